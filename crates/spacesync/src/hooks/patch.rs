//! Typed merge operations compiled from a hook's `defaults`, `overrides` and
//! `merges` fragments and applied directly to a resource's YAML tree.

use serde_yaml::{Mapping, Value};

use super::error::HookError;

/// How a fragment's values are combined with the resource's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    /// Set only where absent; existing values are never overwritten.
    Defaults,
    /// Replace the value at the key path wholesale.
    Overrides,
    /// Deep merge: mappings recurse and sequences append.
    Merges,
}

impl MergeKind {
    pub fn fragment(&self) -> &'static str {
        match self {
            MergeKind::Defaults => "defaults",
            MergeKind::Overrides => "overrides",
            MergeKind::Merges => "merges",
        }
    }
}

/// One entry of a merge fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOp {
    /// Key path; `a.b` in the fragment addresses `{a: {b: ...}}`.
    pub path: Vec<String>,
    pub value: Value,
    pub kind: MergeKind,
}

impl PatchOp {
    pub fn apply(&self, data: &mut Value) {
        let Some((last, parents)) = self.path.split_last() else {
            return;
        };
        let replace = self.kind == MergeKind::Overrides;

        let mut node = data;
        for segment in parents {
            let Some(mapping) = writable_mapping(node, replace) else {
                return;
            };
            node = mapping
                .entry(Value::String(segment.clone()))
                .or_insert(Value::Mapping(Mapping::new()));
        }

        let Some(mapping) = writable_mapping(node, replace) else {
            return;
        };
        let key = Value::String(last.clone());
        match self.kind {
            MergeKind::Defaults => match mapping.get_mut(&key) {
                Some(existing) => fill_absent(existing, &self.value),
                None => {
                    mapping.insert(key, self.value.clone());
                }
            },
            MergeKind::Overrides => {
                mapping.insert(key, self.value.clone());
            }
            MergeKind::Merges => match mapping.get_mut(&key) {
                Some(existing) => deep_merge(existing, &self.value),
                None => {
                    mapping.insert(key, self.value.clone());
                }
            },
        }
    }
}

/// Compiles a fragment into patch operations, one per entry in source order.
pub fn compile_fragment(
    hook: &str,
    fragment: &Mapping,
    kind: MergeKind,
) -> Result<Vec<PatchOp>, HookError> {
    let mut ops = Vec::with_capacity(fragment.len());

    for (key, value) in fragment {
        let key = scalar_key(key);
        if let Some(unsupported) = unsupported_kind(value) {
            return Err(HookError::UnsupportedValue {
                hook: hook.to_string(),
                fragment: kind.fragment(),
                key,
                kind: unsupported,
            });
        }

        ops.push(PatchOp {
            path: key.split('.').map(str::to_string).collect(),
            value: value.clone(),
            kind,
        });
    }

    Ok(ops)
}

/// Applies every op in order.
pub fn apply_all(ops: &[PatchOp], data: &mut Value) {
    for op in ops {
        op.apply(data);
    }
}

fn scalar_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn unsupported_kind(value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_)
        | Value::Bool(_)
        | Value::Number(_)
        | Value::Sequence(_)
        | Value::Mapping(_) => None,
        Value::Null => Some("null"),
        Value::Tagged(_) => Some("tagged"),
    }
}

/// `node` as a mapping to write into. Null becomes an empty mapping; any
/// other non-mapping value is replaced only when `replace` is set, and is
/// otherwise left untouched.
fn writable_mapping(node: &mut Value, replace: bool) -> Option<&mut Mapping> {
    if node.is_null() || (replace && !node.is_mapping()) {
        *node = Value::Mapping(Mapping::new());
    }
    node.as_mapping_mut()
}

fn fill_absent(existing: &mut Value, incoming: &Value) {
    if let (Value::Mapping(target), Value::Mapping(source)) = (existing, incoming) {
        for (key, value) in source {
            match target.get_mut(key) {
                Some(current) => fill_absent(current, value),
                None => {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

fn deep_merge(existing: &mut Value, incoming: &Value) {
    match (existing, incoming) {
        (Value::Mapping(target), Value::Mapping(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(current) => deep_merge(current, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Sequence(target), Value::Sequence(source)) => {
            target.extend(source.iter().cloned());
        }
        (existing, incoming) => *existing = incoming.clone(),
    }
}
