//! Hook definitions as written in `hooks/*.yml`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::error::HookError;
use super::listing::ListFiles;
use crate::assets::Asset;

/// Keys that accept either a single expression or a list of expressions.
const LIST_KEYS: &[&str] = &["yq", "jq"];

/// A transformation rule applied to resources of matching kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookConfig {
    /// Regex over resource kinds. Empty means the hook applies to the kind
    /// named like the hook file.
    #[serde(default)]
    pub target: String,

    /// Ascending: lower priorities run first.
    #[serde(default)]
    pub priority: i64,

    #[serde(default)]
    pub list_files: ListFiles,

    /// Values set only where the resource has none.
    #[serde(default)]
    pub defaults: Mapping,

    /// Values that replace whatever the resource has.
    #[serde(default)]
    pub overrides: Mapping,

    /// Values deep-merged into the resource.
    #[serde(default)]
    pub merges: Mapping,

    /// Convergence condition for re-running `yq` expressions.
    #[serde(default)]
    pub yq_while: String,

    /// Structural expressions, run against the YAML tree.
    #[serde(default)]
    pub yq: Vec<String>,

    /// Projection expressions, run against the JSON form.
    #[serde(default)]
    pub jq: Vec<String>,

    #[serde(default)]
    pub header: String,

    #[serde(default)]
    pub footer: String,
}

impl HookConfig {
    /// Parses a hook source.
    ///
    /// The document is normalized before typed decoding: `yq: "expr"` and
    /// `yq: ["expr"]` are equivalent, and keys with null values are treated
    /// as absent.
    pub fn parse(content: &str, origin: &str) -> Result<Self, HookError> {
        let mut document: Value = serde_yaml::from_str(content).map_err(|e| HookError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

        match &mut document {
            Value::Mapping(mapping) => normalize(mapping),
            _ => {
                return Err(HookError::NotAMapping {
                    origin: origin.to_string(),
                })
            }
        }

        serde_yaml::from_value(document).map_err(|e| HookError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// True when the hook is selected by a pattern rather than by name.
    pub fn is_pattern(&self) -> bool {
        !self.target.is_empty()
    }
}

fn normalize(mapping: &mut Mapping) {
    let null_keys: Vec<Value> = mapping
        .iter()
        .filter(|(_, v)| v.is_null())
        .map(|(k, _)| k.clone())
        .collect();
    for key in null_keys {
        mapping.remove(&key);
    }

    for key in LIST_KEYS {
        if let Some(value) = mapping.get_mut(*key) {
            if value.is_string() {
                let single = std::mem::replace(value, Value::Null);
                *value = Value::Sequence(vec![single]);
            }
        }
    }
}

/// A hook definition bound to the asset it was loaded from.
#[derive(Debug, Clone)]
pub struct Hook {
    pub name: String,
    pub origin: String,
    pub config: HookConfig,
    pattern: Option<Regex>,
}

impl Hook {
    pub fn from_asset(asset: &Asset) -> Result<Self, HookError> {
        let origin = asset.origin.to_string();
        let config = HookConfig::parse(&asset.content, &origin)?;
        Self::new(asset.name.clone(), origin, config)
    }

    pub fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        config: HookConfig,
    ) -> Result<Self, HookError> {
        let origin = origin.into();
        let pattern = if config.is_pattern() {
            let regex = Regex::new(&config.target).map_err(|e| HookError::InvalidPattern {
                origin: origin.clone(),
                pattern: config.target.clone(),
                reason: e.to_string(),
            })?;
            Some(regex)
        } else {
            None
        };

        Ok(Self {
            name: name.into(),
            origin,
            config,
            pattern,
        })
    }

    /// Whether this pattern hook targets `kind`. Kind-exact hooks never match
    /// here; they are looked up by name.
    pub fn matches(&self, kind: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|p| p.is_match(kind))
            .unwrap_or(false)
    }
}
