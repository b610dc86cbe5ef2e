use serde_yaml::Value;

use super::error::ResourceError;

/// One local content unit.
///
/// `data` is the structured tree hooks operate on; `json` is its projection,
/// recomputed after the structural stage and then rewritten by `jq` hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub kind: String,
    pub title: String,
    /// Space-relative path with a leading `/`, e.g. `/apps/app1.yml`.
    /// Directory resources use the directory path (`/apps`).
    pub path: String,
    pub data: Value,
    pub json: serde_json::Value,
}

impl Resource {
    pub fn new(path: impl Into<String>, data: Value) -> Result<Self, ResourceError> {
        let path = path.into();
        let kind = string_field(&data, "kind").ok_or_else(|| ResourceError::MissingField {
            path: path.clone(),
            field: "kind",
        })?;
        let title = string_field(&data, "title").ok_or_else(|| ResourceError::MissingField {
            path: path.clone(),
            field: "title",
        })?;

        let mut resource = Self {
            kind,
            title,
            path,
            data,
            json: serde_json::Value::Null,
        };
        resource.update_json()?;
        Ok(resource)
    }

    pub fn from_yaml(path: impl Into<String>, content: &str) -> Result<Self, ResourceError> {
        let path = path.into();
        let data: Value = serde_yaml::from_str(content).map_err(|e| ResourceError::ParseYaml {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::new(path, data)
    }

    /// Recomputes the JSON projection from the structured data.
    pub fn update_json(&mut self) -> Result<(), ResourceError> {
        self.json = serde_json::to_value(&self.data).map_err(|e| ResourceError::Projection {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Re-reads kind and title from the projection, which hooks may have
    /// rewritten. Fields that are missing or not strings are left unchanged.
    pub fn update_kind_and_title(&mut self) {
        if let Some(kind) = self.json.get("kind").and_then(|v| v.as_str()) {
            self.kind = kind.to_string();
        }
        if let Some(title) = self.json.get("title").and_then(|v| v.as_str()) {
            self.title = title.to_string();
        }
    }

    /// Desired labels, read from the projection's `labels` array.
    pub fn labels(&self) -> Vec<String> {
        self.json
            .get("labels")
            .and_then(|v| v.as_array())
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|l| l.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of path components: `/a.yml` is 1, `/apps/a.yml` is 2.
    pub fn depth(&self) -> usize {
        self.path.split('/').filter(|s| !s.is_empty()).count()
    }

    /// Path of the directory resource containing this one, if any.
    pub fn parent_path(&self) -> Option<&str> {
        let trimmed = self.path.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) | None => None,
            Some(idx) => Some(&trimmed[..idx]),
        }
    }
}

fn string_field(data: &Value, field: &str) -> Option<String> {
    data.get(field).and_then(|v| v.as_str()).map(str::to_string)
}
