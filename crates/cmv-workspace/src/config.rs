//! Workspace configuration and input file loading.

use std::path::Path;
use std::time::Duration;

use cmv_core::{ColorTag, MainData, ViewId};
use cmv_views::find_by_tag;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WorkspaceError, WorkspaceResult};

/// A view to create when the workspace starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// First id handed out to a view.
    pub start_id: ViewId,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// How long the CLI waits for one backend result.
    pub result_timeout_ms: u64,
    pub views: Vec<ViewSpec>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            start_id: ViewId::new(1),
            log_filter: "info".to_string(),
            result_timeout_ms: 5000,
            views: Vec::new(),
        }
    }
}

impl WorkspaceConfig {
    /// Load and validate a YAML config. Missing fields take their defaults.
    pub fn load(path: &Path) -> WorkspaceResult<Self> {
        let content = read(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> WorkspaceResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WorkspaceResult<()> {
        if self.start_id.get() == 0 {
            return Err(WorkspaceError::Config("start_id must be at least 1".to_string()));
        }
        if self.result_timeout_ms == 0 {
            return Err(WorkspaceError::Config(
                "result_timeout_ms must be positive".to_string(),
            ));
        }
        for spec in &self.views {
            if find_by_tag(&spec.type_tag).is_none() {
                return Err(WorkspaceError::Config(format!(
                    "Unknown view type in views: {}",
                    spec.type_tag
                )));
            }
        }
        Ok(())
    }

    pub fn result_timeout(&self) -> Duration {
        Duration::from_millis(self.result_timeout_ms)
    }
}

/// Load a main table from a `{ data, schema: { fields } }` JSON file.
pub fn load_dataset(path: &Path) -> WorkspaceResult<MainData> {
    let content = read(path)?;
    let main: MainData = serde_json::from_str(&content)?;
    main.validate()?;
    Ok(main)
}

/// Load a JSON list of `{ id, color }` tags.
pub fn load_color_tags(path: &Path) -> WorkspaceResult<Vec<ColorTag>> {
    let content = read(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn read(path: &Path) -> WorkspaceResult<String> {
    std::fs::read_to_string(path).map_err(|e| WorkspaceError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
