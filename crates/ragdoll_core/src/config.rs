// crates/ragdoll_core/src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use ragdoll_shared::KeyMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::LoadModelsConfig;
use crate::engine_loop::DEFAULT_MAX_FRAME_DT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Sandbox settings. Every field has a default, so a config file only lists
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub window_title: String,
    pub window_size: (u32, u32),
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` wins when set.
    pub log_filter: String,
    pub input_mode: KeyMode,
    pub asset_root: PathBuf,
    pub max_frame_dt: f32,
    /// Overrides the stage's built-in model and clip list.
    pub model: Option<LoadModelsConfig>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            window_title: "Ragdoll Sandbox".to_string(),
            window_size: (1280, 720),
            log_filter: "info,ragdoll_core=debug,qwop=debug".to_string(),
            input_mode: KeyMode::Code,
            asset_root: PathBuf::from("assets"),
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            model: None,
        }
    }
}

impl SandboxConfig {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::de::from_str(text)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ModelFormat;

    #[test]
    fn empty_config_is_all_defaults() {
        let config = SandboxConfig::from_ron("()").expect("parses");
        assert_eq!(config, SandboxConfig::default());
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = SandboxConfig::from_ron(
            r#"(
                window_title: "QWOP",
                input_mode: key,
                max_frame_dt: 0.1,
                model: Some((
                    parent_dir: "qwop",
                    model_name: "character",
                    model_ext: fbx,
                    anim_names: ["idle", "walk"],
                )),
            )"#,
        )
        .expect("parses");
        assert_eq!(config.window_title, "QWOP");
        assert_eq!(config.input_mode, KeyMode::Key);
        assert_eq!(config.window_size, (1280, 720));
        let model = config.model.expect("model set");
        assert_eq!(model.model_ext, ModelFormat::Fbx);
        assert_eq!(model.anim_names, ["idle", "walk"]);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = SandboxConfig::load("does/not/exist.ron").expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("does/not/exist.ron"));
    }
}
