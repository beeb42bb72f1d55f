use std::path::{Path, PathBuf};

/// Directory the hosting runtime mounts the model into.
pub const DEFAULT_MODEL_DIR: &str = "/opt/ml/model";
/// Artifact file name inside the model directory.
pub const DEFAULT_ARTIFACT: &str = "scikit_model.json";

/// Where to find the model artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub model_dir: PathBuf,
    pub artifact: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            artifact: DEFAULT_ARTIFACT.to_string(),
        }
    }
}

impl AdapterConfig {
    /// Config for a given directory with the default artifact name.
    pub fn for_dir(model_dir: impl AsRef<Path>) -> Self {
        Self {
            model_dir: model_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.model_dir.join(&self.artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_path_joins_dir_and_name() {
        let cfg = AdapterConfig::for_dir("/srv/models/churn");
        assert_eq!(cfg.artifact_path(), PathBuf::from("/srv/models/churn/scikit_model.json"));

        let cfg = AdapterConfig {
            artifact: "v2.json".into(),
            ..cfg
        };
        assert_eq!(cfg.artifact_path(), PathBuf::from("/srv/models/churn/v2.json"));
    }
}
