use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::models::domain::{FeatureSchema, SchemaError};
use crate::services::classifier::{Classifier, ModelError, TreeEnsemble};
use crate::services::xgboost::XgbModel;

/// Errors that can occur while loading startup artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid feature list: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("model expects {model} features but feature list has {schema}")]
    FeatureCountMismatch { model: usize, schema: usize },

    #[error("model feature names differ from feature list at position {position}: model has {model:?}, list has {schema:?}")]
    FeatureNameMismatch {
        position: usize,
        model: String,
        schema: String,
    },
}

/// Artifacts loaded once at startup and shared read-only by every request
#[derive(Clone)]
pub struct Artifacts {
    pub schema: Arc<FeatureSchema>,
    pub classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("features", &self.schema.len())
            .field("model_features", &self.classifier.num_features())
            .finish()
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the ordered feature list (a JSON array of strings)
pub fn load_feature_schema(path: impl AsRef<Path>) -> Result<FeatureSchema, ArtifactError> {
    let path = path.as_ref();
    let bytes = read(path)?;
    let names: Vec<String> = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let schema = FeatureSchema::try_new(names)?;
    tracing::debug!("Loaded {} feature names from {}", schema.len(), path.display());
    Ok(schema)
}

/// Load an XGBoost JSON model
pub fn load_model(path: impl AsRef<Path>) -> Result<TreeEnsemble, ArtifactError> {
    let path = path.as_ref();
    let bytes = read(path)?;
    let model = XgbModel::from_slice(&bytes).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let ensemble = model.into_ensemble()?;
    tracing::debug!(
        "Loaded model from {} ({} trees, {} features)",
        path.display(),
        ensemble.num_trees(),
        ensemble.num_features()
    );
    Ok(ensemble)
}

/// Check that the model was trained on exactly this feature list
pub fn check_compatible(schema: &FeatureSchema, model: &TreeEnsemble) -> Result<(), ArtifactError> {
    if model.num_features() != schema.len() {
        return Err(ArtifactError::FeatureCountMismatch {
            model: model.num_features(),
            schema: schema.len(),
        });
    }

    if let Some(names) = model.feature_names() {
        if names.len() != schema.len() {
            return Err(ArtifactError::FeatureCountMismatch {
                model: names.len(),
                schema: schema.len(),
            });
        }

        if let Some((position, (model_name, schema_name))) = names
            .iter()
            .zip(schema.iter())
            .enumerate()
            .find(|(_, (m, s))| m.as_str() != *s)
        {
            return Err(ArtifactError::FeatureNameMismatch {
                position,
                model: model_name.clone(),
                schema: schema_name.to_string(),
            });
        }
    }

    Ok(())
}

impl Artifacts {
    /// Load both artifacts and verify they agree
    pub fn load(
        model_path: impl AsRef<Path>,
        features_path: impl AsRef<Path>,
    ) -> Result<Self, ArtifactError> {
        let schema = load_feature_schema(features_path)?;
        let model = load_model(model_path)?;
        check_compatible(&schema, &model)?;

        Ok(Self {
            schema: Arc::new(schema),
            classifier: Arc::new(model),
        })
    }
}
