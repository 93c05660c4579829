// Service exports
pub mod artifacts;
pub mod classifier;
pub mod xgboost;

pub use artifacts::{Artifacts, ArtifactError, check_compatible, load_feature_schema, load_model};
pub use classifier::{Classifier, ModelError, Node, RegressionTree, TreeEnsemble, sigmoid};
pub use xgboost::XgbModel;
