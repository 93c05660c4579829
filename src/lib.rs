//! Credit Risk - applicant default probability scoring service
//!
//! Collects applicant and loan attributes, assembles them into the feature
//! vector a pre-trained gradient-boosted model expects, and returns the
//! model's default probability and decision.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{assemble_features, ApplicantForm, Scorer};
pub use models::{ApplicantRecord, FeatureSchema, PredictionResult, ScoreRequest, ScoreResponse};
pub use services::{Artifacts, ArtifactError, Classifier, ModelError, TreeEnsemble};
