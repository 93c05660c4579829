// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ApplicantRecord, CategoricalGroup, FeatureSchema, HomeOwnership, LoanGrade, LoanIntent,
    NumericField, PredictionResult, RiskDecision,
};
pub use requests::{ScoreFeaturesRequest, ScoreRequest};
pub use responses::{
    CategoricalWidget, ErrorResponse, FormResponse, HealthResponse, NumericWidget, SchemaResponse,
    ScoreResponse,
};
