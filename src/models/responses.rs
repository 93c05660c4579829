use serde::{Deserialize, Serialize};
use crate::models::domain::RiskDecision;

/// Response for the score endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub request_id: String,
    pub probability: f64,
    /// Probability formatted as a percentage with two decimals, e.g. "12.34%"
    pub probability_display: String,
    pub label: u8,
    pub decision: RiskDecision,
    pub decision_text: String,
    /// Only present when scoring a form submission
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub loan_percent_income: Option<f64>,
}

/// Numeric stepper description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericWidget {
    pub key: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

/// Single-choice selector description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalWidget {
    pub key: String,
    pub title: String,
    pub column_prefix: String,
    pub options: Vec<String>,
    pub default: String,
}

/// Form layout served to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse {
    pub numeric: Vec<NumericWidget>,
    pub categorical: Vec<CategoricalWidget>,
    pub derived: Vec<String>,
}

/// Ordered feature list the model was trained on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub features: Vec<String>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub feature_count: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
