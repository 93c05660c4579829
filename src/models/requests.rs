use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError};
use crate::models::domain::{HomeOwnership, LoanGrade, LoanIntent};

/// Applicant form submission
///
/// Every field is optional; omitted steppers take their widget default and
/// omitted selectors their default option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(alias = "person_age", rename = "personAge", default)]
    pub person_age: Option<f64>,
    #[serde(alias = "person_income", rename = "personIncome", default)]
    pub person_income: Option<f64>,
    #[serde(alias = "person_emp_length", rename = "personEmpLength", default)]
    pub person_emp_length: Option<f64>,
    #[serde(alias = "loan_amnt", rename = "loanAmnt", default)]
    pub loan_amnt: Option<f64>,
    #[serde(alias = "loan_int_rate", rename = "loanIntRate", default)]
    pub loan_int_rate: Option<f64>,
    #[serde(alias = "cb_person_cred_hist_length", rename = "cbPersonCredHistLength", default)]
    pub cb_person_cred_hist_length: Option<f64>,
    #[serde(alias = "home_ownership", rename = "homeOwnership", default)]
    pub home_ownership: Option<HomeOwnership>,
    #[serde(alias = "loan_intent", rename = "loanIntent", default)]
    pub loan_intent: Option<LoanIntent>,
    #[serde(alias = "loan_grade", rename = "loanGrade", default)]
    pub loan_grade: Option<LoanGrade>,
}

/// Raw sparse feature map to score directly against the schema
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreFeaturesRequest {
    #[validate(length(min = 1), custom(function = "validate_feature_names"))]
    pub features: HashMap<String, f64>,
}

fn validate_feature_names(features: &HashMap<String, f64>) -> Result<(), ValidationError> {
    if features.keys().any(|name| name.trim().is_empty()) {
        return Err(ValidationError::new("empty_feature_name"));
    }
    Ok(())
}
