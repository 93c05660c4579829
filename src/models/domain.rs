use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors raised when building a feature schema
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("feature schema is empty")]
    Empty,

    #[error("duplicate feature name in schema: {0}")]
    Duplicate(String),
}

/// Ordered list of feature names the classifier expects
///
/// Built once at startup from the feature list artifact and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn try_new(names: Vec<String>) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Sparse mapping from feature name to value for a single applicant
///
/// Keys outside the schema are allowed; they are dropped during assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantRecord {
    values: HashMap<String, f64>,
}

impl ApplicantRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl From<HashMap<String, f64>> for ApplicantRecord {
    fn from(values: HashMap<String, f64>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ApplicantRecord {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Numeric stepper fields collected by the applicant form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    PersonAge,
    PersonIncome,
    PersonEmpLength,
    LoanAmnt,
    LoanIntRate,
    CbPersonCredHistLength,
}

impl NumericField {
    pub const ALL: [NumericField; 6] = [
        NumericField::PersonAge,
        NumericField::PersonIncome,
        NumericField::PersonEmpLength,
        NumericField::LoanAmnt,
        NumericField::LoanIntRate,
        NumericField::CbPersonCredHistLength,
    ];

    /// Feature column this field fills
    pub fn key(self) -> &'static str {
        match self {
            NumericField::PersonAge => "person_age",
            NumericField::PersonIncome => "person_income",
            NumericField::PersonEmpLength => "person_emp_length",
            NumericField::LoanAmnt => "loan_amnt",
            NumericField::LoanIntRate => "loan_int_rate",
            NumericField::CbPersonCredHistLength => "cb_person_cred_hist_length",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericField::PersonAge => "Person Age",
            NumericField::PersonIncome => "Annual Income (USD)",
            NumericField::PersonEmpLength => "Employment Length (Years)",
            NumericField::LoanAmnt => "Loan Amount (USD)",
            NumericField::LoanIntRate => "Interest Rate (%)",
            NumericField::CbPersonCredHistLength => "Credit History Length (Years)",
        }
    }

    /// Widget bounds and step as (min, max, step)
    pub fn bounds(self) -> (f64, f64, f64) {
        match self {
            NumericField::PersonAge => (18.0, 75.0, 1.0),
            NumericField::PersonIncome => (1000.0, 500_000.0, 1000.0),
            NumericField::PersonEmpLength => (0.0, 40.0, 1.0),
            NumericField::LoanAmnt => (500.0, 50_000.0, 500.0),
            NumericField::LoanIntRate => (0.0, 50.0, 0.1),
            NumericField::CbPersonCredHistLength => (0.0, 30.0, 1.0),
        }
    }

    /// Value the stepper shows before the user touches it
    pub fn default_value(self) -> f64 {
        self.bounds().0
    }

    #[inline]
    pub fn clamp(self, value: f64) -> f64 {
        let (min, max, _) = self.bounds();
        if value.is_nan() {
            return self.default_value();
        }
        value.clamp(min, max)
    }
}

/// A single-choice selector whose options are one-hot encoded
pub trait CategoricalGroup: Copy + PartialEq + Default + 'static {
    /// Column prefix shared by every option of the group
    const PREFIX: &'static str;
    const TITLE: &'static str;

    fn options() -> &'static [Self];

    fn as_str(self) -> &'static str;

    fn column(self) -> String {
        format!("{}{}", Self::PREFIX, self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HomeOwnership {
    Own,
    #[default]
    Rent,
    Other,
}

impl CategoricalGroup for HomeOwnership {
    const PREFIX: &'static str = "person_home_ownership_";
    const TITLE: &'static str = "Home Ownership";

    fn options() -> &'static [Self] {
        &[HomeOwnership::Own, HomeOwnership::Rent, HomeOwnership::Other]
    }

    fn as_str(self) -> &'static str {
        match self {
            HomeOwnership::Own => "OWN",
            HomeOwnership::Rent => "RENT",
            HomeOwnership::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanIntent {
    #[default]
    Education,
    HomeImprovement,
    Medical,
    Personal,
    Venture,
}

impl CategoricalGroup for LoanIntent {
    const PREFIX: &'static str = "loan_intent_";
    const TITLE: &'static str = "Loan Purpose";

    fn options() -> &'static [Self] {
        &[
            LoanIntent::Education,
            LoanIntent::HomeImprovement,
            LoanIntent::Medical,
            LoanIntent::Personal,
            LoanIntent::Venture,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            LoanIntent::Education => "EDUCATION",
            LoanIntent::HomeImprovement => "HOMEIMPROVEMENT",
            LoanIntent::Medical => "MEDICAL",
            LoanIntent::Personal => "PERSONAL",
            LoanIntent::Venture => "VENTURE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoanGrade {
    #[default]
    C,
    D,
    E,
    F,
    G,
}

impl CategoricalGroup for LoanGrade {
    const PREFIX: &'static str = "loan_grade_";
    const TITLE: &'static str = "Loan Grade";

    fn options() -> &'static [Self] {
        &[LoanGrade::C, LoanGrade::D, LoanGrade::E, LoanGrade::F, LoanGrade::G]
    }

    fn as_str(self) -> &'static str {
        match self {
            LoanGrade::C => "C",
            LoanGrade::D => "D",
            LoanGrade::E => "E",
            LoanGrade::F => "F",
            LoanGrade::G => "G",
        }
    }
}

/// Outcome of one model invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of default, in [0, 1]
    pub probability: f64,
    /// 1 = default predicted, 0 = no default
    pub label: u8,
}

impl PredictionResult {
    pub fn decision(&self) -> RiskDecision {
        if self.label == 1 {
            RiskDecision::HighRisk
        } else {
            RiskDecision::LikelySafe
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskDecision {
    HighRisk,
    LikelySafe,
}

impl RiskDecision {
    pub fn text(self) -> &'static str {
        match self {
            RiskDecision::HighRisk => "High risk",
            RiskDecision::LikelySafe => "Likely safe",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_empty() {
        assert_eq!(FeatureSchema::try_new(vec![]), Err(SchemaError::Empty));
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let names = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(
            FeatureSchema::try_new(names),
            Err(SchemaError::Duplicate("a".to_string()))
        );
    }

    #[test]
    fn test_schema_keeps_order() {
        let schema = FeatureSchema::try_new(vec!["z".into(), "a".into(), "m".into()]).unwrap();
        assert_eq!(schema.iter().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert!(schema.contains("a"));
        assert!(!schema.contains("b"));
    }

    #[test]
    fn test_numeric_clamp() {
        assert_eq!(NumericField::PersonAge.clamp(10.0), 18.0);
        assert_eq!(NumericField::PersonAge.clamp(99.0), 75.0);
        assert_eq!(NumericField::LoanIntRate.clamp(12.5), 12.5);
        assert_eq!(NumericField::PersonIncome.clamp(f64::NAN), 1000.0);
    }

    #[test]
    fn test_category_columns() {
        assert_eq!(HomeOwnership::Own.column(), "person_home_ownership_OWN");
        assert_eq!(LoanIntent::HomeImprovement.column(), "loan_intent_HOMEIMPROVEMENT");
        assert_eq!(LoanGrade::G.column(), "loan_grade_G");
    }

    #[test]
    fn test_category_serde_names() {
        let intent: LoanIntent = serde_json::from_str("\"HOMEIMPROVEMENT\"").unwrap();
        assert_eq!(intent, LoanIntent::HomeImprovement);
        let home: HomeOwnership = serde_json::from_str("\"OTHER\"").unwrap();
        assert_eq!(home, HomeOwnership::Other);
    }

    #[test]
    fn test_decision_from_label() {
        let high = PredictionResult { probability: 0.8, label: 1 };
        let safe = PredictionResult { probability: 0.2, label: 0 };
        assert_eq!(high.decision(), RiskDecision::HighRisk);
        assert_eq!(safe.decision().text(), "Likely safe");
    }
}
