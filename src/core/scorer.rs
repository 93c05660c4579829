use std::sync::Arc;

use crate::core::assembler::assemble_features;
use crate::core::form::ApplicantForm;
use crate::models::{ApplicantRecord, FeatureSchema, PredictionResult};
use crate::services::{Artifacts, Classifier, ModelError};

/// Runs one prediction: assemble the row, then ask the classifier
///
/// Holds only shared read-only state, so it is cheap to clone into every
/// worker.
#[derive(Clone)]
pub struct Scorer {
    schema: Arc<FeatureSchema>,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer")
            .field("features", &self.schema.len())
            .finish()
    }
}

impl Scorer {
    pub fn new(schema: Arc<FeatureSchema>, classifier: Arc<dyn Classifier>) -> Self {
        Self { schema, classifier }
    }

    pub fn from_artifacts(artifacts: Artifacts) -> Self {
        Self::new(artifacts.schema, artifacts.classifier)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Score a sparse record
    ///
    /// Classifier failures (shape mismatch, non-finite output) are returned
    /// unchanged; there is no fallback prediction.
    pub fn predict(&self, record: &ApplicantRecord) -> Result<PredictionResult, ModelError> {
        let row = assemble_features(&self.schema, record);

        let probability = self.classifier.predict_proba(&row)?;
        let label = self.classifier.predict(&row)?;

        Ok(PredictionResult { probability, label })
    }

    pub fn score_form(&self, form: &ApplicantForm) -> Result<PredictionResult, ModelError> {
        self.predict(&form.to_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HomeOwnership, LoanGrade};
    use crate::services::{Node, RegressionTree, TreeEnsemble};

    /// Tree on loan_percent_income (index 1) and loan_grade_G (index 2)
    fn scorer() -> Scorer {
        let schema = FeatureSchema::try_new(vec![
            "person_income".to_string(),
            "loan_percent_income".to_string(),
            "loan_grade_G".to_string(),
        ])
        .unwrap();

        let tree = RegressionTree::new(
            0,
            vec![
                Node::Split { feature: 1, threshold: 30.0, default_left: true, left: 1, right: 2 },
                Node::Split { feature: 2, threshold: 0.5, default_left: true, left: 3, right: 4 },
                Node::Leaf(2.5),
                Node::Leaf(-2.0),
                Node::Leaf(1.5),
            ],
        )
        .unwrap();
        let model = TreeEnsemble::new(vec![tree], 0.0, 3).unwrap();

        Scorer::new(Arc::new(schema), Arc::new(model))
    }

    #[test]
    fn test_predict_sparse_record() {
        let record: ApplicantRecord = [("person_income", 60_000.0)].into_iter().collect();
        let result = scorer().predict(&record).unwrap();

        assert!(result.probability < 0.5);
        assert_eq!(result.label, 0);
    }

    #[test]
    fn test_score_form_uses_derived_ratio() {
        let scorer = scorer();
        let form = ApplicantForm {
            person_income: 20_000.0,
            loan_amnt: 10_000.0,
            home_ownership: HomeOwnership::Own,
            ..Default::default()
        };

        // 50% of income goes right at the root
        let result = scorer.score_form(&form).unwrap();
        assert_eq!(result.label, 1);
        assert!(result.probability > 0.9);
    }

    #[test]
    fn test_grade_one_hot_reaches_model() {
        let scorer = scorer();
        let base = ApplicantForm {
            person_income: 100_000.0,
            loan_amnt: 5_000.0,
            ..Default::default()
        };
        let grade_g = ApplicantForm { loan_grade: LoanGrade::G, ..base.clone() };

        let safe = scorer.score_form(&base).unwrap();
        let risky = scorer.score_form(&grade_g).unwrap();

        assert_eq!(safe.label, 0);
        assert_eq!(risky.label, 1);
        assert!(risky.probability > safe.probability);
    }

    #[test]
    fn test_probability_and_label_bounds() {
        let scorer = scorer();
        for income in [1_000.0, 10_000.0, 100_000.0, 500_000.0] {
            for amount in [500.0, 5_000.0, 50_000.0] {
                let form = ApplicantForm {
                    person_income: income,
                    loan_amnt: amount,
                    ..Default::default()
                };
                let result = scorer.score_form(&form).unwrap();
                assert!((0.0..=1.0).contains(&result.probability));
                assert!(result.label <= 1);
                assert_eq!(result.label, u8::from(result.probability > 0.5));
            }
        }
    }
}
