// Unit tests for the credit-risk scoring core

use credit_risk::core::{assemble_features, form::loan_percent_income, one_hot, ApplicantForm};
use credit_risk::models::{
    ApplicantRecord, CategoricalGroup, FeatureSchema, HomeOwnership, LoanGrade, LoanIntent,
    NumericField, ScoreRequest,
};
use credit_risk::services::{load_feature_schema, load_model, Classifier};
use std::path::PathBuf;

fn artifact(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("artifacts").join(name)
}

fn bundled_schema() -> FeatureSchema {
    load_feature_schema(artifact("gbm_features.json")).unwrap()
}

#[test]
fn test_assembled_length_for_every_subset() {
    let schema = bundled_schema();
    let names: Vec<&str> = schema.iter().collect();

    // Walk prefixes and strided subsets of the schema
    for take in 0..=names.len() {
        for stride in 1..=3 {
            let record: ApplicantRecord = names
                .iter()
                .take(take)
                .step_by(stride)
                .enumerate()
                .map(|(i, name)| (*name, i as f64 + 1.0))
                .collect();

            let row = assemble_features(&schema, &record);
            assert_eq!(row.len(), schema.len());

            for (name, value) in names.iter().zip(&row) {
                assert_eq!(record.get(name).unwrap_or(0.0), *value, "column {}", name);
            }
        }
    }
}

#[test]
fn test_form_record_covers_ui_columns_of_schema() {
    let schema = bundled_schema();
    let record = ApplicantForm::default().to_record();
    let row = assemble_features(&schema, &record);

    // Columns the form never fills stay at zero
    let b = schema.iter().position(|n| n == "loan_grade_B").unwrap();
    let prior_default = schema.iter().position(|n| n == "cb_person_default_on_file_Y").unwrap();
    assert_eq!(row[b], 0.0);
    assert_eq!(row[prior_default], 0.0);

    // Every form key that the schema knows about lands in the row
    for key in record.keys() {
        if let Some(pos) = schema.iter().position(|n| n == key) {
            assert_eq!(row[pos], record.get(key).unwrap());
        }
    }
}

fn hot_count<G: CategoricalGroup>(record: &ApplicantRecord) -> usize {
    G::options()
        .iter()
        .filter(|o| record.get(&o.column()) == Some(1.0))
        .count()
}

#[test]
fn test_exactly_one_hot_per_group() {
    for &home in HomeOwnership::options() {
        for &intent in LoanIntent::options() {
            for &grade in LoanGrade::options() {
                let form = ApplicantForm {
                    home_ownership: home,
                    loan_intent: intent,
                    loan_grade: grade,
                    ..Default::default()
                };
                let record = form.to_record();

                assert_eq!(hot_count::<HomeOwnership>(&record), 1);
                assert_eq!(hot_count::<LoanIntent>(&record), 1);
                assert_eq!(hot_count::<LoanGrade>(&record), 1);
                assert_eq!(record.get(&grade.column()), Some(1.0));
            }
        }
    }
}

#[test]
fn test_one_hot_columns_are_prefixed() {
    for (column, _) in one_hot(HomeOwnership::Other) {
        assert!(column.starts_with("person_home_ownership_"));
    }
}

#[test]
fn test_loan_percent_income_formula() {
    for (amount, income) in [(500.0, 1000.0), (12_000.0, 18_000.0), (50_000.0, 500_000.0)] {
        let form = ApplicantForm::from_request(&ScoreRequest {
            loan_amnt: Some(amount),
            person_income: Some(income),
            ..Default::default()
        });
        assert_eq!(form.loan_percent_income(), amount / income * 100.0);
        assert_eq!(
            form.to_record().get("loan_percent_income"),
            Some(amount / income * 100.0)
        );
    }

    assert_eq!(loan_percent_income(1_000.0, 0.0), 0.0);
}

#[test]
fn test_widget_bounds() {
    for field in NumericField::ALL {
        let (min, max, step) = field.bounds();
        assert!(min < max);
        assert!(step > 0.0);
        assert_eq!(field.clamp(min - 1.0), min);
        assert_eq!(field.clamp(max + 1.0), max);
    }
}

#[test]
fn test_bundled_model_outputs_are_consistent() {
    let schema = bundled_schema();
    let model = load_model(artifact("gbm_credit_risk_model.json")).unwrap();
    assert_eq!(model.num_features(), schema.len());

    for income in [1_000.0, 25_000.0, 60_000.0, 250_000.0] {
        for rate in [0.0, 9.0, 14.0, 30.0] {
            for &grade in LoanGrade::options() {
                let form = ApplicantForm::from_request(&ScoreRequest {
                    person_income: Some(income),
                    loan_amnt: Some(10_000.0),
                    loan_int_rate: Some(rate),
                    loan_grade: Some(grade),
                    ..Default::default()
                });
                let row = assemble_features(&schema, &form.to_record());

                let p = model.predict_proba(&row).unwrap();
                let label = model.predict(&row).unwrap();
                assert!((0.0..=1.0).contains(&p));
                assert!(label == 0 || label == 1);
                assert_eq!(label, u8::from(p > 0.5));
            }
        }
    }
}
