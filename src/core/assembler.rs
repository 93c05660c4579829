use crate::models::{ApplicantRecord, FeatureSchema};

/// Assemble a dense row aligned to the schema
///
/// Every schema feature gets exactly one value, in schema order. Features the
/// record does not set are filled with 0; record keys outside the schema are
/// ignored. A misspelled numeric field therefore scores as 0 rather than
/// failing.
pub fn assemble_features(schema: &FeatureSchema, record: &ApplicantRecord) -> Vec<f64> {
    let row: Vec<f64> = schema
        .iter()
        .map(|name| record.get(name).unwrap_or(0.0))
        .collect();

    if tracing::enabled!(tracing::Level::DEBUG) {
        let filled = schema.iter().filter(|name| record.get(name).is_none()).count();
        let ignored = record.keys().filter(|key| !schema.contains(key)).count();
        tracing::debug!(
            "Assembled {} features ({} zero-filled, {} ignored input keys)",
            row.len(),
            filled,
            ignored
        );
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::try_new(vec![
            "person_age".to_string(),
            "person_income".to_string(),
            "loan_grade_B".to_string(),
            "loan_grade_C".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_assemble_in_schema_order() {
        let record: ApplicantRecord = [
            ("loan_grade_C", 1.0),
            ("person_income", 52_000.0),
            ("person_age", 31.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(assemble_features(&schema(), &record), vec![31.0, 52_000.0, 0.0, 1.0]);
    }

    #[test]
    fn test_absent_features_zero_filled() {
        let record: ApplicantRecord = [("person_age", 40.0)].into_iter().collect();
        assert_eq!(assemble_features(&schema(), &record), vec![40.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let record: ApplicantRecord = [("person_age", 40.0), ("favourite_colour", 3.0)]
            .into_iter()
            .collect();
        let row = assemble_features(&schema(), &record);

        assert_eq!(row.len(), 4);
        assert_eq!(row, vec![40.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_record() {
        let row = assemble_features(&schema(), &ApplicantRecord::new());
        assert_eq!(row, vec![0.0; 4]);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let record: ApplicantRecord = [("person_income", 10.0), ("loan_grade_B", 1.0)]
            .into_iter()
            .collect();
        assert_eq!(
            assemble_features(&schema(), &record),
            assemble_features(&schema(), &record)
        );
    }
}
