use crate::models::{
    ApplicantRecord, CategoricalGroup, CategoricalWidget, FormResponse, HomeOwnership, LoanGrade,
    LoanIntent, NumericField, NumericWidget, ScoreRequest,
};

/// Derived feature computed from loan amount and income
pub const LOAN_PERCENT_INCOME: &str = "loan_percent_income";

/// Loan amount as a percentage of annual income, 0 when income is not positive
#[inline]
pub fn loan_percent_income(loan_amnt: f64, person_income: f64) -> f64 {
    if person_income > 0.0 {
        loan_amnt / person_income * 100.0
    } else {
        0.0
    }
}

/// One column per option: 1 for the selected option, 0 for the others
pub fn one_hot<G: CategoricalGroup>(selected: G) -> Vec<(String, f64)> {
    G::options()
        .iter()
        .map(|&option| (option.column(), if option == selected { 1.0 } else { 0.0 }))
        .collect()
}

/// A fully resolved applicant form, as the widgets would hold it
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantForm {
    pub person_age: f64,
    pub person_income: f64,
    pub person_emp_length: f64,
    pub loan_amnt: f64,
    pub loan_int_rate: f64,
    pub cb_person_cred_hist_length: f64,
    pub home_ownership: HomeOwnership,
    pub loan_intent: LoanIntent,
    pub loan_grade: LoanGrade,
}

impl Default for ApplicantForm {
    fn default() -> Self {
        Self {
            person_age: NumericField::PersonAge.default_value(),
            person_income: NumericField::PersonIncome.default_value(),
            person_emp_length: NumericField::PersonEmpLength.default_value(),
            loan_amnt: NumericField::LoanAmnt.default_value(),
            loan_int_rate: NumericField::LoanIntRate.default_value(),
            cb_person_cred_hist_length: NumericField::CbPersonCredHistLength.default_value(),
            home_ownership: HomeOwnership::default(),
            loan_intent: LoanIntent::default(),
            loan_grade: LoanGrade::default(),
        }
    }
}

impl ApplicantForm {
    /// Resolve a submission: omitted values take widget defaults, numbers are
    /// clamped to widget bounds
    pub fn from_request(req: &ScoreRequest) -> Self {
        let resolve = |field: NumericField, value: Option<f64>| {
            value.map_or_else(|| field.default_value(), |v| field.clamp(v))
        };

        Self {
            person_age: resolve(NumericField::PersonAge, req.person_age),
            person_income: resolve(NumericField::PersonIncome, req.person_income),
            person_emp_length: resolve(NumericField::PersonEmpLength, req.person_emp_length),
            loan_amnt: resolve(NumericField::LoanAmnt, req.loan_amnt),
            loan_int_rate: resolve(NumericField::LoanIntRate, req.loan_int_rate),
            cb_person_cred_hist_length: resolve(
                NumericField::CbPersonCredHistLength,
                req.cb_person_cred_hist_length,
            ),
            home_ownership: req.home_ownership.unwrap_or_default(),
            loan_intent: req.loan_intent.unwrap_or_default(),
            loan_grade: req.loan_grade.unwrap_or_default(),
        }
    }

    pub fn numeric_value(&self, field: NumericField) -> f64 {
        match field {
            NumericField::PersonAge => self.person_age,
            NumericField::PersonIncome => self.person_income,
            NumericField::PersonEmpLength => self.person_emp_length,
            NumericField::LoanAmnt => self.loan_amnt,
            NumericField::LoanIntRate => self.loan_int_rate,
            NumericField::CbPersonCredHistLength => self.cb_person_cred_hist_length,
        }
    }

    pub fn loan_percent_income(&self) -> f64 {
        loan_percent_income(self.loan_amnt, self.person_income)
    }

    /// Sparse record with every column the form knows how to fill
    pub fn to_record(&self) -> ApplicantRecord {
        let mut record = ApplicantRecord::new();

        for field in NumericField::ALL {
            record.set(field.key(), self.numeric_value(field));
        }
        record.set(LOAN_PERCENT_INCOME, self.loan_percent_income());

        for (column, value) in one_hot(self.home_ownership)
            .into_iter()
            .chain(one_hot(self.loan_intent))
            .chain(one_hot(self.loan_grade))
        {
            record.set(column, value);
        }

        record
    }
}

fn categorical_widget<G: CategoricalGroup>(key: &str) -> CategoricalWidget {
    CategoricalWidget {
        key: key.to_string(),
        title: G::TITLE.to_string(),
        column_prefix: G::PREFIX.to_string(),
        options: G::options().iter().map(|o| o.as_str().to_string()).collect(),
        default: G::default().as_str().to_string(),
    }
}

/// Widget layout of the applicant form
pub fn form_layout() -> FormResponse {
    let numeric = NumericField::ALL
        .iter()
        .map(|&field| {
            let (min, max, step) = field.bounds();
            NumericWidget {
                key: field.key().to_string(),
                label: field.label().to_string(),
                min,
                max,
                step,
                default: field.default_value(),
            }
        })
        .collect();

    FormResponse {
        numeric,
        categorical: vec![
            categorical_widget::<HomeOwnership>("homeOwnership"),
            categorical_widget::<LoanIntent>("loanIntent"),
            categorical_widget::<LoanGrade>("loanGrade"),
        ],
        derived: vec![LOAN_PERCENT_INCOME.to_string()],
    }
}
