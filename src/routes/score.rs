use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{form_layout, ApplicantForm, Scorer};
use crate::models::{
    ApplicantRecord, ErrorResponse, HealthResponse, PredictionResult, SchemaResponse,
    ScoreFeaturesRequest, ScoreRequest, ScoreResponse,
};

/// Application state shared across all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub scorer: Scorer,
}

/// Configure all scoring routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/form", web::get().to(get_form))
        .route("/schema", web::get().to(get_schema))
        .route("/score", web::post().to(score))
        .route("/score/features", web::post().to(score_features));
}

fn render(result: PredictionResult, loan_percent_income: Option<f64>) -> ScoreResponse {
    let decision = result.decision();
    ScoreResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        probability: result.probability,
        probability_display: format!("{:.2}%", result.probability * 100.0),
        label: result.label,
        decision,
        decision_text: decision.text().to_string(),
        loan_percent_income,
    }
}

fn inference_failed(err: &crate::services::ModelError) -> HttpResponse {
    tracing::error!("Model invocation failed: {}", err);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "Prediction failed".to_string(),
        message: "The model could not score this applicant".to_string(),
        status_code: 500,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        feature_count: state.scorer.schema().len(),
        timestamp: chrono::Utc::now(),
    })
}

/// Applicant form layout
///
/// GET /api/v1/form
async fn get_form() -> impl Responder {
    HttpResponse::Ok().json(form_layout())
}

/// Ordered feature list
///
/// GET /api/v1/schema
async fn get_schema(state: web::Data<AppState>) -> impl Responder {
    let features = state.scorer.schema().names().to_vec();
    HttpResponse::Ok().json(SchemaResponse {
        count: features.len(),
        features,
    })
}

/// Score an applicant form
///
/// POST /api/v1/score
///
/// Request body (every field optional):
/// ```json
/// {
///   "personAge": 30,
///   "personIncome": 55000,
///   "personEmpLength": 4,
///   "loanAmnt": 12000,
///   "loanIntRate": 11.5,
///   "cbPersonCredHistLength": 6,
///   "homeOwnership": "RENT",
///   "loanIntent": "MEDICAL",
///   "loanGrade": "C"
/// }
/// ```
async fn score(
    state: web::Data<AppState>,
    req: web::Json<ScoreRequest>,
) -> impl Responder {
    let form = ApplicantForm::from_request(&req);
    let loan_pct = form.loan_percent_income();

    tracing::debug!("Scoring form: {:?}", form);

    match state.scorer.score_form(&form) {
        Ok(result) => {
            let response = render(result, Some(loan_pct));
            tracing::info!(
                "Scored applicant {}: probability={:.4}, label={}",
                response.request_id,
                response.probability,
                response.label
            );
            HttpResponse::Ok().json(response)
        }
        Err(e) => inference_failed(&e),
    }
}

/// Score a raw sparse feature map
///
/// POST /api/v1/score/features
///
/// Request body:
/// ```json
/// { "features": { "person_age": 30, "loan_grade_D": 1 } }
/// ```
async fn score_features(
    state: web::Data<AppState>,
    req: web::Json<ScoreFeaturesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for score_features request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let record = ApplicantRecord::from(req.into_inner().features);

    match state.scorer.predict(&record) {
        Ok(result) => {
            let response = render(result, None);
            tracing::info!(
                "Scored feature map {} ({} inputs): probability={:.4}, label={}",
                response.request_id,
                record.len(),
                response.probability,
                response.label
            );
            HttpResponse::Ok().json(response)
        }
        Err(e) => inference_failed(&e),
    }
}
