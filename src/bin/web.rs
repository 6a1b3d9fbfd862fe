//! Local HTTP front-end for the torsion calculator.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use torsion_lab::config::{self, Config};
use torsion_lab::history::{HistoryStore, NewRecord};
use torsion_lab::lab::{self, SinglePointInput};
use torsion_lab::material_db::{self, Material, ModulusCheck};
use torsion_lab::report::{self, ReportOptions};
use torsion_lab::torsion::{
    shear_stress_distribution, CharacterizationResult, EffectiveModulus, NoiseSettings,
    ReducerSettings, Specimen, StressSample,
};
use torsion_lab::units::{convert_length, AngleUnit, LengthUnit, TorqueUnit};

struct AppState {
    config: Config,
    history: Mutex<HistoryStore>,
}

type Shared = Arc<AppState>;

#[derive(Debug, Error)]
enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        log::warn!("{self}");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn material(name: &str) -> Result<Material, ApiError> {
    material_db::find_material(name).map_err(|e| ApiError::Validation(e.to_string()))
}

fn specimen(name: &str, diameter_mm: f64, length_mm: f64) -> Result<Specimen, ApiError> {
    Ok(lab::specimen_from_mm(material(name)?, diameter_mm, length_mm))
}

#[derive(Debug, Deserialize)]
struct SinglePointRequest {
    material: String,
    length_mm: f64,
    diameter_mm: f64,
    torque_n_mm: f64,
    angle_deg: f64,
    #[serde(default = "default_true")]
    save: bool,
}

fn default_true() -> bool {
    true
}

impl SinglePointRequest {
    fn input(&self) -> Result<SinglePointInput, ApiError> {
        let input = SinglePointInput {
            material: material(&self.material)?,
            length_mm: self.length_mm,
            diameter_mm: self.diameter_mm,
            torque_n_mm: self.torque_n_mm,
            angle_deg: self.angle_deg,
        };
        input.validate().map_err(ApiError::Validation)?;
        Ok(input)
    }
}

#[derive(Debug, Serialize)]
struct SinglePointResponse {
    #[serde(flatten)]
    outcome: EffectiveModulus,
    history_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SyntheticRequest {
    material: String,
    diameter_mm: f64,
    length_mm: f64,
    max_torque_n_m: Option<f64>,
    points: Option<usize>,
    noise: Option<bool>,
    error_percent: Option<f64>,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ExperimentResponse {
    specimen: Specimen,
    result: CharacterizationResult,
    plausibility: Option<ModulusCheck>,
    failure_description: &'static str,
    modulus_used: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
enum AngleInput {
    #[default]
    Deg,
    Rad,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    material: String,
    diameter_mm: f64,
    length_mm: f64,
    /// N·mm.
    torques: Vec<f64>,
    angles: Vec<f64>,
    #[serde(default)]
    angle_unit: AngleInput,
    linear_fraction: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DistributionRequest {
    torque_n_m: f64,
    diameter_mm: f64,
    samples: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ReportRequest {
    SinglePoint(SinglePointRequest),
    Experiment(AnalyzeRequest),
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn materials() -> impl IntoResponse {
    Json(material_db::materials())
}

async fn effective_modulus(
    State(state): State<Shared>,
    Json(request): Json<SinglePointRequest>,
) -> Result<Json<SinglePointResponse>, ApiError> {
    let input = request.input()?;
    let outcome = input.evaluate();
    let history_id = if request.save {
        let store = state.history.lock().await;
        let stored = store
            .append(input.to_record(&outcome))
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Some(stored.id)
    } else {
        None
    };
    Ok(Json(SinglePointResponse {
        outcome,
        history_id,
    }))
}

fn experiment_response(
    specimen: Specimen,
    result: CharacterizationResult,
    modulus_used: Option<f64>,
) -> ExperimentResponse {
    let plausibility = result
        .shear_modulus
        .map(|g| material_db::validate_modulus(specimen.material, g, 0.2));
    ExperimentResponse {
        specimen,
        result,
        plausibility,
        failure_description: material_db::failure_description_for(specimen.material),
        modulus_used,
    }
}

async fn calculate(
    State(state): State<Shared>,
    Json(request): Json<SyntheticRequest>,
) -> Result<Json<ExperimentResponse>, ApiError> {
    let specimen = specimen(&request.material, request.diameter_mm, request.length_mm)?;
    let mut settings = state.config.synthetic_settings();
    if let Some(t) = request.max_torque_n_m {
        settings.target_max_torque = t;
    }
    if let Some(n) = request.points {
        settings.point_count = n;
    }
    let noise = request.noise.unwrap_or(settings.noise.is_some());
    let error_percent = request
        .error_percent
        .unwrap_or(state.config.synthetic.error_percent);
    settings.noise = noise.then_some(NoiseSettings { error_percent });
    let mut rng = match request.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let outcome = lab::run_synthetic(
        specimen,
        &settings,
        &state.config.reducer_settings(),
        &mut rng,
    )
    .map_err(|e| ApiError::Validation(e.to_string()))?;
    Ok(Json(experiment_response(
        outcome.specimen,
        outcome.result,
        Some(outcome.experiment.modulus_used),
    )))
}

fn run_analysis(
    request: &AnalyzeRequest,
    defaults: &ReducerSettings,
) -> Result<(Specimen, CharacterizationResult), ApiError> {
    let specimen = specimen(&request.material, request.diameter_mm, request.length_mm)?;
    let mut reducer = *defaults;
    if let Some(f) = request.linear_fraction {
        if f <= 0.0 || f > 1.0 || f.is_nan() {
            return Err(ApiError::Validation(format!(
                "linear_fraction must be in (0, 1], got {f}"
            )));
        }
        reducer.linear_fraction = f;
    }
    let angle_unit = match request.angle_unit {
        AngleInput::Deg => AngleUnit::Degree,
        AngleInput::Rad => AngleUnit::Radian,
    };
    let result = lab::analyze_readings(
        specimen,
        &request.torques,
        &request.angles,
        TorqueUnit::NewtonMillimeter,
        angle_unit,
        &reducer,
    )
    .map_err(|e| ApiError::Validation(e.to_string()))?;
    Ok((specimen, result))
}

async fn analyze(
    State(state): State<Shared>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ExperimentResponse>, ApiError> {
    let (specimen, result) = run_analysis(&request, &state.config.reducer_settings())?;
    Ok(Json(experiment_response(specimen, result, None)))
}

async fn stress_distribution(
    Json(request): Json<DistributionRequest>,
) -> Result<Json<Vec<StressSample>>, ApiError> {
    if request.diameter_mm <= 0.0 || request.diameter_mm.is_nan() {
        return Err(ApiError::Validation("diameter must be positive".into()));
    }
    let d = convert_length(request.diameter_mm, LengthUnit::Millimeter, LengthUnit::Meter);
    Ok(Json(shear_stress_distribution(
        request.torque_n_m,
        d,
        request.samples.unwrap_or(50),
    )))
}

async fn list_experiments(State(state): State<Shared>) -> Result<impl IntoResponse, ApiError> {
    let store = state.history.lock().await;
    let records = store
        .load_all()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(records))
}

async fn store_experiment(
    State(state): State<Shared>,
    Json(record): Json<NewRecord>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.history.lock().await;
    let stored = store
        .append(record)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn render_report(
    State(state): State<Shared>,
    Json(request): Json<ReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let text = match request {
        ReportRequest::SinglePoint(req) => {
            let input = req.input()?;
            report::render_single_point(&input, &input.evaluate())
        }
        ReportRequest::Experiment(req) => {
            let (specimen, result) = run_analysis(&req, &state.config.reducer_settings())?;
            let options = ReportOptions {
                units: state.config.display_units.clone(),
                ..ReportOptions::default()
            };
            report::render_characterization(&specimen, &result, &options)
        }
    };
    Ok(Json(json!({ "format": "markdown", "report": text })))
}

fn router(state: Shared) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/materials", get(materials))
        .route("/api/calculate", post(calculate))
        .route("/api/effective-modulus", post(effective_modulus))
        .route("/api/analyze", post(analyze))
        .route("/api/stress-distribution", post(stress_distribution))
        .route("/api/experiments", get(list_experiments).post(store_experiment))
        .route("/api/report", post(render_report))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load_or_default()?;
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState {
        history: Mutex::new(HistoryStore::new(config.history_path.clone())),
        config,
    });

    log::info!("Torsion Lab server listening on http://{addr}");
    println!("  Health check:   GET  /health");
    println!("  Materials:      GET  /api/materials");
    println!("  Synthetic run:  POST /api/calculate");
    println!("  Single reading: POST /api/effective-modulus");
    println!("  Readings:       POST /api/analyze");
    println!("  History:        GET|POST /api/experiments");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_request_is_tagged() {
        let req: ReportRequest = serde_json::from_value(json!({
            "kind": "single_point",
            "material": "Сталь",
            "length_mm": 100.0,
            "diameter_mm": 10.0,
            "torque_n_mm": 140000.0,
            "angle_deg": 10.0
        }))
        .unwrap();
        match req {
            ReportRequest::SinglePoint(r) => {
                assert!(r.save);
                assert_eq!(r.input().unwrap().material, Material::Steel);
            }
            ReportRequest::Experiment(_) => panic!("wrong variant"),
        }
    }

    #[test]
    fn analysis_rejects_bad_fraction() {
        let req = AnalyzeRequest {
            material: "wood".into(),
            diameter_mm: 10.0,
            length_mm: 100.0,
            torques: vec![50.0, 100.0, 150.0],
            angles: vec![0.5, 1.0, 1.6],
            angle_unit: AngleInput::Deg,
            linear_fraction: Some(1.5),
        };
        assert!(matches!(
            run_analysis(&req, &ReducerSettings::STANDARD),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn unknown_material_is_a_validation_error() {
        assert!(matches!(material("brass"), Err(ApiError::Validation(_))));
    }
}
