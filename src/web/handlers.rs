use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::{MissingDataPolicy, TrendAnalyzer};
use crate::error::TrendError;
use crate::io;
use crate::models::{AnalysisSession, BoundingBox, ObservationSeries};

use super::state::{AppState, StoredSession};

// ---------------------------------------------------------------------------
// Error wrapper
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    details: String,
}

#[derive(Debug)]
pub(crate) struct WebError(TrendError);

impl From<TrendError> for WebError {
    fn from(e: TrendError) -> Self {
        WebError(e)
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for WebError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match &self.0 {
            TrendError::ValidationError(_)
            | TrendError::ParseError(_)
            | TrendError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            TrendError::NotFound(_) => StatusCode::NOT_FOUND,
            TrendError::InsufficientData(_) | TrendError::AllYearsMissing { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            details: self.0.to_string(),
        })
    }
}

fn bad_request(details: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody {
        error: "Bad Request".to_string(),
        details: details.into(),
    })
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SessionResponse {
    id: Uuid,
    name: String,
    bbox: Option<BoundingBox>,
    first_year: Option<i32>,
    last_year: Option<i32>,
    num_years: usize,
    num_missing: usize,
    /// False when a region update matched the current region
    refreshed: bool,
}

impl SessionResponse {
    fn new(id: Uuid, stored: &StoredSession, refreshed: bool) -> Self {
        let series = stored.session.series();
        Self {
            id,
            name: stored.name.clone(),
            bbox: stored.session.bbox().copied(),
            first_year: series.first_year(),
            last_year: series.last_year(),
            num_years: series.len(),
            num_missing: series.num_missing(),
            refreshed,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

/// Region as either an explicit box or the corners of a map viewport.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum RegionRequest {
    Box {
        bbox: BoundingBox,
    },
    Viewport {
        south_west: LatLng,
        north_east: LatLng,
    },
}

impl RegionRequest {
    fn resolve(&self, decimals: u32) -> Result<BoundingBox, TrendError> {
        match *self {
            RegionRequest::Box { bbox } => {
                bbox.validate()?;
                Ok(bbox)
            }
            RegionRequest::Viewport {
                south_west,
                north_east,
            } => BoundingBox::from_corners(
                (south_west.lng, south_west.lat),
                (north_east.lng, north_east.lat),
                decimals,
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    name: Option<String>,
    observations: Option<ObservationSeries>,
    #[serde(flatten)]
    region: Option<RegionRequest>,
    start_year: Option<i32>,
    num_years: Option<u32>,
    missing_policy: Option<MissingDataPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct RegionUpdateRequest {
    #[serde(flatten)]
    region: RegionRequest,
    missing_policy: Option<MissingDataPolicy>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastRequest {
    horizon_years: Option<u32>,
    missing_policy: Option<MissingDataPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    target_year: i32,
    increase_rate: Option<f64>,
    rates: Option<Vec<f64>>,
    missing_policy: Option<MissingDataPolicy>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    format: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sanitize a filename for use in Content-Disposition headers.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '.' || *c == ' ')
        .collect::<String>()
        .replace("..", "")
}

fn load(state: &AppState, id: &Uuid) -> Result<StoredSession, WebError> {
    state
        .get_session(id)
        .ok_or_else(|| WebError(TrendError::NotFound(format!("Session {id} not found"))))
}

/// Region sessions default to the policy their series was aggregated under;
/// uploaded series fall back to the server default.
fn session_policy(state: &AppState, session: &AnalysisSession) -> MissingDataPolicy {
    match session.bbox() {
        Some(_) => session.policy(),
        None => state.config.missing_policy,
    }
}

fn collect_for_region(
    state: &AppState,
    session: &mut AnalysisSession,
    region: &RegionRequest,
    policy: MissingDataPolicy,
) -> Result<bool, TrendError> {
    let provider = state.provider.as_ref().ok_or_else(|| {
        TrendError::InvalidArgument("Server has no raster source configured".to_string())
    })?;
    let bbox = region.resolve(state.config.bbox_decimals)?;
    session.refresh(provider, bbox, policy)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Store an uploaded observation series (.csv, .json or .xlsx) as a new session.
pub async fn upload(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, WebError> {
    if let Some(Ok(mut field)) = payload.next().await {
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|s| s.to_string()))
            .unwrap_or_else(|| "unknown".to_string());

        let mut bytes = Vec::new();
        while let Some(Ok(chunk)) = field.next().await {
            bytes.extend_from_slice(&chunk);
        }

        let series = io::read_series_from_bytes(&bytes, &filename)?;
        let name = std::path::Path::new(&filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&filename)
            .to_string();

        let id = Uuid::new_v4();
        let stored = StoredSession {
            name,
            session: AnalysisSession::from_series(series),
        };
        info!(%id, years = stored.session.series().len(), "stored uploaded series");
        let resp = SessionResponse::new(id, &stored, true);
        state.insert_session(id, stored);
        return Ok(HttpResponse::Ok().json(resp));
    }

    Ok(bad_request("No file uploaded"))
}

/// Create a session from an inline series, or by collecting rasters for a region.
pub async fn create_session(
    state: web::Data<AppState>,
    body: web::Json<CreateSessionRequest>,
) -> Result<HttpResponse, WebError> {
    let body = body.into_inner();
    let policy = body.missing_policy.unwrap_or(state.config.missing_policy);

    let session = match (body.observations, body.region) {
        (Some(series), _) => AnalysisSession::from_series(series),
        (None, Some(region)) => {
            let num_years = state
                .config
                .check_num_years(body.num_years.unwrap_or(state.config.num_years))?;
            let mut session =
                AnalysisSession::new(body.start_year.unwrap_or(state.config.start_year), num_years);
            collect_for_region(&state, &mut session, &region, policy)?;
            session
        }
        (None, None) => return Ok(bad_request("Provide either observations or a region")),
    };

    let id = Uuid::new_v4();
    let stored = StoredSession {
        name: body.name.unwrap_or_else(|| "session".to_string()),
        session,
    };
    let resp = SessionResponse::new(id, &stored, true);
    state.insert_session(id, stored);
    Ok(HttpResponse::Ok().json(resp))
}

/// Move a session to a new region; data is re-collected only if the region changed.
pub async fn update_region(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<RegionUpdateRequest>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let mut stored = load(&state, &id)?;
    let policy = body.missing_policy.unwrap_or(stored.session.policy());
    let refreshed = collect_for_region(&state, &mut stored.session, &body.region, policy)?;
    let resp = SessionResponse::new(id, &stored, refreshed);
    if refreshed {
        state.insert_session(id, stored);
    }
    Ok(HttpResponse::Ok().json(resp))
}

pub async fn observations(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let stored = load(&state, &id)?;
    Ok(HttpResponse::Ok().json(stored.session.series()))
}

/// Fit the trend model and forecast; responds with the full report.
pub async fn forecast(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: Option<web::Json<ForecastRequest>>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let stored = load(&state, &id)?;
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    let policy = body
        .missing_policy
        .unwrap_or_else(|| session_policy(&state, &stored.session));
    let horizon = state
        .config
        .check_horizon(body.horizon_years.unwrap_or(state.config.horizon_years))?;

    let report = TrendAnalyzer::new(stored.session.series(), policy).report(horizon, None, &[])?;
    Ok(HttpResponse::Ok().json(report))
}

/// Run greening scenarios for one target year and one or more increase rates.
pub async fn simulate(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SimulateRequest>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let stored = load(&state, &id)?;
    let body = body.into_inner();
    let policy = body
        .missing_policy
        .unwrap_or_else(|| session_policy(&state, &stored.session));
    let rates = body
        .rates
        .or_else(|| body.increase_rate.map(|r| vec![r]))
        .unwrap_or_else(|| vec![state.config.increase_rate]);

    let analyzer = TrendAnalyzer::new(stored.session.series(), policy);
    let model = analyzer.model()?;
    let results = crate::analysis::simulate_rates(&model, body.target_year, &rates)?;
    Ok(HttpResponse::Ok().json(results))
}

pub async fn export(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let stored = load(&state, &id)?;
    let fmt = query.format.as_deref().unwrap_or("csv");
    let safe_name = sanitize_filename(&stored.name);

    let (content_type, ext, data) = match fmt {
        "csv" => {
            let mut buf = Vec::new();
            io::write_csv_to(stored.session.series(), &mut buf)?;
            ("text/csv", "csv", buf)
        }
        "json" => {
            let text = io::to_json_string(stored.session.series(), true)?;
            ("application/json", "json", text.into_bytes())
        }
        _ => {
            return Ok(bad_request(format!(
                "Unsupported export format: {fmt}. Use csv or json."
            )))
        }
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{safe_name}.{ext}\""),
        ))
        .body(data))
}

// ---------------------------------------------------------------------------
// Static file handlers
// ---------------------------------------------------------------------------

pub async fn index_html() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../../static/index.html"))
}

pub async fn app_js() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(include_str!("../../static/app.js"))
}

pub async fn style_css() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(include_str!("../../static/style.css"))
}
