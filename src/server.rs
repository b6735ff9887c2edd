use crate::config::AppConfig;
use crate::error::LoadError;
use crate::filter::FilterParams;
use crate::session::{FilterOptions, Session};
use crate::types::RecordTable;
use crate::view::{self, DashboardView};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use geojson::FeatureCollection;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub struct AppState {
    session: Mutex<Session>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_columns: Vec<String>,
}

pub struct ApiError(LoadError);

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LoadError::Schema { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LoadError::Csv(_) => StatusCode::BAD_REQUEST,
            LoadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
            missing_columns: self.0.missing_columns().to_vec(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>, config: &AppConfig) -> Router {
    Router::new()
        .route("/api/options", get(options_handler))
        .route("/api/view", get(view_handler))
        .route("/api/markers", get(markers_handler))
        .route("/api/upload", post(upload_handler))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, table: RecordTable) -> Result<()> {
    let session = Session::new(table, &config.filter.all_label, config.map.clone());
    let state = Arc::new(AppState::new(session));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    tracing::info!("Starting server on http://{}", addr);

    let app = router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn options_handler(State(state): State<Arc<AppState>>) -> Json<FilterOptions> {
    Json(state.session().options())
}

async fn view_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Json<DashboardView> {
    let session = state.session();
    let criteria = params.into_criteria(session.all_label());
    Json(session.view_with(&criteria))
}

async fn markers_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Json<FeatureCollection> {
    let session = state.session();
    let criteria = params.into_criteria(session.all_label());
    let view = session.view_with(&criteria);
    Json(view::feature_collection(&view.markers))
}

async fn upload_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<DashboardView>, ApiError> {
    let mut session = state.session();
    match session.upload(body) {
        Ok(view) => Ok(Json(view)),
        Err(err) => {
            tracing::warn!(error = %err, "Rejected upload");
            Err(err.into())
        }
    }
}
