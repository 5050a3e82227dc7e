use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    AlphabeticalPlanner, Classification, Classifier, DashboardSummary, Frequency, PortalError,
    RoutePlan, RoutePlanner, SortField, SortOrder, StatusBucket, WorkOrder, WorkOrderQuery,
    WorkOrderStore, plan_route,
};

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<WorkOrderStore>>,
    classifier: Arc<Classifier>,
    planner: Arc<dyn RoutePlanner>,
}

impl AppState {
    pub fn new(store: WorkOrderStore, classifier: Classifier) -> Self {
        Self::with_shared(Arc::new(RwLock::new(store)), classifier)
    }

    pub fn with_shared(store: Arc<RwLock<WorkOrderStore>>, classifier: Classifier) -> Self {
        Self {
            store,
            classifier: Arc::new(classifier),
            planner: Arc::new(AlphabeticalPlanner),
        }
    }

    pub fn with_planner(mut self, planner: impl RoutePlanner + 'static) -> Self {
        self.planner = Arc::new(planner);
        self
    }

    fn store(&self) -> Arc<RwLock<WorkOrderStore>> {
        self.store.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PortalError> for ApiError {
    fn from(value: PortalError) -> Self {
        match value {
            PortalError::EmptyRoute(_) | PortalError::InvalidData(_) => {
                ApiError::Invalid(value.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// `at` pins the evaluation instant (RFC 3339); the wall clock is used otherwise.
#[derive(Debug, Default, Deserialize)]
struct AtParams {
    at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    at: Option<String>,
    search: Option<String>,
    bucket: Option<String>,
    cadence: Option<String>,
    sort: Option<String>,
    order: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoutePayload {
    origin: String,
    #[serde(default)]
    ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct WorkOrderView {
    work_order: WorkOrder,
    classification: Classification,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    count: usize,
    source: String,
    last_error: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/work-orders", get(list_work_orders))
        .route("/work-orders/:id", get(get_work_order))
        .route("/dashboard", get(get_dashboard))
        .route("/refresh", post(refresh_work_orders))
        .route("/route", post(create_route))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    store: WorkOrderStore,
    classifier: Classifier,
) -> std::io::Result<()> {
    let state = AppState::new(store, classifier);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "work order portal API listening");
    axum::serve(listener, app).await
}

fn evaluation_instant(at: Option<&str>) -> Result<DateTime<Utc>, ApiError> {
    match at.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(|err| ApiError::invalid(format!("invalid 'at' instant '{raw}': {err}"))),
        None => Ok(Utc::now()),
    }
}

impl ListParams {
    fn to_query(&self) -> Result<WorkOrderQuery, ApiError> {
        let mut query = WorkOrderQuery {
            search_text: self.search.clone(),
            ..WorkOrderQuery::default()
        };
        if let Some(raw) = self.bucket.as_deref() {
            query.bucket = Some(
                StatusBucket::from_str(raw)
                    .ok_or_else(|| ApiError::invalid(format!("unknown bucket '{raw}'")))?,
            );
        }
        if let Some(raw) = self.cadence.as_deref() {
            query.cadence = Some(
                Frequency::from_str(raw)
                    .ok_or_else(|| ApiError::invalid(format!("unknown cadence '{raw}'")))?,
            );
        }
        let order = match self.order.as_deref().map(str::trim) {
            None | Some("") | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => return Err(ApiError::invalid(format!("unknown sort order '{other}'"))),
        };
        if let Some(raw) = self.sort.as_deref() {
            let field = SortField::from_str(raw)
                .ok_or_else(|| ApiError::invalid(format!("unknown sort field '{raw}'")))?;
            query.sort = Some((field, order));
        }
        Ok(query)
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_work_orders(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<WorkOrderView>>, ApiError> {
    let now = evaluation_instant(params.at.as_deref())?;
    let query = params.to_query()?;
    let store = state.store();
    let views = {
        let guard = store.read();
        query
            .apply(&state.classifier, guard.work_orders(), now)
            .into_iter()
            .map(|work_order| WorkOrderView {
                work_order: work_order.clone(),
                classification: state.classifier.classify(work_order, now),
            })
            .collect::<Vec<_>>()
    };
    Ok(Json(views))
}

async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<AtParams>,
) -> Result<Json<WorkOrderView>, ApiError> {
    let now = evaluation_instant(params.at.as_deref())?;
    let store = state.store();
    let view = {
        let guard = store.read();
        guard.find(&id).map(|work_order| WorkOrderView {
            work_order: work_order.clone(),
            classification: state.classifier.classify(work_order, now),
        })
    };
    view.map(Json)
        .ok_or_else(|| ApiError::not_found(format!("work order {id} not found")))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<AtParams>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let now = evaluation_instant(params.at.as_deref())?;
    let store = state.store();
    let summary = {
        let guard = store.read();
        DashboardSummary::build(&state.classifier, guard.work_orders(), now)
    };
    Ok(Json(summary))
}

async fn refresh_work_orders(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let store = state.store();
    let response = {
        let mut guard = store.write();
        let count = guard.refresh()?;
        RefreshResponse {
            count,
            source: guard.source_description(),
            last_error: guard.last_error().map(str::to_string),
        }
    };
    if let Some(error) = &response.last_error {
        warn!(%error, "refresh used fallback data");
    }
    Ok(Json(response))
}

async fn create_route(
    State(state): State<AppState>,
    Json(payload): Json<RoutePayload>,
) -> Result<Json<RoutePlan>, ApiError> {
    let store = state.store();
    let plan = {
        let guard = store.read();
        let selected: Vec<&WorkOrder> = match &payload.ids {
            Some(ids) => ids
                .iter()
                .map(|id| {
                    guard
                        .find(id)
                        .ok_or_else(|| ApiError::not_found(format!("work order {id} not found")))
                })
                .collect::<Result<_, _>>()?,
            None => guard.work_orders().iter().collect(),
        };
        plan_route(state.planner.as_ref(), &payload.origin, &selected)?
    };
    Ok(Json(plan))
}
