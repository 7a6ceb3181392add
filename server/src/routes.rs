use crate::{
    api::{dashboard::*, donation::*, event::*},
    async_interceptor::AsyncInterceptorLayer,
    extract::{ApiJson, ApiQuery},
    interceptors::authn::AdminAuthnInterceptor,
};
use axum::{
    extract::{Path, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Json, Router,
};
use hopewell_status::Status;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
};

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub donations: Arc<dyn DonationService>,
    pub events: Arc<dyn EventService>,
    pub dashboard: Arc<dyn DashboardService>,
}

pub struct RouterOptions {
    pub request_timeout: Duration,
    /// Empty disables cross-origin access.
    pub allowed_origins: Vec<HeaderValue>,
}

pub fn router(state: AppState, authn: AdminAuthnInterceptor, options: RouterOptions) -> Router {
    let admin = Router::new()
        .route("/donations", get(list_donations))
        .route("/donations/:donation_id", get(get_donation))
        .route("/dashboard/donations", get(donation_dashboard))
        .route("/events", post(create_event))
        .route_layer(AsyncInterceptorLayer::new(authn));

    // A verified payment must end in a settlement or a recording failure,
    // so this route is bounded by the service instead of the request timeout.
    let settlement = Router::new().route("/donations/verify", post(settle_donation));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(options.allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/donations/orders", post(create_order))
        .route("/events", get(list_events))
        .nest("/admin", admin)
        .layer(TimeoutLayer::new(options.request_timeout))
        .merge(settlement)
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> Result<Json<DonationOrder>, Status> {
    Ok(Json(state.donations.create_order(request).await?))
}

async fn settle_donation(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SettleDonationRequest>,
) -> Result<Json<SettleDonationResponse>, Status> {
    Ok(Json(state.donations.settle_donation(request).await?))
}

async fn get_donation(
    State(state): State<AppState>,
    Path(donation_id): Path<String>,
) -> Result<Json<Donation>, Status> {
    Ok(Json(state.donations.get_donation(donation_id).await?))
}

async fn list_donations(
    State(state): State<AppState>,
    ApiQuery(request): ApiQuery<ListDonationsRequest>,
) -> Result<Json<ListDonationsResponse>, Status> {
    Ok(Json(state.donations.list_donations(request).await?))
}

async fn donation_dashboard(
    State(state): State<AppState>,
    ApiQuery(request): ApiQuery<DonationDashboardRequest>,
) -> Result<Json<DonationDashboard>, Status> {
    Ok(Json(state.dashboard.donation_dashboard(request).await?))
}

async fn create_event(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateEventRequest>,
) -> Result<Json<Event>, Status> {
    Ok(Json(state.events.create_event(request).await?))
}

async fn list_events(
    State(state): State<AppState>,
    ApiQuery(request): ApiQuery<ListEventsRequest>,
) -> Result<Json<ListEventsResponse>, Status> {
    Ok(Json(state.events.list_events(request).await?))
}
