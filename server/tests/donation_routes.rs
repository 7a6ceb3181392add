use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderValue, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use hopewell_server::{
    api::{dashboard::*, donation::*, event::*},
    interceptors::authn::AdminAuthnInterceptor,
    routes::{router, AppState, RouterOptions},
};
use hopewell_status::Status;
use mockall::mock;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

mock! {
    pub Donations {}

    #[async_trait]
    impl DonationService for Donations {
        async fn create_order(
            &self,
            request: CreateOrderRequest,
        ) -> Result<DonationOrder, DonationError>;

        async fn settle_donation(
            &self,
            request: SettleDonationRequest,
        ) -> Result<SettleDonationResponse, DonationError>;

        async fn get_donation(&self, donation_id: String) -> Result<Donation, Status>;

        async fn list_donations(
            &self,
            request: ListDonationsRequest,
        ) -> Result<ListDonationsResponse, Status>;
    }
}

mock! {
    pub Events {}

    #[async_trait]
    impl EventService for Events {
        async fn create_event(&self, request: CreateEventRequest) -> Result<Event, Status>;

        async fn list_events(&self, request: ListEventsRequest) -> Result<ListEventsResponse, Status>;
    }
}

mock! {
    pub Dashboard {}

    #[async_trait]
    impl DashboardService for Dashboard {
        async fn donation_dashboard(
            &self,
            request: DonationDashboardRequest,
        ) -> Result<DonationDashboard, Status>;
    }
}

const ADMIN_TOKEN: &str = "admin-token";
const SITE_ORIGIN: &str = "https://hopewell.org";

fn app_with(donations: Arc<dyn DonationService>, request_timeout: Duration) -> Router {
    let state = AppState {
        donations,
        events: Arc::new(MockEvents::new()),
        dashboard: Arc::new(MockDashboard::new()),
    };
    router(
        state,
        AdminAuthnInterceptor::new(ADMIN_TOKEN.to_string()),
        RouterOptions {
            request_timeout,
            allowed_origins: vec![HeaderValue::from_static(SITE_ORIGIN)],
        },
    )
}

fn app(donations: MockDonations) -> Router {
    app_with(Arc::new(donations), Duration::from_secs(5))
}

fn verify_request() -> Request<Body> {
    let body = json!({
        "razorpay_order_id": "order_1",
        "razorpay_payment_id": "pay_1",
        "razorpay_signature": "0f",
        "donor_name": "Asha Rao",
        "donor_email": "asha@example.org",
        "amount": 1000,
    });
    Request::builder()
        .method("POST")
        .uri("/donations/verify")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn donation() -> Donation {
    Donation {
        id: "pay_1".to_string(),
        order_id: "order_1".to_string(),
        donor_name: "Asha Rao".to_string(),
        donor_email: "asha@example.org".to_string(),
        amount: 1000.0,
        currency: "INR".to_string(),
        date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap(),
        status: DonationStatus::Completed,
    }
}

#[tokio::test]
async fn verified_callback_returns_donation() {
    let mut donations = MockDonations::new();
    donations
        .expect_settle_donation()
        .withf(|request| request.order_id == "order_1" && request.payment_id == "pay_1")
        .times(1)
        .returning(|_| {
            Ok(SettleDonationResponse {
                donation: donation(),
                already_settled: false,
            })
        });

    let response = app(donations).oneshot(verify_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["donation"]["amount"], json!(1000.0));
    assert_eq!(body["donation"]["status"], json!("Completed"));
    assert_eq!(body["already_settled"], json!(false));
}

#[tokio::test]
async fn signature_mismatch_is_forbidden() {
    let mut donations = MockDonations::new();
    donations.expect_settle_donation().times(1).returning(|_| {
        Err(DonationError::SignatureMismatch {
            order_id: "order_1".to_string(),
        })
    });

    let response = app(donations).oneshot(verify_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["code"], json!("PERMISSION_DENIED"));
    assert_eq!(body["reason"], json!("SIGNATURE_MISMATCH"));
}

#[tokio::test]
async fn recording_failure_has_its_own_reason() {
    let mut donations = MockDonations::new();
    donations.expect_settle_donation().times(1).returning(|_| {
        Err(DonationError::SettlementRecording {
            payment_id: "pay_1".to_string(),
            source: hopewell_storage::Error::Other(anyhow::anyhow!("connection reset")),
        })
    });

    let response = app(donations).oneshot(verify_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["reason"], json!("SETTLEMENT_RECORDING_FAILED"));
    assert!(body["message"].as_str().unwrap().contains("pay_1"));
}

#[tokio::test]
async fn gateway_failure_is_bad_gateway() {
    let mut donations = MockDonations::new();
    donations.expect_create_order().times(1).returning(|_| {
        Err(DonationError::Gateway(
            hopewell_server::gateway::Error::ClientError {
                status: reqwest::StatusCode::BAD_REQUEST,
                code: "BAD_REQUEST_ERROR".to_string(),
                description: "amount exceeds maximum amount allowed".to_string(),
            },
        ))
    });

    let request = Request::builder()
        .method("POST")
        .uri("/donations/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "amount": 1000 }).to_string()))
        .unwrap();
    let response = app(donations).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["reason"], json!("GATEWAY_ERROR"));
}

#[tokio::test]
async fn admin_routes_require_token() {
    let mut donations = MockDonations::new();
    donations.expect_get_donation().times(0);

    let request = Request::builder()
        .uri("/admin/donations/pay_1")
        .body(Body::empty())
        .unwrap();
    let response = app(donations).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], json!("UNAUTHENTICATED"));
}

#[tokio::test]
async fn admin_can_read_donation() {
    let mut donations = MockDonations::new();
    donations
        .expect_get_donation()
        .withf(|donation_id| donation_id == "pay_1")
        .times(1)
        .returning(|_| Ok(donation()));

    let request = Request::builder()
        .uri("/admin/donations/pay_1")
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
        .body(Body::empty())
        .unwrap();
    let response = app(donations).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["id"], json!("pay_1"));
}

#[tokio::test]
async fn healthz_is_public() {
    let request = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let response = app(MockDonations::new()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_body_is_a_validation_failure() {
    let mut donations = MockDonations::new();
    donations.expect_create_order().times(0);

    let request = Request::builder()
        .method("POST")
        .uri("/donations/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "amount": "lots" }).to_string()))
        .unwrap();
    let response = app(donations).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], json!("INVALID_ARGUMENT"));
    assert_eq!(body["reason"], json!("VALIDATION_FAILED"));
}

#[tokio::test]
async fn malformed_query_is_a_validation_failure() {
    let mut donations = MockDonations::new();
    donations.expect_list_donations().times(0);

    let request = Request::builder()
        .uri("/admin/donations?page_size=many")
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
        .body(Body::empty())
        .unwrap();
    let response = app(donations).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["reason"], json!("VALIDATION_FAILED"));
}

#[tokio::test]
async fn cors_allows_only_configured_origins() {
    for (origin, allowed) in [(SITE_ORIGIN, true), ("https://elsewhere.example", false)] {
        let request = Request::builder()
            .uri("/healthz")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = app(MockDonations::new()).oneshot(request).await.unwrap();

        let header = response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN);
        if allowed {
            assert_eq!(header, Some(&HeaderValue::from_static(SITE_ORIGIN)));
        } else {
            assert!(header.is_none(), "{}", origin);
        }
    }
}

// Every call takes longer than the router's request timeout.
struct SlowDonations;

#[async_trait]
impl DonationService for SlowDonations {
    async fn create_order(
        &self,
        _request: CreateOrderRequest,
    ) -> Result<DonationOrder, DonationError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Err(DonationError::Validation("unreachable".to_string()))
    }

    async fn settle_donation(
        &self,
        _request: SettleDonationRequest,
    ) -> Result<SettleDonationResponse, DonationError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(SettleDonationResponse {
            donation: donation(),
            already_settled: false,
        })
    }

    async fn get_donation(&self, _donation_id: String) -> Result<Donation, Status> {
        Ok(donation())
    }

    async fn list_donations(
        &self,
        _request: ListDonationsRequest,
    ) -> Result<ListDonationsResponse, Status> {
        Ok(ListDonationsResponse {
            donations: vec![],
            next_page_token: String::new(),
            total_count: 0,
        })
    }
}

#[tokio::test]
async fn settlement_is_not_cut_off_by_request_timeout() {
    let app = app_with(Arc::new(SlowDonations), Duration::from_millis(20));

    let response = app.clone().oneshot(verify_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("POST")
        .uri("/donations/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "amount": 1000 }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}
