use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use hopewell_status::Status;

/// `Json` whose rejections are reported as a `VALIDATION_FAILED` status.
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections are reported as a `VALIDATION_FAILED` status.
pub struct ApiQuery<T>(pub T);

fn validation_failed(message: String) -> Status {
    Status::invalid_argument(message).with_reason("VALIDATION_FAILED")
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Status;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| validation_failed(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = Status;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| validation_failed(rejection.body_text()))?;
        Ok(Self(value))
    }
}
