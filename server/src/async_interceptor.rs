use async_trait::async_trait;
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use hopewell_status::Status;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Inspects a request before its route runs. An `Err` is rendered as the
/// JSON status response and the route is never called. Implementations may
/// attach data for handlers through request extensions.
#[async_trait]
pub trait AsyncInterceptor
where
    Self: Sized + Clone + Send + Sync,
{
    async fn intercept(&self, req: &mut Request) -> Result<(), Status>;
}

/// Applied with `Router::route_layer` so unmatched paths still 404.
#[derive(Clone, Debug)]
pub struct AsyncInterceptorLayer<I>
where
    I: AsyncInterceptor,
{
    interceptor: I,
}

impl<I> AsyncInterceptorLayer<I>
where
    I: AsyncInterceptor,
{
    pub fn new(interceptor: I) -> Self {
        Self { interceptor }
    }
}

impl<S, I> Layer<S> for AsyncInterceptorLayer<I>
where
    I: AsyncInterceptor,
{
    type Service = AsyncInterceptorService<S, I>;

    fn layer(&self, service: S) -> Self::Service {
        Self::Service {
            inner: service,
            interceptor: self.interceptor.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AsyncInterceptorService<S, I>
where
    I: AsyncInterceptor,
{
    inner: S,
    interceptor: I,
}

impl<S, I> Service<Request> for AsyncInterceptorService<S, I>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    I: AsyncInterceptor + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // The clone may not be ready; keep the instance poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let interceptor = self.interceptor.clone();

        Box::pin(async move {
            match interceptor.intercept(&mut req).await {
                Ok(_) => inner.call(req).await,
                Err(status) => Ok(status.into_response()),
            }
        })
    }
}
