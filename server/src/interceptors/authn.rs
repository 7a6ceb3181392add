use crate::{async_interceptor::AsyncInterceptor, signature::secrets_match};
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
};
use hopewell_status::{unauthenticated, Status};
use log::debug;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum Peer {
    Admin,
    Anonymous,
}

/// Admits back-office requests carrying `Authorization: Bearer <admin token>`.
#[derive(Clone)]
pub struct AdminAuthnInterceptor {
    api_token: Arc<String>,
}

impl AdminAuthnInterceptor {
    pub fn new(api_token: String) -> Self {
        Self {
            api_token: Arc::new(api_token),
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Peer, Status> {
        let bearer = match headers.get(AUTHORIZATION) {
            None => return Ok(Peer::Anonymous),
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| unauthenticated!("'authorization' header is malformed"))?,
        };

        if !secrets_match(&self.api_token, bearer.trim()) {
            return Err(unauthenticated!("admin token is invalid"));
        }
        Ok(Peer::Admin)
    }
}

#[async_trait]
impl AsyncInterceptor for AdminAuthnInterceptor {
    async fn intercept(&self, req: &mut Request) -> Result<(), Status> {
        let peer = self.authenticate(req.headers())?;
        debug!("Request to {} from {:?}", req.uri().path(), peer);
        if peer != Peer::Admin {
            return Err(unauthenticated!("admin credentials required"));
        }
        req.extensions_mut().insert(peer);
        Ok(())
    }
}
