// src/server/handler.rs
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::Instrument;

use super::page::render_page;
use crate::query::StatusService;

pub const PAGE_PATH: &str = "/";
pub const STATUS_PATH: &str = "/api/status";

/// Routes `/` to the cached page and `/api/status` to a fresh check.
#[derive(Clone)]
pub struct RequestHandler {
    service: Arc<StatusService>,
}

impl RequestHandler {
    pub fn new(service: Arc<StatusService>) -> Self {
        Self { service }
    }

    async fn route(&self, req: Request<Body>) -> Response<Body> {
        let is_get = req.method() == Method::GET;
        match req.uri().path() {
            PAGE_PATH if is_get => {
                let snapshot = self.service.cached().await;
                respond(StatusCode::OK, "text/html; charset=utf-8", render_page(&snapshot))
            }
            STATUS_PATH if is_get => {
                let snapshot = self.service.fresh().await;
                match serde_json::to_vec(&*snapshot) {
                    Ok(body) => respond(StatusCode::OK, "application/json", body),
                    Err(err) => {
                        tracing::error!(%err, "failed to serialize health snapshot");
                        respond(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "text/plain; charset=utf-8",
                            "Internal Server Error",
                        )
                    }
                }
            }
            PAGE_PATH | STATUS_PATH => {
                let mut response = respond(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "text/plain; charset=utf-8",
                    "Method Not Allowed",
                );
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static("GET"));
                response
            }
            _ => respond(StatusCode::NOT_FOUND, "text/plain; charset=utf-8", "Not Found"),
        }
    }
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        let span = tracing::info_span!(
            "request",
            id = %uuid::Uuid::new_v4(),
            method = %req.method(),
            path = %req.uri().path(),
        );
        Box::pin(
            async move {
                let response = handler.route(req).await;
                tracing::debug!(status = response.status().as_u16(), "request complete");
                Ok(response)
            }
            .instrument(span),
        )
    }
}
