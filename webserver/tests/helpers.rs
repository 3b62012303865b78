//! Test helper utilities for router tests

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use webserver::{MockTaskApi, WebServer};

/// Router over a mock API with its expectations already set
pub fn router_with(api: MockTaskApi) -> Router {
    let bind_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    WebServer::new(bind_addr, Arc::new(api)).build_router()
}

/// Send one request through the router and return status plus JSON body
pub async fn send<T: DeserializeOwned>(router: Router, request: Request<Body>) -> (StatusCode, T) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("unexpected body {:?}: {e}", String::from_utf8_lossy(&bytes)));
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
