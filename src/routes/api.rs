//! Fallback service: everything not matched by the common routes goes through the dispatcher.

use crate::routing::RawRequest;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    response::Response,
};

pub async fn dispatch(State(state): State<AppState>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let raw = RawRequest::new(method.as_str(), path, body.to_vec());
    let dispatcher = state.dispatcher.clone();
    dispatcher.dispatch(state, raw).await
}
