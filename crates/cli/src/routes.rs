//! Axum handlers binding the HTTP surface of §6 to `NodeState` and
//! `ReplicatedStore`. Every handler is a thin adapter: parse path
//! segments into the core's own types, call through, map `corelib::Error`
//! onto the status codes of §7.

use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use corelib::error::Error;
use corelib::ring::RingId;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps a domain error onto the HTTP status of §7's error table.
fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::Duplicate(_) => StatusCode::CONFLICT,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        Error::Unreachable(_) | Error::Unavailable | Error::IdCollision(_) | Error::Raced(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn err_response(err: Error) -> Response {
    (error_status(&err), err.to_string()).into_response()
}

pub async fn root() -> &'static str {
    "ok"
}

pub async fn predecessor(State(state): State<Arc<AppState>>) -> Json<String> {
    Json(state.node.predecessor().host)
}

pub async fn network(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, String>> {
    let inner = state.node.inner.lock();
    Json(inner.peer_cache.iter().map(|(id, host)| (id.0.to_string(), host.to_string())).collect())
}

pub async fn content_all(State(state): State<Arc<AppState>>) -> Json<Vec<(RingId, Vec<(String, Value)>)>> {
    // a == b asks for the whole ring, per the between() full-ring exception.
    content_arc(&state, RingId(0), RingId(0))
}

pub async fn content_range(
    State(state): State<Arc<AppState>>,
    Path((a, b)): Path<(u64, u64)>,
) -> Json<Vec<(RingId, Vec<(String, Value)>)>> {
    content_arc(&state, RingId(a), RingId(b))
}

fn content_arc(state: &AppState, a: RingId, b: RingId) -> Json<Vec<(RingId, Vec<(String, Value)>)>> {
    let inner = state.node.inner.lock();
    Json(inner.local_store.content(&state.node.keyspace, a, b))
}

pub async fn delete(State(state): State<Arc<AppState>>, Path((a, b)): Path<(u64, u64)>) -> StatusCode {
    let mut inner = state.node.inner.lock();
    inner.local_store.delete(&state.node.keyspace, RingId(a), RingId(b));
    StatusCode::OK
}

pub async fn update_predecessor(
    State(state): State<Arc<AppState>>,
    Path(host): Path<String>,
) -> StatusCode {
    if state.node.accept_predecessor(&host) {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub async fn lookup(State(state): State<Arc<AppState>>, Path(key): Path<u64>) -> Response {
    let chain = corelib::lookup::lookup(&state.node, state.store.transport.as_ref(), RingId(key)).await;
    Json(chain).into_response()
}

pub async fn exists(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    exists_n(state, canonical_path(path), None).await
}

pub async fn exists_with_n(
    State(state): State<Arc<AppState>>,
    Path((path, n)): Path<(String, u32)>,
) -> Response {
    exists_n(state, canonical_path(path), Some(n)).await
}

async fn exists_n(state: Arc<AppState>, path: String, n: Option<u32>) -> Response {
    match state.store.exists(&path, n).await {
        Ok(found) => Json(found).into_response(),
        Err(err) => err_response(err),
    }
}

pub async fn get(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    get_n(state, canonical_path(path), None).await
}

pub async fn get_with_n(
    State(state): State<Arc<AppState>>,
    Path((path, n)): Path<(String, u32)>,
) -> Response {
    get_n(state, canonical_path(path), Some(n)).await
}

async fn get_n(state: Arc<AppState>, path: String, n: Option<u32>) -> Response {
    match state.store.get(&path, n).await {
        Ok(value) => Json(value).into_response(),
        Err(err) => err_response(err),
    }
}

pub async fn put(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Json(value): Json<Value>,
) -> Response {
    put_n(state, canonical_path(path), value, None).await
}

pub async fn put_with_n(
    State(state): State<Arc<AppState>>,
    Path((path, n)): Path<(String, u32)>,
    Json(value): Json<Value>,
) -> Response {
    put_n(state, canonical_path(path), value, Some(n)).await
}

async fn put_n(state: Arc<AppState>, path: String, value: Value, n: Option<u32>) -> Response {
    match state.store.put(&path, value, n).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => err_response(err),
    }
}

pub async fn remove(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    remove_n(state, canonical_path(path), None).await
}

pub async fn remove_with_n(
    State(state): State<Arc<AppState>>,
    Path((path, n)): Path<(String, u32)>,
) -> Response {
    remove_n(state, canonical_path(path), Some(n)).await
}

async fn remove_n(state: Arc<AppState>, path: String, n: Option<u32>) -> Response {
    match state.store.remove(&path, n).await {
        Ok(value) => Json(value).into_response(),
        Err(err) => err_response(err),
    }
}

pub async fn copy(
    State(state): State<Arc<AppState>>,
    Path((src, dst)): Path<(String, String)>,
) -> Response {
    match state.store.copy(&canonical_path(src), &canonical_path(dst), None).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => err_response(err),
    }
}

/// Axum's `:path` segment extractor strips the leading slash the rest of
/// the system treats as part of a path's canonical form (it's what gets
/// hashed, stored, and re-sent over the wire when a replicated op
/// forwards to another node). Restore it here, once, at the HTTP edge.
fn canonical_path(segment: String) -> String {
    format!("/{segment}")
}

pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.store.list().await)
}

pub async fn shutdown(State(state): State<Arc<AppState>>) -> StatusCode {
    if let Some(tx) = state.shutdown.lock().take() {
        let _ = tx.send(());
    }
    StatusCode::OK
}
