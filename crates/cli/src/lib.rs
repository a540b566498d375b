//! HTTP surface (C10) and process entry point (C11) for a single ring
//! node: an axum router binding the routes of §6 to `NodeState` and
//! `ReplicatedStore`, plus the `clap`-derived CLI that wires it all up.

pub mod config;
pub mod routes;

use corelib::node::NodeState;
use parking_lot::Mutex;
use replication::ReplicatedStore;
use std::sync::Arc;
use tokio::sync::oneshot;

pub use config::Args;

/// Shared state handed to every handler. `shutdown` is consumed by the
/// first `/shutdown` request; later ones are a no-op.
pub struct AppState {
    pub node: Arc<NodeState>,
    pub store: Arc<ReplicatedStore>,
    pub shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

/// Builds the router of §6 and a receiver that resolves once `/shutdown`
/// has been hit, for `axum::serve(..).with_graceful_shutdown(..)`.
pub fn build_router(
    node: Arc<NodeState>,
    store: Arc<ReplicatedStore>,
) -> (axum::Router, oneshot::Receiver<()>) {
    use axum::routing::{get, post};

    let (tx, rx) = oneshot::channel();
    let state = Arc::new(AppState { node, store, shutdown: Mutex::new(Some(tx)) });

    let router = axum::Router::new()
        .route("/", get(routes::root))
        .route("/predecessor", get(routes::predecessor))
        .route("/network", get(routes::network))
        .route("/content", get(routes::content_all))
        .route("/content/:a/:b", get(routes::content_range))
        .route("/delete/:a/:b", get(routes::delete))
        .route("/update_predecessor/:host", get(routes::update_predecessor))
        .route("/lookup/:key", get(routes::lookup))
        .route("/exists/:path", get(routes::exists))
        .route("/exists/:path/:n", get(routes::exists_with_n))
        .route("/get/:path", get(routes::get))
        .route("/get/:path/:n", get(routes::get_with_n))
        .route("/put/:path", post(routes::put).put(routes::put))
        .route("/put/:path/:n", post(routes::put_with_n).put(routes::put_with_n))
        .route("/remove/:path", get(routes::remove))
        .route("/remove/:path/:n", get(routes::remove_with_n))
        .route("/copy/:src/:dst", get(routes::copy))
        .route("/list", get(routes::list))
        .route("/shutdown", get(routes::shutdown))
        .with_state(state);

    (router, rx)
}
