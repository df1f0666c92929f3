// HTTP routes: JSON telemetry + SSE command streams

mod http;
mod stream;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::Aggregator;
use crate::config::AppConfig;
use crate::lookup::Resolver;
use crate::models::HostInfo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: Arc<Aggregator>,
    pub(crate) host_info: Arc<HostInfo>,
    pub(crate) resolver: Arc<Resolver>,
    pub(crate) config: AppConfig,
}

pub fn app(
    aggregator: Arc<Aggregator>,
    host_info: Arc<HostInfo>,
    resolver: Arc<Resolver>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        aggregator,
        host_info,
        resolver,
        config,
    };
    Router::new()
        .route("/", get(|| async { "hostconsole is running" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/stats", get(http::stats_handler)) // GET /stats
        .route("/host", get(http::host_handler)) // GET /host
        .route("/pinginfo", get(http::pinginfo_handler)) // GET /pinginfo?url=
        .route("/run/{command}", get(stream::run_handler)) // GET /run/{command}?target=&args=
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
