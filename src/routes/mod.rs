pub mod dashboard;
mod rate_limit;
pub mod snapshot;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::ClientIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(snapshot::get_snapshot),
    components(schemas(snapshot::SnapshotResponse)),
    tags(
        (name = "snapshot", description = "Downsampled series and latest reading"),
    ),
    info(
        title = "Reef Monitor API",
        description = "Aquarium pH, temperature and outlet dashboard API",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let snapshot_routes = Router::new().route("/data", get(snapshot::get_snapshot));

    let snapshot_routes = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        snapshot_routes
    } else {
        tracing::info!(
            per_second = config.rate_limit_per_second,
            burst = config.rate_limit_burst,
            "Rate limiting configured"
        );

        let limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .finish()
            .expect("Failed to create snapshot rate limiter");

        snapshot_routes.layer(GovernorLayer {
            config: Arc::new(limiter),
        })
    };

    let page = dashboard::render(config);
    let page_routes = Router::new().route("/", get(move || dashboard::serve(page.clone())));

    Router::new()
        .merge(page_routes)
        .merge(snapshot_routes)
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
