pub mod cards;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod generation;
pub mod handlers;
pub mod models;
pub mod moderation;
pub mod rate_limit;
pub mod routes;
pub mod seed;
pub mod state;
pub mod sweeper;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Request};
use common::config::StorageBackend;
use common::storage::filesystem::DEFAULT_PUBLIC_PATH;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Level;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Holiday Card API",
        version = "1.0.0",
        description = "Create AI-written holiday cards with generated covers and share them by link"
    ),
    tags(
        (name = "Cards", description = "Card creation, publishing and regeneration"),
        (name = "Occasions", description = "Holidays a card can be made for"),
        (name = "Cleanup", description = "Removal of expired cards"),
        (name = "Health", description = "Service health"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "cleanup_token",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

const EXPOSED_HEADERS: &[&str] = &[
    "retry-after",
    "x-ratelimit-dimension",
    "x-ratelimit-ip-limit",
    "x-ratelimit-ip-remaining",
    "x-ratelimit-ip-reset",
    "x-ratelimit-device-limit",
    "x-ratelimit-device-remaining",
    "x-ratelimit-device-reset",
];

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(
            EXPOSED_HEADERS
                .iter()
                .copied()
                .map(HeaderName::from_static)
                .collect::<Vec<_>>(),
        )
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let config = state.config.clone();

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let mut router = router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api));

    // Local covers are served by us unless an external URL fronts the directory.
    if config.storage.backend == StorageBackend::Filesystem
        && config.storage.public_base_url.as_deref().is_none_or(str::is_empty)
    {
        router = router.nest_service(DEFAULT_PUBLIC_PATH, ServeDir::new(&config.storage.local_dir));
    }

    router
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .layer(cors_layer(&config.server.cors))
}
