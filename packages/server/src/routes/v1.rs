use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .routes(routes!(handlers::occasion::list_occasions))
        .merge(card_routes())
        .routes(routes!(
            handlers::cleanup::run_cleanup,
            handlers::cleanup::cleanup_info
        ))
}

fn card_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::card::create_card))
        .routes(routes!(handlers::card::get_card))
        .routes(routes!(handlers::card::publish_card))
        .routes(routes!(handlers::card::regenerate_cover))
        .routes(routes!(handlers::card::regenerate_message))
}
