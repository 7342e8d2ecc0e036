use axum::Router;

use crate::state::AppState;

pub mod championships;
pub mod heats;
pub mod scoring;
pub mod standings;

pub fn routes() -> Router<AppState> {
    let categories = standings::routes::routes()
        .merge(scoring::routes::routes())
        .merge(heats::routes::routes());

    Router::new()
        .nest("/categories", categories)
        .nest("/championships", championships::routes::routes())
}
