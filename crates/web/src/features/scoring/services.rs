use storage::{
    CompetitionStore,
    dto::scoring::{ScoringSchemeResponse, UpdateScoringSchemeRequest},
    error::Result,
    models::ScoringScheme,
    services::pipeline,
};
use uuid::Uuid;

pub async fn get_scoring_scheme(
    store: &dyn CompetitionStore,
    category_id: Uuid,
) -> Result<ScoringSchemeResponse> {
    store.category(category_id).await?;
    let (scheme, stored) = pipeline::current_scoring_scheme(store, category_id).await?;

    Ok(ScoringSchemeResponse::new(scheme, stored))
}

/// Builds the scheme for the category's current field and stores it.
///
/// Derived points are left stale; the caller triggers the recompute.
pub async fn store_scoring_scheme(
    store: &dyn CompetitionStore,
    category_id: Uuid,
    request: UpdateScoringSchemeRequest,
) -> Result<ScoringScheme> {
    store.category(category_id).await?;
    let field_size = store.entrants(category_id).await?.len();
    let scheme = request.into_scheme(category_id, field_size)?;
    pipeline::store_scoring_scheme(store, &scheme).await?;

    Ok(scheme)
}
