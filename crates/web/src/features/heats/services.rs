use storage::{
    CompetitionStore,
    dto::heat::EventHeatsResponse,
    error::{Result, StorageError},
    services::pipeline,
};
use uuid::Uuid;

pub async fn schedule_next_event(
    store: &dyn CompetitionStore,
    category_id: Uuid,
) -> Result<EventHeatsResponse> {
    let (event, heats) = pipeline::reschedule_next_event(store, category_id).await?;

    Ok(EventHeatsResponse::new(event.event_id, category_id, heats))
}

pub async fn schedule_event(
    store: &dyn CompetitionStore,
    category_id: Uuid,
    event_id: Uuid,
) -> Result<EventHeatsResponse> {
    let heats = pipeline::reschedule_event(store, event_id, category_id).await?;

    Ok(EventHeatsResponse::new(event_id, category_id, heats))
}

pub async fn list_event_heats(
    store: &dyn CompetitionStore,
    category_id: Uuid,
    event_id: Uuid,
) -> Result<EventHeatsResponse> {
    let category = store.category(category_id).await?;
    let event = store.event(event_id).await?;
    if event.championship_id != category.championship_id {
        return Err(StorageError::NotFound);
    }

    let heats = store.heats(event_id, category_id).await?;
    Ok(EventHeatsResponse::new(event_id, category_id, heats))
}
