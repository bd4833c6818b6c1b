//! Journal Service REST API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use waymark_core::{DaySlug, Subject, SubjectId};

use crate::error::Result;
use crate::{DayService, InteractionService};

#[derive(Clone)]
pub struct AppState {
    pub days: DayService,
    pub interactions: InteractionService,
}

pub fn create_router(days: DayService, interactions: InteractionService) -> Router {
    let state = AppState { days, interactions };

    Router::new()
        // Health
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Days
        .route("/api/days", get(list_days))
        .route("/api/day/{slug}", get(get_day))
        .route("/api/day/{slug}", put(put_day))
        // Photo interactions
        .route("/api/photo/{id}/interactions", get(get_photo_interactions))
        .route("/api/photo/{id}/react", post(react_photo))
        .route("/api/photo/{id}/comment", post(comment_photo))
        .route("/api/photo/{id}/comment/{cid}", put(edit_photo_comment))
        .route("/api/photo/{id}/comment/{cid}", delete(delete_photo_comment))
        // Stack interactions (mirror the photo routes, plus roll-up)
        .route("/api/stack/{id}/interactions", get(get_stack_interactions))
        .route("/api/stack/{id}/react", post(react_stack))
        .route("/api/stack/{id}/comment", post(comment_stack))
        .route("/api/stack/{id}/comment/{cid}", put(edit_stack_comment))
        .route("/api/stack/{id}/comment/{cid}", delete(delete_stack_comment))
        .with_state(state)
}

async fn health() -> &'static str { "OK" }
async fn ready() -> &'static str { "OK" }

// Day endpoints

async fn list_days(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.days.list().await))
}

async fn get_day(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let slug = DaySlug::parse(&slug)?;
    Ok(Json(state.days.get(&slug).await?))
}

async fn put_day(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(document): Json<Value>,
) -> Result<Json<Value>> {
    let slug = DaySlug::parse(&slug)?;
    state.days.put(&slug, document).await?;
    Ok(Json(json!({ "ok": true })))
}

// Interaction endpoints

#[derive(Deserialize)]
struct ReactRequest {
    emoji: Option<String>,
    action: Option<String>,
}

#[derive(Deserialize)]
struct CommentRequest {
    text: Option<String>,
    author: Option<String>,
}

#[derive(Deserialize)]
struct EditCommentRequest {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StackInteractionsQuery {
    include_rollup: Option<String>,
    photos: Option<String>,
}

/// The `photos` query value is a JSON array of photo ids. Anything
/// malformed is treated as an empty list, never an error.
pub(crate) fn parse_photos_param(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

async fn get_photo_interactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let subject = Subject::Photo(SubjectId::parse(&id)?);
    Ok(Json(json!(state.interactions.get(&subject).await)))
}

async fn get_stack_interactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StackInteractionsQuery>,
) -> Result<Json<Value>> {
    let stack_id = SubjectId::parse(&id)?;

    if query.include_rollup.as_deref() == Some("true") {
        let photo_ids = parse_photos_param(query.photos.as_deref());
        let (stack, rollup) = state.interactions.rollup(&stack_id, &photo_ids).await;
        return Ok(Json(json!({ "stack": stack, "rollup": rollup })));
    }

    Ok(Json(json!(
        state.interactions.get(&Subject::Stack(stack_id)).await
    )))
}

async fn react(state: AppState, subject: Subject, req: ReactRequest) -> Result<Json<Value>> {
    let emoji = req.emoji.as_deref().unwrap_or("");
    let remove_requested = req.action.as_deref() == Some("remove");
    let outcome = state.interactions.react(&subject, emoji, remove_requested).await?;
    Ok(Json(json!({
        "ok": true,
        "count": outcome.count,
        "removed": outcome.removed
    })))
}

async fn react_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReactRequest>,
) -> Result<Json<Value>> {
    react(state, Subject::Photo(SubjectId::parse(&id)?), req).await
}

async fn react_stack(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReactRequest>,
) -> Result<Json<Value>> {
    react(state, Subject::Stack(SubjectId::parse(&id)?), req).await
}

async fn comment(state: AppState, subject: Subject, req: CommentRequest) -> Result<Json<Value>> {
    let comment = state
        .interactions
        .comment(&subject, req.text.as_deref().unwrap_or(""), req.author.as_deref())
        .await?;
    Ok(Json(json!({ "ok": true, "comment": comment })))
}

async fn comment_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Value>> {
    comment(state, Subject::Photo(SubjectId::parse(&id)?), req).await
}

async fn comment_stack(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Value>> {
    comment(state, Subject::Stack(SubjectId::parse(&id)?), req).await
}

async fn edit_comment(
    state: AppState,
    subject: Subject,
    comment_id: String,
    req: EditCommentRequest,
) -> Result<Json<Value>> {
    let comment = state
        .interactions
        .edit_comment(&subject, &comment_id, req.text.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(json!({ "ok": true, "comment": comment })))
}

async fn edit_photo_comment(
    State(state): State<AppState>,
    Path((id, cid)): Path<(String, String)>,
    Json(req): Json<EditCommentRequest>,
) -> Result<Json<Value>> {
    edit_comment(state, Subject::Photo(SubjectId::parse(&id)?), cid, req).await
}

async fn edit_stack_comment(
    State(state): State<AppState>,
    Path((id, cid)): Path<(String, String)>,
    Json(req): Json<EditCommentRequest>,
) -> Result<Json<Value>> {
    edit_comment(state, Subject::Stack(SubjectId::parse(&id)?), cid, req).await
}

async fn delete_photo_comment(
    State(state): State<AppState>,
    Path((id, cid)): Path<(String, String)>,
) -> Result<StatusCode> {
    let subject = Subject::Photo(SubjectId::parse(&id)?);
    state.interactions.delete_comment(&subject, &cid).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_stack_comment(
    State(state): State<AppState>,
    Path((id, cid)): Path<(String, String)>,
) -> Result<StatusCode> {
    let subject = Subject::Stack(SubjectId::parse(&id)?);
    state.interactions.delete_comment(&subject, &cid).await?;
    Ok(StatusCode::NO_CONTENT)
}
