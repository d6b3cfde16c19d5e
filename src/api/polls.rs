use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_poll_id, validate_user_id};
use super::{ApiError, ApiResponse, AppState, CreatePollRequest, PollDto, VoteRequest};
use crate::models::{PollResult, PollVote};
use crate::services::CreatePollInput;

#[derive(Debug, Deserialize)]
pub struct PollQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotesQuery {
    pub user_id: Option<String>,
}

/// GET /api/pool?id=
pub async fn get_poll(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PollQuery>,
) -> Result<Json<ApiResponse<PollDto>>, ApiError> {
    let id = query
        .id
        .as_deref()
        .ok_or_else(|| ApiError::validation("Missing poll id"))?;
    let id = validate_poll_id(id)?;

    let poll = state.poll_service().get(id).await?;
    let options = state.metadata().enrich_options(&poll.poll.options).await;

    Ok(Json(ApiResponse::success(PollDto::from_parts(
        poll, options,
    ))))
}

/// POST /api/pool
pub async fn create_poll(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePollRequest>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::validation("Missing userId"))?;
    let title = payload
        .title
        .ok_or_else(|| ApiError::validation("Missing title"))?;
    let end_date = payload
        .end_date
        .ok_or_else(|| ApiError::validation("Missing endDate"))?;
    let options = payload
        .options
        .ok_or_else(|| ApiError::validation("Missing options"))?;
    // `false` is a present value; only null/undefined is rejected here.
    let multi_options = payload
        .multi_options
        .ok_or_else(|| ApiError::validation("Missing multiOptions"))?;

    let poll_id = state
        .poll_service()
        .create_and_return_id(CreatePollInput {
            user_id,
            title,
            end_date,
            multi_options,
            options,
        })
        .await?;

    Ok(Json(ApiResponse::success(poll_id)))
}

/// GET /api/pool/results/{pool_id}
pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(pool_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<PollResult>>>, ApiError> {
    let pool_id = validate_poll_id(&pool_id)?;
    let results = state.poll_service().results(pool_id).await?;
    Ok(Json(ApiResponse::success(results)))
}

/// POST /api/poll/vote/{poll_id}
pub async fn submit_votes(
    State(state): State<Arc<AppState>>,
    Path(poll_id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let poll_id = validate_poll_id(&poll_id)?;
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::validation("Missing userId"))?;
    let user_id = validate_user_id(&user_id)?;
    let selections = payload
        .selections
        .ok_or_else(|| ApiError::validation("Missing selections"))?;

    state
        .poll_service()
        .vote(poll_id, user_id, selections)
        .await?;

    Ok(Json(ApiResponse::success(true)))
}

/// GET /api/poll/{poll_id}/votes?userId=
pub async fn get_user_votes(
    State(state): State<Arc<AppState>>,
    Path(poll_id): Path<String>,
    Query(query): Query<VotesQuery>,
) -> Result<Json<ApiResponse<Vec<PollVote>>>, ApiError> {
    let poll_id = validate_poll_id(&poll_id)?;
    let user_id = query
        .user_id
        .as_deref()
        .ok_or_else(|| ApiError::validation("Missing userId"))?;
    let user_id = validate_user_id(user_id)?;

    let votes = state
        .poll_service()
        .get_user_votes(poll_id, user_id)
        .await?;

    Ok(Json(ApiResponse::success(votes)))
}
