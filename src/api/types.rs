use serde::{Deserialize, Serialize};

use crate::models::{Creator, PollOption, PollWithCreator, VoteSelection};
use crate::services::EnrichedOption;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Poll as served to voters: creator display info plus metadata-enriched
/// options.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDto {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub end_date: String,
    pub multi_options: bool,
    pub options: Vec<EnrichedOption>,
    pub creator: Creator,
}

impl PollDto {
    #[must_use]
    pub fn from_parts(poll: PollWithCreator, options: Vec<EnrichedOption>) -> Self {
        Self {
            id: poll.poll.id,
            user_id: poll.poll.user_id,
            title: poll.poll.title,
            end_date: poll.poll.end_date,
            multi_options: poll.poll.multi_options,
            options,
            creator: poll.creator,
        }
    }
}

/// All fields optional so the controller can distinguish missing from
/// present; `multi_options: false` must count as present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub end_date: Option<String>,
    pub options: Option<Vec<PollOption>>,
    pub multi_options: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub user_id: Option<String>,
    pub selections: Option<Vec<VoteSelection>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub oauth_provider: Option<String>,
    pub oauth_id: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub nickname: String,
    pub avatar_url: String,
}

impl From<crate::db::User> for UserDto {
    fn from(user: crate::db::User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            avatar_url: user.avatar_url,
        }
    }
}
