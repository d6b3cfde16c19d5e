use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an option points at on AniList.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionKind {
    Character,
    Anime,
    Manga,
}

impl OptionKind {
    #[must_use]
    pub const fn is_media(self) -> bool {
        matches!(self, Self::Anime | Self::Manga)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Character => "CHARACTER",
            Self::Anime => "ANIME",
            Self::Manga => "MANGA",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHARACTER" => Ok(Self::Character),
            "ANIME" => Ok(Self::Anime),
            "MANGA" => Ok(Self::Manga),
            other => Err(format!("Unknown option kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub anilist_id: i32,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PollOption {
    /// Identity of an option within its poll.
    #[must_use]
    pub const fn key(&self) -> (i32, OptionKind) {
        (self.anilist_id, self.kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// RFC 3339; voting closes strictly after this moment.
    pub end_date: String,
    pub multi_options: bool,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub nickname: String,
    pub avatar_url: String,
}

impl Creator {
    /// Fallback when the identity layer has no row for the owning user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            nickname: "unknown".to_string(),
            avatar_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollWithCreator {
    #[serde(flatten)]
    pub poll: Poll,
    pub creator: Creator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollVote {
    pub id: String,
    pub user_id: String,
    pub poll_id: String,
    pub anilist_id: i32,
    #[serde(rename = "type")]
    pub kind: OptionKind,
}

/// One selected option in a vote submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSelection {
    pub anilist_id: i32,
    #[serde(rename = "type")]
    pub kind: OptionKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResult {
    pub anilist_id: i32,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub votes: u64,
}
