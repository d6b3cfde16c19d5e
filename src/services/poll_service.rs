//! Domain service for poll lifecycle and vote consistency.
//!
//! This module provides a clean domain layer abstraction over data access,
//! enabling testability and separation of concerns.

use std::collections::{HashMap, HashSet};

use crate::models::{OptionKind, PollOption, PollResult, PollVote, PollWithCreator, VoteSelection};
use thiserror::Error;

/// Domain errors for poll operations.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Poll not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User has already voted on this poll")]
    AlreadyVoted,

    #[error("Poll has expired")]
    Expired,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for PollError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PollError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Input for creating a poll.
#[derive(Debug, Clone)]
pub struct CreatePollInput {
    pub user_id: String,
    pub title: String,
    pub end_date: String,
    pub multi_options: bool,
    pub options: Vec<PollOption>,
}

/// Domain service trait for poll operations.
#[async_trait::async_trait]
pub trait PollService: Send + Sync {
    /// Validates and persists a new poll, returning its id.
    ///
    /// # Errors
    ///
    /// - Returns [`PollError::Validation`] on an empty title, an unparseable
    ///   or past end date, an empty option list, or duplicate options
    /// - Returns [`PollError::Database`] on storage failures
    async fn create_and_return_id(&self, input: CreatePollInput) -> Result<String, PollError>;

    /// Retrieves a poll together with its creator's display profile.
    ///
    /// # Errors
    ///
    /// - Returns [`PollError::NotFound`] if the poll does not exist
    /// - Returns [`PollError::Database`] on storage failures
    async fn get(&self, poll_id: &str) -> Result<PollWithCreator, PollError>;

    /// Lists all prior votes by one user on one poll. Callers use this to
    /// decide whether to block repeat voting in the UI.
    async fn get_user_votes(&self, poll_id: &str, user_id: &str)
    -> Result<Vec<PollVote>, PollError>;

    /// Submits a vote: one selection for single-option polls, one or more
    /// distinct selections for multi-option polls. Persistence is all or
    /// nothing.
    ///
    /// # Errors
    ///
    /// - Returns [`PollError::Validation`] if a selection is not among the
    ///   poll's options, the selection list is empty or contains duplicates,
    ///   or a single-option poll receives more than one selection
    /// - Returns [`PollError::Expired`] if the poll's end date has passed
    /// - Returns [`PollError::AlreadyVoted`] if any vote by this user already
    ///   exists for this poll
    async fn vote(
        &self,
        poll_id: &str,
        user_id: &str,
        selections: Vec<VoteSelection>,
    ) -> Result<(), PollError>;

    /// Aggregated per-option vote counts, zero-filled so every declared
    /// option appears, ordered by count descending with ties broken by the
    /// option order in the poll.
    async fn results(&self, poll_id: &str) -> Result<Vec<PollResult>, PollError>;
}

/// Pure function producing the ordered result list for a poll.
///
/// Every declared option appears exactly once, with a zero count when no
/// votes exist for it. The sort is stable, so options with equal counts keep
/// their original order.
///
/// # Examples
///
/// ```
/// # use std::collections::HashMap;
/// # use anipool::models::{OptionKind, PollOption};
/// # use anipool::services::poll_service::order_results;
/// let options = vec![
///     PollOption { anilist_id: 1, kind: OptionKind::Anime, text: None },
///     PollOption { anilist_id: 2, kind: OptionKind::Anime, text: None },
/// ];
/// let counts = HashMap::from([((2, OptionKind::Anime), 3)]);
/// let results = order_results(&options, &counts);
/// assert_eq!(results[0].anilist_id, 2);
/// assert_eq!(results[1].votes, 0);
/// ```
#[must_use]
pub fn order_results(
    options: &[PollOption],
    counts: &HashMap<(i32, OptionKind), u64>,
) -> Vec<PollResult> {
    let mut results: Vec<PollResult> = options
        .iter()
        .map(|option| PollResult {
            anilist_id: option.anilist_id,
            kind: option.kind,
            text: option.text.clone(),
            votes: counts.get(&option.key()).copied().unwrap_or(0),
        })
        .collect();

    results.sort_by(|a, b| b.votes.cmp(&a.votes));
    results
}

/// Returns the first selection that does not match any declared option.
#[must_use]
pub fn find_invalid_selection<'a>(
    options: &[PollOption],
    selections: &'a [VoteSelection],
) -> Option<&'a VoteSelection> {
    let declared: HashSet<(i32, OptionKind)> = options.iter().map(PollOption::key).collect();
    selections
        .iter()
        .find(|s| !declared.contains(&(s.anilist_id, s.kind)))
}

/// Returns true when the same option is selected more than once.
#[must_use]
pub fn has_duplicate_selection(selections: &[VoteSelection]) -> bool {
    let mut seen = HashSet::new();
    selections
        .iter()
        .any(|s| !seen.insert((s.anilist_id, s.kind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: i32, kind: OptionKind) -> PollOption {
        PollOption {
            anilist_id: id,
            kind,
            text: None,
        }
    }

    fn selection(id: i32, kind: OptionKind) -> VoteSelection {
        VoteSelection {
            anilist_id: id,
            kind,
        }
    }

    #[test]
    fn order_results_descending_by_votes() {
        let options = vec![option(1, OptionKind::Anime), option(2, OptionKind::Anime)];
        let counts = HashMap::from([
            ((1, OptionKind::Anime), 0),
            ((2, OptionKind::Anime), 2),
        ]);

        let results = order_results(&options, &counts);
        assert_eq!(results[0].anilist_id, 2);
        assert_eq!(results[0].votes, 2);
        assert_eq!(results[1].anilist_id, 1);
        assert_eq!(results[1].votes, 0);
    }

    #[test]
    fn order_results_ties_keep_option_order() {
        let options = vec![
            option(10, OptionKind::Character),
            option(20, OptionKind::Character),
            option(30, OptionKind::Character),
        ];
        let counts = HashMap::from([
            ((10, OptionKind::Character), 1),
            ((20, OptionKind::Character), 1),
            ((30, OptionKind::Character), 1),
        ]);

        let results = order_results(&options, &counts);
        let ids: Vec<i32> = results.iter().map(|r| r.anilist_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn order_results_zero_fills_missing_options() {
        let options = vec![option(1, OptionKind::Manga), option(2, OptionKind::Manga)];
        let counts = HashMap::new();

        let results = order_results(&options, &counts);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.votes == 0));
    }

    #[test]
    fn order_results_distinguishes_kinds_with_same_id() {
        // A character and an anime can share an AniList id.
        let options = vec![option(7, OptionKind::Character), option(7, OptionKind::Anime)];
        let counts = HashMap::from([((7, OptionKind::Anime), 4)]);

        let results = order_results(&options, &counts);
        assert_eq!(results[0].kind, OptionKind::Anime);
        assert_eq!(results[0].votes, 4);
        assert_eq!(results[1].kind, OptionKind::Character);
        assert_eq!(results[1].votes, 0);
    }

    #[test]
    fn find_invalid_selection_detects_unknown_option() {
        let options = vec![option(1, OptionKind::Anime)];
        let selections = vec![selection(1, OptionKind::Anime), selection(2, OptionKind::Anime)];

        let invalid = find_invalid_selection(&options, &selections);
        assert_eq!(invalid.map(|s| s.anilist_id), Some(2));
    }

    #[test]
    fn find_invalid_selection_checks_kind_too() {
        let options = vec![option(1, OptionKind::Anime)];
        let selections = vec![selection(1, OptionKind::Manga)];

        assert!(find_invalid_selection(&options, &selections).is_some());
    }

    #[test]
    fn duplicate_selection_detected() {
        let selections = vec![selection(1, OptionKind::Anime), selection(1, OptionKind::Anime)];
        assert!(has_duplicate_selection(&selections));

        let distinct = vec![selection(1, OptionKind::Anime), selection(1, OptionKind::Manga)];
        assert!(!has_duplicate_selection(&distinct));
    }

    #[test]
    fn poll_error_display() {
        let err = PollError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Poll not found: abc");

        let err = PollError::Expired;
        assert_eq!(err.to_string(), "Poll has expired");
    }
}
