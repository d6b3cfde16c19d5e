//! `SeaORM` implementation of the [`PollService`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{BallotOutcome, Store};
use crate::models::{Poll, PollResult, PollVote, PollWithCreator, VoteSelection};
use crate::services::poll_service::{
    CreatePollInput, PollError, PollService, find_invalid_selection, has_duplicate_selection,
    order_results,
};

pub struct SeaOrmPollService {
    store: Store,
}

impl SeaOrmPollService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn parse_end_date(end_date: &str) -> Result<DateTime<Utc>, PollError> {
        DateTime::parse_from_rfc3339(end_date)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| PollError::Validation(format!("Invalid end date: {e}")))
    }

    fn validate_input(input: &CreatePollInput) -> Result<(), PollError> {
        if input.title.trim().is_empty() {
            return Err(PollError::Validation("Title cannot be empty".to_string()));
        }

        let end_date = Self::parse_end_date(&input.end_date)?;
        if end_date <= Utc::now() {
            return Err(PollError::Validation(
                "End date must be in the future".to_string(),
            ));
        }

        if input.options.is_empty() {
            return Err(PollError::Validation(
                "Poll must have at least one option".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for option in &input.options {
            if !seen.insert(option.key()) {
                return Err(PollError::Validation(format!(
                    "Duplicate option: {} ({})",
                    option.anilist_id, option.kind
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl PollService for SeaOrmPollService {
    async fn create_and_return_id(&self, input: CreatePollInput) -> Result<String, PollError> {
        Self::validate_input(&input)?;

        let poll = Poll {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            title: input.title,
            end_date: input.end_date,
            multi_options: input.multi_options,
            options: input.options,
        };

        self.store.create_poll(&poll).await?;
        Ok(poll.id)
    }

    async fn get(&self, poll_id: &str) -> Result<PollWithCreator, PollError> {
        self.store
            .get_poll_with_creator(poll_id)
            .await?
            .ok_or_else(|| PollError::NotFound(poll_id.to_string()))
    }

    async fn get_user_votes(
        &self,
        poll_id: &str,
        user_id: &str,
    ) -> Result<Vec<PollVote>, PollError> {
        Ok(self.store.votes_by_poll_and_user(poll_id, user_id).await?)
    }

    async fn vote(
        &self,
        poll_id: &str,
        user_id: &str,
        selections: Vec<VoteSelection>,
    ) -> Result<(), PollError> {
        let poll = self
            .store
            .get_poll(poll_id)
            .await?
            .ok_or_else(|| PollError::NotFound(poll_id.to_string()))?;

        if let Some(invalid) = find_invalid_selection(&poll.options, &selections) {
            return Err(PollError::Validation(format!(
                "Invalid option: {} ({})",
                invalid.anilist_id, invalid.kind
            )));
        }

        let end_date = Self::parse_end_date(&poll.end_date)?;
        if end_date <= Utc::now() {
            return Err(PollError::Expired);
        }

        // Early read check for a friendly rejection. The storage-level unique
        // constraint below is what actually closes the check-then-insert race.
        let prior = self.store.votes_by_poll_and_user(poll_id, user_id).await?;
        if !prior.is_empty() {
            return Err(PollError::AlreadyVoted);
        }

        if poll.multi_options {
            if selections.is_empty() {
                return Err(PollError::Validation(
                    "At least one selection is required".to_string(),
                ));
            }
        } else if selections.len() != 1 {
            return Err(PollError::Validation(
                "Exactly one selection is required".to_string(),
            ));
        }

        if has_duplicate_selection(&selections) {
            return Err(PollError::Validation(
                "Duplicate selection in submission".to_string(),
            ));
        }

        match self
            .store
            .record_ballot(poll_id, user_id, &selections)
            .await?
        {
            BallotOutcome::Recorded => Ok(()),
            BallotOutcome::Duplicate => Err(PollError::AlreadyVoted),
        }
    }

    async fn results(&self, poll_id: &str) -> Result<Vec<PollResult>, PollError> {
        let poll = self
            .store
            .get_poll(poll_id)
            .await?
            .ok_or_else(|| PollError::NotFound(poll_id.to_string()))?;

        let counts = self.store.vote_counts_by_option(poll_id).await?;
        Ok(order_results(&poll.options, &counts))
    }
}
