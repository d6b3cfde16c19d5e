pub mod prelude;

pub mod poll_ballots;
pub mod poll_options;
pub mod poll_votes;
pub mod polls;
pub mod users;
