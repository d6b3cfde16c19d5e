pub use super::poll_ballots::Entity as PollBallots;
pub use super::poll_options::Entity as PollOptions;
pub use super::poll_votes::Entity as PollVotes;
pub use super::polls::Entity as Polls;
pub use super::users::Entity as Users;
