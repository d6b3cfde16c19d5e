pub mod poll;

pub use poll::{
    Creator, OptionKind, Poll, PollOption, PollResult, PollVote, PollWithCreator, VoteSelection,
};
