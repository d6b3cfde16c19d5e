pub mod poll_service;
pub use poll_service::{CreatePollInput, PollError, PollService};

pub mod poll_service_impl;
pub use poll_service_impl::SeaOrmPollService;

pub mod metadata;
pub use metadata::{EnrichedOption, MetadataService};
