pub mod api;
pub mod auth;
pub mod bids;
pub mod jobs;
