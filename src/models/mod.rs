pub mod bid;
pub mod claims;
pub mod job;
pub mod results;
