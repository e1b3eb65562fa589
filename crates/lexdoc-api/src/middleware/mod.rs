//! Tower middleware for the API router.

pub mod metrics;
