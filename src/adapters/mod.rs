// Adapters layer: concrete implementations for the feed, staging, and
// store ports.

pub mod csv_feed;
pub mod http_feed;
pub mod json_store;
pub mod local_staging;
pub mod memory_store;
