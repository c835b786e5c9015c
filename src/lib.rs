pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod load;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod transform;
