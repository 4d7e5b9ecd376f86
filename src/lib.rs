pub mod agent;
pub mod conversation;
pub mod errors;
pub mod pipeline;
pub mod types;
pub mod utils;
