//! Values passed through the normalization pipeline and the conversation.
pub mod chart;
pub mod content;
pub mod message;
pub mod trace;
