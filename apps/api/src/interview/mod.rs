pub mod feedback;
pub mod handlers;
pub mod prompts;
pub mod questions;
