pub mod handlers;
pub mod lineage;
pub mod transcript;
