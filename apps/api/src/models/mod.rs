pub mod feedback;
pub mod job_posting;
pub mod operation;
pub mod resume;
pub mod session;
pub mod user;
