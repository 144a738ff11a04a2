//! Domain types and models

pub mod assignment;
pub mod course;
pub mod file;
pub mod session;
pub mod user;

pub use assignment::{ApiAssignment, ApiSubmission, SubmissionWorkflowState};
pub use course::{ApiCourse, ApiEnrollment, EnrollmentState};
pub use file::ApiFile;
pub use session::LoginSession;
pub use user::{ApiProfile, ApiUser};
