pub mod repository_error;
pub mod submission_repo;

pub use repository_error::{RepositoryError, RepositoryResult};
pub use submission_repo::{MongoSubmissionRepository, SubmissionRepository};
