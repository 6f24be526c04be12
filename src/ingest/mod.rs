pub mod github;
pub mod local;
pub mod log_format;

pub use github::{GitHubClient, PageConfig};
