//! GitHub API operations using octocrab.

pub mod commits;

pub use commits::{fetch_commits, fetch_commits_with_client, CommitAuthor, CommitRecord};
