//! Code search across remote indexes and local repository clones

mod aggregator;
pub mod repo;

pub use aggregator::CodeSearch;
pub use repo::{resolve, Cloner, GitCloner, RepoCache, RepoReference};
