#![forbid(unsafe_code)]

pub mod github;
pub mod local;
pub mod repository;

pub use github::{GithubConfig, GithubRepository};
pub use local::LocalRepository;
pub use repository::{
    InMemoryRepository, ProgressRepository, QuizSourceRepository, Storage, StorageError,
};
