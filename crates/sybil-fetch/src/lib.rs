pub mod archive;
pub mod reddit;

pub use archive::ArchiveClient;
pub use reddit::RedditClient;
