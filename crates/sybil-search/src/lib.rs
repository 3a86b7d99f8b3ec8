pub mod dupes;
pub mod google;

pub use dupes::DupeScanner;
pub use google::SearchClient;
