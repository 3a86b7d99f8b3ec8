mod forest;

pub use forest::{ClassifierScorer, Forest};
