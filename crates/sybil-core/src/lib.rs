mod error;
mod types;

pub use error::{SybilError, SybilResult};
pub use types::*;
