pub mod filter;
pub mod points;
pub mod qdrant;

mod error;

pub use error::Error;
pub use qdrant::{NearestQuery, QdrantStore};

pub type Result<T, E = Error> = std::result::Result<T, E>;
