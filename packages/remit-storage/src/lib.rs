pub mod compose;
pub mod criteria;
pub mod db;
pub mod models;
pub mod plan;
pub mod projector;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
