// Shared library untuk validation dan pagination primitives
pub mod models;
pub mod utils;

pub use models::pagination::{Page, PageRequest};
pub use utils::validation::ValidationError;
