pub mod auth;
pub mod pagination;

pub use auth::*;
pub use pagination::*;
