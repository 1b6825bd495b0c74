pub mod entities;
pub mod errors;
pub mod extraction;
pub mod layout;
pub mod ports;

pub use entities::*;
pub use errors::{DomainError, Result};
pub use extraction::extract;
pub use layout::{compose, PageLayout};
