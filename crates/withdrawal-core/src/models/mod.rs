//! Domain models for the withdrawal tracker.

mod animal;
mod catalog;
mod summary;
mod usage;

pub use animal::*;
pub use catalog::*;
pub use summary::*;
pub use usage::*;
