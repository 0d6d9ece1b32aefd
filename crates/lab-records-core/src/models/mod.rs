//! Domain models for the lab records system.

mod catalog;
mod patient;
mod seed;
mod settings;
mod visit;

pub use catalog::*;
pub use patient::*;
pub use seed::*;
pub use settings::*;
pub use visit::*;
