//! Application layer - Use cases that coordinate domain services.
//!
//! This layer contains the application-specific business rules and orchestrates
//! the flow of data between the CLI layer and the package manager, plugin and
//! runtime seams.

mod fix;

pub use fix::{FixPackagesOptions, FixPackagesUseCase};
