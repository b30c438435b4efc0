//! Command implementations.

pub mod actor;
pub mod read;
pub mod validate;

pub use actor::run_actor;
pub use read::run_read;
pub use validate::run_validate;
