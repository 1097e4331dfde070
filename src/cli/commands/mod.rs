//! CLI command implementations

pub mod config;
pub mod forget;
pub mod status;

pub use config::execute as config;
pub use forget::execute as forget;
pub use status::execute as status;
