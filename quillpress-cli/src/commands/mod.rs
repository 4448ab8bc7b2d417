//! CLI command implementations.

mod build;
mod dev;

pub use build::build_site;
pub use dev::dev_server;
