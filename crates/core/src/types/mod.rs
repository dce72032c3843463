//! Domain types for presentation control

mod advertisement;
mod command;
mod version;

pub use advertisement::Advertisement;
pub use command::Command;
pub use version::VersionRange;
