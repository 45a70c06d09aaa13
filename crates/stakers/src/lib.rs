pub mod cli;
pub mod compose;
pub mod docker;
mod engine;
pub mod error;
pub mod params;
pub mod ports;
mod reader;
mod registry;
mod settings;
pub mod store;

pub use engine::SwitchOrchestrator;
pub use error::StakerError;
pub use reader::StateReader;
pub use registry::{version_gte, CompatibilityRegistry, CompatibleClient};
pub use settings::build_user_settings;

#[cfg(test)]
pub(crate) mod test_utils;
