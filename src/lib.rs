pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{invoke_json, require_credentials_for, ToolDescriptor, TravelTools};
pub use config::TomlConfig;
pub use core::{CoercionRules, SearchTool, TieredNormalizer};
pub use utils::error::{Result, ToolError};
