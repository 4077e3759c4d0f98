//! Shared vocabulary for the prospector workspace: the normalized profile
//! model, the source adapter contract, default extraction behaviors, and
//! configuration.

pub mod adapter;
pub mod config;
pub mod error;
pub mod extract;
pub mod file_config;
pub mod types;

pub use adapter::SourceAdapter;
pub use config::AppConfig;
pub use error::{Capability, SourceError, SourceResult, UnknownSourceKind};
pub use file_config::{DiscoveryConfig, FileConfig, ResolverConfig, YouTubeConfig};
pub use types::*;
