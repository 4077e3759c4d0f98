//! Concrete source adapters and the startup registry that wires them up.

pub mod stub;
pub mod youtube;

pub use stub::StubAdapter;
pub use youtube::YouTubeAdapter;

use std::sync::Arc;
use tracing::{info, warn};

use prospector_common::{AppConfig, FileConfig, SourceKind};
use prospector_resolve::SourceRegistry;
use youtube_client::YouTubeClient;

/// One adapter per source kind. YouTube is live when an API key is present;
/// every other kind is registered as a capability stub.
pub fn build_registry(app: &AppConfig, file: &FileConfig) -> SourceRegistry {
    let mut registry = SourceRegistry::new();

    for kind in SourceKind::ALL {
        match kind {
            SourceKind::YouTube => match &app.youtube_api_key {
                Some(key) => {
                    let client = YouTubeClient::new(key.clone());
                    registry.register(Arc::new(YouTubeAdapter::new(client, &file.youtube)));
                }
                None => {
                    warn!("YOUTUBE_API_KEY not set, registering YouTube as a stub");
                    registry.register(Arc::new(StubAdapter::new(kind)));
                }
            },
            _ => registry.register(Arc::new(StubAdapter::new(kind))),
        }
    }

    info!(sources = ?registry, "Source registry built");
    registry
}
