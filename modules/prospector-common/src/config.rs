use std::path::PathBuf;

/// Application configuration loaded from environment variables.
/// Contains only secrets and env-specific values; resolver and discovery
/// tuning live in the TOML FileConfig.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    // Sources
    pub youtube_api_key: Option<String>,

    // TOML tuning file
    pub config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let config = Self {
            youtube_api_key: non_empty_env("YOUTUBE_API_KEY"),
            config_path: non_empty_env("PROSPECTOR_CONFIG").map(PathBuf::from),
        };

        config.log_keys();
        config
    }

    fn log_keys(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let head: String = v.chars().take(5).collect();
                    format!("{}...({} chars)", head, v.chars().count())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  YOUTUBE_API_KEY: {}", preview_opt(&self.youtube_api_key));
        tracing::info!(
            "  PROSPECTOR_CONFIG: {}",
            self.config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<not set>".to_string())
        );
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
