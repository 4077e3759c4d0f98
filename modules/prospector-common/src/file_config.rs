use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// TOML-backed tuning loaded from disk. Every section and field is optional;
/// omitted values fall back to the defaults below.
/// Secrets (API keys) stay as env vars.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileConfig {
    pub resolver: ResolverConfig,
    pub discovery: DiscoveryConfig,
    pub youtube: YouTubeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ResolverConfig {
    /// Minimum name similarity ratio for a fuzzy-name merge.
    pub name_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            name_threshold: 0.85,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DiscoveryConfig {
    pub max_results_per_source: usize,
    /// How many sources are queried at once during discovery.
    pub max_concurrent_sources: usize,
    /// Per-entity bound on in-flight enrichment fetches.
    pub max_concurrent_fetches: usize,
    /// Content items requested per enriched record.
    pub max_content_items: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_results_per_source: 50,
            max_concurrent_sources: 4,
            max_concurrent_fetches: 5,
            max_content_items: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct YouTubeConfig {
    /// Used when a discovery run supplies no YouTube-specific terms.
    pub default_queries: Vec<String>,
    pub relevance_language: String,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            default_queries: [
                "fitness coach",
                "personal trainer",
                "yoga instructor",
                "wellness coach",
                "nutrition coach",
                "strength training coach",
                "pilates instructor",
                "CrossFit coach",
                "online fitness coaching",
                "health coach",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            relevance_language: "en".to_string(),
        }
    }
}

impl FileConfig {
    /// Reject values the resolver cannot work with.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.resolver.name_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            bail!("resolver.name_threshold must be within [0, 1], got {threshold}");
        }
        if self.discovery.max_concurrent_sources == 0 {
            bail!("discovery.max_concurrent_sources must be at least 1");
        }
        if self.discovery.max_concurrent_fetches == 0 {
            bail!("discovery.max_concurrent_fetches must be at least 1");
        }
        Ok(())
    }
}

/// Parse and validate a TOML config string.
pub fn parse_config(content: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(content).context("Failed to parse config TOML")?;
    config.validate()?;
    Ok(config)
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.resolver.name_threshold, 0.85);
        assert_eq!(config.discovery.max_results_per_source, 50);
        assert_eq!(config.discovery.max_concurrent_fetches, 5);
        assert_eq!(config.youtube.relevance_language, "en");
        assert!(!config.youtube.default_queries.is_empty());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = parse_config(
            r#"
            [resolver]
            name_threshold = 0.9

            [discovery]
            max_concurrent_fetches = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.resolver.name_threshold, 0.9);
        assert_eq!(config.discovery.max_concurrent_fetches, 2);
        assert_eq!(config.discovery.max_results_per_source, 50);
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let err = parse_config("[resolver]\nname_threshold = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("name_threshold"));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(parse_config("[resolver]\nthreshold = 0.9\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[discovery]\nmax_results_per_source = 10").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.discovery.max_results_per_source, 10);
    }
}
