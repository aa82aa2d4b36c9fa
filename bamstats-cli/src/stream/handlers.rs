use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};
use serde_json::{Value, json};

use bamstats_broker::{BackendConfig, HttpBackend, StatsBroker};
use bamstats_sampling::RegionSampler;

/// Execute the `stream` subcommand
/// # Arguments
/// - matches: matched items from CLAP args
pub fn run_stream(matches: &ArgMatches) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    runtime.block_on(stream_statistics(matches))
}

async fn stream_statistics(matches: &ArgMatches) -> Result<()> {
    let url = matches
        .get_one::<String>("url")
        .context("An alignment file URL is required.")?;
    let rounds = matches.get_one::<u32>("sample-more").copied().unwrap_or(0);

    let config = load_config(
        matches.get_one::<String>("config").map(Path::new),
        matches.get_one::<String>("backend").cloned(),
    )?;
    info!("using backend at {}", config.base_url);

    let sampler = match matches.get_one::<u64>("seed") {
        Some(seed) => RegionSampler::with_seed(*seed),
        None => RegionSampler::new(),
    };
    let mut broker = StatsBroker::with_sampler(HttpBackend::new(&config)?, sampler);

    let _printer = broker.hub().subscribe_all(|event, value| {
        let line = event_line(event, value);
        let mut stdout = io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{}", line) {
            warn!("failed to print event {}: {}", event, err);
        }
    });

    broker.set_url(url.clone());
    if let Some(index_url) = matches.get_one::<String>("index-url") {
        broker.set_index_url(index_url.clone());
    }
    if let Some(intervals_url) = matches.get_one::<String>("intervals-url") {
        broker.set_intervals_url(Some(intervals_url.clone()));
    }

    broker.tick().await?;
    broker.join_stream().await;

    for round in 1..=rounds {
        info!("sampling more ({} of {})", round, rounds);
        broker.sample_more();
        broker.tick().await?;
        broker.join_stream().await;
    }

    Ok(())
}

///
/// Backend settings from an optional TOML file, with `backend` overriding its base URL.
///
pub fn load_config(path: Option<&Path>, backend: Option<String>) -> Result<BackendConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str::<BackendConfig>(&text)
                .with_context(|| format!("Invalid config file: {:?}", path))?
        }
        None => BackendConfig::default(),
    };

    if let Some(backend) = backend {
        config.base_url = backend;
    }

    Ok(config)
}

fn event_line(event: &str, value: &Value) -> Value {
    json!({ "event": event, "value": value })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_config_file_and_override() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("bamstats.toml");
        std::fs::write(
            &path,
            "base_url = \"https://stats.example.org\"\nconnect_timeout_secs = 5\n",
        )
        .unwrap();

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.base_url, "https://stats.example.org");
        assert_eq!(config.connect_timeout_secs, 5);

        let config = load_config(Some(&path), Some("http://127.0.0.1:9000".to_string())).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.connect_timeout_secs, 5);
    }

    #[rstest]
    fn test_invalid_config_is_reported() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("bamstats.toml");
        std::fs::write(&path, "connect_timeout_secs = \"soon\"\n").unwrap();

        assert!(load_config(Some(&path), None).is_err());
    }

    #[rstest]
    fn test_event_line() {
        assert_eq!(
            event_line("total_reads", &json!(12)).to_string(),
            r#"{"event":"total_reads","value":12}"#
        );
    }
}
