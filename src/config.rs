use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration for the install-page server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Host the service is canonically reachable as. Page requests for any
    /// other host get a 301 to this one; bookmarklets are built against it.
    /// Unset disables the redirect and falls back to the request host.
    pub canonical_host: Option<String>,
    pub page_root: PathBuf,
    pub asset_root: PathBuf,
    pub enable_cors: bool,
}

/// Command-line overrides. Anything not given here falls back to the
/// environment, then the config file, then built-in defaults.
#[derive(Debug, Parser)]
#[command(name = "tinderizer-web", version, about = "Tinderizer install-page runtime")]
pub struct Cli {
    /// TOML config file (also via TINDERIZER_CONFIG).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Socket address to listen on.
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Canonical host to redirect page requests to.
    #[arg(long)]
    pub canonical_host: Option<String>,
    /// Directory holding the install-page HTML files.
    #[arg(long)]
    pub page_root: Option<PathBuf>,
    /// Directory checked for on-disk overrides of generated assets.
    #[arg(long)]
    pub asset_root: Option<PathBuf>,
    /// Allow cross-origin requests to the JSON endpoints.
    #[arg(long)]
    pub enable_cors: bool,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_addr: Option<String>,
    canonical_host: Option<String>,
    page_root: Option<PathBuf>,
    asset_root: Option<PathBuf>,
    enable_cors: Option<bool>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::resolve(Cli::parse())
    }

    pub fn resolve(cli: Cli) -> anyhow::Result<Self> {
        let config_path = cli
            .config
            .clone()
            .or_else(|| std::env::var("TINDERIZER_CONFIG").ok().map(PathBuf::from));
        let file: FileConfig = match &config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => FileConfig::default(),
        };

        let bind_addr: SocketAddr = match cli.bind {
            Some(addr) => addr,
            None => std::env::var("BIND_ADDR")
                .ok()
                .or(file.bind_addr)
                .unwrap_or_else(|| "0.0.0.0:8080".to_string())
                .parse()
                .context("failed to parse BIND_ADDR")?,
        };

        let canonical_host = normalize_host(
            cli.canonical_host
                .or_else(|| std::env::var("CANONICAL_HOST").ok())
                .or(file.canonical_host),
        );
        if let Some(host) = &canonical_host {
            url::Url::parse(&format!("http://{host}/"))
                .with_context(|| format!("invalid canonical host {host:?}"))?;
        }

        let page_root = cli
            .page_root
            .or_else(|| std::env::var("PAGE_ROOT").ok().map(PathBuf::from))
            .or(file.page_root)
            .unwrap_or_else(|| PathBuf::from("pages"));

        let asset_root = cli
            .asset_root
            .or_else(|| std::env::var("ASSET_ROOT").ok().map(PathBuf::from))
            .or(file.asset_root)
            .unwrap_or_else(|| PathBuf::from("assets"));

        let enable_cors = cli.enable_cors
            || std::env::var("ENABLE_CORS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .ok()
                .or(file.enable_cors)
                .unwrap_or(false);

        Ok(Self {
            bind_addr,
            canonical_host,
            page_root,
            asset_root,
            enable_cors,
        })
    }

    /// Host to build bookmarklets against: the canonical host when
    /// configured, otherwise whatever host the request came in on, falling
    /// back to the historic development default.
    pub fn host_for_request(&self, request_host: Option<&str>) -> String {
        self.canonical_host
            .clone()
            .or_else(|| request_host.map(|h| h.to_string()))
            .unwrap_or_else(|| format!("tinderizer.dev:{}", self.bind_addr.port()))
    }
}

fn normalize_host(host: Option<String>) -> Option<String> {
    host.filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_canonical(canonical: Option<&str>) -> AppConfig {
        AppConfig {
            bind_addr: "0.0.0.0:8080".parse().expect("addr"),
            canonical_host: canonical.map(|h| h.to_string()),
            page_root: PathBuf::from("pages"),
            asset_root: PathBuf::from("assets"),
            enable_cors: false,
        }
    }

    #[test]
    fn canonical_host_wins_over_request_host() {
        let cfg = config_with_canonical(Some("tinderizer.com"));
        assert_eq!(
            cfg.host_for_request(Some("other.example")),
            "tinderizer.com"
        );
    }

    #[test]
    fn request_host_used_when_no_canonical() {
        let cfg = config_with_canonical(None);
        assert_eq!(
            cfg.host_for_request(Some("other.example")),
            "other.example"
        );
        assert_eq!(cfg.host_for_request(None), "tinderizer.dev:8080");
    }

    #[test]
    fn empty_canonical_host_counts_as_unset() {
        assert_eq!(normalize_host(Some(String::new())), None);
        assert_eq!(
            normalize_host(Some("tinderizer.com".into())),
            Some("tinderizer.com".to_string())
        );
    }

    #[test]
    fn file_config_parses_partial_toml() {
        let file: FileConfig = toml::from_str(
            r#"
            canonical_host = "tinderizer.com"
            enable_cors = true
            "#,
        )
        .expect("toml");
        assert_eq!(file.canonical_host.as_deref(), Some("tinderizer.com"));
        assert_eq!(file.enable_cors, Some(true));
        assert!(file.bind_addr.is_none());
    }
}
