#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use translator_desk_core::config::{
    AppConfig, Credentials, DetectMode, Env, StdEnv, DEFAULT_BIND_ADDR, DEFAULT_DETECT_DELAY_MS,
    DEFAULT_ENV_FILE, DEFAULT_HTTP_TIMEOUT_SECS,
};
use translator_desk_core::provider::AzureTranslator;
use translator_desk_core::service::TranslatorService;
use translator_desk_core::web::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "translator-desk")]
#[command(about = "Web front-end for Azure AI Translator")]
struct Args {
    /// File of KEY=VALUE lines loaded into the environment before reading credentials.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Overrides AZURE_AI_TRANSLATION_KEY.
    #[arg(long)]
    key: Option<String>,

    /// Overrides AZURE_AI_TRANSLATION_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,

    /// Overrides AZURE_AI_TRANSLATION_REGION.
    #[arg(long)]
    region: Option<String>,

    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    bind: SocketAddr,

    /// Quiet period before a keystroke-driven detection call.
    #[arg(long, default_value_t = DEFAULT_DETECT_DELAY_MS)]
    detect_delay_ms: u64,

    /// Require an explicit source language instead of offering "Detect".
    #[arg(long)]
    manual_source: bool,

    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    http_timeout_secs: u64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;
    load_env_file(&args.env_file)?;

    let bind = args.bind;
    let env = StdEnv;
    let cfg = build_config(args, &env)
        .inspect_err(|e| tracing::error!(error = %e, "invalid configuration"))?;

    tracing::info!(
        endpoint = %cfg.credentials.endpoint.as_str(),
        region = %cfg.credentials.region.as_str(),
        mode = ?cfg.detect_mode,
        "config loaded"
    );

    run_server(cfg, bind).await
}

async fn run_server(cfg: AppConfig, bind: SocketAddr) -> anyhow::Result<()> {
    let provider = AzureTranslator::new(cfg.credentials.clone(), cfg.http_timeout)
        .context("failed to create HTTP client")?;
    let service = TranslatorService::new(Arc::new(provider), cfg.detect_mode);

    // Catalog is fetched once, before the first page is served.
    let load = service.fetch_languages().await;
    for notice in &load.notices {
        tracing::warn!(notice = %notice.message, "catalog unavailable");
    }

    let state = Arc::new(AppState::new(service, cfg.detect_delay));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    web::serve(listener, state, shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Existing environment variables win over the file; a missing file is fine.
fn load_env_file(path: &Path) -> anyhow::Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "env file loaded");
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no env file");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn build_config(args: Args, env: &impl Env) -> anyhow::Result<AppConfig> {
    let credentials = Credentials::resolve(args.key, args.endpoint, args.region, env)?;

    let mut cfg = AppConfig::new(credentials).with_http_timeout_secs(args.http_timeout_secs)?;
    cfg.detect_mode = if args.manual_source {
        DetectMode::Manual
    } else {
        DetectMode::Auto
    };
    cfg.detect_delay = Duration::from_millis(args.detect_delay_ms);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use translator_desk_core::config::{
        MapEnv, ENV_TRANSLATOR_ENDPOINT, ENV_TRANSLATOR_KEY, ENV_TRANSLATOR_REGION,
    };

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["translator-desk"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("valid args")
    }

    fn env() -> MapEnv {
        MapEnv::default()
            .with_var(ENV_TRANSLATOR_KEY, "k")
            .with_var(ENV_TRANSLATOR_ENDPOINT, "https://x/")
            .with_var(ENV_TRANSLATOR_REGION, "eastus")
    }

    #[test]
    fn defaults_select_auto_detect() {
        let cfg = build_config(args(&[]), &env()).expect("config");
        assert_eq!(cfg.detect_mode, DetectMode::Auto);
        assert_eq!(cfg.detect_delay, Duration::from_millis(500));
        assert_eq!(cfg.credentials.endpoint.as_str(), "https://x");
    }

    #[test]
    fn manual_source_flag_selects_manual_mode() {
        let cfg = build_config(args(&["--manual-source", "--detect-delay-ms", "250"]), &env())
            .expect("config");
        assert_eq!(cfg.detect_mode, DetectMode::Manual);
        assert_eq!(cfg.detect_delay, Duration::from_millis(250));
    }

    #[test]
    fn missing_credentials_fail() {
        let err = build_config(args(&[]), &MapEnv::default()).expect_err("missing");
        assert!(err.to_string().contains("credentials are missing"));
    }

    #[test]
    fn zero_timeout_rejected() {
        assert!(build_config(args(&["--http-timeout-secs", "0"]), &env()).is_err());
    }
}
