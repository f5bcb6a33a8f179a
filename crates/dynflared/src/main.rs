// # dynflared - Dynamic DNS daemon for Cloudflare
//
// Thin integration layer: parses flags, sets up logging and the runtime,
// wires the DNS resolver, cache file and Cloudflare provider into an
// update cycle, and hands it to the scheduler. All update logic lives in
// dynflare-core.
//
// ## Configuration
//
// Every flag falls back to an environment variable:
//
// - `--target` / `DYNFLARE_TARGET`: Name that resolves to the caller's address
//   (default `myip.opendns.com`)
// - `--server` / `DYNFLARE_SERVER`: Resolver to ask (default `resolver1.opendns.com`)
// - `--path` / `DYNFLARE_CACHE_PATH`: Cache file
//   (default `/tmp/.dynamic-dns-cloudflare.cache`)
// - `--domain` / `DYNFLARE_DOMAIN`: Record to update (required)
// - `--zone` / `DYNFLARE_ZONE`: Zone holding the record (required)
// - `--interval` / `DYNFLARE_INTERVAL`: Poll interval such as `12h`; unset
//   runs once
// - `--log-level` / `DYNFLARE_LOG_LEVEL`: trace, debug, info, warn, error
// - `--dry-run` / `DYNFLARE_DRY_RUN`: Log record updates instead of sending them
//
// Credentials are read from the environment only:
//
// - `CF_API_KEY`: Cloudflare global API key
// - `CF_API_EMAIL`: Account email
//
// ## Example
//
// ```bash
// export CF_API_KEY=...
// export CF_API_EMAIL=ops@example.com
//
// dynflared --domain home.example.com --zone example.com --interval 12h
// ```

use anyhow::Result;
use clap::Parser;
use dynflare_core::config::{DEFAULT_CACHE_PATH, DEFAULT_SERVER, DEFAULT_TARGET, parse_interval};
use dynflare_core::{FileCacheStore, Scheduler, TargetConfig, Termination, UpdateCycle};
use dynflare_ip_dns::DnsIpResolver;
use dynflare_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Shutdown signal, or a successful one-shot run
/// - 1: Configuration error, or a failed one-shot run
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DynflareExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown,
    /// The single cycle of a one-shot run failed
    CycleFailed,
    /// Configuration error or startup failure
    ConfigError,
    /// Runtime error (unexpected failure)
    RuntimeError,
}

impl From<DynflareExitCode> for ExitCode {
    fn from(code: DynflareExitCode) -> Self {
        let code = match code {
            DynflareExitCode::CleanShutdown => 0,
            DynflareExitCode::CycleFailed | DynflareExitCode::ConfigError => 1,
            DynflareExitCode::RuntimeError => 2,
        };
        ExitCode::from(code)
    }
}

impl From<&Termination> for DynflareExitCode {
    fn from(termination: &Termination) -> Self {
        match termination.exit_code() {
            0 => DynflareExitCode::CleanShutdown,
            _ => DynflareExitCode::CycleFailed,
        }
    }
}

/// Command line flags
#[derive(Debug, Parser)]
#[command(name = "dynflared", version, about = "Keep a Cloudflare A record pointed at this host")]
struct Cli {
    /// Name that resolves to the caller's public address
    #[arg(long, env = "DYNFLARE_TARGET", default_value = DEFAULT_TARGET)]
    target: String,

    /// DNS server to ask for the target
    #[arg(long, env = "DYNFLARE_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// File holding the last applied address
    #[arg(long, env = "DYNFLARE_CACHE_PATH", default_value = DEFAULT_CACHE_PATH)]
    path: String,

    /// Record to update, e.g. home.example.com
    #[arg(long, env = "DYNFLARE_DOMAIN", default_value = "")]
    domain: String,

    /// Zone that holds the record, e.g. example.com
    #[arg(long, env = "DYNFLARE_ZONE", default_value = "")]
    zone: String,

    /// Poll interval such as 30m or 12h; unset runs a single cycle
    #[arg(long, env = "DYNFLARE_INTERVAL", default_value = "")]
    interval: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "DYNFLARE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log record updates instead of sending them
    #[arg(long, env = "DYNFLARE_DRY_RUN")]
    dry_run: bool,
}

/// Application configuration
struct Config {
    target: TargetConfig,
    api_key: String,
    email: String,
    log_level: Level,
    dry_run: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("target", &self.target)
            .field("api_key", &"***REDACTED***")
            .field("email", &self.email)
            .field("log_level", &self.log_level)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Config {
    /// Build the configuration from parsed flags and an environment lookup
    ///
    /// Flags are validated before credentials are looked at.
    fn load<F>(cli: Cli, env_var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = parse_log_level(&cli.log_level)?;
        let interval = parse_interval(&cli.interval)?;

        let target = TargetConfig::new(cli.domain, cli.zone)
            .with_lookup_host(cli.target)
            .with_resolver(cli.server)
            .with_cache_path(cli.path)
            .with_interval(interval);
        target.validate()?;

        let api_key = env_var("CF_API_KEY").unwrap_or_default();
        let email = env_var("CF_API_EMAIL").unwrap_or_default();
        if api_key.is_empty() || email.is_empty() {
            anyhow::bail!(
                "CF_API_KEY and CF_API_EMAIL are required. \
                Set them via: export CF_API_KEY=... CF_API_EMAIL=..."
            );
        }

        Ok(Self {
            target,
            api_key,
            email,
            log_level,
            dry_run: cli.dry_run,
        })
    }
}

fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "log level '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}

fn main() -> ExitCode {
    let (rt, shutdown) = match runtime_with_signals() {
        Ok(started) => started,
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            return DynflareExitCode::RuntimeError.into();
        }
    };

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                DynflareExitCode::ConfigError.into()
            } else {
                DynflareExitCode::CleanShutdown.into()
            };
        }
    };

    let config = match Config::load(cli, |key| env::var(key).ok()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DynflareExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DynflareExitCode::ConfigError.into();
    }

    info!("Starting dynflared");
    info!(
        "Managing {} in zone {} ({})",
        config.target.domain,
        config.target.zone,
        match config.target.interval {
            Some(interval) => format!("every {:?}", interval),
            None => "single run".to_string(),
        }
    );

    let provider = CloudflareProvider::new(&config.api_key, &config.email, config.dry_run);
    let provider = match provider {
        Ok(provider) => provider,
        Err(e) => {
            error!("{}", e);
            return DynflareExitCode::ConfigError.into();
        }
    };
    if provider.is_dry_run() {
        info!("Dry-run mode: record updates are logged, not sent");
    }

    let cycle = UpdateCycle::new(
        Arc::new(config.target.clone()),
        Box::new(DnsIpResolver::new()),
        Box::new(FileCacheStore::new(&config.target.cache_path)),
        Box::new(provider),
    );
    let scheduler = Scheduler::new(cycle);

    let code = rt.block_on(run_daemon(scheduler, shutdown));

    // Do not wait on an abandoned in-flight request
    rt.shutdown_background();
    code.into()
}

/// Build the runtime and register the shutdown signals on it
///
/// Runs before anything else so that a signal arriving during startup is
/// held until the scheduler starts, instead of killing the process.
fn runtime_with_signals() -> Result<(tokio::runtime::Runtime, ShutdownSignals)> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;

    let shutdown = {
        let _guard = rt.enter();
        ShutdownSignals::install()?
    };

    Ok((rt, shutdown))
}

/// Run the scheduler until it completes or a shutdown signal arrives
async fn run_daemon(scheduler: Scheduler, shutdown: ShutdownSignals) -> DynflareExitCode {
    let termination = scheduler.run_until(shutdown.recv()).await;
    match &termination {
        Termination::Signalled(_) => info!("Shutting down dynflared"),
        Termination::Completed(Ok(_)) => info!("Single run complete"),
        Termination::Completed(Err(e)) => error!("Single run failed: {}", e),
    }

    DynflareExitCode::from(&termination)
}

/// Handlers for SIGTERM and SIGINT, registered before the first cycle
#[cfg(unix)]
struct ShutdownSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;
        Ok(Self { sigterm, sigint })
    }

    /// Resolve with the name of the first signal received
    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// Fallback for non-Unix platforms (CTRL-C only)
#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        "SIGINT"
    }
}
