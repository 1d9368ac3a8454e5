//! Kafka health CLI - prints cluster health metric lines for a metrics collector.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use kafka_health::admin::rest::{RestAdmin, RestAdminConfig};
use kafka_health::config::{parse_bool, parse_timeout};
use kafka_health::{AdminClient, HealthCheckConfig, HealthReportAssembler};

/// Kafka health - assess broker reachability, config drift and version compatibility.
#[derive(Parser)]
#[command(name = "kafka-health")]
#[command(about = "Assess Kafka cluster health and print metric lines")]
#[command(version)]
struct Cli {
    /// Kafka REST Proxy base URL (or set `KAFKA_ADDRESSES` env var).
    #[arg(long, env = "KAFKA_ADDRESSES", default_value = "")]
    addresses: String,

    /// Cluster id to query; the first cluster reported is used when empty.
    #[arg(long, env = "KAFKA_CLUSTER_ID")]
    cluster_id: Option<String>,

    /// Basic auth user.
    #[arg(long, env = "KAFKA_USER")]
    user: Option<String>,

    /// Basic auth password.
    #[arg(long, env = "KAFKA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// PEM CA bundle for an HTTPS REST Proxy.
    #[arg(long, env = "KAFKA_CA_CERT")]
    ca_cert: Option<PathBuf>,

    /// Number of brokers the cluster is expected to run.
    #[arg(long, env = "KAFKA_TOTAL_BROKERS_COUNT")]
    total_brokers: usize,

    /// Whether the cluster is declared to run in KRaft mode.
    #[arg(
        long,
        env = "KRAFT_ENABLED",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = parse_bool
    )]
    kraft_enabled: bool,

    /// Lowest supported Kafka version (`x` matches any component).
    #[arg(long, env = "MIN_VERSION", default_value = "0.0.0")]
    min_version: String,

    /// Highest supported Kafka version (`x` matches any component).
    #[arg(long, env = "MAX_VERSION", default_value = "x.x.x")]
    max_version: String,

    /// Per-broker query timeout, e.g. `60s`.
    #[arg(
        long,
        env = "KAFKA_EXEC_PLUGIN_TIMEOUT",
        default_value = "60s",
        value_parser = parse_timeout
    )]
    timeout: Duration,

    /// Config keys allowed to differ between brokers (comma-separated).
    #[arg(long, env = "ALLOWED_DIFFERENT_CONFIGS", value_delimiter = ',')]
    allowed_different_configs: Vec<String>,

    /// Per-broker config keys stripped before comparison (comma-separated).
    #[arg(long, env = "BROKER_LOCAL_CONFIGS", value_delimiter = ',')]
    broker_local_configs: Vec<String>,

    /// Namespace reported on the compatibility line.
    #[arg(long, env = "OS_PROJECT", default_value = "")]
    namespace: String,

    /// Output format (text metric lines or json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,

    /// Enable debug logging (also enabled by `KAFKA_MONITORING_SCRIPT_DEBUG`).
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, env = "KAFKA_MONITORING_SCRIPT_DEBUG", hide = true)]
    debug_env: Option<String>,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    info!("Start health pass");
    let start = Instant::now();

    let mut config = HealthCheckConfig::new(cli.total_brokers)
        .with_kraft_enabled(cli.kraft_enabled)
        .with_fetch_timeout(cli.timeout)
        .with_namespace(cli.namespace.clone())
        .with_version_range(&cli.min_version, &cli.max_version)
        .context("Invalid supported version range")?;
    if !cli.allowed_different_configs.is_empty() {
        config = config
            .with_allowed_different_configs(cli.allowed_different_configs.iter().map(|k| k.trim()));
    }
    if !cli.broker_local_configs.is_empty() {
        config =
            config.with_broker_local_configs(cli.broker_local_configs.iter().map(|k| k.trim()));
    }

    let admin = build_admin(&cli)?;
    let report = HealthReportAssembler::new(&config)
        .assemble(admin.as_ref().map(|a| a as &dyn AdminClient))
        .await;

    let message = match cli.format {
        OutputFormat::Text => report.render(),
        OutputFormat::Json => serde_json::to_string_pretty(&report.to_json())
            .context("Failed to serialize report")?,
    };
    debug!("Message to send:\n{message}");
    println!("{message}");

    info!(elapsed_ms = start.elapsed().as_millis(), "End health pass");
    Ok(())
}

/// Logs go to stderr; stdout carries only the metric lines.
fn init_tracing(cli: &Cli) {
    let debug_env = cli.debug_env.as_deref().is_some_and(|v| !v.is_empty());
    let level = if cli.verbose || debug_env { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// `None` when no admin endpoint is configured.
fn build_admin(cli: &Cli) -> Result<Option<RestAdmin>> {
    let addresses = cli.addresses.trim();
    if addresses.is_empty() {
        warn!("KAFKA_ADDRESSES is empty, no admin connection available");
        return Ok(None);
    }

    let mut rest = RestAdminConfig::new(addresses).with_timeout(cli.timeout);
    if let Some(id) = &cli.cluster_id {
        rest = rest.with_cluster_id(id);
    }
    if let (Some(user), Some(password)) = (&cli.user, &cli.password) {
        rest = rest.with_credentials(user, password);
    }
    if let Some(path) = &cli.ca_cert {
        rest = rest.with_ca_cert(path);
    }

    let admin = RestAdmin::new(rest).context("Failed to create Kafka admin client")?;
    Ok(Some(admin))
}
