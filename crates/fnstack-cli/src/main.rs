//! fnstack Gateway - HTTP file service over an object-store bucket

use clap::Parser;
use fnstack_cli::{run_server_with_shutdown, GatewayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "fnstack-gateway")]
#[command(about = "HTTP file service over an object-store bucket")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "FNSTACK_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "FNSTACK_PORT")]
    port: u16,

    /// Bucket the file routes operate on
    #[arg(short, long, default_value = "my-bucket-8701", env = "FNSTACK_BUCKET")]
    bucket: String,

    /// S3-compatible object store URL (in-memory storage when omitted)
    #[arg(long, env = "FNSTACK_STORE_URL")]
    store_url: Option<String>,

    /// Object store request timeout in seconds
    #[arg(long, default_value = "30", env = "FNSTACK_STORE_TIMEOUT")]
    store_timeout: u64,

    /// Create the bucket before accepting requests
    #[arg(long, env = "FNSTACK_ENSURE_BUCKET")]
    ensure_bucket: bool,

    /// Disable CORS headers
    #[arg(long, env = "FNSTACK_NO_CORS")]
    no_cors: bool,

    /// Enable debug logging
    #[arg(short, long, env = "FNSTACK_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "fnstack_cli={log_level},fnstack_core={log_level},\
                     fnstack_store={log_level},tower_http=debug"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting file service on {}:{}", args.host, args.port);
    tracing::info!("Bucket: {}", args.bucket);

    match &args.store_url {
        Some(url) => tracing::info!("Object store: {}", url),
        None => tracing::warn!("No --store-url given - data will NOT persist!"),
    }

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        bucket_name: args.bucket,
        store_url: args.store_url,
        store_timeout_secs: args.store_timeout,
        ensure_bucket_on_start: args.ensure_bucket,
        cors_enabled: !args.no_cors,
        ..Default::default()
    };

    run_server_with_shutdown(config, async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await
}
