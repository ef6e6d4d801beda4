//! Store service binary

use clap::Parser;
use kvshepherd::service::{run_service, ServiceArgs};
use kvshepherd::{ServiceVariant, SupervisorConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "kvshepherd-store")]
#[command(about = "Supervise the key-value store process")]
#[command(version)]
struct Args {
    #[command(flatten)]
    service: ServiceArgs,

    /// Bind address for the reverse-proxy listener
    #[arg(long)]
    http_bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = SupervisorConfig::load(ServiceVariant::Store, args.service.config.as_deref())?;
    args.service.apply(&mut config);
    if let Some(addr) = args.http_bind {
        config.http_bind = Some(addr);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kvshepherd store service ({})", kvshepherd::BUILD_INFO);
    tracing::info!("  Code path: {}", config.code_path.display());
    tracing::info!("  Work dir: {}", config.work_dir().display());
    tracing::info!("  Control port: {}", config.control_port);

    run_service(config).await?;
    Ok(())
}
