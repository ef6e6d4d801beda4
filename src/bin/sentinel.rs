//! Sentinel service binary

use clap::Parser;
use kvshepherd::common::DirectorySource;
use kvshepherd::service::{run_service, ServiceArgs};
use kvshepherd::topology::ClusterNodeInfo;
use kvshepherd::{ServiceVariant, SupervisorConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "kvshepherd-sentinel")]
#[command(about = "Supervise the sentinel process for the key-value store")]
#[command(version)]
struct Args {
    #[command(flatten)]
    service: ServiceArgs,

    /// Master name used in the generated monitor directive
    #[arg(long)]
    master_name: Option<String>,

    /// Port of the store the sentinel monitors
    #[arg(long)]
    target_port: Option<u16>,

    /// Paged HTTP node directory
    #[arg(long, conflicts_with = "node")]
    directory_url: Option<String>,

    /// Page size for directory queries
    #[arg(long, default_value = "100")]
    page_size: usize,

    /// Static cluster node as name=address (repeatable)
    #[arg(long)]
    node: Vec<ClusterNodeInfo>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config =
        SupervisorConfig::load(ServiceVariant::Sentinel, args.service.config.as_deref())?;
    args.service.apply(&mut config);
    if let Some(name) = args.master_name {
        config.master_name = name;
    }
    if let Some(port) = args.target_port {
        config.target_port = port;
    }
    if let Some(url) = args.directory_url {
        config.directory = Some(DirectorySource::Http {
            url,
            page_size: args.page_size,
        });
    } else if !args.node.is_empty() {
        config.directory = Some(DirectorySource::Static {
            nodes: args.node,
            page_size: None,
        });
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kvshepherd sentinel service ({})", kvshepherd::BUILD_INFO);
    tracing::info!("  Code path: {}", config.code_path.display());
    tracing::info!("  Work dir: {}", config.work_dir().display());
    tracing::info!("  Control port: {}", config.control_port);
    tracing::info!("  Monitoring: {} on port {}", config.master_name, config.target_port);

    run_service(config).await?;
    Ok(())
}
