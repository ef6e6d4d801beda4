//! Operator CLI

use clap::{Parser, Subcommand};
use kvshepherd::materializer::{quorum_threshold, ConfigMaterializer, MaterializeMode, MonitorSettings};
use kvshepherd::process::ShutdownClient;
use kvshepherd::topology::{ClusterNodeInfo, HttpNodeDirectory, TopologyReader};
use kvshepherd::ServiceVariant;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kvshepherd")]
#[command(about = "kvshepherd operator tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a working config from a template
    Render {
        /// Which service the config is for
        #[arg(long, value_enum)]
        variant: ServiceVariant,

        /// Template file
        #[arg(long)]
        template: PathBuf,

        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,

        /// Cluster node as name=address (repeatable, sentinel only)
        #[arg(long)]
        node: Vec<ClusterNodeInfo>,

        /// Master name for sentinel directives
        #[arg(long, default_value = "mymaster")]
        master_name: String,

        /// Store port for sentinel directives
        #[arg(long, default_value = "6379")]
        target_port: u16,
    },

    /// Send the shutdown command to a control port
    Shutdown {
        /// Control port
        #[arg(long)]
        port: u16,

        /// Host
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Timeout in milliseconds
        #[arg(long, default_value = "2000")]
        timeout_ms: u64,
    },

    /// List nodes from an HTTP node directory
    Nodes {
        /// Directory URL
        #[arg(long)]
        url: String,

        /// Page size
        #[arg(long, default_value = "100")]
        page_size: usize,
    },

    /// Print the quorum threshold for a node count
    Quorum {
        /// Number of nodes
        nodes: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            variant,
            template,
            out_dir,
            node,
            master_name,
            target_port,
        } => {
            let materializer = ConfigMaterializer::new(out_dir, variant.default_config_file());
            let settings = MonitorSettings {
                master_name,
                target_port,
            };
            let mode = if variant.needs_topology() {
                MaterializeMode::Sentinel {
                    settings: &settings,
                    nodes: &node,
                }
            } else {
                MaterializeMode::Plain
            };
            let path = materializer.materialize(&template, mode).await?;
            println!("{}", path.display());
        }

        Commands::Shutdown {
            port,
            host,
            timeout_ms,
        } => {
            let client = ShutdownClient::with_addr(
                SocketAddr::new(host, port),
                Duration::from_millis(timeout_ms),
            );
            let outcome = client.request_shutdown().await;
            println!("{}: {}", client.addr(), outcome);
        }

        Commands::Nodes { url, page_size } => {
            let directory = HttpNodeDirectory::new(url, page_size, Duration::from_secs(10))?;
            let nodes = TopologyReader::new(directory).discover_nodes().await?;
            for node in &nodes {
                println!("{} {}", node.name, node.address);
            }
            println!("quorum: {}", quorum_threshold(nodes.len()));
        }

        Commands::Quorum { nodes } => {
            println!("{}", quorum_threshold(nodes));
        }
    }

    Ok(())
}
