use clap::{Parser, Subcommand};

use pod_monitor::client::MonitorClient;
use pod_monitor::health::{HeartbeatOutcome, PodIdentity, RemoveOutcome};

#[derive(Parser)]
#[command(name = "monitor-cli")]
#[command(about = "Management CLI for the pod health monitor", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked pods and their health
    List,
    /// Send a heartbeat for a pod
    Report {
        pod: String,
        namespace: String,
        /// Report the pod as unhealthy
        #[arg(long)]
        unhealthy: bool,
    },
    /// Remove a pod's record
    Remove { pod: String, namespace: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = MonitorClient::new(&cli.url)?;

    match cli.command {
        Commands::List => {
            let pods = client.list().await?;
            println!("{}", serde_json::to_string_pretty(&pods)?);
        }
        Commands::Report {
            pod,
            namespace,
            unhealthy,
        } => {
            let identity = PodIdentity::new(pod, namespace);
            match client.report(&identity, !unhealthy).await? {
                HeartbeatOutcome::Created => println!("{identity}: registered"),
                HeartbeatOutcome::Updated => println!("{identity}: updated"),
                HeartbeatOutcome::Conflict => {
                    eprintln!("Error: {identity} is already deleted or deletion is pending");
                    std::process::exit(1);
                }
            }
        }
        Commands::Remove { pod, namespace } => {
            let identity = PodIdentity::new(pod, namespace);
            match client.remove(&identity).await? {
                RemoveOutcome::Removed => println!("{identity}: removed"),
                RemoveOutcome::NotFound => {
                    eprintln!("Error: {identity} is not tracked");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
