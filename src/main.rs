use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use netdraft_core::{ProjectType, TopologyStore};
use netdraft_storage::{HttpRemote, Session, SessionConfig, SyncConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Manage network and electrical topology projects
#[derive(Parser, Debug)]
#[command(name = "netdraft")]
#[command(about = "Topology project manager with server sync", long_about = None)]
struct Args {
    /// Base URL of the project API
    #[arg(long, default_value = "http://localhost:3001/api")]
    server: String,

    /// Directory for the local cache slot
    #[arg(long, default_value = "./data")]
    cache_dir: PathBuf,

    /// Quiet period before a push is sent
    #[arg(long, default_value_t = 1000)]
    debounce_ms: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every project
    List,
    /// Create a project and make it active
    Create {
        name: String,
        #[arg(long, value_enum, default_value_t = KindArg::Network)]
        kind: KindArg,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a project
    Delete { id: String },
    /// Print or write a project's topology as JSON
    Export {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace a project's topology with an exported document
    Import { id: String, file: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Network,
    Electrical,
}

impl From<KindArg> for ProjectType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Network => ProjectType::Network,
            KindArg::Electrical => ProjectType::Electrical,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting netdraft v{}", env!("CARGO_PKG_VERSION"));
    info!("Server: {}", args.server);
    info!("Cache directory: {:?}", args.cache_dir);

    let config = SessionConfig {
        sync: SyncConfig {
            debounce: Duration::from_millis(args.debounce_ms),
            cache_dir: Some(args.cache_dir.clone()),
            ..SyncConfig::default()
        },
        ..SessionConfig::default()
    };

    let remote = Arc::new(HttpRemote::new(args.server.as_str()));
    let mut session = Session::open(remote, config).await?;
    if !session.is_synced() {
        warn!("Working offline: changes will not be pushed this run");
    }

    let result = run(args.command, session.store_mut());
    session.close().await;
    result
}

fn run(command: Command, store: &mut TopologyStore) -> anyhow::Result<()> {
    match command {
        Command::List => {
            for project in store.projects() {
                println!(
                    "{}  {:<10}  {}  {}/{}  {}",
                    project.id,
                    project.kind.as_str(),
                    project.name,
                    project.nodes.len(),
                    project.edges.len(),
                    project.updated_at,
                );
            }
        }
        Command::Create {
            name,
            kind,
            description,
        } => {
            let id = store.create_project(&name, kind.into(), description);
            println!("{}", id);
        }
        Command::Delete { id } => {
            if !store.delete_project(&id) {
                return Err(anyhow!("No project with id {}", id));
            }
            info!("Deleted project {}", id);
        }
        Command::Export { id, out } => {
            let json = store.export_project(&id)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    info!("Exported {} to {:?}", id, path);
                }
                None => println!("{}", json),
            }
        }
        Command::Import { id, file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            store.select_project(&id)?;
            store.import_topology(&json)?;
            info!(
                nodes = store.nodes().len(),
                edges = store.edges().len(),
                "Imported {:?} into {}",
                file,
                id
            );
        }
    }
    Ok(())
}
