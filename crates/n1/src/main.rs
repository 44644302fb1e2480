use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use n1_events::bus::EventBus;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

#[derive(Parser)]
#[command(name = "n1")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Serve,
    Openapi,
    Completions { shell: Shell },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve => {
            init_tracing();
            n1_serve::openapi::ensure_initialized();
            let db_path =
                std::env::var("N1_DB_PATH").unwrap_or_else(|_| ".need1/need1.db".to_string());
            if let Some(parent) = Path::new(&db_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let port = std::env::var("N1_PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(4810);
            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
            let event_bus = EventBus::new(1024);
            let state = n1_serve::AppState {
                db_path: db_path.clone(),
                event_bus,
                idempotency: n1_serve::IdempotencyLocks::new(),
            };
            let _ = cleanup_idempotency(&db_path);
            let purge_state = state.clone();
            tokio::spawn(async move { n1_serve::purge::run(purge_state).await });
            tracing::info!(%addr, "listening");
            if let Err(err) = n1_serve::serve(state, addr).await {
                eprintln!("serve error: {err}");
            }
        }
        Command::Openapi => {
            let spec = n1_serve::openapi::generate_spec();
            println!("{}", spec);
        }
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "n1", &mut std::io::stdout());
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn cleanup_idempotency(path: &str) -> Result<(), String> {
    let conn = n1_db::schema::open_and_migrate(path).map_err(|err| err.to_string())?;
    let store = n1_db::idempotency::IdempotencyStore::new(&conn);
    let _ = store.cleanup(chrono::Utc::now());
    Ok(())
}
