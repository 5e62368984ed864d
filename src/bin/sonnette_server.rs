//! Sonnette event API server
//!
//! Records bell/intrusion events POSTed by the doorbell units and serves
//! the query/stream routes the dashboards poll.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::signal;

use sonnette::server::{router, AppState};
use sonnette::store::SqliteEventStore;

/// Server configuration
struct Config {
    /// Address to bind to
    addr: SocketAddr,
    /// SQLite database file
    db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:5000".parse().unwrap(),
            db_path: PathBuf::from("./sonnette.db"),
        }
    }
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    let port: u16 = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("error: invalid port number: {}", args[i + 1]);
                        std::process::exit(1);
                    });
                    config.addr.set_port(port);
                    i += 2;
                } else {
                    eprintln!("error: --port requires a value");
                    std::process::exit(1);
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.db_path = PathBuf::from(&args[i + 1]);
                    i += 2;
                } else {
                    eprintln!("error: --db requires a value");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("sonnette-server - event API server");
                println!();
                println!("USAGE:");
                println!("    sonnette-server [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -p, --port <PORT>    Port to listen on [default: 5000]");
                println!("    -d, --db <FILE>      SQLite database file [default: ./sonnette.db]");
                println!("    -h, --help           Print help information");
                println!();
                println!("ENVIRONMENT:");
                println!("    SONNETTE_SECRET      Shared secret for event submissions");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = parse_args();

    let secret = std::env::var("SONNETTE_SECRET").unwrap_or_else(|_| {
        tracing::warn!("SONNETTE_SECRET not set; using the default secret");
        "super_secret".to_string()
    });

    let store = Arc::new(SqliteEventStore::open(&config.db_path)?);
    tracing::info!(db = %config.db_path.display(), "database opened");

    let app = router(AppState { store, secret });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "sonnette-server v{} listening", env!("CARGO_PKG_VERSION"));

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("shut down");
    Ok(())
}
