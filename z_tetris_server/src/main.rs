use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use zenoh_duel::{DuelConfig, DuelServer, ServerCommand};

/// z_tetris_server - relay and referee for z_tetris rooms
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Key expression prefix
    #[arg(short, long)]
    prefix: Option<String>,

    /// Path to Zenoh config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 1)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let zenoh_config = match &args.config {
        Some(path) => zenoh::Config::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config file: {}", e))?,
        None => zenoh::Config::default(),
    };
    let mut config = DuelConfig::default().with_zenoh_config(zenoh_config);
    if let Some(prefix) = args.prefix {
        config = config.with_keyexpr_prefix(prefix);
    }

    let session = zenoh::open(config.zenoh_config.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open zenoh session: {}", e))?;

    println!("=== z_tetris_server ===");
    println!("Prefix: {}", config.keyexpr_prefix);
    println!("Commands:");
    println!("  q - Quit");
    println!();

    let server = DuelServer::new(session.clone(), config).await?;
    let stop = server.sender();

    // Stop on 'q' from stdin
    let keyboard_stop = stop.clone();
    let keyboard_task = tokio::task::spawn_blocking(move || {
        let mut reader = io::stdin().lock();
        let mut buf = [0u8; 1];
        while reader.read_exact(&mut buf).is_ok() {
            if matches!(buf[0], b'q' | b'Q') {
                println!("→ Quit requested");
                let _ = keyboard_stop.send(ServerCommand::Stop);
                break;
            }
        }
    });

    // ... or on Ctrl-C
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            let _ = stop.send(ServerCommand::Stop);
        }
    });

    server.run().await?;

    keyboard_task.abort();
    session
        .close()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to close zenoh session: {}", e))?;
    println!("Goodbye!");
    Ok(())
}
