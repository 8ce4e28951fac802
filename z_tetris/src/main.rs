mod term_render;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use console::{Key, Term};
use tetris_core::{SimConfig, SimContext};
use term_render::TermRenderer;
use tracing_subscriber::EnvFilter;
use zenoh_duel::{DuelConfig, DuelLink, LinkEvent, PlayerId, RoomId, TransportState, apply_server_message};

/// z_tetris - two-player Tetris over Zenoh
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Room to join; a new one is created if omitted
    #[arg(short, long)]
    room: Option<String>,

    /// Player name, kept across reconnections
    #[arg(short, long)]
    name: Option<String>,

    /// Key expression prefix
    #[arg(short, long)]
    prefix: Option<String>,

    /// Path to Zenoh config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Keyboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Start,
    Pause,
    Reset,
    Quit,
}

fn command_for(key: Key) -> Option<Command> {
    match key {
        Key::ArrowLeft => Some(Command::MoveLeft),
        Key::ArrowRight => Some(Command::MoveRight),
        Key::ArrowDown => Some(Command::SoftDrop),
        Key::ArrowUp | Key::Char(' ') => Some(Command::Rotate),
        Key::Char('s') | Key::Char('S') => Some(Command::Start),
        Key::Char('p') | Key::Char('P') => Some(Command::Pause),
        Key::Char('r') | Key::Char('R') => Some(Command::Reset),
        Key::Char('q') | Key::Char('Q') | Key::Escape => Some(Command::Quit),
        _ => None,
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 1)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs would garble the board, so they go to stderr and only on request
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let zenoh_config = match &args.config {
        Some(path) => zenoh::Config::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config file: {}", e))?,
        None => zenoh::Config::default(),
    };
    let mut duel_config = DuelConfig::default().with_zenoh_config(zenoh_config);
    if let Some(prefix) = args.prefix.clone() {
        duel_config = duel_config.with_keyexpr_prefix(prefix);
    }

    let room = match args.room {
        Some(room) => RoomId::from_name(room)?,
        None => RoomId::generate(),
    };
    let player = match args.name {
        Some(name) => PlayerId::from_name(name)?,
        None => PlayerId::generate(),
    };

    let session = zenoh::open(duel_config.zenoh_config.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open zenoh session: {}", e))?;

    let message = Arc::new(Mutex::new(vec![
        format!("room: {}", room),
        "s start  p pause".to_string(),
        "r reset  q quit".to_string(),
        "server: ?".to_string(),
    ]));
    let mut context = SimContext::new(SimConfig::default());
    context.register(Box::new(TermRenderer::new(player.to_string(), message.clone())));

    let mut link = DuelLink::new(session.clone(), duel_config, room, player);
    link.listen().await.context("Failed to join room")?;

    let term = Term::stdout();
    term.clear_screen()?;
    term.hide_cursor()?;

    let (command_tx, command_rx) = flume::unbounded();
    let keyboard_task = tokio::task::spawn_blocking(move || {
        let input_term = Term::stdout();
        while let Ok(key) = input_term.read_key() {
            if let Some(command) = command_for(key) {
                if command_tx.send(command).is_err() || command == Command::Quit {
                    break;
                }
            }
        }
    });

    context.start();
    let mut frame = tokio::time::interval(Duration::from_millis(20));

    loop {
        tokio::select! {
            _ = frame.tick() => {
                context.tick(Instant::now());
            }
            event = link.next_event() => match event? {
                LinkEvent::Message(server_message) => apply_server_message(&mut context, &server_message),
                LinkEvent::SampleDue => {
                    link.send_sample(context.player().state()).await?;
                }
                LinkEvent::Transport(state) => {
                    let text = match state {
                        TransportState::Connected => "server: up",
                        TransportState::Disconnected => "server: down",
                    };
                    if let Ok(mut lines) = message.lock() {
                        if let Some(last) = lines.last_mut() {
                            *last = text.to_string();
                        }
                    }
                }
            },
            command = command_rx.recv_async() => {
                let player = context.player_mut();
                match command {
                    Ok(Command::MoveLeft) => { player.move_left(); }
                    Ok(Command::MoveRight) => { player.move_right(); }
                    Ok(Command::SoftDrop) => { player.soft_drop(); }
                    Ok(Command::Rotate) => { player.rotate(); }
                    Ok(Command::Start) => {
                        if player.request_start() {
                            link.start().await?;
                        }
                    }
                    Ok(Command::Pause) => {
                        if player.request_pause() {
                            link.pause().await?;
                        }
                    }
                    Ok(Command::Reset) => {
                        if let Err(e) = player.reset() {
                            tracing::debug!("reset refused: {}", e);
                        }
                    }
                    Ok(Command::Quit) | Err(_) => break,
                }
            }
        }
    }

    context.stop();
    link.stop().await?;
    keyboard_task.abort();
    let _ = keyboard_task.await;
    term.show_cursor()?;
    session
        .close()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to close zenoh session: {}", e))?;

    println!("Final score: {}", context.player().state().score());
    Ok(())
}
