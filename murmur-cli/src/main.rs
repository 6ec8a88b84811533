mod input;
mod prompt;
mod terminal;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use murmur_rendezvous::RoomRegistry;
use murmur_session::{
    ChatView, HostSession, HttpSignalingClient, JoinRequest, MemberConfig, RelayConfig,
    SessionConfig, SignalingClient, Transport, TransportConfig, WebrtcTransport, join_room,
    run_member, spawn_relay,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalView;

#[derive(Parser)]
#[command(name = "murmur", version, about = "Peer-to-peer text chat rooms over WebRTC")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct SessionArgs {
    /// Base URL of the rendezvous service
    #[arg(
        long,
        global = true,
        env = "MURMUR_SIGNALING_URL",
        default_value = "http://localhost:8080"
    )]
    signaling_url: String,

    /// STUN server, may be repeated
    #[arg(long = "stun", global = true, default_value = "stun:stun1.l.google.com:19302")]
    stun: Vec<String>,

    #[arg(long, global = true, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// How long a joiner waits for the host's answer
    #[arg(long, global = true, default_value_t = 60)]
    answer_timeout_secs: u64,

    /// Stop admitting peers once this many joined (host only)
    #[arg(long, global = true)]
    max_peers: Option<usize>,

    /// Do not echo a message back to the member who sent it (host only)
    #[arg(long, global = true)]
    no_self_echo: bool,

    /// Show your own messages immediately instead of waiting for the host's echo
    #[arg(long, global = true)]
    local_echo: bool,
}

impl SessionArgs {
    fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            ice_servers: self.stun.clone(),
            ..TransportConfig::default()
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            answer_timeout: Duration::from_secs(self.answer_timeout_secs),
        }
    }

    fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            include_sender: !self.no_self_echo,
            max_peers: self.max_peers,
        }
    }

    fn member_config(&self) -> MemberConfig {
        MemberConfig {
            local_echo: self.local_echo,
        }
    }
}

#[derive(clap::Args, Default)]
struct RoomArgs {
    #[arg(long)]
    room: Option<String>,

    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    username: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rendezvous service
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,
    },
    /// Create a room, relay for everyone who joins it and chat in it
    Host(RoomArgs),
    /// Join an existing room
    Join(RoomArgs),
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) => command,
        None => prompt::choose_mode()?,
    };

    match command {
        Commands::Serve { listen } => {
            init_tracing("info");
            serve(&listen).await
        }
        Commands::Host(room) => {
            init_tracing("warn");
            host(&cli.session, room).await
        }
        Commands::Join(room) => {
            init_tracing("warn");
            join(&cli.session, room).await
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn serve(listen: &str) -> Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to listen on {}", listen))?;

    println!(
        "{} {}",
        "📡 Rendezvous service on".green().bold(),
        listener.local_addr()?
    );

    murmur_rendezvous::serve(listener, RoomRegistry::new(), shutdown_signal()).await
}

async fn host(args: &SessionArgs, room: RoomArgs) -> Result<()> {
    let signaling = Arc::new(HttpSignalingClient::new(&args.signaling_url)?);
    let transport = Arc::new(WebrtcTransport::new(args.transport_config()));
    let request = prompt::join_request(room)?;

    let session = HostSession::create(signaling.as_ref(), request.room.clone(), &request.password)
        .await
        .context("Failed to create room")?;
    println!("{} '{}'", "🏠 Hosting room".green().bold(), request.room);

    let relay = spawn_relay(
        session,
        args.relay_config(),
        &args.session_config(),
        transport.clone(),
        signaling.clone(),
    );

    // The host chats in its own room like any other member.
    let outcome = chat(transport.as_ref(), signaling.as_ref(), &request, args).await;

    relay.shutdown().await;
    outcome
}

async fn join(args: &SessionArgs, room: RoomArgs) -> Result<()> {
    let signaling = HttpSignalingClient::new(&args.signaling_url)?;
    let transport = WebrtcTransport::new(args.transport_config());
    let request = prompt::join_request(room)?;

    chat(&transport, &signaling, &request, args).await
}

async fn chat(
    transport: &dyn Transport,
    signaling: &dyn SignalingClient,
    request: &JoinRequest,
    args: &SessionArgs,
) -> Result<()> {
    println!("{}", "⏳ Waiting for the host to answer...".cyan());

    let membership = join_room(transport, signaling, request, &args.session_config())
        .await
        .with_context(|| format!("Failed to join room '{}'", request.room))?;

    let view: Arc<dyn ChatView> = Arc::new(TerminalView);
    let input = input::stdin_lines();

    tokio::select! {
        result = run_member(membership, input, view, args.member_config()) => {
            result?;
        }
        _ = shutdown_signal() => info!("Interrupted, leaving the room"),
    }

    println!("{}", "👋 Bye".green());
    Ok(())
}
