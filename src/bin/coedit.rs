use clap::{Parser, Subcommand};
use coedit_core::net::{self, ClientSession, ServerHandle};
use coedit_core::{Config, Incoming, TextInputEvent};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[derive(Parser)]
#[command(name = "coedit")]
#[command(about = "Collaborative plain-text editing over TCP")]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Port to listen on or connect to
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the authoritative server
    Server {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,

        /// File to load as the starting document
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// Connect to a server and edit
    Client {
        /// Server address
        #[arg(long)]
        server: Option<String>,

        /// Client id announced to the server
        #[arg(long)]
        id: Option<String>,
    },
}

const HELP: &str = "commands: i <pos> <text> | d <pos> <len> | c <pos> | p | q";

/// One line of stdin
enum Input {
    Edit(TextInputEvent),
    Cursor(usize),
    Print,
    Quit,
    Invalid,
}

fn parse_input(line: &str) -> Input {
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or_default();
    let pos = parts.next().and_then(|p| p.parse::<usize>().ok());
    let rest = parts.next();

    match (command, pos, rest) {
        ("i", Some(pos), Some(text)) => {
            Input::Edit(TextInputEvent::insert(text.replace("\\n", "\n"), pos))
        }
        ("d", Some(pos), Some(length)) => match length.trim().parse() {
            Ok(length) => Input::Edit(TextInputEvent::delete(pos, length)),
            Err(_) => Input::Invalid,
        },
        ("c", Some(pos), None) => Input::Cursor(pos),
        ("p", None, None) => Input::Print,
        ("q", None, None) => Input::Quit,
        _ => Input::Invalid,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Installed before the config loads so its warnings are printed;
    // RUST_LOG wins over the configured level
    let from_env = EnvFilter::try_from_default_env().ok();
    let has_env_filter = from_env.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let mut config = load_config(&cli, &filter_handle, has_env_filter)?;

    match cli.command {
        Command::Server { bind, document } => {
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            if document.is_some() {
                config.initial_document = document;
            }
            config.validate()?;

            info!("=== coedit server ===");
            let server = net::serve(&config).await?;
            run_server(server).await
        }
        Command::Client { server, id } => {
            if let Some(server) = server {
                config.server_address = server;
            }
            if let Some(id) = id {
                config.client_id = id;
            }
            config.validate()?;

            info!("=== coedit client {} ===", config.client_id);
            let session = net::connect(&config).await?;
            run_client(session).await
        }
    }
}

/// Load the config named on the command line, then switch the log filter
/// to its level unless RUST_LOG already chose one
fn load_config(
    cli: &Cli,
    filter_handle: &FilterHandle,
    has_env_filter: bool,
) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if !has_env_filter {
        filter_handle.modify(|filter| *filter = EnvFilter::new(&config.log_level))?;
    }
    Ok(config)
}

async fn run_server(server: ServerHandle) -> anyhow::Result<()> {
    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Edit(event) => {
                        if server.edit(event).is_none() {
                            println!("edit not applied");
                        }
                    }
                    Input::Print => println!(
                        "{:?} ({} clients, {} ops)",
                        server.text(),
                        server.client_count(),
                        server.history_len()
                    ),
                    Input::Quit => break,
                    Input::Cursor(_) | Input::Invalid => println!("{}", HELP),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    server.shutdown().await;
    Ok(())
}

async fn run_client(mut session: ClientSession) -> anyhow::Result<()> {
    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Edit(TextInputEvent::Insert { text, pos }) => {
                        let _ = session.insert(&text, pos);
                    }
                    Input::Edit(TextInputEvent::Delete { pos, length }) => {
                        let _ = session.delete(pos, length);
                    }
                    Input::Cursor(pos) => session.move_cursor(pos),
                    Input::Print => println!(
                        "{:?} (cursor {}, {} pending)",
                        session.text(),
                        session.cursor_position(),
                        session.pending_len()
                    ),
                    Input::Quit => break,
                    Input::Invalid => println!("{}", HELP),
                }
            }
            incoming = session.recv() => match incoming {
                Some(Incoming::Applied(_)) | Some(Incoming::DocumentLoaded) => {
                    println!("{:?}", session.text());
                }
                Some(_) => {}
                None => {
                    println!("connection closed");
                    break;
                }
            },
        }
    }

    session.disconnect().await;
    Ok(())
}
