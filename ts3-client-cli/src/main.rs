//! ts3-client-cli: connect to a TeamSpeak 3 server and print what happens.
//!
//! Loads the client library, connects with the given identity and nickname, prints
//! connection, talk and text events until Ctrl+C (or the server drops the connection),
//! then disconnects cleanly.
//!
//!   ts3-client-cli --address voice.example.com --nickname bot
//!   ts3-client-cli --config client.json --json

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;

use ts3_client::native::{default_library_name, NativeLib};
use ts3_client::{
    Client, ClientCallbacks, ClientConfig, ClientEvent, ConnectStatus, ConnectionHandlerId,
    ErrorCode, TalkStatus,
};

/// Status reports from `connect_status_change` events.
type StatusTx = mpsc::UnboundedSender<(ConnectStatus, ErrorCode)>;
type StatusRx = mpsc::UnboundedReceiver<(ConnectStatus, ErrorCode)>;

#[derive(Parser)]
#[command(name = "ts3-client-cli", about = "TeamSpeak 3 command-line client")]
struct Args {
    /// Path to the client library (defaults to the platform library name)
    #[arg(long, env = "TS3_CLIENT_LIB")]
    lib: Option<PathBuf>,

    /// JSON config file with `init` and `connect` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Folder holding the library's sound backends
    #[arg(long)]
    resource_path: Option<String>,

    /// Server hostname or IP
    #[arg(long)]
    address: Option<String>,

    /// Server port
    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    nickname: Option<String>,

    /// Exported identity (or set TS3_IDENTITY env var)
    #[arg(long, env = "TS3_IDENTITY", hide_env_values = true)]
    identity: Option<String>,

    /// Server password (or set TS3_SERVER_PASSWORD env var)
    #[arg(long, env = "TS3_SERVER_PASSWORD", hide_env_values = true)]
    server_password: Option<String>,

    /// Print every event as a JSON line instead of text
    #[arg(long)]
    json: bool,

    /// Seconds between connection status polls
    #[arg(long, default_value_t = 1)]
    poll_secs: u64,
}

impl Args {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(resource_path) = &self.resource_path {
            config.init.resource_path = resource_path.clone();
        }
        let connect = &mut config.connect;
        if let Some(address) = &self.address {
            connect.address = address.clone();
        }
        if let Some(port) = self.port {
            connect.port = port;
        }
        if let Some(nickname) = &self.nickname {
            connect.nickname = nickname.clone();
        }
        if let Some(identity) = &self.identity {
            connect.identity = identity.clone();
        }
        if let Some(password) = &self.server_password {
            connect.server_password = password.clone();
        }
        Ok(config)
    }
}

fn printing_callbacks(statuses: StatusTx) -> ClientCallbacks {
    ClientCallbacks::new()
        .on_connect_status_change(move |_, ev| {
            let _ = statuses.send((ev.new_status, ev.error));
            println!("Connect status changed: {:?}, error: {}", ev.new_status, ev.error);
            if ev.new_status == ConnectStatus::ConnectionEstablished {
                println!("Connection established!");
            }
        })
        .on_text_message(|_, ev| {
            println!(
                "Received message from {} ({}): {}",
                ev.from.name, ev.from.id, ev.message
            );
        })
        .on_talk_status_change(|_, ev| match ev.status {
            TalkStatus::Talking => println!("Client {} started talking", ev.client_id),
            TalkStatus::NotTalking => println!("Client {} stopped talking", ev.client_id),
            _ => {}
        })
        .on_client_move(|_, ev| {
            println!(
                "Client {} moved {} -> {}",
                ev.client_id, ev.old_channel_id, ev.new_channel_id
            );
        })
        .on_handler_panic(|kind, message| {
            tracing::error!(event = %kind, "event handler failed: {message}");
        })
}

/// Whether a connection attempt is over, given the statuses seen so far.
///
/// `Disconnected` before any other status is the idle state, unless it carries an error:
/// that is a connect attempt the library gave up on.
#[derive(Debug, Default)]
struct ConnectProgress {
    started: bool,
}

impl ConnectProgress {
    fn observe(&mut self, status: ConnectStatus, error: ErrorCode) -> bool {
        match status {
            ConnectStatus::Disconnected => self.started || !error.is_ok(),
            _ => {
                self.started = true;
                false
            }
        }
    }
}

/// Wait until the connection drops or the connect attempt fails.
///
/// Polls the status every `every` and also reads status events, which are the only place a
/// failed connect reports its error.
async fn wait_for_disconnect(
    client: &Client<NativeLib>,
    connection: ConnectionHandlerId,
    every: Duration,
    mut statuses: StatusRx,
) {
    let mut ticker = tokio::time::interval(every);
    let mut progress = ConnectProgress::default();
    loop {
        let (status, error) = tokio::select! {
            _ = ticker.tick() => match client.connection_status(connection) {
                Ok(status) => (status, ErrorCode::OK),
                Err(e) => {
                    tracing::warn!("error getting connection status: {e}");
                    continue;
                }
            },
            Some(update) = statuses.recv() => update,
        };
        if progress.observe(status, error) {
            if error.is_ok() {
                println!("Disconnected from server.");
            } else {
                println!("Connection failed: {error}");
            }
            return;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ts3_client=info,ts3_client_cli=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.client_config()?;

    let lib_path = args
        .lib
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_library_name()));
    let lib = NativeLib::load(&lib_path)
        .with_context(|| format!("loading client library {}", lib_path.display()))?;
    let client = Client::initialize(lib, &config.init).context("initializing client library")?;

    let outcome = run(&client, &args, &config).await;
    if let Err(e) = client.shutdown() {
        tracing::warn!("shutting down client library: {e}");
    }
    outcome
}

async fn run(client: &Client<NativeLib>, args: &Args, config: &ClientConfig) -> Result<()> {
    let version = client.lib_version().context("getting client library version")?;
    println!("TeamSpeak 3 Client SDK version: {version}");

    let connection = client
        .spawn_connection_handler(0)
        .context("creating server connection handler")?;

    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let outcome = match arm_callbacks(client, args.json, status_tx) {
        Ok(printer) => {
            let outcome = connect_and_wait(client, connection, args, config, status_rx).await;
            // Drops the forwarding sender so the printer task ends.
            match client.set_client_callbacks(ClientCallbacks::new()) {
                Ok(()) => {
                    if let Some(printer) = printer {
                        let _ = printer.await;
                    }
                }
                Err(e) => {
                    tracing::warn!("clearing client callbacks: {e}");
                    if let Some(printer) = printer {
                        printer.abort();
                    }
                }
            }
            outcome
        }
        Err(e) => Err(e),
    };

    if let Err(e) = client.destroy_connection_handler(connection) {
        tracing::warn!("destroying connection handler: {e}");
    }
    outcome
}

/// Install the event printers. In JSON mode the returned task prints forwarded envelopes.
fn arm_callbacks(
    client: &Client<NativeLib>,
    json: bool,
    statuses: StatusTx,
) -> Result<Option<tokio::task::JoinHandle<()>>> {
    if !json {
        client
            .set_client_callbacks(printing_callbacks(statuses))
            .context("registering client callbacks")?;
        return Ok(None);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .set_client_callbacks(ClientCallbacks::forward_to(tx))
        .context("registering client callbacks")?;
    Ok(Some(tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            if let ClientEvent::ConnectStatusChange(ev) = &envelope.event {
                let _ = statuses.send((ev.new_status, ev.error));
            }
            match serde_json::to_string(&envelope) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!("serializing event: {e}"),
            }
        }
    })))
}

async fn connect_and_wait(
    client: &Client<NativeLib>,
    connection: ConnectionHandlerId,
    args: &Args,
    config: &ClientConfig,
    statuses: StatusRx,
) -> Result<()> {
    let connect = &config.connect;
    println!(
        "Connecting to {} as {}...",
        connect.endpoint(),
        connect.nickname
    );
    client
        .start_connection(connection, connect)
        .context("connecting to server")?;
    println!("Press Ctrl+C to exit.");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\nDisconnecting from server...");
            client
                .stop_connection(connection, "Goodbye!")
                .context("disconnecting")?;
        }
        _ = wait_for_disconnect(
            client,
            connection,
            Duration::from_secs(args.poll_secs.max(1)),
            statuses,
        ) => {}
    }
    Ok(())
}
