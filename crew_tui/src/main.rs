use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::sync::mpsc::unbounded_channel;
use tracing::info;

use crew_core::{load_client_config, Frame, Intent, Route, Session};

mod app;
mod http;
mod keymap;
mod runtime;
mod ui;

use app::CrewApp;
use http::HttpAuthority;

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StartRoute {
    Lobby,
    Game,
}

impl From<StartRoute> for Route {
    fn from(value: StartRoute) -> Self {
        match value {
            StartRoute::Lobby => Route::Lobby,
            StartRoute::Game => Route::Game,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "crewlink terminal client", long_about = None)]
struct Cli {
    /// Base URL of the game authority.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,
    /// Session cookie sent verbatim with every request, e.g. `sid=abc123`.
    #[arg(long)]
    session_cookie: Option<String>,
    /// Client config JSON; falls back to CREWLINK_CLIENT_CONFIG_PATH, then the builtin.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override both poll intervals, in milliseconds.
    #[arg(long)]
    poll_ms: Option<u64>,
    /// Screen to start on.
    #[arg(long, value_enum, default_value_t = StartRoute::Game)]
    route: StartRoute,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (log_tx, log_rx) = mpsc::channel::<String>();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_tx.clone(),
        })
        .init();

    let cli = Cli::parse();
    let (mut config, metadata) = load_client_config(cli.config.as_deref());
    if let Some(millis) = cli.poll_ms {
        config = config.with_poll_interval_ms(millis);
    }
    info!(
        target: "crewlink::runtime",
        server = %cli.server,
        config = ?metadata.path(),
        "client.starting"
    );

    let authority = HttpAuthority::new(&cli.server, cli.session_cookie, config.request_timeout())?;
    let session = Session::new(cli.route.into(), &config);

    let (frame_tx, frame_rx) = unbounded_channel::<Frame>();
    let (intent_tx, intent_rx) = unbounded_channel::<Intent>();

    let ui_handle = std::thread::spawn(move || -> Result<()> {
        let app = CrewApp::new(frame_rx, intent_tx, log_rx)?;
        app.run()
    });

    runtime::run(session, authority, config, intent_rx, frame_tx).await?;

    ui_handle
        .join()
        .map_err(|_| eyre!("terminal thread panicked"))??;
    Ok(())
}
