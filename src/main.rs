//! Intake Scanner - operator terminal
//!
//! Reads commands and container numbers from stdin, one per line. Lines
//! starting with `:` are commands, anything else is a container number
//! confirmed as if Enter was pressed in the scan field.

use clap::Parser;
use colored::*;
use intake_scanner::{
    feedback::{
        BellTone, CommandTone, EntryKind, FeedbackChannel, LogEntry, NullTone, ToneSink,
    },
    ledger_client::LedgerClient,
    recognition_source::{
        ContinuousChannel, FfmpegFrameSource, ScanOutcome, TesseractRecognizer,
    },
    error::RecognitionError,
    scan_event::parse_quantity,
    state::DEFAULT_LOG_FILTER,
    AppConfig, ScanSession,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "intake-scanner")]
#[command(about = "Container intake scanning terminal")]
struct Args {
    /// Ledger server URL (overrides SCANNER_SERVER_URL)
    #[arg(long)]
    server: Option<String>,

    /// Intake date, YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,

    /// Client to scan for
    #[arg(long)]
    client: Option<String>,

    /// Quantity per scan
    #[arg(long, default_value_t = 1)]
    qty: i64,

    /// Disable the terminal bell
    #[arg(long)]
    no_audio: bool,
}

const HELP: &str = "\
:date YYYY-MM-DD   select date
:orders            load clients for the date
:client NAME|#N    select client (by name or list number)
:qty N             quantity per scan
:undo              revert last scan
:finish            finish selected client
:camera            start camera recognition
:stop              stop camera
:pair              show handheld pairing URL
:status            show current selection
:help              this text
:quit              exit
<anything else>    container number";

fn render(entry: &LogEntry) {
    let stamp = entry.at.format("%H:%M:%S").to_string().dimmed();
    let text = match entry.kind {
        EntryKind::Info => entry.text.normal(),
        EntryKind::Success => entry.text.green().bold(),
        EntryKind::Undo => entry.text.yellow(),
        EntryKind::Error => entry.text.red(),
    };
    println!("{} {}", stamp, text);
}

fn status(session: &ScanSession, camera_armed: bool) {
    println!(
        "{} date={} client={} qty={} camera={} undo={}",
        "▶".cyan(),
        if session.date().is_empty() { "—" } else { session.date() },
        if session.client().is_empty() { "—" } else { session.client() },
        session.quantity(),
        if camera_armed { "on" } else { "off" },
        session
            .last_scan()
            .map(|s| format!("{} x{}", s.container, s.quantity))
            .unwrap_or_else(|| "—".to_string()),
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr, operator log to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    tracing::info!("Starting Intake Scanner v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::default();
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if args.no_audio {
        config.audio = false;
    }

    tracing::info!(
        server_url = %config.server_url,
        camera_input = %config.camera_input,
        camera_format = ?config.camera_format,
        retry_delay_ms = config.retry_delay_ms,
        audio = config.audio,
        tone_command = ?config.tone_command,
        "Configuration loaded"
    );

    let ledger = Arc::new(LedgerClient::with_timeout(
        config.server_url.clone(),
        config.http_timeout(),
    )?);

    let tone: Box<dyn ToneSink> = match (config.audio, config.tone_command.clone()) {
        (false, _) => Box::new(NullTone),
        (true, Some(program)) => Box::new(CommandTone::new(program)),
        (true, None) => Box::new(BellTone::stdout()),
    };
    let mut feedback = FeedbackChannel::new(config.log_capacity, tone);
    let mut log_rx = feedback.subscribe();

    let mut session = ScanSession::new(ledger, feedback);
    if let Some(date) = args.date {
        session.set_date(date);
    }
    if let Some(client) = args.client {
        session.set_client(&client)?;
    }
    session.set_quantity(args.qty);

    let camera = Arc::new(ContinuousChannel::with_retry_delay(
        Arc::new(FfmpegFrameSource::new(config.ffmpeg())),
        Arc::new(TesseractRecognizer::new(config.ocr_lang.clone())),
        config.retry_delay(),
    ));
    let (camera_tx, mut camera_rx) =
        mpsc::unbounded_channel::<Result<ScanOutcome, RecognitionError>>();

    println!("{}", "Intake Scanner — :help for commands".bold());
    status(&session, false);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(entry) = log_rx.recv() => render(&entry),

            Some(outcome) = camera_rx.recv() => {
                // Errors are already on the operator log
                let _ = session.handle_camera_outcome(outcome).await;
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let (cmd, arg) = match line.strip_prefix(':') {
                    Some(rest) => {
                        let mut parts = rest.splitn(2, char::is_whitespace);
                        (parts.next().unwrap_or(""), parts.next().unwrap_or("").trim())
                    }
                    None => {
                        let _ = session.scan_container(line).await;
                        continue;
                    }
                };

                match cmd {
                    "date" => {
                        session.set_date(arg);
                        status(&session, camera.state().is_armed());
                    }
                    "orders" => {
                        if let Ok(clients) = session.load_orders().await {
                            for (i, client) in clients.iter().enumerate() {
                                println!("  #{} {}", i + 1, client);
                            }
                        }
                    }
                    "client" => {
                        let name = match arg.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
                            Some(n) => session
                                .clients()
                                .get(n.saturating_sub(1))
                                .cloned()
                                .unwrap_or_default(),
                            None => arg.to_string(),
                        };
                        if session.set_client(&name).is_ok() {
                            status(&session, camera.state().is_armed());
                        }
                    }
                    "qty" => match parse_quantity(arg) {
                        Ok(qty) => {
                            session.set_quantity(qty);
                            status(&session, camera.state().is_armed());
                        }
                        Err(e) => println!("{} {}", "✖".red(), e),
                    },
                    "undo" => {
                        let _ = session.undo().await;
                    }
                    "finish" => {
                        let _ = session.finish_client().await;
                    }
                    "camera" => {
                        if camera.state().is_armed() {
                            tracing::warn!("Camera scan already running");
                            continue;
                        }
                        session.camera_armed();
                        let camera = camera.clone();
                        let tx = camera_tx.clone();
                        tokio::spawn(async move {
                            let outcome = camera.scan().await;
                            let _ = tx.send(outcome);
                        });
                    }
                    "stop" => {
                        camera.handle().disarm();
                    }
                    "pair" => {
                        let _ = session.pairing_url().await;
                    }
                    "status" => status(&session, camera.state().is_armed()),
                    "help" => println!("{}", HELP),
                    "quit" | "exit" => break,
                    other => println!("{} unknown command :{}", "✖".red(), other),
                }
            }
        }
    }

    camera.handle().disarm();
    while let Ok(entry) = log_rx.try_recv() {
        render(&entry);
    }
    tracing::info!("Intake Scanner stopped");

    Ok(())
}
