#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

use anyhow::Context;
use clap::Parser;
use http_replay_ingest_lib::{ReplayCursor, SessionStore};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
struct Cli {
    /// Capture file to load
    capture: PathBuf,

    /// BPF filter applied while reading the capture
    #[arg(short, long, default_value = "tcp src port 80 or tcp dst port 80")]
    filter: String,

    /// Print the load report as JSON
    #[arg(long)]
    json: bool,

    /// Walk this many responses through a replay cursor and log their timing
    #[arg(long, value_name = "N")]
    replay: Option<usize>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

fn replay(cursor: &mut ReplayCursor<'_>, responses: usize) {
    cursor.advance_session();
    for _ in 0..responses {
        cursor.advance_response();
        while !cursor.is_last_packet() {
            let latency = cursor.next_packet_latency();
            cursor.advance_packet();
            debug!(
                latency_ms = ?latency,
                len = cursor.current_packet_length(),
                "Replay packet"
            );
        }
        // Move on once the current session has been played through.
        if cursor
            .current_session()
            .zip(cursor.current_response())
            .is_some_and(|(session, response)| {
                session.responses().last().is_some_and(|last| core::ptr::eq(last, response))
            })
        {
            cursor.advance_session();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut store = SessionStore::new();
    let report = http_replay_ingest_lib::load(&mut store, &cli.capture, &cli.filter)
        .with_context(|| format!("Failed to load {}", cli.capture.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!(
            frames = report.frames,
            tcp_segments = report.tcp_segments,
            opened = report.sessions_opened,
            stored = report.sessions_stored,
            discarded = report.sessions_discarded,
            unfinished = report.sessions_unfinished,
            "Totally {} sessions build complete",
            store.len()
        );
    }

    if let Some(responses) = cli.replay
        && !store.is_empty()
    {
        let mut cursor = store.open_replay_cursor();
        replay(&mut cursor, responses);
    }

    store.teardown();
    Ok(())
}
