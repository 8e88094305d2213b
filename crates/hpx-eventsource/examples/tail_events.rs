//! Tail an event stream
//!
//! Subscribes to a Server-Sent Events endpoint and prints every message,
//! reconnecting with `Last-Event-ID` when the connection drops.
//!
//! Run with: `cargo run -p hpx-eventsource --example tail_events -- <url> [max-events]`
//!
//! Set `RUST_LOG=hpx_eventsource=debug` to see the session lifecycle.

use std::time::Duration;

use hpx_eventsource::{EventSource, EventSourceConfig, EventSourceMessage};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .ok_or("usage: tail_events <url> [max-events]")?;
    let max_events = args.next().map(|n| n.parse::<usize>()).transpose()?;

    let config = EventSourceConfig::new(url)
        .idle_timeout(Some(Duration::from_secs(60)))
        .reconnect_initial_delay(Duration::from_secs(1))
        .reconnect_max_delay(Duration::from_secs(30))
        .reconnect_backoff_factor(2.0)
        .reconnect_jitter(0.2);

    let (source, mut stream) = EventSource::stream(config)?;
    let mut received = 0;

    while let Some(message) = stream.next_message().await {
        let done = message.is_terminal();
        match message {
            EventSourceMessage::Open { status } => println!("-- open ({status})"),
            EventSourceMessage::Event(event) => {
                println!(
                    "[{}] {}{}",
                    event.event_type,
                    event.id.map(|id| format!("#{id} ")).unwrap_or_default(),
                    event.data
                );
                received += 1;
                if max_events.is_some_and(|max| received >= max) {
                    source.cancel();
                }
            }
            EventSourceMessage::Closed => println!("-- closed by server"),
            EventSourceMessage::Failed { error, status } => {
                println!(
                    "-- failed: {} (status {status:?})",
                    error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        if done {
            break;
        }
    }

    println!(
        "-- done after {received} events, last id {:?}",
        source.last_event_id()
    );
    Ok(())
}
