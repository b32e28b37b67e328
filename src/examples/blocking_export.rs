//! Export confirmed annotations of a queue as CSV from synchronous code
//!
//! Run with:
//!   ROSSUM_API_URL=https://elis.rossum.ai/api/v1 ROSSUM_USERNAME=... ROSSUM_PASSWORD=... \
//!   cargo run --example blocking_export -- <queue id> <output file>

use anyhow::Context;
use rossum_rs::blocking::Client;
use rossum_rs::telemetry::{init_tracing, LogFormat};
use rossum_rs::{ClientConfig, ExportFormat, ListQuery};

fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::Json)?;

    let mut args = std::env::args().skip(1);
    let queue_id: u64 = args
        .next()
        .context("usage: blocking_export <queue id> <output file>")?
        .parse()?;
    let output = args.next().unwrap_or_else(|| format!("queue-{}.csv", queue_id));

    let base_url = std::env::var("ROSSUM_API_URL")
        .unwrap_or_else(|_| "https://elis.rossum.ai/api/v1".to_string());
    let username = std::env::var("ROSSUM_USERNAME")?;
    let password = std::env::var("ROSSUM_PASSWORD")?;

    let client = Client::login(ClientConfig::new(base_url), &username, &password)?;

    let queue = client.queues().get(queue_id)?;
    let csv = client.queues().export(
        queue_id,
        ExportFormat::Csv,
        &ListQuery::new().filter("status", "confirmed"),
    )?;
    std::fs::write(&output, &csv)?;

    println!("exported {} bytes from {} to {}", csv.len(), queue.name, output);
    Ok(())
}
