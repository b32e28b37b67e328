//! List queues and the annotations waiting for review in each of them
//!
//! Run with:
//!   ROSSUM_API_URL=https://elis.rossum.ai/api/v1 ROSSUM_TOKEN=... \
//!   cargo run --example list_queues

use futures::TryStreamExt;
use rossum_rs::telemetry::{init_tracing, LogFormat};
use rossum_rs::{Client, ClientConfig, ListQuery, Sideload};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::Pretty)?;

    let base_url = std::env::var("ROSSUM_API_URL")
        .unwrap_or_else(|_| "https://elis.rossum.ai/api/v1".to_string());
    let token = std::env::var("ROSSUM_TOKEN")?;

    let client = Client::with_token(ClientConfig::new(base_url), token)?;

    let mut queues = client.queues().list(&ListQuery::new().order_by("name"));
    while let Some(queue) = queues.try_next().await? {
        let to_review = client
            .annotations()
            .list_all(
                &ListQuery::new()
                    .filter("queue", queue.id)
                    .filter("status", "to_review")
                    .sideload(Sideload::Documents),
            )
            .await?;

        println!("{} (#{}): {} to review", queue.name, queue.id, to_review.len());
        for annotation in to_review {
            let file = annotation
                .document
                .object()
                .map(|d| d.original_file_name.as_str())
                .unwrap_or("?");
            println!("  - {} {}", annotation.id, file);
        }
    }

    Ok(())
}
