//! File service walkthrough
//!
//! This demo:
//! - Runs the core gateway in-process over an in-memory store
//! - Then talks to a running `fnstack-gateway` through the client SDK
//!
//! Start the service with `cargo run --bin fnstack-gateway -- --ensure-bucket`
//! and run with: cargo run --example file_service

use bytes::Bytes;
use fnstack_client::{Config, FileServiceClient, FileUpload};
use fnstack_core::{FileMetadata, ObjectStoreGateway};
use fnstack_store::MemoryObjectStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // ==================== In-process gateway ====================

    println!("In-process gateway over an in-memory store\n");
    let gateway = ObjectStoreGateway::new(Arc::new(MemoryObjectStore::new()), "demo-bucket");
    gateway.ensure_bucket("demo-bucket").await?;

    for (name, body) in [("b.txt", "second"), ("a.txt", "first")] {
        let created = gateway
            .upload(&FileMetadata::new(Bytes::from(body), name, "text/plain"))
            .await?;
        println!("  stored {} ({} bytes)", created.key, created.size);
    }

    for record in gateway.list().await? {
        println!("  - {}", serde_json::to_string(&record)?);
    }

    match gateway
        .upload(&FileMetadata::new(Bytes::from("x"), "../escape", "text/plain"))
        .await
    {
        Ok(_) => println!("  unexpected: traversal name accepted"),
        Err(e) => println!("  rejected: {e}"),
    }

    // ==================== Remote service ====================

    let endpoint =
        std::env::var("FNSTACK_ENDPOINT").unwrap_or_else(|_| "http://localhost:8080".to_string());
    println!("\nRemote service at {endpoint}\n");
    let client = FileServiceClient::new(Config::new(endpoint))?;

    if !client.health_check().await.unwrap_or(false) {
        println!("  service not reachable, skipping");
        return Ok(());
    }

    println!("  server time: {}", client.current_time().await?);
    println!("  buckets: {}", client.list_buckets().await?.join(", "));

    let result = client
        .upload_file(FileUpload::from_bytes("hello", "README.md", "text/plain"))
        .await?;
    println!("  uploaded {} ({} bytes)", result.key, result.size);

    for entry in client.list_files().await? {
        println!("  - {} ({} bytes)", entry.key, entry.size);
    }

    let file = client.download_file("README.md").await?;
    println!("  downloaded: {}", String::from_utf8_lossy(&file.data));

    match client.download_file("missing.txt").await {
        Err(e) if e.is_not_found() => println!("  missing.txt: not found"),
        other => println!("  missing.txt: {other:?}"),
    }

    Ok(())
}
