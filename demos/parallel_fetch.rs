//! Parallel fetch over a bounded connection pool.
//!
//! Demonstrates:
//! - Building a client with defaults and a connection bound
//! - Adding requests under caller IDs and generated IDs
//! - Running the batch from async code
//! - Reading the full and data-only result views
//!
//! Usage:
//!   cargo run --example parallel_fetch
//!   cargo run --example parallel_fetch -- --debug
//!   cargo run --example parallel_fetch -- --connections 2 https://example.com https://example.org

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use multicurl::{MultiClient, RequestOptions, Result};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_URLS: &[&str] = &[
    "https://httpbin.org/get",
    "https://httpbin.org/status/404",
    "https://httpbin.org/delay/1",
    "https://httpbin.org/headers",
    "https://httpbin.org/html",
];

// ============================================================================
// Args
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    debug: bool,
    connections: usize,
    urls: Vec<String>,
}

impl Args {
    /// Parse command-line arguments.
    fn parse() -> Self {
        let mut args = Self {
            debug: false,
            connections: 2,
            urls: Vec::new(),
        };

        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" => args.debug = true,
                "--connections" => {
                    if let Some(n) = iter.next().and_then(|n| n.parse().ok()) {
                        args.connections = n;
                    }
                }
                _ => args.urls.push(arg),
            }
        }

        if args.urls.is_empty() {
            args.urls = DEFAULT_URLS.iter().map(|u| (*u).to_owned()).collect();
        }

        args
    }
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug { "multicurl=debug" } else { "multicurl=info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Parallel Fetch ===\n");

    let mut client = MultiClient::builder()
        .max_connections(args.connections)
        .default_header("Accept", "application/json, text/plain;q=0.9, */*;q=0.1")
        .default_option(|o| {
            o.with_follow_redirects(true)
                .with_timeout(Duration::from_secs(20))
                .with_user_agent("multicurl-demo/0.1")
        })
        .build()?;

    for (index, url) in args.urls.iter().enumerate() {
        client.get(index, url.as_str())?;
    }
    let generated = client.push_request(
        "https://httpbin.org/post",
        Some(serde_json::json!({ "hello": "world" }).into()),
        RequestOptions::new(),
        vec![("Content-Type".into(), "application/json".into())],
    )?;

    println!(
        "[Send] {} requests over {} connections",
        client.len(),
        args.connections
    );

    let results = client.send_async().await?;

    println!("\n[Full]");
    for (id, entry) in results.full(false) {
        println!(
            "  {id:>36}  {:>4}  {}",
            entry.status_code.map_or_else(|| "-".to_owned(), |c| c.to_string()),
            entry.header("content-type").unwrap_or("-")
        );
    }

    println!("\n[Data, 2xx only]");
    for (id, body) in results.data(true) {
        let preview: String = match body.as_text() {
            Some(text) => text.chars().take(60).collect(),
            None => body.as_json().map(ToString::to_string).unwrap_or_default(),
        };
        println!("  {id:>36}  {preview}");
    }

    if let Some(entry) = results.get(generated.as_str()) {
        println!("\n[Generated ID] {generated} -> {:?}", entry.status_code);
    }

    Ok(())
}
