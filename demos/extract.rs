//! Batch element extraction with selector fallback.
//!
//! Demonstrates:
//! - DOM-domain queries and attribute maps
//! - `extract_elements` trying selectors in priority order
//!
//! Usage (browser started with `--remote-debugging-port=9222`):
//!   cargo run --example extract
//!   cargo run --example extract -- --port 9333 --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use cdp_session::{BrowserSession, ConnectOptions, ExtractOptions, Result};
use common::Args;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Extract ===\n");

    let session = BrowserSession::default();
    session
        .connect(ConnectOptions::new("localhost", args.port))
        .await?;

    session.open("https://example.com", None).await?;

    // DOM-domain path: query one node and inspect it.
    if let Some(node) = session.dom_query_selector("a", None).await? {
        let attributes = session.dom_get_attributes(&node).await?;
        let text = session.dom_get_text_content(&node).await?;
        println!("[Node] a (id {})", node.node_id());
        println!("       text: {}", text.trim());
        for (name, value) in &attributes {
            println!("       {name}={value}");
        }
    }

    // Batch path: first selector with any matches wins.
    let descriptors = session
        .extract_elements(
            &["article", "main p", "p"],
            ExtractOptions {
                max_elements: 10,
                ..ExtractOptions::default()
            },
        )
        .await?;

    println!("\n[Extract] {} element(s)", descriptors.len());
    for descriptor in &descriptors {
        let text = descriptor.text.as_deref().unwrap_or("");
        let preview: String = text.chars().take(60).collect();
        println!("  [{}] {preview}", descriptor.selector);
    }

    session.disconnect().await;
    Ok(())
}
