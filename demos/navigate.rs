//! Navigation, extraction and screenshot walkthrough.
//!
//! Demonstrates:
//! - Connecting to a running browser's debugging endpoint
//! - Navigating and waiting for a selector
//! - Reading text, URL and title
//! - Saving a viewport screenshot
//!
//! Usage (browser started with `--remote-debugging-port=9222`):
//!   cargo run --example navigate
//!   cargo run --example navigate -- --port 9333 --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use cdp_session::{BrowserSession, ConnectOptions, Result};
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
    println!("=== Navigate ===\n");

    let session = BrowserSession::default();
    session
        .connect(ConnectOptions::new("localhost", args.port))
        .await?;
    println!("[Connect] Attached to first page target");

    session.open("https://example.com", None).await?;
    session.wait_for_selector("h1", None).await?;

    let url = session.current_url().await?;
    let title = session.title().await?;
    println!("[Page] {title} ({url})");

    if let Some(heading) = session.get_text("h1").await? {
        println!("[Text] h1: {heading}");
    }

    session.save_screenshot("screenshot.png").await?;
    println!("[Screenshot] Saved to screenshot.png");

    session.disconnect().await;
    println!("\n[Done] Disconnected");
    Ok(())
}
