//! Walks through the four operations against the configured backend.
//!
//! ```bash
//! RUST_LOG=rscodex=debug cargo run -p rscodex --example quickstart
//! ```
//!
//! Set `RSCODEX_CODEX_MODEL` or `RSCODEX_CODEX_CLI` to point at a different
//! model or binary.

use rscodex::{Coder, ExecOutcome};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let coder = Coder::new("codex")?;
    println!("Using {}", coder.check_health().await?);

    let generated = coder
        .generate("Write a Python function add(a, b) that returns a + b", &[])
        .await?;
    println!("--- generate ---\n{}", generated.best());

    let explained = coder.explain(generated.best()).await?;
    println!("--- explain ---\n{}", explained.text);

    let edited = coder
        .edit("def add(a,b):\n    return a", "Fix to return a + b", &[])
        .await?;
    println!("--- edit ---\n{}", edited.best());

    match coder.exec_command("ls -la", true).await? {
        ExecOutcome::Completed(result) => println!("--- exec ---\n{}", result.output),
        ExecOutcome::Cancelled => println!("--- exec ---\ncancelled"),
    }

    Ok(())
}
