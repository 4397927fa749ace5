//! Convert example - import a bookmark export and write it back out
//!
//! ```text
//! RUST_LOG=bookmark_exchange=debug cargo run --example convert -- bookmarks.html [--json]
//! ```

use bookmark_exchange::{import_bookmarks, BookmarkSerializer, Outline, ParserConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: convert <bookmarks.html> [--json]")?;
    let as_json = args.any(|arg| arg == "--json");

    let html = tokio::fs::read_to_string(&path).await?;

    // Ctrl-C aborts a long import
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let items = import_bookmarks(html, ParserConfig::default(), &cancel).await?;
    let count: usize = items.iter().map(|item| item.bookmark_count()).sum();
    eprintln!("Imported {} bookmarks from {}", count, path);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    eprint!("{}", Outline(&items));

    let exported = BookmarkSerializer::new()
        .serialize_with_cancellation(items, &cancel)
        .await?;
    print!("{}", exported);

    Ok(())
}
