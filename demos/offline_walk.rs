//! Offline walk example
//!
//! Walks a small hand-written link graph and prints each expanded article.
//!
//! Run with: `cargo run --example offline_walk`

use std::sync::Arc;
use std::time::Duration;
use wikiwalk::source::MemoryGraph;
use wikiwalk::{WalkConfig, Walker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🦀 wikiwalk offline example\n");

    // Build a link graph:
    //   Rust → Mozilla → Firefox → Web browser
    //   Rust → LLVM → Clang → Apple → Safari → Web browser
    //   Rust → Category:Languages (not an article) → Web browser
    let graph = MemoryGraph::from_edge_list(&[
        ("Rust", "Mozilla"),
        ("Rust", "LLVM"),
        ("Rust", "Category:Languages"),
        ("Mozilla", "Firefox"),
        ("Firefox", "Web browser"),
        ("LLVM", "Clang"),
        ("Clang", "Apple"),
        ("Apple", "Safari"),
        ("Safari", "Web browser"),
        ("Category:Languages", "Web browser"),
    ])
    .with_ineligible("Category:Languages")
    .with_alias("Rust (programming language)", "Rust")
    .with_latency("Mozilla", Duration::from_millis(20))
    .with_page_size(1);

    println!(
        "✅ Link graph: {} articles, {} links",
        graph.graph().num_nodes(),
        graph.graph().num_edges()
    );

    let walker = Walker::new(Arc::new(graph))
        .with_config(WalkConfig::default().with_max_in_flight(4))
        .on_expand(|event| {
            println!(
                "  expanding {:<20} depth {} ({} links)",
                event.title, event.depth, event.links
            );
        });

    println!("\n🔍 Walking Rust (programming language) → Web browser");
    let (path, stats) = walker
        .walk_with_stats("Rust (programming language)", "Web browser")
        .await?;

    match path {
        Some(path) => println!("\n✅ {path} ({} hops)", path.hops()),
        None => println!("\n❌ No path"),
    }
    println!(
        "   {} expanded, {} fetched, {} unavailable",
        stats.expanded, stats.dispatched, stats.unavailable
    );

    Ok(())
}
