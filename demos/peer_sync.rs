//! Example: two replicas of a graph editing offline, then syncing over JSON.
//!
//! Run with `RUST_LOG=debug cargo run --example peer_sync --features serde`
//! to see merge logging.

use lww_crdt::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn sync(local: &LWWGraph<String>, peer: &LWWGraph<String>) -> Result<(), Box<dyn std::error::Error>> {
    // What a peer would put on the wire
    let payload = serde_json::to_string(peer)?;
    info!(bytes = payload.len(), "received peer snapshot");

    let remote: LWWGraph<String> = serde_json::from_str(&payload)?;
    local.merge(&remote)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Route map shared by two field teams (LWW-Graph) ===\n");

    let north = LWWGraph::new();
    for town in ["Ashford", "Brook", "Carlow"] {
        north.add_vertex(town.to_string());
    }
    north.add_edge("Ashford".into(), "Brook".into())?;
    north.add_edge("Brook".into(), "Carlow".into())?;

    let south = LWWGraph::new();
    sync(&south, &north)?;
    println!("South after first sync: {:?}", sorted(south.get_all_vertices()));

    // Offline edits on both sides
    north.remove_edge("Brook".into(), "Carlow".into());
    south.add_vertex("Dunmore".to_string());
    south.add_edge("Carlow".into(), "Dunmore".into())?;
    south.add_edge("Ashford".into(), "Carlow".into())?;

    println!("\n--- Concurrent edits ---");
    println!("North: Brook-Carlow closed");
    println!("South: Dunmore added, Ashford-Carlow opened");

    sync(&north, &south)?;
    sync(&south, &north)?;

    println!("\n--- After sync ---");
    println!("North vertices: {:?}", sorted(north.get_all_vertices()));
    println!("South vertices: {:?}", sorted(south.get_all_vertices()));
    println!(
        "Brook-Carlow open: {}",
        north.edge_exists(&"Brook".into(), &"Carlow".into())
    );
    println!(
        "Route Ashford -> Dunmore: {:?}",
        north.find_path(&"Ashford".into(), &"Dunmore".into())?
    );
    println!("Replicas identical: {}", north == south);

    Ok(())
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}
