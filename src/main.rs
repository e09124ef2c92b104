//! Pinpoint demonstration
//!
//! Places a target near a reference location in a simulated world, runs a
//! pinpoint against it and prints the fix as JSON.
//!
//! Usage: `pinpoint [config.json]`. Log verbosity follows `RUST_LOG`.

use std::sync::Arc;

use pinpoint::{
    CoordinateTransform, InMemoryProfileRepository, Location, PinpointConfig, PinpointOrchestrator,
    SearchDistanceProbe, SimulatedProximitySearch, TargetId,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PinpointConfig::from_file(path)?,
        None => PinpointConfig::default(),
    };

    println!("=== Pinpoint Demo ===\n");

    let reference = Location::new(37.7749, -122.4194); // San Francisco
    let target = TargetId::from(424242u64);
    let hidden_at = reference.offset(0.0023, -0.0031);

    let search = SimulatedProximitySearch::new()
        .with_entity(target.clone(), hidden_at)
        .with_entity(1001u64, reference.offset(-0.002, 0.001))
        .with_hidden_entity(1002u64, reference.offset(0.001, 0.002));
    let probe = SearchDistanceProbe::from_config(search, Arc::new(InMemoryProfileRepository::new()), &config);
    let orchestrator = PinpointOrchestrator::with_config(probe, &config);

    let fix = orchestrator.pinpoint_fix(reference, &target).await?;
    let error_m = CoordinateTransform::with_radius(config.earth_radius_km).surface_distance(&fix.location, &hidden_at) * 1000.0;

    println!("{}", serde_json::to_string_pretty(&fix)?);
    println!("\nTrue location: {}", hidden_at);
    println!("Located:       {}", fix.location);
    println!("Error:         {:.3} m", error_m);
    println!("Profiles cached during probing: {}", orchestrator.probe().repository().cached_count());

    Ok(())
}
