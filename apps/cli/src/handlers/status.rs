use super::open_store;
use anyhow::Result;
use std::io::Write;
use trip_kernel::domain::config::AppConfig;
use trip_registration::{FillTier, Progress, RegistrationStore};

/// Prints how many seats are taken and whether registration is still open.
pub async fn show(config: &AppConfig, json: bool) -> Result<()> {
    let store = RegistrationStore::open(open_store(config).await?, config.trip.capacity).await?;
    let progress = Progress::compute(store.count(), store.capacity());

    let mut out = std::io::stdout().lock();
    if json {
        let report = serde_json::json!({
            "count": store.count(),
            "capacity": store.capacity(),
            "full": store.is_full(),
            "progress": progress,
        });
        writeln!(out, "{report}")?;
        return Ok(());
    }

    writeln!(out, "Registrations: {} of {}", store.count(), store.capacity())?;
    writeln!(out, "Spots left: {}", progress.spots_left)?;
    writeln!(out, "Filled: {:.0}%", progress.fill_percent)?;
    let state = match progress.tier {
        _ if store.is_full() => "closed, the trip is full",
        FillTier::Open => "open",
        FillTier::Filling => "open, filling up",
        FillTier::Critical => "open, almost full",
    };
    writeln!(out, "Status: {state}")?;
    Ok(())
}
