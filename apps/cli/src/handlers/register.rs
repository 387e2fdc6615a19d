use super::open_store;
use crate::args::RegisterArgs;
use anyhow::{Context, Result, bail};
use trip_kernel::domain::config::AppConfig;
use trip_kernel::domain::fields::Field;
use trip_registration::{
    Gatekeeper, GatekeeperSettings, HttpSubmitter, Panel, RegistrationError, UiEvent,
};

/// Drives one registration through the gatekeeper the way a visitor would: load the page,
/// type and leave each field, press submit, then wait out any delayed panel switch.
pub async fn register(config: &AppConfig, args: RegisterArgs) -> Result<()> {
    let submitter = HttpSubmitter::from_config(&config.submission)?;
    let store = open_store(config).await?;
    let mut gate = Gatekeeper::open(store, submitter, GatekeeperSettings::from(config)).await?;

    gate.dispatch(UiEvent::PageLoaded).await?;
    if gate.view().panel() == Panel::TripFull {
        bail!("Registration is closed: all {} spots have been filled", gate.store().capacity());
    }

    let typed = [
        (Field::Name, args.name),
        (Field::Email, args.email),
        (Field::Phone, args.phone),
        (Field::Captcha, args.captcha),
    ];
    for (field, value) in typed {
        gate.dispatch(UiEvent::Input { field, value }).await?;
        gate.dispatch(UiEvent::Blur(field)).await?;
    }
    let name = gate.view().form.name.clone();

    let follow_ups = match gate.dispatch(UiEvent::Submit).await {
        Ok(follow_ups) => follow_ups,
        Err(err) => {
            report_refusal(&mut gate, &err);
            return Err(err).context("Registration refused");
        },
    };

    println!("Registration received for {name}.");
    println!("Spots left: {}", gate.view().progress().spots_left);

    for follow_up in follow_ups {
        tokio::time::sleep(follow_up.after).await;
        gate.dispatch(follow_up.event).await?;
    }
    if gate.view().panel() == Panel::TripFull {
        println!("The trip is now full.");
    }
    Ok(())
}

fn report_refusal<K, S>(gate: &mut Gatekeeper<K, S>, err: &RegistrationError)
where
    K: trip_storage::KeyValueStore,
    S: trip_registration::Submitter,
{
    tracing::debug!(error = %err, "Registration refused");
    for (field, message) in gate.view().errored_fields() {
        eprintln!("  {field}: {message}");
    }
    if let Some(alert) = gate.view_mut().take_alert() {
        eprintln!("{alert}");
    }
}
