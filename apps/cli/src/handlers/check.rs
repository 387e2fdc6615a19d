use super::open_store;
use anyhow::{Result, bail};
use trip_kernel::domain::config::AppConfig;
use trip_kernel::domain::fields::Field;
use trip_registration::{EMAIL_TAKEN_ON_SUBMIT, Mode, RegistrationStore, Validators, Verdict};

/// Validates a single value; email is also checked against the registered list.
pub async fn check_field(config: &AppConfig, field: Field, value: &str) -> Result<()> {
    let validators = Validators::new(&config.trip.captcha_answer);

    if let Verdict::Invalid(message) = validators.check(field, value, Mode::Submit) {
        bail!("{field}: {message}");
    }

    if field == Field::Email {
        let store = RegistrationStore::open(open_store(config).await?, config.trip.capacity).await?;
        if store.is_duplicate(value) {
            bail!("{field}: {EMAIL_TAKEN_ON_SUBMIT}");
        }
    }

    println!("{field}: ok");
    Ok(())
}
