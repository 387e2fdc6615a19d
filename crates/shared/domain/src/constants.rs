//! Well-known names and defaults.

/// Persisted key holding the number of completed registrations as decimal text.
pub const COUNTER_KEY: &str = "registrationCounter";

/// Persisted key holding a JSON array of lowercase registered emails.
pub const EMAIL_LIST_KEY: &str = "registeredEmailList";

/// Seats available on the trip.
pub const DEFAULT_CAPACITY: u32 = 10;

/// The word a human types to pass the captcha.
pub const DEFAULT_CAPTCHA_ANSWER: &str = "GOA";

/// Delay between the success panel and the trip-full panel once the last seat is taken.
pub const DEFAULT_FULL_PANEL_DELAY_MS: u64 = 3000;

/// Third-party form endpoint receiving submissions.
pub const DEFAULT_ENDPOINT: &str = "https://formsubmit.co/ajax/registrations@goafriendstrip.com";
