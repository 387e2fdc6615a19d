//! Kernel utilities shared across slices.
//! Keep this crate lightweight; today it owns configuration loading.
//!
//! ## Config loading
//! ```rust,no_run
//! use trip_kernel::config::load_app_config;
//!
//! let cfg = load_app_config(Some("tripgate.toml")).unwrap();
//! assert!(cfg.trip.capacity > 0);
//! ```

pub mod config;

pub use trip_domain as domain;
