//! # Domain Models
//!
//! Pure types shared by every `TripGate` crate, with minimal dependencies (`serde`,
//! `bitflags`). Keep it lean: no I/O, networking, or heavy logic, just data and simple
//! helpers.

pub mod config;
pub mod constants;
pub mod fields;
pub mod model;
