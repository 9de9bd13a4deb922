//! f3kdb - flash3kyuu deband host
//!
//! Raw planar clip processing around the `f3kdb-core` debanding engine.
//! The binary is a thin CLI; the modules are public so tests can drive them.

pub mod error;
pub mod models;
pub mod services;
