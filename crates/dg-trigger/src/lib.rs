//! # dg-trigger
//!
//! Receives contact-flow events and starts one Deepgram integrator session
//! per contact.
//!
//! - [`handler::TriggerHandler`]: event → DG params → integrator payload → launcher
//! - [`server::TriggerServer`]: `POST /invoke` and `GET /health` over axum
//!
//! The `dg-trigger` binary wires settings, logging and the launcher together
//! and either serves HTTP or handles a single event from a file.

#![deny(unsafe_code)]

pub mod errors;
pub mod handler;
pub mod health;
pub mod server;

pub use errors::TriggerError;
pub use handler::TriggerHandler;
pub use server::TriggerServer;
