//! # dg-core
//!
//! Turns contact attributes into the query params of a Deepgram streaming
//! session.
//!
//! - **Scanner**: [`scanner::scan`] splits an escaped, space-delimited value
//!   into tokens
//! - **Normalizer**: [`params::normalize_attributes`] keeps `dg_` attributes
//!   and converts each into a [`ParamValue`]
//! - **Post-processor**: [`postprocess::post_process`] fills in the callback
//!   URL and injects the integration tag
//! - **Wire types**: [`event`] holds the inbound event, the integrator payload
//!   and the contact-flow result
//!
//! ```text
//! {"dg_model": "nova", "dg_tag": "a b\\ c"}
//!   →   {"model": "nova", "tag": ["a", "b c", "dg_amazonconnect"]}
//! ```

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod event;
pub mod params;
pub mod postprocess;
pub mod scanner;

pub use errors::{ParamsError, Result};
pub use event::{ContactFlowEvent, IntegratorPayload, KvsStream, LambdaResult, PayloadError};
pub use params::{ParamSet, ParamValue};

use serde_json::Value;

/// Derive the DG params for one contact.
///
/// `raw_attributes` is the contact's attribute container as received; `None`
/// and `null` count as empty. Either the full param set is returned or an
/// error, never a partial result.
pub fn build_dg_params(raw_attributes: Option<&Value>, contact_id: &str) -> Result<ParamSet> {
    let params = params::normalize_attributes(raw_attributes)?;
    if params.is_empty() {
        tracing::info!(
            contact_id,
            "no `dg_` contact attributes were set; add some to customize Deepgram"
        );
    }
    postprocess::post_process(params, contact_id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
