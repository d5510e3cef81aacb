//! Semantic rules applied after normalization.
//!
//! Two steps, in order:
//!
//! 1. [`apply_callback_template`] substitutes the contact ID into the
//!    `callback` URL.
//! 2. [`inject_integration_tag`] makes sure the integration marker is among
//!    the session tags.

use crate::constants::{CALLBACK_KEY, CONTACT_ID_PLACEHOLDER, INTEGRATION_TAG, TAG_KEY};
use crate::errors::{ParamsError, Result};
use crate::params::{ParamSet, ParamValue};

/// Run both post-processing steps.
pub fn post_process(mut params: ParamSet, contact_id: &str) -> Result<ParamSet> {
    apply_callback_template(&mut params, contact_id)?;
    inject_integration_tag(&mut params)?;
    Ok(params)
}

/// Replace every `{contact-id}` in the `callback` param with `contact_id`.
///
/// A multi-valued callback is rejected: there is no policy for which URL
/// Deepgram should call.
pub fn apply_callback_template(params: &mut ParamSet, contact_id: &str) -> Result<()> {
    let Some(callback) = params.get(CALLBACK_KEY) else {
        return Ok(());
    };

    let template = match callback {
        ParamValue::Scalar(url) => url,
        ParamValue::List(urls) => {
            return Err(ParamsError::MultipleCallbacks {
                values: urls.clone(),
            });
        }
    };

    if template.contains(CONTACT_ID_PLACEHOLDER) {
        let url = template.replace(CONTACT_ID_PLACEHOLDER, contact_id);
        let _ = params.insert(CALLBACK_KEY, ParamValue::Scalar(url));
    }
    Ok(())
}

/// Append [`INTEGRATION_TAG`] to the `tag` param unless it is already there.
///
/// Existing tags keep their order and the marker goes last. Idempotent.
pub fn inject_integration_tag(params: &mut ParamSet) -> Result<()> {
    let mut tags: Vec<String> = match params.get(TAG_KEY) {
        None => Vec::new(),
        Some(ParamValue::Scalar(tag)) => vec![tag.clone()],
        Some(ParamValue::List(tags)) if tags.len() >= 2 => tags.clone(),
        Some(ParamValue::List(tags)) => {
            return Err(ParamsError::Invariant(format!(
                "`{TAG_KEY}` list holds {} value(s), expected at least 2",
                tags.len()
            )));
        }
    };

    if !tags.iter().any(|t| t == INTEGRATION_TAG) {
        tags.push(INTEGRATION_TAG.to_string());
    }

    let value = ParamValue::from_tokens(tags).ok_or_else(|| {
        ParamsError::Invariant(format!("`{TAG_KEY}` is empty after injection"))
    })?;
    let _ = params.insert(TAG_KEY, value);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
