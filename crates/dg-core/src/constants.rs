//! Reserved names shared by the trigger and the integrator.

/// Contact attributes whose key starts with this prefix become DG params.
pub const ATTRIBUTE_PREFIX: &str = "dg_";

/// Tag appended to every session so Deepgram can attribute usage to this integration.
pub const INTEGRATION_TAG: &str = "dg_amazonconnect";

/// Placeholder in the `callback` param that is replaced with the contact ID.
pub const CONTACT_ID_PLACEHOLDER: &str = "{contact-id}";

/// Param key holding the callback URL template.
pub const CALLBACK_KEY: &str = "callback";

/// Param key holding the session tags.
pub const TAG_KEY: &str = "tag";

/// Expected `Name` of the contact-flow invocation event.
pub const CONTACT_FLOW_EVENT_NAME: &str = "ContactFlowEvent";
