use std::collections::BTreeMap;

/// Optional sink for analytics events. A controller without one simply
/// skips the call.
pub trait AnalyticsHook: Send + Sync {
    fn track(
        &self,
        event: &str,
        attributes: &BTreeMap<String, String>,
    );
}

pub const SUBMIT_EVENT: &str = "form_submit";

/// Attributes sent with [`SUBMIT_EVENT`].
pub fn submit_attributes() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("event_category".to_string(), "estimates".to_string()),
        (
            "event_label".to_string(),
            "estimate_request_completed".to_string(),
        ),
    ])
}
