/// Helper macro to avoid retyping the base domain-like name of our system when creating further
/// string constants from it. When given no parameters, this returns the base domain-like name of
/// the system. When given a string literal parameter it adds `/parameter` to the end.
macro_rules! reqsync {
    () => {
        "reqsync.dev"
    };
    ($s:literal) => {
        concat!(reqsync!(), "/", $s)
    };
}

// System identifiers
pub const REQSYNC: &str = reqsync!();
pub const DEFAULT_FIELD_MANAGER: &str = "reqsync";

// Top-level document keys
pub const SPEC: &str = "spec";
pub const STATUS: &str = "status";
pub const CONDITIONS: &str = "conditions";

// Well-known spec fields
pub const WRITE_CONNECTION_SECRET_TO_REF: &str = "writeConnectionSecretToRef";
pub const RESOURCE_REF: &str = "resourceRef";

/// Spec fields that only have meaning on the side that owns them. These are never copied from the
/// local requirement to the remote one and never late-initialized from the remote one.
pub const SPEC_EXCLUDED_FIELDS: &[&str] = &[WRITE_CONNECTION_SECRET_TO_REF, RESOURCE_REF];

// Label keys
pub const LABEL_OWNER_NAME: &str = reqsync!("owner-name");
pub const LABEL_OWNER_UID: &str = reqsync!("owner-uid");

// Condition types
pub const CONDITION_READY: &str = "Ready";
pub const CONDITION_SYNCED: &str = "Synced";

// Standard tags https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
pub const APP_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

#[test]
fn reqsync_constants_macro_test() {
    assert_eq!("reqsync.dev", reqsync!());
    assert_eq!("reqsync.dev/owner-uid", LABEL_OWNER_UID);
    assert_eq!("reqsync.dev/foo", reqsync!("foo"));
}
