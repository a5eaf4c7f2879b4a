//! Bundled error-code lookup table and well-known business codes.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Business code: no authentication token was supplied.
pub const TOKEN_MISSING: i64 = 41001;
/// Business code: the supplied authentication token was rejected.
pub const TOKEN_INVALID: i64 = 41002;
/// Business code: the authenticated caller lacks permission.
pub const PERMISSION_DENIED: i64 = 41003;

static TABLE: OnceLock<HashMap<String, String>> = OnceLock::new();

const RAW_TABLE: &str = include_str!("codes.json");

/// Look up the user-facing message for a stringified HTTP/business error
/// code in the bundled table. Loaded lazily on first use.
pub fn lookup(code: i64) -> Option<&'static str> {
    let table = TABLE.get_or_init(|| {
        serde_json::from_str(RAW_TABLE).unwrap_or_else(|e| {
            tracing::error!(target: "relaykit::codes", "bundled error-code table is malformed: {e}");
            HashMap::new()
        })
    });
    table.get(&code.to_string()).map(String::as_str)
}
