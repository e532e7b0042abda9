//! Resource endpoints. This server publishes no resources, so listing and reading
//! always return empty collections.

use serde_json::{json, Map, Value};

pub fn build_resources_list() -> Value {
    json!({ "resources": [] })
}

/// Any `uri` is accepted; nothing can be read.
pub fn handle_resources_read(_params: Option<&Map<String, Value>>) -> Value {
    json!({ "contents": [] })
}
