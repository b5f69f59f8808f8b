//! Decoding the model's structured reply into raw fields.
//!
//! Parsing is best effort on purpose: a missing or malformed payload becomes
//! an empty mapping so the pipeline always reaches validation, where absent
//! fields simply normalize to `None`.

use parley_core::ChatCompletion;
use serde_json::{Map, Value};
use tracing::debug;

/// Raw field mapping as returned by the model, before validation.
pub type RawFields = Map<String, Value>;

/// Where the parsed payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    FunctionCall,
    ToolCall,
    Content,
}

/// Extract the argument mapping from a completion.
///
/// Preference order: the legacy `function_call`, then the first tool call's
/// function, then the message text itself. Anything that does not decode to
/// a JSON object yields an empty mapping.
#[must_use]
pub fn parse_function_call_response(completion: &ChatCompletion) -> RawFields {
    let Some(message) = completion.first_message() else {
        debug!("Response has no choices, using empty field mapping");
        return RawFields::new();
    };

    let function = message.function_call.as_ref().map_or_else(
        || {
            message
                .tool_calls
                .as_ref()
                .and_then(|calls| calls.first())
                .map(|call| (PayloadSource::ToolCall, call.function.arguments.as_str()))
        },
        |call| Some((PayloadSource::FunctionCall, call.arguments.as_str())),
    );

    let (source, payload) = function.unwrap_or_else(|| {
        (
            PayloadSource::Content,
            message.content.as_deref().unwrap_or("{}"),
        )
    });

    decode_object(source, payload)
}

fn decode_object(source: PayloadSource, payload: &str) -> RawFields {
    // An empty arguments string means "no arguments".
    let payload = if payload.trim().is_empty() {
        "{}"
    } else {
        payload
    };

    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            debug!("{source:?} payload is not an object ({other}), using empty field mapping");
            RawFields::new()
        }
        Err(e) => {
            debug!("{source:?} payload failed to parse ({e}), using empty field mapping");
            RawFields::new()
        }
    }
}
