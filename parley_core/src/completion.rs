//! Request and response shapes for OpenAI-compatible chat completions.
//!
//! Responses are decoded into these types at the provider boundary. Every
//! field is optional or defaulted so a sparse payload still decodes; callers
//! decide what a missing choice or missing content means.
//!
//! Models do not always honor the wire types: `arguments` may arrive as an
//! object and `content` as structured JSON. Those values are kept as their
//! JSON text instead of failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ChatMessage;

/// A callable function exposed to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Forces the model to invoke one named function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCallDirective {
    pub name: String,
}

impl FunctionCallDirective {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One chat completion request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallDirective>,
}

impl ChatRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.0,
            max_tokens: 512,
            functions: None,
            function_call: None,
        }
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Expose `function` and force the model to call it.
    #[must_use]
    pub fn with_forced_function(mut self, function: FunctionDefinition) -> Self {
        self.function_call = Some(FunctionCallDirective::named(function.name.clone()));
        self.functions = Some(vec![function]);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Message of the first choice, if the model returned any.
    #[must_use]
    pub fn first_message(&self) -> Option<&AssistantMessage> {
        self.choices.first().map(|c| &c.message)
    }

    /// Text content of the first choice, or an empty string.
    #[must_use]
    pub fn first_content(&self) -> &str {
        self.first_message()
            .and_then(|m| m.content.as_deref())
            .unwrap_or("")
    }

    /// Convenience constructor for a single plain-text reply.
    #[must_use]
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                index: 0,
                message: AssistantMessage {
                    content: Some(content.into()),
                    ..AssistantMessage::default()
                },
                finish_reason: Some("stop".to_string()),
            }],
            ..Self::default()
        }
    }

    /// Convenience constructor for a single legacy function-call reply.
    #[must_use]
    pub fn from_function_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                index: 0,
                message: AssistantMessage {
                    function_call: Some(FunctionCall {
                        name: Some(name.into()),
                        arguments: arguments.into(),
                    }),
                    ..AssistantMessage::default()
                },
                finish_reason: Some("function_call".to_string()),
            }],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: AssistantMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssistantMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Function invocation with its arguments serialized as a JSON string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub arguments: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// JSON text of `value`; strings pass through unquoted, null is `None`.
fn json_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(json_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(json_text(Value::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use serde_json::json;

    #[test]
    fn request_omits_absent_functions() {
        let request = ChatRequest::new("m", vec![ChatMessage::user("hi")]).with_max_tokens(10);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["max_tokens"], 10);
        assert!(value.get("functions").is_none());
        assert!(value.get("function_call").is_none());
    }

    #[test]
    fn forced_function_sets_directive() {
        let function = FunctionDefinition {
            name: "f".to_string(),
            description: "d".to_string(),
            parameters: json!({"type": "object"}),
        };
        let request =
            ChatRequest::new("m", vec![ChatMessage::new(Role::User, "x")]).with_forced_function(function);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["function_call"], json!({"name": "f"}));
        assert_eq!(value["functions"][0]["name"], "f");
    }

    #[test]
    fn sparse_response_decodes() {
        let completion: ChatCompletion = serde_json::from_value(json!({})).unwrap();
        assert!(completion.first_message().is_none());
        assert_eq!(completion.first_content(), "");

        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"tool_calls": [{"id": "c1", "type": "function",
                "function": {"name": "f", "arguments": "{}"}}]}}]
        }))
        .unwrap();
        let message = completion.first_message().unwrap();
        assert!(message.content.is_none());
        assert_eq!(message.tool_calls.as_ref().unwrap()[0].function.arguments, "{}");
    }

    #[test]
    fn non_string_arguments_and_content_are_kept_as_json_text() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [
                {"message": {"function_call": {"name": "f", "arguments": {"age": "25"}}}},
                {"message": {"content": {"name": "Rohit"}}},
                {"message": {"content": null, "function_call": {"name": "f", "arguments": null}}}
            ]
        }))
        .unwrap();

        let arguments = &completion.choices[0].message.function_call.as_ref().unwrap().arguments;
        assert_eq!(serde_json::from_str::<Value>(arguments).unwrap(), json!({"age": "25"}));

        let content = completion.choices[1].message.content.as_deref().unwrap();
        assert_eq!(serde_json::from_str::<Value>(content).unwrap(), json!({"name": "Rohit"}));

        let message = &completion.choices[2].message;
        assert!(message.content.is_none());
        assert_eq!(message.function_call.as_ref().unwrap().arguments, "");
    }
}
