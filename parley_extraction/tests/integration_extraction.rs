//! End-to-end tests for the extraction pipeline.
//!
//! A scripted provider stands in for the model and an in-memory store stands
//! in for the database, so these run without network or disk access.

use std::sync::Mutex;

use async_trait::async_trait;
use parley_core::testing::ScriptedProvider;
use parley_core::{ChatCompletion, RecordStore, UserRecord};
use parley_extraction::{
    ExtractionConfig, ExtractionError, ExtractionPipeline, ValidationIssue,
};

#[derive(Default)]
struct MemoryStore {
    records: Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, record: &UserRecord) -> anyhow::Result<i64> {
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(i64::try_from(records.len())?)
    }
}

struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn save(&self, _record: &UserRecord) -> anyhow::Result<i64> {
        anyhow::bail!("disk full")
    }
}

fn function_reply(arguments: &str) -> ChatCompletion {
    ChatCompletion::from_function_call("extract_user_info", arguments)
}

#[tokio::test]
async fn spelled_out_age_is_fixed_by_retry() {
    let provider = ScriptedProvider::new()
        .then(function_reply(r#"{"age": "twenty-five"}"#))
        .then(function_reply(r#"{"age": "25"}"#));
    let pipeline = ExtractionPipeline::new(provider, ExtractionConfig::default());

    let outcome = pipeline
        .extract_with_retry("My age is twenty-five")
        .await
        .unwrap();

    assert_eq!(outcome.record.age, Some(25));
    assert!(outcome.error_tags().is_empty());
    assert_eq!(pipeline.provider().calls(), 2);
}

#[tokio::test]
async fn at_most_two_calls_and_second_only_for_age() {
    let scripts: [(&str, usize); 4] = [
        (r#"{"name": "Rohit", "phone": "9876543210"}"#, 1),
        (r#"{"email": "bad"}"#, 1),
        (r#"{"phone": "x"}"#, 1),
        (r#"{"age": "?"}"#, 2),
    ];

    for (arguments, expected_calls) in scripts {
        let provider = ScriptedProvider::new()
            .then(function_reply(arguments))
            .then(function_reply(arguments))
            .then(function_reply(arguments));
        let pipeline = ExtractionPipeline::new(provider, ExtractionConfig::default());

        pipeline.extract_with_retry("text").await.unwrap();

        assert_eq!(pipeline.provider().calls(), expected_calls, "{arguments}");
    }
}

#[tokio::test]
async fn retry_is_keyed_to_age_even_with_other_errors() {
    let provider = ScriptedProvider::new()
        .then(function_reply(r#"{"email": "bad", "age": "abc"}"#))
        .then(function_reply(r#"{"email": "bad", "age": "30"}"#));
    let pipeline = ExtractionPipeline::new(provider, ExtractionConfig::default());

    let outcome = pipeline.extract_with_retry("text").await.unwrap();

    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.errors, vec![ValidationIssue::BadEmail]);
    assert_eq!(outcome.record.age, Some(30));
}

#[tokio::test]
async fn tool_call_replies_are_accepted() {
    let reply: ChatCompletion = serde_json::from_str(
        r#"{"choices": [{"message": {"role": "assistant", "content": null, "tool_calls": [
            {"id": "call_1", "type": "function", "function": {"name": "extract_user_info",
             "arguments": "{\"name\": \"Saket Jadhav\", \"email\": \"saketjadhav25@gmail.com\", \"phone\": \"+91 7020328045\", \"location\": \"Pune\", \"age\": \"25\"}"}}
        ]}}]}"#,
    )
    .unwrap();
    let provider = ScriptedProvider::new().then(reply);
    let pipeline = ExtractionPipeline::new(provider, ExtractionConfig::default());

    let outcome = pipeline
        .extract_with_retry("Hello, my name is Saket Jadhav. My email is saketjadhav25@gmail.com, phone +91 7020328045. I'm 25 from Pune.")
        .await
        .unwrap();

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.record.name.as_deref(), Some("Saket Jadhav"));
    assert_eq!(outcome.record.location.as_deref(), Some("Pune"));
    assert_eq!(outcome.record.age, Some(25));
}

#[tokio::test]
async fn extracted_record_is_handed_to_store() {
    let provider = ScriptedProvider::new()
        .then(function_reply(r#"{"name": "Priya", "email": "not-an-email"}"#));
    let pipeline = ExtractionPipeline::new(provider, ExtractionConfig::default());
    let store = MemoryStore::default();

    let (outcome, id) = pipeline.extract_and_store("This is Priya.", &store).await.unwrap();

    assert_eq!(id, 1);
    assert_eq!(outcome.error_tags(), vec!["bad email"]);
    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], outcome.record);
}

#[tokio::test]
async fn store_failure_is_reported_as_storage_error() {
    let provider = ScriptedProvider::new().then(function_reply("{}"));
    let pipeline = ExtractionPipeline::new(provider, ExtractionConfig::default());

    let err = pipeline.extract_and_store("text", &FailingStore).await.unwrap_err();

    assert!(matches!(err, ExtractionError::Storage(_)));
}
