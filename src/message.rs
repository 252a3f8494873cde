//! The process boundary shared by every automation program.
//!
//! A program receives one command line argument holding a JSON object and
//! prints exactly one JSON object to stdout. Automation "messages" carry the
//! task input under `payload`, credentials under `secrets` and correlation data
//! (for example the ticket that triggered the run) under `context`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Secrets;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Message<P> {
    pub payload: P,
    #[serde(default)]
    pub secrets: Secrets,
    #[serde(default)]
    pub context: Context,
}

impl<P: DeserializeOwned> Message<P> {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::Input(format!("invalid message: {}", e)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Context {
    pub ticket: Option<TicketRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketRef {
    pub id: i64,
}

/// Payload of programs that take a single free-form input value.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultPayload {
    pub default: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MigratePayload {
    pub thehiveurl: String,
    pub thehivekey: String,
    #[serde(default)]
    pub skip_files: bool,
    #[serde(default)]
    pub keep_ids: bool,
}

/// Result printed by programs that have nothing else to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Done {
    pub done: bool,
}

impl Done {
    pub fn new() -> Self {
        Self { done: true }
    }
}

impl Default for Done {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the program result to stdout as a single JSON line.
pub fn emit<T: Serialize>(result: &T) -> Result<()> {
    let line = serde_json::to_string(result).map_err(Error::Output)?;
    println!("{}", line);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_with_all_sections() {
        let raw = r#"{
            "payload": {"default": "hello"},
            "secrets": {"catalyst_apiurl": "http://catalyst/api", "catalyst_apikey": "k"},
            "context": {"ticket": {"id": 42, "name": "x"}, "playbook": "p"}
        }"#;

        let msg: Message<DefaultPayload> = Message::parse(raw).unwrap();
        assert_eq!(msg.payload.default, "hello");
        assert_eq!(msg.secrets.catalyst_apikey.as_deref(), Some("k"));
        assert_eq!(msg.context.ticket.as_ref().map(|t| t.id), Some(42));
        assert_eq!(msg.context.extra.get("playbook"), Some(&Value::from("p")));
    }

    #[test]
    fn test_parse_message_defaults_secrets_and_context() {
        let msg: Message<DefaultPayload> = Message::parse(r#"{"payload": {"default": "a"}}"#).unwrap();
        assert!(msg.context.ticket.is_none());
        assert!(msg.secrets.catalyst_apiurl.is_none());
    }

    #[test]
    fn test_parse_migrate_payload_flags_default_to_false() {
        let raw = r#"{"payload": {"thehiveurl": "http://hive", "thehivekey": "key"}}"#;
        let msg: Message<MigratePayload> = Message::parse(raw).unwrap();
        assert!(!msg.payload.skip_files);
        assert!(!msg.payload.keep_ids);
    }

    #[test]
    fn test_parse_rejects_missing_payload() {
        let result = Message::<DefaultPayload>::parse(r#"{"secrets": {}}"#);
        assert!(matches!(result, Err(Error::Input(_))));
    }

    #[test]
    fn test_done_serializes() {
        assert_eq!(serde_json::to_string(&Done::new()).unwrap(), r#"{"done":true}"#);
    }

    #[test]
    fn test_emit_unserializable_result() {
        let mut result = std::collections::HashMap::new();
        result.insert((1, 2), "tuple keys are not json object keys");

        assert!(matches!(emit(&result), Err(Error::Output(_))));
        assert!(emit(&Done::new()).is_ok());
    }
}
