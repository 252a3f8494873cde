//! JSON Schema describing the `details` object of a migrated ticket.
//!
//! Every ticket starts from a fresh copy of the incident or alert template.
//! Case custom fields each add one property, and a later field replaces an
//! earlier property of the same name.

use serde_json::{Map, Value, json};

use super::fields::map_time;
use crate::thehive::CustomFieldValue;

const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";
const SCHEMA_ID: &str = "https://example.com/object1618746510.json";
const REQUIRED: [&str; 5] = ["severity", "description", "summary", "tlp", "pap"];

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsSchema {
    root: Map<String, Value>,
    properties: Map<String, Value>,
}

impl DetailsSchema {
    fn with_properties(properties: Map<String, Value>) -> Self {
        let mut root = Map::new();
        root.insert("definitions".to_string(), json!({}));
        root.insert("$schema".to_string(), json!(SCHEMA_DIALECT));
        root.insert("$id".to_string(), json!(SCHEMA_ID));
        root.insert("title".to_string(), json!("Default"));
        root.insert("type".to_string(), json!("object"));
        root.insert("required".to_string(), json!(REQUIRED));
        Self { root, properties }
    }

    pub fn incident() -> Self {
        let mut properties = Map::new();
        properties.insert("severity".to_string(), severity_property());
        properties.insert(
            "flag".to_string(),
            json!({ "title": "Flag", "type": "boolean", "x-cols": 6 }),
        );
        properties.insert("tlp".to_string(), level_property("tlp", "TLP"));
        properties.insert("pap".to_string(), level_property("pap", "PAP"));
        properties.insert(
            "tags".to_string(),
            json!({
                "$id": "#root/tags",
                "title": "Tags",
                "type": "array",
                "items": { "type": "string" }
            }),
        );
        properties.insert("description".to_string(), textarea_property("description", "Description"));
        properties.insert(
            "resolutionStatus".to_string(),
            text_property("resolutionStatus", "Resolution Status", 6),
        );
        properties.insert(
            "endDate".to_string(),
            json!({
                "$id": "#root/endDate",
                "title": "End Data",
                "type": "string",
                "format": "date-time",
                "x-cols": 6,
                "x-class": "pr-2"
            }),
        );
        properties.insert("summary".to_string(), textarea_property("summary", "Summary"));
        Self::with_properties(properties)
    }

    pub fn alert() -> Self {
        let mut properties = Map::new();
        properties.insert("severity".to_string(), severity_property());
        properties.insert("tlp".to_string(), level_property("tlp", "TLP"));
        properties.insert("source".to_string(), text_property("source", "Source", 4));
        properties.insert("sourceRef".to_string(), text_property("sourceRef", "Source Ref", 4));
        properties.insert("type".to_string(), text_property("type", "Type", 4));
        properties.insert("description".to_string(), textarea_property("description", "Description"));
        Self::with_properties(properties)
    }

    /// Adds (or replaces) the property describing a custom field.
    pub fn add_custom_field(&mut self, name: &str, value: &CustomFieldValue) {
        let property = match value {
            CustomFieldValue::String(_) => json!({ "type": "string", "x-cols": 6, "x-class": "pr-2" }),
            CustomFieldValue::Boolean(_) => json!({ "type": "boolean", "x-cols": 6, "x-class": "pr-2" }),
            CustomFieldValue::Date(_) => {
                json!({ "type": "string", "format": "date-time", "x-cols": 6, "x-class": "pr-2" })
            }
            CustomFieldValue::Integer(_) => json!({ "type": "integer", "x-cols": 6, "x-class": "pr-2" }),
            CustomFieldValue::Float(_) => json!({ "type": "number", "x-cols": 6, "x-class": "pr-2" }),
        };
        self.properties.insert(name.to_string(), property);
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn to_value(&self) -> Value {
        let mut root = self.root.clone();
        root.insert("properties".to_string(), Value::Object(self.properties.clone()));
        Value::Object(root)
    }

    /// The schema as shipped on a ticket: an opaque JSON string.
    pub fn render(&self) -> String {
        self.to_value().to_string()
    }
}

/// The details value carried for a custom field.
pub fn custom_field_detail(value: &CustomFieldValue) -> Value {
    match value {
        CustomFieldValue::String(s) => Value::from(s.as_str()),
        CustomFieldValue::Boolean(b) => Value::from(*b),
        CustomFieldValue::Date(millis) => map_time(Some(*millis)).map_or(Value::Null, Value::from),
        CustomFieldValue::Integer(i) => Value::from(*i),
        CustomFieldValue::Float(f) => Value::from(*f),
    }
}

/// Extends the incident template with the case's custom fields and returns
/// it together with the matching details.
pub fn synthesize(custom_fields: &[(String, CustomFieldValue)]) -> (DetailsSchema, Map<String, Value>) {
    let mut schema = DetailsSchema::incident();
    let mut details = Map::new();
    for (name, value) in custom_fields {
        schema.add_custom_field(name, value);
        details.insert(name.clone(), custom_field_detail(value));
    }
    (schema, details)
}

fn severity_property() -> Value {
    json!({
        "$id": "#root/severity",
        "title": "Severity",
        "type": "string",
        "default": "Medium",
        "x-cols": 6,
        "x-class": "pr-2",
        "x-display": "icon",
        "x-itemIcon": "icon",
        "oneOf": [
            { "const": "Unknown", "title": "Unknown", "icon": "mdi-help" },
            { "const": "Low", "title": "Low", "icon": "mdi-chevron-up" },
            { "const": "Medium", "title": "Medium", "icon": "mdi-chevron-double-up" },
            { "const": "High", "title": "High", "icon": "mdi-chevron-triple-up" },
            { "const": "Very High", "title": "Very High", "icon": "mdi-exclamation" }
        ]
    })
}

fn level_property(name: &str, title: &str) -> Value {
    json!({
        "$id": format!("#root/{}", name),
        "title": title,
        "type": "string",
        "x-cols": 6,
        "x-class": "pr-2",
        "x-display": "icon",
        "x-itemIcon": "icon",
        "oneOf": [
            { "const": "White", "title": "White", "icon": "mdi-alpha-w" },
            { "const": "Green", "title": "Green", "icon": "mdi-alpha-g" },
            { "const": "Amber", "title": "Amber", "icon": "mdi-alpha-a" },
            { "const": "Red", "title": "Red", "icon": "mdi-alpha-r" }
        ]
    })
}

fn text_property(name: &str, title: &str, cols: u8) -> Value {
    json!({
        "$id": format!("#root/{}", name),
        "title": title,
        "type": "string",
        "x-cols": cols,
        "x-class": "pr-2"
    })
}

fn textarea_property(name: &str, title: &str) -> Value {
    json!({
        "$id": format!("#root/{}", name),
        "title": title,
        "type": "string",
        "x-display": "textarea",
        "x-class": "pr-2"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property_names(schema: &DetailsSchema) -> Vec<String> {
        schema.properties().keys().cloned().collect()
    }

    #[test]
    fn test_incident_template() {
        let schema = DetailsSchema::incident();
        assert_eq!(
            property_names(&schema),
            vec![
                "severity",
                "flag",
                "tlp",
                "pap",
                "tags",
                "description",
                "resolutionStatus",
                "endDate",
                "summary"
            ]
        );

        let value = schema.to_value();
        assert_eq!(value["required"], json!(["severity", "description", "summary", "tlp", "pap"]));
        assert_eq!(value["$schema"], json!(SCHEMA_DIALECT));
        assert_eq!(value["properties"]["pap"]["$id"], json!("#root/pap"));
    }

    #[test]
    fn test_alert_template() {
        let schema = DetailsSchema::alert();
        assert_eq!(
            property_names(&schema),
            vec!["severity", "tlp", "source", "sourceRef", "type", "description"]
        );
        assert_eq!(schema.properties()["source"]["x-cols"], json!(4));
    }

    #[test]
    fn test_synthesize_adds_one_property_per_custom_field() {
        let custom_fields = vec![
            ("ticket_ref".to_string(), CustomFieldValue::String("ABC".to_string())),
            ("is_vip".to_string(), CustomFieldValue::Boolean(true)),
        ];

        let (schema, details) = synthesize(&custom_fields);

        let template = DetailsSchema::incident();
        let mut expected = property_names(&template);
        expected.push("ticket_ref".to_string());
        expected.push("is_vip".to_string());
        assert_eq!(property_names(&schema), expected);

        assert_eq!(schema.properties()["ticket_ref"]["type"], json!("string"));
        assert_eq!(schema.properties()["is_vip"]["type"], json!("boolean"));
        assert_eq!(details["ticket_ref"], json!("ABC"));
        assert_eq!(details["is_vip"], json!(true));
    }

    #[test]
    fn test_synthesize_typed_properties() {
        let custom_fields = vec![
            ("seen".to_string(), CustomFieldValue::Date(0)),
            ("hosts".to_string(), CustomFieldValue::Integer(3)),
            ("score".to_string(), CustomFieldValue::Float(0.25)),
        ];

        let (schema, details) = synthesize(&custom_fields);

        assert_eq!(
            schema.properties()["seen"],
            json!({ "type": "string", "format": "date-time", "x-cols": 6, "x-class": "pr-2" })
        );
        assert_eq!(schema.properties()["hosts"]["type"], json!("integer"));
        assert_eq!(schema.properties()["score"]["type"], json!("number"));
        assert_eq!(details["seen"], json!("1970-01-01T00:00:00Z"));
        assert_eq!(details["hosts"], json!(3));
        assert_eq!(details["score"], json!(0.25));
    }

    #[test]
    fn test_custom_field_replaces_template_property() {
        let custom_fields = vec![("summary".to_string(), CustomFieldValue::Integer(1))];
        let (schema, _) = synthesize(&custom_fields);

        assert_eq!(schema.properties().len(), DetailsSchema::incident().properties().len());
        assert_eq!(schema.properties()["summary"]["type"], json!("integer"));
    }

    #[test]
    fn test_templates_do_not_leak_between_cases() {
        let (first, _) = synthesize(&[("a".to_string(), CustomFieldValue::Boolean(false))]);
        let (second, _) = synthesize(&[]);

        assert!(first.properties().contains_key("a"));
        assert!(!second.properties().contains_key("a"));
    }

    #[test]
    fn test_render_is_a_json_string() {
        let rendered = DetailsSchema::alert().render();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["title"], json!("Default"));
        assert!(rendered.starts_with(r#"{"definitions":{},"$schema""#));
    }
}
