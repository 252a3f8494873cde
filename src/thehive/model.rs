//! Records of the TheHive REST API, decoded leniently.
//!
//! Enumeration levels and nullable collections never fail decoding: anything
//! unexpected becomes `None` or empty and the mappers apply their fallbacks.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveCase {
    pub id: String,
    pub case_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub severity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub tlp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub pap: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "custom_fields")]
    pub custom_fields: Vec<(String, CustomFieldValue)>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub flag: bool,
    #[serde(default)]
    pub resolution_status: Option<String>,
    #[serde(default)]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveAlert {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub severity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub tlp: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_ref: Option<String>,
    #[serde(rename = "type", default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub last_sync_date: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveObservable {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub data_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ioc: bool,
    #[serde(default)]
    pub attachment: Option<HiveAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveTask {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub group: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveTaskLog {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub attachment: Option<HiveAttachment>,
}

/// A file stored in the TheHive datastore; `id` is its content hash.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveAttachment {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub hashes: Vec<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Value of a case custom field.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomFieldValue {
    String(String),
    Boolean(bool),
    /// Epoch milliseconds.
    Date(i64),
    Integer(i64),
    Float(f64),
}

/// The wire form: one slot per type, at most one expected to be set.
#[derive(Debug, Default, Deserialize)]
struct CustomFieldSlots {
    #[serde(default)]
    string: Option<String>,
    #[serde(default)]
    boolean: Option<bool>,
    #[serde(default)]
    date: Option<i64>,
    #[serde(default)]
    integer: Option<i64>,
    #[serde(default)]
    float: Option<f64>,
}

impl CustomFieldSlots {
    fn into_value(self) -> Option<CustomFieldValue> {
        if let Some(v) = self.string {
            Some(CustomFieldValue::String(v))
        } else if let Some(v) = self.boolean {
            Some(CustomFieldValue::Boolean(v))
        } else if let Some(v) = self.date {
            Some(CustomFieldValue::Date(v))
        } else if let Some(v) = self.integer {
            Some(CustomFieldValue::Integer(v))
        } else {
            self.float.map(CustomFieldValue::Float)
        }
    }
}

fn custom_fields<'de, D>(deserializer: D) -> Result<Vec<(String, CustomFieldValue)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default();

    let mut fields = Vec::with_capacity(raw.len());
    for (name, value) in raw {
        let slots = Option::<CustomFieldSlots>::deserialize(value)
            .map_err(|e| D::Error::custom(format!("custom field `{}`: {}", name, e)))?;
        if let Some(value) = slots.and_then(CustomFieldSlots::into_value) {
            fields.push((name, value));
        }
    }
    Ok(fields)
}

/// Integers and integral floats are levels, everything else is unknown.
fn lenient_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    })
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn case_json() -> Value {
        json!({
            "_id": "~16416",
            "id": "~16416",
            "createdBy": "jonas@thehive.local",
            "createdAt": 1638704013583i64,
            "updatedAt": 1638704061151i64,
            "_type": "case",
            "caseId": 1,
            "title": "My Test 1",
            "description": "My Testcase",
            "severity": 2,
            "startDate": 1638703980000i64,
            "endDate": null,
            "resolutionStatus": null,
            "tags": [],
            "flag": false,
            "tlp": 2,
            "pap": 2,
            "status": "Open",
            "summary": null,
            "owner": "jonas@thehive.local",
            "customFields": {}
        })
    }

    #[test]
    fn test_case_parsing() {
        let case: HiveCase = serde_json::from_value(case_json()).unwrap();
        assert_eq!(case.case_id, 1);
        assert_eq!(case.severity, Some(2));
        assert_eq!(case.status, "Open");
        assert!(case.summary.is_none());
        assert!(case.end_date.is_none());
        assert!(case.custom_fields.is_empty());
    }

    #[test]
    fn test_levels_decode_leniently() {
        let mut raw = case_json();
        raw["severity"] = json!("high");
        raw["tlp"] = json!(3.0);
        raw["pap"] = json!(1.5);

        let case: HiveCase = serde_json::from_value(raw).unwrap();
        assert_eq!(case.severity, None);
        assert_eq!(case.tlp, Some(3));
        assert_eq!(case.pap, None);
    }

    #[test]
    fn test_null_collections_become_empty() {
        let mut raw = case_json();
        raw["tags"] = Value::Null;
        raw["customFields"] = Value::Null;
        raw["flag"] = Value::Null;

        let case: HiveCase = serde_json::from_value(raw).unwrap();
        assert!(case.tags.is_empty());
        assert!(case.custom_fields.is_empty());
        assert!(!case.flag);
    }

    #[test]
    fn test_custom_fields_keep_order_and_type() {
        let mut raw = case_json();
        raw["customFields"] = json!({
            "ticket_ref": {"string": "ABC", "order": 0},
            "is_vip": {"boolean": true, "order": 1},
            "detected": {"date": 1638703980000i64},
            "hosts": {"integer": 12},
            "score": {"float": 0.5},
            "empty": {"string": null},
        });

        let case: HiveCase = serde_json::from_value(raw).unwrap();
        assert_eq!(
            case.custom_fields,
            vec![
                ("ticket_ref".to_string(), CustomFieldValue::String("ABC".to_string())),
                ("is_vip".to_string(), CustomFieldValue::Boolean(true)),
                ("detected".to_string(), CustomFieldValue::Date(1638703980000)),
                ("hosts".to_string(), CustomFieldValue::Integer(12)),
                ("score".to_string(), CustomFieldValue::Float(0.5)),
            ]
        );
    }

    #[test]
    fn test_custom_field_first_populated_slot_wins() {
        let mut raw = case_json();
        raw["customFields"] = json!({"both": {"integer": 3, "string": "three"}});

        let case: HiveCase = serde_json::from_value(raw).unwrap();
        assert_eq!(
            case.custom_fields,
            vec![("both".to_string(), CustomFieldValue::String("three".to_string()))]
        );
    }

    #[test]
    fn test_task_log_with_attachment() {
        let log: HiveTaskLog = serde_json::from_value(json!({
            "_id": "~24656",
            "id": "~24656",
            "createdBy": "jonas@thehive.local",
            "createdAt": 1638729992590i64,
            "_type": "case_task_log",
            "message": "asd",
            "attachment": {
                "name": "Chemistry Vector.eps",
                "hashes": ["adf2d4cd72f4141fe7f8eb4af035596415a29c048d3039be6449008f291258e9"],
                "size": 3421842,
                "contentType": "application/postscript",
                "id": "adf2d4cd72f4141fe7f8eb4af035596415a29c048d3039be6449008f291258e9"
            },
            "status": "Ok"
        }))
        .unwrap();

        let attachment = log.attachment.unwrap();
        assert_eq!(attachment.name, "Chemistry Vector.eps");
        assert_eq!(attachment.size, Some(3421842));
        assert_eq!(log.created_by, "jonas@thehive.local");
    }
}
