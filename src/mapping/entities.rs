use serde_json::{Map, json};

use super::fields::{map_severity, map_status, map_time, map_tlp};
use super::schema::{DetailsSchema, synthesize};
use crate::catalyst::{Artifact, ArtifactStatus, Comment, Reference, Ticket, TicketType};
use crate::thehive::{HiveAlert, HiveCase, HiveObservable, HiveTask, HiveTaskLog};

/// Translates a TheHive case into an incident ticket.
///
/// Observables, task logs and files are attached later by the migration.
/// With `keep_ids` the ticket reuses the case number as its id.
pub fn map_case(case: &HiveCase, url: &str, keep_ids: bool) -> Ticket {
    let (schema, custom_details) = synthesize(&case.custom_fields);

    let mut details = Map::new();
    details.insert("tlp".to_string(), json!(map_tlp(case.tlp).as_str()));
    details.insert("pap".to_string(), json!(map_tlp(case.pap).as_str()));
    details.insert("severity".to_string(), json!(map_severity(case.severity).as_str()));
    details.insert("description".to_string(), json!(case.description));
    details.insert("summary".to_string(), json!(case.summary));
    details.insert("tags".to_string(), json!(case.tags));
    details.insert("endDate".to_string(), json!(map_time(case.end_date)));
    details.insert("resolutionStatus".to_string(), json!(case.resolution_status));
    details.insert("flag".to_string(), json!(case.flag));
    // custom fields take precedence
    details.extend(custom_details);

    Ticket {
        id: keep_ids.then_some(case.case_id),
        name: case.title.clone(),
        ticket_type: TicketType::Incident,
        status: map_status(&case.status),
        owner: case.owner.clone(),
        schema: schema.render(),
        details,
        references: vec![Reference {
            name: format!("TheHive #{}", case.case_id),
            href: format!(
                "{}/index.html#!/case/~{}/details",
                url,
                case.id.trim_start_matches('~')
            ),
        }],
        files: Vec::new(),
        comments: Vec::new(),
        artifacts: Vec::new(),
        created: map_time(case.created_at),
        modified: map_time(case.updated_at),
    }
}

pub fn map_alert(alert: &HiveAlert, url: &str) -> Ticket {
    let mut details = Map::new();
    details.insert("tlp".to_string(), json!(map_tlp(alert.tlp).as_str()));
    details.insert("severity".to_string(), json!(map_severity(alert.severity).as_str()));
    details.insert("description".to_string(), json!(alert.description));
    details.insert("source".to_string(), json!(alert.source));
    details.insert("sourceRef".to_string(), json!(alert.source_ref));
    details.insert("type".to_string(), json!(alert.alert_type));

    Ticket {
        id: None,
        name: alert.title.clone(),
        ticket_type: TicketType::Alert,
        status: map_status(&alert.status),
        owner: alert.user.clone(),
        schema: DetailsSchema::alert().render(),
        details,
        references: vec![Reference {
            name: "TheHive Alerts".to_string(),
            href: format!("{}/index.html#!/alert/list", url),
        }],
        files: Vec::new(),
        comments: Vec::new(),
        artifacts: Vec::new(),
        created: map_time(alert.created_at),
        modified: map_time(alert.last_sync_date),
    }
}

pub fn map_observable(observable: &HiveObservable) -> Artifact {
    // file observables carry no data, only an attachment
    let name = observable
        .data
        .clone()
        .or_else(|| observable.attachment.as_ref().map(|a| a.name.clone()))
        .unwrap_or_default();

    Artifact {
        name,
        artifact_type: observable.data_type.clone(),
        status: if observable.ioc {
            ArtifactStatus::Malicious
        } else {
            ArtifactStatus::Unknown
        },
    }
}

pub fn map_task_log(task: &HiveTask, log: &HiveTaskLog) -> Comment {
    let mut message = format!(
        "**{}: {}** ({})\n\n{}",
        task.group, task.title, task.status, log.message
    );
    if let Some(attachment) = &log.attachment {
        message.push_str("\n\n*Attachment*: ");
        message.push_str(&attachment.name);
    }

    Comment {
        creator: log.created_by.clone(),
        created: map_time(log.created_at),
        message,
    }
}
