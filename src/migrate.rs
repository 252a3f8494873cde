//! Migration of a TheHive instance into Catalyst.
//!
//! The run is sequential and not resumable: alerts are created first, then
//! every case is staged with its observables, task logs and attachments, and
//! finally all incidents are created in one batch. A failure aborts the run and
//! leaves whatever was already created in place.

use log::{debug, info};
use serde::Serialize;

use crate::catalyst::{FileRef, Ticket, TicketSink, bucket_name};
use crate::config::MigrationConfig;
use crate::error::{ConfigError, Result};
use crate::mapping::{map_alert, map_case, map_observable, map_task_log};
use crate::storage::ObjectStore;
use crate::thehive::{HiveAttachment, HiveCase, LegacySource};

#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Base url of the TheHive web interface, used for back references.
    pub thehive_url: String,
    pub keep_ids: bool,
    pub skip_files: bool,
}

impl From<&MigrationConfig> for MigrationOptions {
    fn from(config: &MigrationConfig) -> Self {
        Self {
            thehive_url: config.thehive_url.clone(),
            keep_ids: config.keep_ids,
            skip_files: config.skip_files,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub alerts: usize,
    pub incidents: usize,
    pub artifacts: usize,
    pub comments: usize,
    pub files: usize,
    pub deleted: usize,
}

pub struct Migration<'a> {
    source: &'a dyn LegacySource,
    sink: &'a dyn TicketSink,
    store: Option<&'a dyn ObjectStore>,
    options: MigrationOptions,
}

impl<'a> Migration<'a> {
    pub fn new(
        source: &'a dyn LegacySource,
        sink: &'a dyn TicketSink,
        store: Option<&'a dyn ObjectStore>,
        options: MigrationOptions,
    ) -> Self {
        Self {
            source,
            sink,
            store,
            options,
        }
    }

    pub async fn run(&self) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();

        report.alerts = self.migrate_alerts().await?;

        info!("🔎 finding incidents");
        let cases = self.source.find_cases().await?;
        let mut incidents = Vec::with_capacity(cases.len());
        for case in &cases {
            let incident = self.stage_incident(case).await?;
            report.artifacts += incident.artifacts.len();
            report.comments += incident.comments.len();
            report.files += incident.files.len();
            incidents.push(incident);
        }

        if !incidents.is_empty() {
            if self.options.keep_ids {
                info!("🗑️  deleting {} incidents before re-import", incidents.len());
                for id in incidents.iter().filter_map(|incident| incident.id) {
                    if self.sink.remove_ticket(id).await? {
                        report.deleted += 1;
                    }
                }
            }
            info!("📤 creating {} incidents", incidents.len());
            self.sink.create_tickets(&incidents).await?;
        }
        report.incidents = incidents.len();

        info!("✅ migration finished: {:?}", report);
        Ok(report)
    }

    async fn migrate_alerts(&self) -> Result<usize> {
        info!("🔎 finding alerts");
        let alerts: Vec<Ticket> = self
            .source
            .find_alerts()
            .await?
            .iter()
            .map(|alert| map_alert(alert, &self.options.thehive_url))
            .collect();

        if !alerts.is_empty() {
            info!("📤 creating {} alerts", alerts.len());
            self.sink.create_tickets(&alerts).await?;
        }
        Ok(alerts.len())
    }

    /// Maps a case and attaches its observables, task logs and files.
    async fn stage_incident(&self, case: &HiveCase) -> Result<Ticket> {
        debug!("staging case #{} ({})", case.case_id, case.id);
        let mut incident = map_case(case, &self.options.thehive_url, self.options.keep_ids);

        for observable in self.source.case_observables(&case.id).await? {
            incident.artifacts.push(map_observable(&observable));
        }

        for task in self.source.case_tasks(&case.id).await? {
            for log in self.source.task_logs(&task.id).await? {
                incident.comments.push(map_task_log(&task, &log));

                if self.options.skip_files {
                    continue;
                }
                if let Some(attachment) = &log.attachment {
                    incident.files.push(FileRef {
                        key: attachment.id.clone(),
                        name: attachment.name.clone(),
                    });
                    self.transfer_attachment(&incident, attachment).await?;
                }
            }
        }

        Ok(incident)
    }

    async fn transfer_attachment(&self, incident: &Ticket, attachment: &HiveAttachment) -> Result<()> {
        let store = self.store.ok_or(ConfigError::Missing("minio_host"))?;
        // buckets are named after the target ticket id, which only keep_ids fixes in advance
        let ticket_id = incident.id.ok_or_else(|| ConfigError::Invalid {
            name: "keep_ids",
            message: format!(
                "attachment {} of {:?} needs keep_ids to be transferred, or set skip_files",
                attachment.name, incident.name
            ),
        })?;

        let bucket = bucket_name(ticket_id);
        store.ensure_bucket(&bucket).await?;

        debug!("transferring attachment {} ({})", attachment.name, attachment.id);
        let content = self.source.download_attachment(&attachment.id).await?;
        store.put_object(&bucket, &attachment.id, content).await?;
        Ok(())
    }
}
