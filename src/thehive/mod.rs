pub mod client;
pub mod model;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ApiError;

pub use client::TheHiveClient;
pub use model::{
    CustomFieldValue, HiveAlert, HiveAttachment, HiveCase, HiveObservable, HiveTask, HiveTaskLog,
};

/// Read access to the legacy case-management system.
#[async_trait]
pub trait LegacySource: Send + Sync {
    /// All alerts, newest first.
    async fn find_alerts(&self) -> Result<Vec<HiveAlert>, ApiError>;

    /// All cases, newest first.
    async fn find_cases(&self) -> Result<Vec<HiveCase>, ApiError>;

    async fn case_observables(&self, case_id: &str) -> Result<Vec<HiveObservable>, ApiError>;

    async fn case_tasks(&self, case_id: &str) -> Result<Vec<HiveTask>, ApiError>;

    async fn task_logs(&self, task_id: &str) -> Result<Vec<HiveTaskLog>, ApiError>;

    async fn download_attachment(&self, attachment_id: &str) -> Result<Bytes, ApiError>;
}
