//! Translation of TheHive records into Catalyst tickets.

pub mod entities;
pub mod fields;
pub mod schema;

pub use entities::{map_alert, map_case, map_observable, map_task_log};
pub use fields::{Severity, Tlp, map_severity, map_status, map_time, map_tlp};
pub use schema::{DetailsSchema, synthesize};
