use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusEvent {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "startDate")]
    pub date: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<u32>,
    pub registered_count: Option<u32>,
}

impl CampusEvent {
    pub fn spots_display(&self) -> String {
        match (self.registered_count, self.capacity) {
            (Some(registered), Some(capacity)) => format!("{}/{}", registered, capacity),
            (None, Some(capacity)) => format!("?/{}", capacity),
            _ => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub id: Id,
    pub event_id: Option<Id>,
    pub event_title: Option<String>,
    pub status: Option<String>,
    pub qr_code: Option<String>,
}
