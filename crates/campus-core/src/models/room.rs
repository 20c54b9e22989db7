use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: Id,
    pub building: Option<String>,
    pub room_number: Option<String>,
    pub capacity: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Classroom {
    pub fn label(&self) -> String {
        match (&self.building, &self.room_number) {
            (Some(building), Some(room)) => format!("{}-{}", building, room),
            (Some(s), None) | (None, Some(s)) => s.clone(),
            (None, None) => format!("Room {}", self.id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomReservation {
    pub id: Id,
    pub classroom_id: Option<Id>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub purpose: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomReservationRequest {
    pub classroom_id: Id,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub purpose: String,
}
