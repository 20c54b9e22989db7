use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    pub id: Id,
    pub section_id: Option<Id>,
    pub course_code: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geofence_radius: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "Present"),
            AttendanceStatus::Late => write!(f, "Late"),
            AttendanceStatus::Absent => write!(f, "Absent"),
            AttendanceStatus::Excused => write!(f, "Excused"),
            AttendanceStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub session_id: Option<Id>,
    pub course_code: Option<String>,
    pub status: AttendanceStatus,
    pub check_in_time: Option<String>,
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckInRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// Share of sessions attended (present or late), ignoring excused absences.
pub fn attendance_rate(records: &[AttendanceRecord]) -> Option<f64> {
    let counted: Vec<_> = records
        .iter()
        .filter(|r| !matches!(r.status, AttendanceStatus::Excused | AttendanceStatus::Unknown))
        .collect();
    if counted.is_empty() {
        return None;
    }
    let attended = counted
        .iter()
        .filter(|r| matches!(r.status, AttendanceStatus::Present | AttendanceStatus::Late))
        .count();
    Some(attended as f64 / counted.len() as f64)
}
