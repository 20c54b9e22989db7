use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Id,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub credits: Option<f64>,
    pub ects: Option<f64>,
    pub department: Option<String>,
}

impl Course {
    /// "CENG101 Introduction to Programming", falling back to whatever is known
    pub fn title(&self) -> String {
        match (&self.code, &self.name) {
            (Some(code), Some(name)) => format!("{} {}", code, name),
            (Some(s), None) | (None, Some(s)) => s.clone(),
            (None, None) => format!("Course {}", self.id),
        }
    }
}

/// An offered instance of a course in a given semester
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Id,
    pub course_id: Option<Id>,
    pub section_number: Option<String>,
    pub semester: Option<String>,
    pub year: Option<i32>,
    pub instructor_name: Option<String>,
    pub classroom: Option<String>,
    pub capacity: Option<u32>,
    pub enrolled_count: Option<u32>,
    #[serde(default)]
    pub schedule: Vec<ScheduleSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl Section {
    pub fn seats_left(&self) -> Option<u32> {
        match (self.capacity, self.enrolled_count) {
            (Some(cap), Some(enrolled)) => Some(cap.saturating_sub(enrolled)),
            _ => None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.seats_left() == Some(0)
    }

    pub fn term(&self) -> String {
        match (&self.semester, self.year) {
            (Some(semester), Some(year)) => format!("{} {}", semester, year),
            (Some(semester), None) => semester.clone(),
            (None, Some(year)) => year.to_string(),
            (None, None) => String::new(),
        }
    }

    pub fn schedule_display(&self) -> String {
        self.schedule
            .iter()
            .map(|slot| {
                format!(
                    "{} {}-{}",
                    slot.day.as_deref().unwrap_or("?"),
                    slot.start_time.as_deref().unwrap_or("?"),
                    slot.end_time.as_deref().unwrap_or("?")
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Id,
    pub section_id: Option<Id>,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub status: Option<String>,
    pub enrolled_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub section_id: Id,
}
