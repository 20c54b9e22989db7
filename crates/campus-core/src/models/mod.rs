//! Data models for campus entities.
//!
//! Payloads are owned by the server; these structs only give display code
//! something typed to work with. Non-identifier fields are optional and
//! unknown fields are ignored.
//!
//! - `AuthTokens`, `LoginRequest`: credential exchange
//! - `UserProfile`: the signed-in user
//! - `Course`, `Section`, `Enrollment`, `Grade`: academics
//! - `AttendanceSession`, `AttendanceRecord`: GPS check-in attendance
//! - `MealMenu`, `MealReservation`, `Wallet`: cafeteria and payments
//! - `CampusEvent`, `EventRegistration`: campus events
//! - `Classroom`, `RoomReservation`: room scheduling

pub mod attendance;
pub mod auth;
pub mod course;
pub mod event;
pub mod grade;
pub mod meal;
pub mod room;
pub mod user;
pub mod wallet;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use attendance::{attendance_rate, AttendanceRecord, AttendanceSession, AttendanceStatus, CheckInRequest};
pub use auth::{AuthTokens, LoginRequest, LogoutRequest, RefreshRequest};
pub use course::{Course, EnrollRequest, Enrollment, Section};
pub use event::{CampusEvent, EventRegistration};
pub use grade::{weighted_gpa, Grade};
pub use meal::{MealMenu, MealReservation, MealReservationRequest};
pub use room::{Classroom, RoomReservation, RoomReservationRequest};
pub use user::{ProfileUpdate, UserProfile, UserRole};
pub use wallet::{TopUpRequest, Wallet, WalletTransaction};

/// Entity identifier; the API uses both numeric ids and UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Str(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => Id::Num(n),
            Err(_) => Id::Str(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_accepts_numbers_and_strings() {
        let ids: Vec<Id> = serde_json::from_str(r#"[42, "3f0c9a4e-1b2d-4c5e-8f90-123456789abc"]"#).unwrap();
        assert_eq!(ids[0], Id::Num(42));
        assert_eq!(ids[1].to_string(), "3f0c9a4e-1b2d-4c5e-8f90-123456789abc");
    }

    #[test]
    fn test_id_from_cli_argument() {
        assert_eq!(Id::from("17"), Id::Num(17));
        assert_eq!(Id::from("abc-1"), Id::Str("abc-1".to_string()));
        // Serializes back in the same shape
        assert_eq!(serde_json::to_string(&Id::from("17")).unwrap(), "17");
    }
}
