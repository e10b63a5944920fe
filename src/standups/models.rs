use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Uuid,
    pub name: String,
}

impl Attendee {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Uuid,
    pub date: SystemTime,
    pub transcript: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standup {
    pub id: Uuid,
    pub attendees: Vec<Attendee>,
    /// Total meeting length in seconds.
    pub duration_secs: u64,
    /// Newest first.
    pub meetings: Vec<Meeting>,
    pub title: String,
}

impl Standup {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            attendees: Vec::new(),
            duration_secs: 5 * 60,
            meetings: Vec::new(),
            title: String::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Speaking time per attendee, never zero.
    pub fn seconds_per_attendee(&self) -> u64 {
        let attendees = self.attendees.len().max(1) as u64;
        (self.duration_secs / attendees).max(1)
    }

    pub fn mock() -> Self {
        let attendee = |n: u128, name: &str| Attendee {
            id: Uuid::from_u128(n),
            name: name.to_string(),
        };
        Self {
            id: Uuid::from_u128(0xDEADBEEF),
            attendees: vec![
                attendee(1, "Blob"),
                attendee(2, "Blob Jr"),
                attendee(3, "Blob Sr"),
                attendee(4, "Blob Esq"),
                attendee(5, "Blob III"),
                attendee(6, "Blob I"),
            ],
            duration_secs: 60,
            meetings: vec![Meeting {
                id: Uuid::from_u128(0xC0FFEE),
                date: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
                transcript: "Yesterday I worked on the stack reducer.".to_string(),
            }],
            title: "Design".to_string(),
        }
    }
}
