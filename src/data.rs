use serde::{Deserialize, Serialize};
use std::fmt;

use crate::roll;

// Type aliases for clarity
pub type RoomName = String;
pub type DeskNumber = u32;
pub type SerialNumber = u32;

/// An exam candidate. Roll numbers look like `<branch>-<semester>-<ordinal>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub roll_number: String,
    pub paper: String,
    pub branch: String,
    /// `<semesterNumber>-<section>`, e.g. `3-A`.
    pub semester_section: String,
}

impl Student {
    pub fn new(
        roll_number: impl Into<String>,
        paper: impl Into<String>,
        branch: impl Into<String>,
        semester_section: impl Into<String>,
    ) -> Self {
        Self {
            roll_number: roll_number.into(),
            paper: paper.into(),
            branch: branch.into(),
            semester_section: semester_section.into(),
        }
    }

    pub fn conflict_class(&self) -> ConflictClass {
        roll::conflict_class(self)
    }

    pub fn roll_ordinal(&self) -> u64 {
        roll::roll_ordinal(&self.roll_number)
    }
}

/// A physical exam room made of two-seat desks laid out in columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub room_name: RoomName,
    pub total_capacity: u32,
    pub number_of_columns: u32,
    /// Explicit desk count per column, front to back. Used verbatim when its
    /// length matches `number_of_columns`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desks_per_column: Option<Vec<u32>>,
}

impl Classroom {
    pub fn new(room_name: impl Into<String>, total_capacity: u32, number_of_columns: u32) -> Self {
        Self {
            room_name: room_name.into(),
            total_capacity,
            number_of_columns,
            desks_per_column: None,
        }
    }

    pub fn with_desks_per_column(mut self, desks: Vec<u32>) -> Self {
        self.desks_per_column = Some(desks);
        self
    }
}

/// Grouping key that must never repeat on both sides of one desk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConflictClass {
    pub paper: String,
    pub semester: String,
}

impl fmt::Display for ConflictClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.paper, self.semester)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Side1,
    Side2,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Side1 => write!(f, "side 1"),
            Side::Side2 => write!(f, "side 2"),
        }
    }
}

/// Represents a single seated student.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub student: Student,
    pub room_name: RoomName,
    pub desk_number: DeskNumber,
    pub side: Side,
    pub serial_number: SerialNumber,
}

/// Non-fatal conditions met while allocating. None of these block the run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AllocationWarning {
    #[serde(rename_all = "camelCase")]
    InsufficientCapacity { capacity: u64, students: u64 },
    #[serde(rename_all = "camelCase")]
    RoomSkipped { room: RoomName, reason: String },
    #[serde(rename_all = "camelCase")]
    CapacityMismatch {
        room: RoomName,
        declared: u32,
        seats: u32,
    },
    #[serde(rename_all = "camelCase")]
    PartialAllocation { unassigned: u64 },
    #[serde(rename_all = "camelCase")]
    InvalidInput { reason: String },
}

impl fmt::Display for AllocationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationWarning::InsufficientCapacity { capacity, students } => write!(
                f,
                "[Insufficient Capacity] {} seats declared for {} students; nobody was seated",
                capacity, students
            ),
            AllocationWarning::RoomSkipped { room, reason } => {
                write!(f, "[Room Skipped] {}: {}", room, reason)
            }
            AllocationWarning::CapacityMismatch {
                room,
                declared,
                seats,
            } => write!(
                f,
                "[Capacity Mismatch] {} declares {} seats but its desks hold {}",
                room, declared, seats
            ),
            AllocationWarning::PartialAllocation { unassigned } => {
                write!(f, "[Partial Allocation] {} students left unseated", unassigned)
            }
            AllocationWarning::InvalidInput { reason } => {
                write!(f, "[Invalid Input] {}; nobody was seated", reason)
            }
        }
    }
}

/// The final output of the allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub assignments: Vec<Assignment>,
    pub unassigned_students: Vec<Student>,
    #[serde(default)]
    pub warnings: Vec<AllocationWarning>,
}

impl Allocation {
    pub fn assignments_for<'a>(
        &'a self,
        room_name: &'a str,
    ) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments
            .iter()
            .filter(move |a| a.room_name == room_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_round_trips_camel_case() {
        let json = r#"{"rollNumber":"CS-3-17","paper":"MATH","branch":"CS","semesterSection":"3-A"}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student, Student::new("CS-3-17", "MATH", "CS", "3-A"));
        assert_eq!(serde_json::to_string(&student).unwrap(), json);
    }

    #[test]
    fn classroom_without_explicit_desks_omits_field() {
        let room = Classroom::new("R1", 40, 4);
        let json = serde_json::to_value(&room).unwrap();
        assert!(json.get("desksPerColumn").is_none());

        let parsed: Classroom =
            serde_json::from_str(r#"{"roomName":"R2","totalCapacity":10,"numberOfColumns":2,"desksPerColumn":[3,2]}"#)
                .unwrap();
        assert_eq!(parsed.desks_per_column, Some(vec![3, 2]));
    }

    #[test]
    fn warnings_are_tagged() {
        let warning = AllocationWarning::RoomSkipped {
            room: "R1".into(),
            reason: "no columns".into(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "roomSkipped");
        assert_eq!(warning.to_string(), "[Room Skipped] R1: no columns");
    }

    #[test]
    fn conflict_class_joins_paper_and_semester() {
        let student = Student::new("EE-5-2", "PHY", "EE", "5-B");
        assert_eq!(student.conflict_class().to_string(), "PHY5");
    }
}
