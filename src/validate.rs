//! Read-only audit of an allocation.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::data::{Allocation, Assignment, DeskNumber, RoomName, SerialNumber, Side, Student};

/// Two occupants of one desk sharing a conflict class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub room_name: RoomName,
    pub desk_number: DeskNumber,
    pub conflict_class: String,
    pub roll_numbers: Vec<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} desk {}: {} share conflict class {}",
            self.room_name,
            self.desk_number,
            self.roll_numbers.join(" and "),
            self.conflict_class
        )
    }
}

/// Bookkeeping problems that do not break desk exclusivity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntegrityIssue {
    /// In the input but neither seated nor listed as unassigned.
    #[serde(rename_all = "camelCase")]
    MissingStudent { roll_number: String },
    #[serde(rename_all = "camelCase")]
    DuplicateStudent { roll_number: String, occurrences: u64 },
    /// In the allocation but not in the input.
    #[serde(rename_all = "camelCase")]
    UnknownStudent { roll_number: String },
    #[serde(rename_all = "camelCase")]
    SideCollision {
        room_name: RoomName,
        desk_number: DeskNumber,
        side: Side,
    },
    #[serde(rename_all = "camelCase")]
    MissingSerial {
        room_name: RoomName,
        serial_number: SerialNumber,
    },
    #[serde(rename_all = "camelCase")]
    DuplicateSerial {
        room_name: RoomName,
        serial_number: SerialNumber,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_assigned: u64,
    pub same_desk_violations: u64,
    /// Advisory: occupant pairs on consecutive desks writing the same paper.
    pub adjacent_same_paper_count: u64,
    pub paper_distribution: BTreeMap<String, u64>,
    pub room_occupancy: BTreeMap<RoomName, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when no desk holds two occupants of the same conflict class.
    pub is_valid: bool,
    pub violations: Vec<Violation>,
    pub statistics: Statistics,
    pub integrity: Vec<IntegrityIssue>,
}

pub fn validate(allocation: &Allocation, students: &[Student]) -> ValidationReport {
    let mut statistics = Statistics {
        total_assigned: allocation.assignments.len() as u64,
        ..Statistics::default()
    };

    let by_room: BTreeMap<&str, Vec<&Assignment>> = allocation
        .assignments
        .iter()
        .map(|a| (a.room_name.as_str(), a))
        .into_group_map()
        .into_iter()
        .collect();

    let mut violations = Vec::new();
    let mut integrity = Vec::new();

    for (room, assignments) in &by_room {
        statistics
            .room_occupancy
            .insert(room.to_string(), assignments.len() as u64);

        let desks: BTreeMap<DeskNumber, Vec<&Assignment>> = assignments
            .iter()
            .map(|a| (a.desk_number, *a))
            .into_group_map()
            .into_iter()
            .collect();

        for (&desk_number, occupants) in &desks {
            check_desk(room, desk_number, occupants, &mut violations, &mut integrity);
        }

        // advisory only
        for ((_, front), (_, back)) in desks.iter().tuple_windows() {
            statistics.adjacent_same_paper_count += front
                .iter()
                .cartesian_product(back.iter())
                .filter(|(a, b)| a.student.paper == b.student.paper)
                .count() as u64;
        }

        check_serials(room, assignments, &mut integrity);
    }

    for assignment in &allocation.assignments {
        *statistics
            .paper_distribution
            .entry(assignment.student.paper.clone())
            .or_default() += 1;
    }

    check_coverage(allocation, students, &mut integrity);

    statistics.same_desk_violations = violations.len() as u64;
    let is_valid = violations.is_empty();
    if is_valid {
        debug!(
            "Allocation valid: {} seated, {} adjacent same-paper pairs",
            statistics.total_assigned, statistics.adjacent_same_paper_count
        );
    } else {
        for violation in &violations {
            warn!("Same-desk violation: {}", violation);
        }
    }

    ValidationReport {
        is_valid,
        violations,
        statistics,
        integrity,
    }
}

fn check_desk(
    room: &str,
    desk_number: DeskNumber,
    occupants: &[&Assignment],
    violations: &mut Vec<Violation>,
    integrity: &mut Vec<IntegrityIssue>,
) {
    for (side, count) in occupants.iter().map(|a| a.side).counts().into_iter().sorted() {
        if count > 1 {
            integrity.push(IntegrityIssue::SideCollision {
                room_name: room.to_string(),
                desk_number,
                side,
            });
        }
    }

    let by_class = occupants
        .iter()
        .map(|a| (a.student.conflict_class(), a.student.roll_number.clone()))
        .into_group_map();
    for (class, rolls) in by_class.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
        if rolls.len() > 1 {
            violations.push(Violation {
                room_name: room.to_string(),
                desk_number,
                conflict_class: class.to_string(),
                roll_numbers: rolls,
            });
        }
    }
}

// serials in a room must be exactly 1..=k
fn check_serials(room: &str, assignments: &[&Assignment], integrity: &mut Vec<IntegrityIssue>) {
    let counts = assignments.iter().map(|a| a.serial_number).counts();
    let k = assignments.len() as SerialNumber;

    for (&serial_number, &count) in counts.iter().sorted() {
        if count > 1 {
            integrity.push(IntegrityIssue::DuplicateSerial {
                room_name: room.to_string(),
                serial_number,
            });
        }
    }
    for serial_number in 1..=k {
        if !counts.contains_key(&serial_number) {
            integrity.push(IntegrityIssue::MissingSerial {
                room_name: room.to_string(),
                serial_number,
            });
        }
    }
}

fn check_coverage(allocation: &Allocation, students: &[Student], integrity: &mut Vec<IntegrityIssue>) {
    let placed = allocation
        .assignments
        .iter()
        .map(|a| a.student.roll_number.as_str())
        .chain(
            allocation
                .unassigned_students
                .iter()
                .map(|s| s.roll_number.as_str()),
        )
        .counts();
    let known: HashSet<&str> = students.iter().map(|s| s.roll_number.as_str()).collect();

    for student in students {
        match placed.get(student.roll_number.as_str()) {
            None => integrity.push(IntegrityIssue::MissingStudent {
                roll_number: student.roll_number.clone(),
            }),
            Some(&n) if n > 1 => integrity.push(IntegrityIssue::DuplicateStudent {
                roll_number: student.roll_number.clone(),
                occurrences: n as u64,
            }),
            Some(_) => {}
        }
    }

    for roll in placed.keys().filter(|r| !known.contains(*r)).sorted() {
        integrity.push(IntegrityIssue::UnknownStudent {
            roll_number: roll.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seat(roll: &str, paper: &str, desk: DeskNumber, side: Side, serial: SerialNumber) -> Assignment {
        Assignment {
            student: Student::new(roll, paper, "CS", "3-A"),
            room_name: "R".into(),
            desk_number: desk,
            side,
            serial_number: serial,
        }
    }

    fn students_of(allocation: &Allocation) -> Vec<Student> {
        allocation
            .assignments
            .iter()
            .map(|a| a.student.clone())
            .chain(allocation.unassigned_students.iter().cloned())
            .collect()
    }

    #[test]
    fn clean_allocation_is_valid() {
        let allocation = Allocation {
            assignments: vec![
                seat("CS-3-1", "MATH", 1, Side::Side1, 1),
                seat("CS-3-2", "PHY", 1, Side::Side2, 2),
                seat("CS-3-3", "MATH", 2, Side::Side1, 3),
            ],
            ..Allocation::default()
        };
        let report = validate(&allocation, &students_of(&allocation));
        assert!(report.is_valid);
        assert!(report.integrity.is_empty());
        assert_eq!(report.statistics.total_assigned, 3);
        assert_eq!(report.statistics.adjacent_same_paper_count, 1);
        assert_eq!(report.statistics.paper_distribution["MATH"], 2);
        assert_eq!(report.statistics.room_occupancy["R"], 3);
    }

    #[test]
    fn same_class_on_one_desk_is_a_violation() {
        let allocation = Allocation {
            assignments: vec![
                seat("CS-3-1", "MATH", 1, Side::Side1, 1),
                seat("CS-3-2", "MATH", 1, Side::Side2, 2),
            ],
            ..Allocation::default()
        };
        let report = validate(&allocation, &students_of(&allocation));
        assert!(!report.is_valid);
        assert_eq!(report.statistics.same_desk_violations, 1);
        assert_eq!(
            report.violations,
            vec![Violation {
                room_name: "R".into(),
                desk_number: 1,
                conflict_class: "MATH3".into(),
                roll_numbers: vec!["CS-3-1".into(), "CS-3-2".into()],
            }]
        );
    }

    #[test]
    fn same_paper_in_other_semester_is_allowed() {
        let mut other = seat("CS-5-2", "MATH", 1, Side::Side2, 2);
        other.student.semester_section = "5-A".into();
        let allocation = Allocation {
            assignments: vec![seat("CS-3-1", "MATH", 1, Side::Side1, 1), other],
            ..Allocation::default()
        };
        let report = validate(&allocation, &students_of(&allocation));
        assert!(report.is_valid);
    }

    #[test]
    fn adjacency_uses_desk_order_not_gaps() {
        let allocation = Allocation {
            assignments: vec![
                seat("CS-3-1", "MATH", 1, Side::Side1, 1),
                seat("CS-3-2", "MATH", 5, Side::Side1, 2),
                seat("CS-3-3", "PHY", 9, Side::Side1, 3),
            ],
            ..Allocation::default()
        };
        let report = validate(&allocation, &students_of(&allocation));
        // desks 1 and 5 are consecutive among occupied desks
        assert_eq!(report.statistics.adjacent_same_paper_count, 1);
    }

    #[test]
    fn reports_bookkeeping_problems() {
        let allocation = Allocation {
            assignments: vec![
                seat("CS-3-1", "MATH", 1, Side::Side1, 1),
                seat("CS-3-2", "PHY", 1, Side::Side1, 3),
                seat("CS-3-9", "CHEM", 2, Side::Side1, 3),
            ],
            unassigned_students: vec![Student::new("CS-3-1", "MATH", "CS", "3-A")],
            ..Allocation::default()
        };
        let students = vec![
            Student::new("CS-3-1", "MATH", "CS", "3-A"),
            Student::new("CS-3-2", "PHY", "CS", "3-A"),
            Student::new("CS-3-4", "BIO", "CS", "3-A"),
        ];
        let report = validate(&allocation, &students);
        assert!(report.is_valid);
        assert_eq!(
            report.integrity,
            vec![
                IntegrityIssue::SideCollision {
                    room_name: "R".into(),
                    desk_number: 1,
                    side: Side::Side1,
                },
                IntegrityIssue::DuplicateSerial {
                    room_name: "R".into(),
                    serial_number: 3,
                },
                IntegrityIssue::MissingSerial {
                    room_name: "R".into(),
                    serial_number: 2,
                },
                IntegrityIssue::DuplicateStudent {
                    roll_number: "CS-3-1".into(),
                    occurrences: 2,
                },
                IntegrityIssue::MissingStudent {
                    roll_number: "CS-3-4".into(),
                },
                IntegrityIssue::UnknownStudent {
                    roll_number: "CS-3-9".into(),
                },
            ]
        );
    }
}
