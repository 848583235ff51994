//! One-shot pipeline over a snapshot: allocate, audit, lay out every room.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::data::{Allocation, Classroom, Student};
use crate::error::SeatingError;
use crate::report::{PrintLayout, layout_for_print};
use crate::solver::{AllocatorOptions, allocate_with, check_rooms};
use crate::validate::{ValidationReport, validate};

/// The re-ingestible part of a saved seating snapshot. Any other fields in the
/// document (a stored allocation, metadata) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub classrooms: Vec<Classroom>,
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingPlan {
    pub allocation: Allocation,
    pub validation: ValidationReport,
    pub layouts: Vec<PrintLayout>,
}

pub fn plan(snapshot: &Snapshot, options: &AllocatorOptions) -> Result<SeatingPlan, SeatingError> {
    let allocation = allocate_with(&snapshot.classrooms, &snapshot.students, options)?;
    let validation = validate(&allocation, &snapshot.students);

    // only classrooms the allocator actually used get a chart
    let mut layouts = Vec::new();
    for (classroom, checked) in check_rooms(&snapshot.classrooms) {
        let seated = allocation
            .assignments_for(&classroom.room_name)
            .next()
            .is_some();
        if checked.is_err() || !seated {
            continue;
        }
        match layout_for_print(classroom, &allocation.assignments) {
            Ok(layout) => layouts.push(layout),
            Err(e) => warn!("No seat chart for {}: {}", classroom.room_name, e),
        }
    }

    info!(
        "Plan ready: {} seated, {} unassigned, {} seat charts, valid: {}",
        allocation.assignments.len(),
        allocation.unassigned_students.len(),
        layouts.len(),
        validation.is_valid
    );

    Ok(SeatingPlan {
        allocation,
        validation,
        layouts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_ignores_stored_allocation() {
        let json = r#"{
            "classrooms": [{"roomName": "R1", "totalCapacity": 4, "numberOfColumns": 1}],
            "students": [
                {"rollNumber": "CS-3-1", "paper": "MATH", "branch": "CS", "semesterSection": "3-A"},
                {"rollNumber": "CS-3-2", "paper": "PHY", "branch": "CS", "semesterSection": "3-A"}
            ],
            "allocation": {"assignments": [], "unassignedStudents": []},
            "savedAt": "2024-05-01"
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let result = plan(&snapshot, &AllocatorOptions::default()).unwrap();
        assert_eq!(result.allocation.assignments.len(), 2);
        assert!(result.validation.is_valid);
        assert_eq!(result.layouts.len(), 1);
        assert_eq!(result.layouts[0].room_name, "R1");
    }

    #[test]
    fn rooms_left_empty_get_no_chart() {
        let snapshot = Snapshot {
            classrooms: vec![Classroom::new("A", 4, 4), Classroom::new("B", 4, 1)],
            students: vec![Student::new("CS-3-1", "MATH", "CS", "3-A")],
        };
        let result = plan(&snapshot, &AllocatorOptions::default()).unwrap();
        let rooms: Vec<_> = result.layouts.iter().map(|l| l.room_name.as_str()).collect();
        assert_eq!(rooms, vec!["A"]);
    }

    #[test]
    fn duplicate_room_gets_no_chart() {
        let snapshot = Snapshot {
            classrooms: vec![Classroom::new("R", 4, 1), Classroom::new("R", 40, 4)],
            students: vec![
                Student::new("CS-3-1", "MATH", "CS", "3-A"),
                Student::new("CS-3-2", "PHY", "CS", "3-A"),
            ],
        };
        let result = plan(&snapshot, &AllocatorOptions::default()).unwrap();
        assert_eq!(result.allocation.assignments.len(), 2);
        let charts: Vec<_> = result
            .layouts
            .iter()
            .map(|l| l.benches_per_column.clone())
            .collect();
        assert_eq!(charts, vec![vec![2]]);
    }
}
