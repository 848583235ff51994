//! Printable seat chart for one room.
//!
//! The chart is derived only from the classroom record and the assignments
//! handed in. Desk geometry is rebuilt here, so a chart can be produced for an
//! allocation loaded from a saved snapshot just as well as for a fresh one.

use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::data::{Assignment, Classroom, DeskNumber, RoomName, Side};
use crate::error::SeatingError;
use crate::layout::DeskLayout;
use crate::roll::compare_rolls;

/// Roll range written by one (paper, branch, semester-section) group in a room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub label: String,
    pub paper: String,
    pub branch: String,
    pub semester_section: String,
    pub from_roll: String,
    pub to_roll: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintLayout {
    pub room_name: RoomName,
    pub benches_per_column: Vec<u32>,
    pub summary: Vec<SummaryRow>,
    /// Two sub-columns per physical column (side 1, then side 2), every one
    /// padded to `max_rows_in_column`.
    pub columns: Vec<Vec<Option<Assignment>>>,
    pub max_rows_in_column: usize,
    /// Assignments that have no cell in the grid: desk numbers outside the
    /// room, or a second student claiming an occupied side.
    pub overflow: Vec<Assignment>,
}

pub fn layout_for_print(
    classroom: &Classroom,
    assignments: &[Assignment],
) -> Result<PrintLayout, SeatingError> {
    let layout = DeskLayout::build(classroom)?;

    let mut in_room: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| a.room_name == classroom.room_name)
        .collect();
    in_room.sort_by_key(|a| a.serial_number);

    let summary = summarize(&in_room);

    let mut overflow = Vec::new();
    let mut seats: HashMap<DeskNumber, [Option<&Assignment>; 2]> = HashMap::new();
    for assignment in &in_room {
        if layout.position_of(assignment.desk_number).is_none() {
            overflow.push((*assignment).clone());
            continue;
        }
        let slot = match assignment.side {
            Side::Side1 => 0,
            Side::Side2 => 1,
        };
        let desk = seats.entry(assignment.desk_number).or_default();
        if desk[slot].is_some() {
            overflow.push((*assignment).clone());
        } else {
            desk[slot] = Some(*assignment);
        }
    }
    if !overflow.is_empty() {
        warn!(
            "{} assignments in {} do not fit its desk grid",
            overflow.len(),
            classroom.room_name
        );
    }

    let mut desks_by_column = vec![Vec::new(); layout.column_count()];
    for desk in layout.desks() {
        desks_by_column[desk.column].push(desk.desk_number);
    }

    let mut columns = Vec::with_capacity(layout.column_count() * 2);
    let mut max_rows_in_column = 0;
    for desks in &desks_by_column {
        for slot in 0..2 {
            let sub_column: Vec<Option<Assignment>> = desks
                .iter()
                .map(|desk_number| seats.get(desk_number).and_then(|pair| pair[slot]).cloned())
                .collect();
            max_rows_in_column = max_rows_in_column.max(sub_column.len());
            columns.push(sub_column);
        }
    }
    for sub_column in &mut columns {
        sub_column.resize(max_rows_in_column, None);
    }

    debug!(
        "Laid out {} for print: {} sub-columns x {} rows, {} summary rows",
        classroom.room_name,
        columns.len(),
        max_rows_in_column,
        summary.len()
    );

    Ok(PrintLayout {
        room_name: classroom.room_name.clone(),
        benches_per_column: layout.benches_per_column().to_vec(),
        summary,
        columns,
        max_rows_in_column,
        overflow,
    })
}

fn summarize(assignments: &[&Assignment]) -> Vec<SummaryRow> {
    assignments
        .iter()
        .map(|a| {
            let s = &a.student;
            ((s.paper.as_str(), s.branch.as_str(), s.semester_section.as_str()), s)
        })
        .into_group_map()
        .into_iter()
        .map(|((paper, branch, semester_section), members)| {
            let rolls = || members.iter().map(|s| s.roll_number.as_str());
            let from_roll = rolls().min_by(|a, b| compare_rolls(a, b)).unwrap_or_default();
            let to_roll = rolls().max_by(|a, b| compare_rolls(a, b)).unwrap_or_default();
            SummaryRow {
                label: format!("{} / {} / {}", paper, branch, semester_section),
                paper: paper.to_string(),
                branch: branch.to_string(),
                semester_section: semester_section.to_string(),
                from_roll: from_roll.to_string(),
                to_roll: to_roll.to_string(),
                count: members.len() as u64,
            }
        })
        .sorted_by(|a, b| a.label.cmp(&b.label))
        .collect()
}
