//! Desk geometry for a classroom.
//!
//! Desks are numbered column-major starting at 1: column 0 front to back, then
//! column 1, and so on. Supervisors walk a room in this order, so every other
//! part of the engine (allocation, validation, printing) relies on it.

use crate::data::{Classroom, DeskNumber};
use crate::error::SeatingError;

pub const MAX_COLUMNS: u32 = 8;
/// Upper bound on desks in one column, explicit or computed. Keeps seat
/// totals well inside `u32` and print grids a sane size.
pub const MAX_DESKS_PER_COLUMN: u32 = 500;

/// One desk position in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeskSlot {
    pub column: usize,
    pub row: usize,
    pub desk_number: DeskNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskLayout {
    benches_per_column: Vec<u32>,
}

impl DeskLayout {
    /// Builds the geometry of `classroom`.
    ///
    /// An explicit `desks_per_column` whose length matches the column count is
    /// used as given, even when its seat total differs from the declared
    /// capacity. Otherwise `ceil(capacity / 2)` benches are spread over the
    /// columns, with the leftmost columns taking the remainder.
    pub fn build(classroom: &Classroom) -> Result<Self, SeatingError> {
        let room = &classroom.room_name;
        if classroom.number_of_columns < 1 || classroom.number_of_columns > MAX_COLUMNS {
            return Err(SeatingError::invalid(
                room,
                format!(
                    "number of columns must be between 1 and {}, got {}",
                    MAX_COLUMNS, classroom.number_of_columns
                ),
            ));
        }
        if classroom.total_capacity < 1 {
            return Err(SeatingError::invalid(room, "total capacity must be at least 1"));
        }

        let columns = classroom.number_of_columns;
        let benches_per_column: Vec<u32> = match &classroom.desks_per_column {
            Some(explicit) if explicit.len() == columns as usize => explicit.clone(),
            _ => {
                let benches = classroom.total_capacity.div_ceil(2);
                let base = benches / columns;
                let remainder = benches % columns;
                (0..columns)
                    .map(|c| if c < remainder { base + 1 } else { base })
                    .collect()
            }
        };

        if let Some(column) = benches_per_column
            .iter()
            .position(|&d| d > MAX_DESKS_PER_COLUMN)
        {
            return Err(SeatingError::invalid(
                room,
                format!(
                    "column {} has {} desks, more than the limit of {}",
                    column + 1,
                    benches_per_column[column],
                    MAX_DESKS_PER_COLUMN
                ),
            ));
        }

        Ok(Self { benches_per_column })
    }

    pub fn benches_per_column(&self) -> &[u32] {
        &self.benches_per_column
    }

    pub fn column_count(&self) -> usize {
        self.benches_per_column.len()
    }

    pub fn desk_count(&self) -> u32 {
        self.benches_per_column.iter().sum()
    }

    pub fn seat_count(&self) -> u32 {
        self.desk_count() * 2
    }

    /// All desks in traversal order.
    pub fn desks(&self) -> impl Iterator<Item = DeskSlot> + '_ {
        self.benches_per_column
            .iter()
            .enumerate()
            .flat_map(|(column, &rows)| (0..rows as usize).map(move |row| (column, row)))
            .zip(1..)
            .map(|((column, row), desk_number)| DeskSlot {
                column,
                row,
                desk_number,
            })
    }

    /// Locates a desk number within the grid, `None` when it is out of range.
    pub fn position_of(&self, desk_number: DeskNumber) -> Option<(usize, usize)> {
        if desk_number == 0 {
            return None;
        }
        let mut offset = desk_number - 1;
        for (column, &rows) in self.benches_per_column.iter().enumerate() {
            if offset < rows {
                return Some((column, offset as usize));
            }
            offset -= rows;
        }
        None
    }
}

/// Configuration-time checks run before a room takes part in allocation.
///
/// Stricter than [`DeskLayout::build`]: an explicit desk list of the wrong
/// length is rejected here rather than quietly replaced.
pub fn validate_classroom(classroom: &Classroom) -> Result<(), SeatingError> {
    let room = &classroom.room_name;
    if room.trim().is_empty() {
        return Err(SeatingError::invalid(room, "room name must not be empty"));
    }
    if classroom.number_of_columns < 1 || classroom.number_of_columns > MAX_COLUMNS {
        return Err(SeatingError::invalid(
            room,
            format!(
                "number of columns must be between 1 and {}, got {}",
                MAX_COLUMNS, classroom.number_of_columns
            ),
        ));
    }
    if classroom.total_capacity < 1 {
        return Err(SeatingError::invalid(room, "total capacity must be at least 1"));
    }
    if let Some(explicit) = &classroom.desks_per_column {
        if explicit.len() != classroom.number_of_columns as usize {
            return Err(SeatingError::invalid(
                room,
                format!(
                    "desksPerColumn has {} entries for {} columns",
                    explicit.len(),
                    classroom.number_of_columns
                ),
            ));
        }
        if let Some(column) = explicit.iter().position(|&d| d == 0) {
            return Err(SeatingError::invalid(
                room,
                format!("column {} has no desks", column + 1),
            ));
        }
        if let Some(column) = explicit.iter().position(|&d| d > MAX_DESKS_PER_COLUMN) {
            return Err(SeatingError::invalid(
                room,
                format!(
                    "column {} has {} desks, more than the limit of {}",
                    column + 1,
                    explicit[column],
                    MAX_DESKS_PER_COLUMN
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreads_remainder_to_leftmost_columns() {
        let layout = DeskLayout::build(&Classroom::new("R", 50, 4)).unwrap();
        assert_eq!(layout.benches_per_column(), &[7, 6, 6, 6]);
        assert_eq!(layout.desk_count(), 25);
    }

    #[test]
    fn odd_capacity_rounds_benches_up() {
        let layout = DeskLayout::build(&Classroom::new("R", 7, 2)).unwrap();
        assert_eq!(layout.benches_per_column(), &[2, 2]);
    }

    #[test]
    fn explicit_desks_are_used_verbatim() {
        let room = Classroom::new("R", 10, 2).with_desks_per_column(vec![4, 9]);
        let layout = DeskLayout::build(&room).unwrap();
        assert_eq!(layout.benches_per_column(), &[4, 9]);
        assert_eq!(layout.seat_count(), 26);
    }

    #[test]
    fn explicit_desks_of_wrong_length_fall_back() {
        let room = Classroom::new("R", 10, 2).with_desks_per_column(vec![4]);
        let layout = DeskLayout::build(&room).unwrap();
        assert_eq!(layout.benches_per_column(), &[3, 2]);
        assert!(validate_classroom(&room).is_err());
    }

    #[test]
    fn rejects_empty_geometry() {
        assert!(matches!(
            DeskLayout::build(&Classroom::new("R", 10, 0)),
            Err(SeatingError::InvalidConfiguration { .. })
        ));
        assert!(DeskLayout::build(&Classroom::new("R", 0, 2)).is_err());
    }

    #[test]
    fn desks_are_numbered_column_major() {
        let room = Classroom::new("R", 10, 2).with_desks_per_column(vec![3, 2]);
        let layout = DeskLayout::build(&room).unwrap();
        let desks: Vec<_> = layout
            .desks()
            .map(|d| (d.desk_number, d.column, d.row))
            .collect();
        assert_eq!(
            desks,
            vec![(1, 0, 0), (2, 0, 1), (3, 0, 2), (4, 1, 0), (5, 1, 1)]
        );
        assert_eq!(layout.position_of(4), Some((1, 0)));
        assert_eq!(layout.position_of(6), None);
        assert_eq!(layout.position_of(0), None);
    }

    #[test]
    fn oversized_columns_are_rejected() {
        let explicit = Classroom::new("R", 4, 2).with_desks_per_column(vec![u32::MAX, 1]);
        assert!(matches!(
            DeskLayout::build(&explicit),
            Err(SeatingError::InvalidConfiguration { .. })
        ));
        assert!(validate_classroom(&explicit).is_err());

        let at_limit = Classroom::new("R", 4, 1).with_desks_per_column(vec![MAX_DESKS_PER_COLUMN]);
        assert_eq!(DeskLayout::build(&at_limit).unwrap().desk_count(), MAX_DESKS_PER_COLUMN);

        // computed geometry is bounded the same way
        assert!(DeskLayout::build(&Classroom::new("R", u32::MAX, 8)).is_err());
        assert!(DeskLayout::build(&Classroom::new("R", 10, 9)).is_err());
    }

    #[test]
    fn validation_limits_columns() {
        assert!(validate_classroom(&Classroom::new("R", 10, 9)).is_err());
        assert!(validate_classroom(&Classroom::new("R", 10, 8)).is_ok());
        assert!(validate_classroom(&Classroom::new(" ", 10, 2)).is_err());
        let zero_column = Classroom::new("R", 10, 2).with_desks_per_column(vec![3, 0]);
        assert!(validate_classroom(&zero_column).is_err());
    }
}
