use crate::data::{
    Allocation, AllocationWarning, Assignment, Classroom, SerialNumber, Side, Student,
};
use crate::error::SeatingError;
use crate::layout::{DeskLayout, validate_classroom};
use crate::strategy::{SeatSource, Strategy};
use itertools::Itertools;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// What to do with a classroom that fails configuration checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidRoomPolicy {
    /// Leave the room out, record a warning, seat everyone else.
    #[default]
    Skip,
    /// Fail the whole run.
    Abort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorOptions {
    pub strategy: Strategy,
    pub invalid_room_policy: InvalidRoomPolicy,
}

impl AllocatorOptions {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_invalid_room_policy(mut self, policy: InvalidRoomPolicy) -> Self {
        self.invalid_room_policy = policy;
        self
    }
}

/// Seats students with the default sticky-pair strategy, skipping malformed
/// rooms. Never fails: input that cannot be seated at all comes back as an
/// allocation with every student unassigned and a warning saying why.
pub fn allocate(classrooms: &[Classroom], students: &[Student]) -> Allocation {
    match allocate_with(classrooms, students, &AllocatorOptions::default()) {
        Ok(allocation) => allocation,
        Err(e) => {
            warn!("Allocation rejected: {}", e);
            Allocation {
                assignments: Vec::new(),
                unassigned_students: students.to_vec(),
                warnings: vec![AllocationWarning::InvalidInput {
                    reason: e.to_string(),
                }],
            }
        }
    }
}

/// Assigns students to (room, desk, side).
///
/// Rooms are filled in a fixed preference order; within a room desks are walked
/// column-major and each desk takes occupants from the selected strategy. Every
/// filled seat gets the next room-local serial number. Students still waiting
/// once all rooms are done end up in `unassigned_students`.
pub fn allocate_with(
    classrooms: &[Classroom],
    students: &[Student],
    options: &AllocatorOptions,
) -> Result<Allocation, SeatingError> {
    let start_time = Instant::now();

    if let Some(dup) = students
        .iter()
        .map(|s| s.roll_number.as_str())
        .duplicates()
        .next()
    {
        return Err(SeatingError::DuplicateRoll {
            roll: dup.to_string(),
        });
    }

    info!(
        "Allocating {} students across {} classrooms using {:?}...",
        students.len(),
        classrooms.len(),
        options.strategy
    );

    let mut warnings = Vec::new();
    let mut rooms = prepare_rooms(classrooms, options.invalid_room_policy, &mut warnings)?;

    // fast fail on declared capacity
    let capacity: u64 = rooms.iter().map(|(c, _)| c.total_capacity as u64).sum();
    if capacity < students.len() as u64 {
        let warning = AllocationWarning::InsufficientCapacity {
            capacity,
            students: students.len() as u64,
        };
        warn!("{}", warning);
        warnings.push(warning);
        return Ok(Allocation {
            assignments: Vec::new(),
            unassigned_students: students.to_vec(),
            warnings,
        });
    }

    rooms.sort_by(|(a, _), (b, _)| {
        fill_preference(a)
            .cmp(&fill_preference(b))
            .then_with(|| a.room_name.cmp(&b.room_name))
    });
    trace!(
        "Room filling order: {}",
        rooms.iter().map(|(c, _)| c.room_name.as_str()).join(", ")
    );

    let mut source = options.strategy.source(students.to_vec());
    let mut assignments = Vec::with_capacity(students.len());
    for (classroom, layout) in &rooms {
        if source.is_empty() {
            break;
        }
        let cutoff = classroom.total_capacity.min(layout.seat_count());
        let filled = seat_room(classroom, layout, cutoff, source.as_mut(), &mut assignments);
        debug!(
            "Room {} took {} of {} seats",
            classroom.room_name, filled, cutoff
        );
    }

    let unassigned_students = source.into_remaining();
    if !unassigned_students.is_empty() {
        let warning = AllocationWarning::PartialAllocation {
            unassigned: unassigned_students.len() as u64,
        };
        warn!("{}", warning);
        warnings.push(warning);
    }

    info!(
        "Seated {} students, {} unassigned, in {:.2?}",
        assignments.len(),
        unassigned_students.len(),
        start_time.elapsed()
    );

    Ok(Allocation {
        assignments,
        unassigned_students,
        warnings,
    })
}

/// 4-column rooms first, then 5-column rooms, then everything else.
fn fill_preference(classroom: &Classroom) -> u8 {
    match classroom.number_of_columns {
        4 => 0,
        5 => 1,
        _ => 2,
    }
}

/// Configuration checks for every classroom, in input order. A room name is
/// claimed by its first classroom that passes; later classrooms with the same
/// name are rejected. Only rooms with an `Ok` layout take part in allocation.
pub fn check_rooms(
    classrooms: &[Classroom],
) -> Vec<(&Classroom, Result<DeskLayout, SeatingError>)> {
    let mut seen = HashSet::new();
    classrooms
        .iter()
        .map(|classroom| {
            let checked = validate_classroom(classroom)
                .and_then(|_| DeskLayout::build(classroom))
                .and_then(|layout| {
                    if seen.insert(classroom.room_name.as_str()) {
                        Ok(layout)
                    } else {
                        Err(SeatingError::invalid(
                            &classroom.room_name,
                            "room name is used more than once",
                        ))
                    }
                });
            (classroom, checked)
        })
        .collect()
}

// builds the geometry of every room that passes, applying the policy to the rest
fn prepare_rooms<'a>(
    classrooms: &'a [Classroom],
    policy: InvalidRoomPolicy,
    warnings: &mut Vec<AllocationWarning>,
) -> Result<Vec<(&'a Classroom, DeskLayout)>, SeatingError> {
    let mut rooms = Vec::with_capacity(classrooms.len());

    for (classroom, checked) in check_rooms(classrooms) {
        match checked {
            Ok(layout) => {
                if classroom.desks_per_column.is_some()
                    && layout.seat_count() != classroom.total_capacity
                {
                    let warning = AllocationWarning::CapacityMismatch {
                        room: classroom.room_name.clone(),
                        declared: classroom.total_capacity,
                        seats: layout.seat_count(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                rooms.push((classroom, layout));
            }
            Err(e) => match policy {
                InvalidRoomPolicy::Abort => return Err(e),
                InvalidRoomPolicy::Skip => {
                    warn!("Skipping room: {}", e);
                    let reason = match &e {
                        SeatingError::InvalidConfiguration { reason, .. } => reason.clone(),
                        other => other.to_string(),
                    };
                    warnings.push(AllocationWarning::RoomSkipped {
                        room: classroom.room_name.clone(),
                        reason,
                    });
                }
            },
        }
    }

    Ok(rooms)
}

// walks one room's desks until the cutoff is reached, the desks run out, or
// nobody is left waiting; returns the number of seats filled
fn seat_room(
    classroom: &Classroom,
    layout: &DeskLayout,
    cutoff: u32,
    source: &mut dyn SeatSource,
    assignments: &mut Vec<Assignment>,
) -> SerialNumber {
    let mut serial: SerialNumber = 0;

    for desk in layout.desks() {
        let free = cutoff.saturating_sub(serial);
        if free == 0 {
            break;
        }
        let Some(pick) = source.next_desk(free.min(2) as usize) else {
            break;
        };

        if let Some(side2) = &pick.side2 {
            // hard invariant: strategies must never pair a class with itself
            debug_assert_ne!(pick.side1.conflict_class(), side2.conflict_class());
        }

        let occupants = std::iter::once((Side::Side1, pick.side1))
            .chain(pick.side2.map(|s| (Side::Side2, s)));
        for (side, student) in occupants {
            serial += 1;
            assignments.push(Assignment {
                student,
                room_name: classroom.room_name.clone(),
                desk_number: desk.desk_number,
                side,
                serial_number: serial,
            });
        }
    }

    serial
}
