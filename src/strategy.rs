//! Named seating strategies.
//!
//! A strategy only decides which waiting students are offered to the next desk.
//! Room order, serial numbers and capacity cutoffs belong to the allocator, so
//! switching strategies never changes those rules.

use std::collections::VecDeque;

use itertools::Itertools;
use log::trace;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::{ConflictClass, Student};
use crate::roll::{compare_rolls, semester_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Strategy {
    /// Round-robin over conflict-class buckets, keeping a pair of classes on
    /// consecutive desks until one of them runs out.
    #[default]
    StickyPair,
    /// Branch, then semester, then roll order; each desk takes the head of the
    /// queue and the first later student of a different conflict class.
    PriorityFill,
    /// Seeded shuffle, then the same pairing scan as `PriorityFill`.
    Shuffled { seed: u64 },
}

impl Strategy {
    pub fn source(&self, students: Vec<Student>) -> Box<dyn SeatSource> {
        match *self {
            Strategy::StickyPair => Box::new(StickyPairSource::new(students)),
            Strategy::PriorityFill => {
                let mut students = students;
                students.sort_by(|a, b| {
                    a.branch
                        .cmp(&b.branch)
                        .then_with(|| {
                            semester_number(&a.semester_section)
                                .cmp(semester_number(&b.semester_section))
                        })
                        .then_with(|| a.semester_section.cmp(&b.semester_section))
                        .then_with(|| compare_rolls(&a.roll_number, &b.roll_number))
                });
                Box::new(QueueSource::new(students))
            }
            Strategy::Shuffled { seed } => {
                let mut students = students;
                // input order must not leak into the result
                students.sort_by(|a, b| compare_rolls(&a.roll_number, &b.roll_number));
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                students.shuffle(&mut rng);
                Box::new(QueueSource::new(students))
            }
        }
    }
}

/// Occupants chosen for one desk. Both sides never share a conflict class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskPick {
    pub side1: Student,
    pub side2: Option<Student>,
}

pub trait SeatSource {
    /// Offers occupants for the next desk, filling at most `seats` (1 or 2)
    /// sides. `None` once nobody is waiting.
    fn next_desk(&mut self, seats: usize) -> Option<DeskPick>;

    fn is_empty(&self) -> bool;

    /// Students never offered to a desk, consumed at the end of a run.
    fn into_remaining(self: Box<Self>) -> Vec<Student>;
}

/// Per-conflict-class queues, classes in ascending order, each queue in roll
/// order.
#[derive(Debug, Clone)]
pub struct ConflictBuckets {
    classes: Vec<ConflictClass>,
    queues: Vec<VecDeque<Student>>,
}

impl ConflictBuckets {
    pub fn from_students(students: Vec<Student>) -> Self {
        let grouped = students
            .into_iter()
            .map(|s| (s.conflict_class(), s))
            .into_group_map();

        let mut classes = Vec::with_capacity(grouped.len());
        let mut queues = Vec::with_capacity(grouped.len());
        for (class, mut members) in grouped.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
            members.sort_by(|a, b| compare_rolls(&a.roll_number, &b.roll_number));
            classes.push(class);
            queues.push(members.into());
        }
        Self { classes, queues }
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    pub fn class(&self, index: usize) -> &ConflictClass {
        &self.classes[index]
    }

    pub fn waiting(&self, index: usize) -> usize {
        self.queues[index].len()
    }

    fn pop(&mut self, index: usize) -> Option<Student> {
        self.queues[index].pop_front()
    }

    /// First non-empty bucket at or after `start`, wrapping around, other than
    /// `skip`.
    pub fn next_non_empty(&self, start: usize, skip: Option<usize>) -> Option<usize> {
        let n = self.len();
        (0..n)
            .map(|k| (start + k) % n)
            .find(|&i| Some(i) != skip && !self.queues[i].is_empty())
    }

    fn into_remaining(self) -> Vec<Student> {
        self.queues.into_iter().flatten().collect()
    }
}

/// Rotation pointer over conflict-class buckets: the bucket feeding side 1 and
/// the bucket feeding side 2. It lives for one allocation run and carries over
/// from room to room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub side1: usize,
    pub side2: usize,
}

impl Default for Rotation {
    fn default() -> Self {
        Self { side1: 0, side2: 1 }
    }
}

impl Rotation {
    /// Buckets for the next desk. The current pair is kept while both buckets
    /// still hold students; an emptied bucket is replaced by the next
    /// non-empty one. The second index is always distinct from the first.
    pub fn advance(
        &mut self,
        buckets: &ConflictBuckets,
        seats: usize,
    ) -> Option<(usize, Option<usize>)> {
        if buckets.len() == 0 {
            return None;
        }
        let first = buckets.next_non_empty(self.side1, None)?;
        self.side1 = first;
        if seats < 2 {
            return Some((first, None));
        }
        let second = buckets.next_non_empty(self.side2 % buckets.len(), Some(first));
        if let Some(second) = second {
            self.side2 = second;
        }
        Some((first, second))
    }
}

pub struct StickyPairSource {
    buckets: ConflictBuckets,
    rotation: Rotation,
}

impl StickyPairSource {
    pub fn new(students: Vec<Student>) -> Self {
        let buckets = ConflictBuckets::from_students(students);
        trace!(
            "Sticky pair rotation over {} conflict classes: {}",
            buckets.len(),
            buckets.classes.iter().join(", ")
        );
        Self {
            buckets,
            rotation: Rotation::default(),
        }
    }
}

impl SeatSource for StickyPairSource {
    fn next_desk(&mut self, seats: usize) -> Option<DeskPick> {
        let (first, second) = self.rotation.advance(&self.buckets, seats)?;
        let side1 = self.buckets.pop(first)?;
        let side2 = second.and_then(|i| self.buckets.pop(i));
        Some(DeskPick { side1, side2 })
    }

    fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn into_remaining(self: Box<Self>) -> Vec<Student> {
        self.buckets.into_remaining()
    }
}

/// A single ordered queue. Side 2 goes to the first later student whose
/// conflict class differs from side 1.
pub struct QueueSource {
    queue: VecDeque<Student>,
}

impl QueueSource {
    pub fn new(students: Vec<Student>) -> Self {
        Self {
            queue: students.into(),
        }
    }
}

impl SeatSource for QueueSource {
    fn next_desk(&mut self, seats: usize) -> Option<DeskPick> {
        let side1 = self.queue.pop_front()?;
        let side2 = if seats < 2 {
            None
        } else {
            let class = side1.conflict_class();
            self.queue
                .iter()
                .position(|s| s.conflict_class() != class)
                .and_then(|i| self.queue.remove(i))
        };
        Some(DeskPick { side1, side2 })
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn into_remaining(self: Box<Self>) -> Vec<Student> {
        self.queue.into()
    }
}
