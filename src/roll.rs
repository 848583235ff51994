//! Ordering and grouping keys derived from a student record.

use std::cmp::Ordering;

use crate::data::{ConflictClass, Student};

/// Numeric suffix of a roll number (`CS-3-017` -> 17). Anything that does not
/// end in digits sorts as 0.
pub fn roll_ordinal(roll_number: &str) -> u64 {
    let suffix = roll_number.rsplit('-').next().unwrap_or_default().trim();
    suffix.parse().unwrap_or(0)
}

/// Semester number from a `<semester>-<section>` string. A value without a
/// dash is taken whole.
pub fn semester_number(semester_section: &str) -> &str {
    semester_section
        .split('-')
        .next()
        .unwrap_or_default()
        .trim()
}

pub fn conflict_class(student: &Student) -> ConflictClass {
    ConflictClass {
        paper: student.paper.clone(),
        semester: semester_number(&student.semester_section).to_string(),
    }
}

/// Orders roll numbers by ordinal, falling back to the full text so that two
/// rolls with the same ordinal still compare deterministically.
pub fn compare_rolls(a: &str, b: &str) -> Ordering {
    roll_ordinal(a)
        .cmp(&roll_ordinal(b))
        .then_with(|| a.cmp(b))
}
