//! Versioned scrape contracts for the campus academic portal.
//!
//! Each target pins the selector or pattern it relies on to a `VERSION`, and its
//! tests pin that contract to a fixture of the markup it was written against.
//! Bump the version whenever the contract changes with the markup.

mod course_activities;
mod course_table_params;
mod score_sheet;
mod semester_calendar;

pub use course_activities::{CourseActivities, CourseActivity, TimeSlot};
pub use course_table_params::{CourseTableParams, CourseTableQuery};
pub use score_sheet::{Score, ScoreSheet};
pub use semester_calendar::{Semester, SemesterCalendar, Term};

use crate::{error::DecodeError, shape::ResponseShape};

pub trait ScrapeTarget {
    type Output;

    const NAME: &'static str;
    const VERSION: u32;
    const SHAPE: ResponseShape;

    fn decode(bytes: &[u8]) -> Result<Self::Output, DecodeError>;
}
