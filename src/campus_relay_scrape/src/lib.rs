pub mod error;
pub mod html;
pub mod jsonish;
pub mod pattern;
pub mod rows;
pub mod shape;
pub mod targets;

pub use error::{DecodeError, RowError};
pub use html::{LoginForm, element_exists, hidden_form_fields, parse_html, parse_selector, script_blocks};
pub use jsonish::{decode_jsonish, normalize_jsonish};
pub use pattern::{PatternMatch, compile_pattern, decode_pattern, first_capture};
pub use rows::{RowView, decode_rows};
pub use shape::{DecodedBody, ResponseShape, decode_body};
pub use targets::{
    CourseActivities, CourseActivity, CourseTableParams, CourseTableQuery, Score, ScoreSheet,
    ScrapeTarget, Semester, SemesterCalendar, Term, TimeSlot,
};
