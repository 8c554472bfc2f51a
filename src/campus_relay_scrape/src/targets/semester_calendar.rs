use serde::Serialize;
use serde_json::Value;

use super::ScrapeTarget;
use crate::{
    error::{DecodeError, RowError},
    jsonish::decode_jsonish,
    pattern::{compile_pattern, first_capture},
    shape::ResponseShape,
};

const SCHOOL_YEAR_PATTERN: &str = r"(?P<start>\d+)-(?P<end>\d+)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Term {
    First,
    Second,
    Summer,
    Winter,
    Other(String),
}

impl Term {
    fn from_name(name: &str) -> Self {
        if name.contains('1') {
            Self::First
        } else if name.contains('2') {
            Self::Second
        } else if name.contains('暑') {
            Self::Summer
        } else if name.contains('寒') {
            Self::Winter
        } else {
            Self::Other(name.to_owned())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Semester {
    pub id: i64,
    pub start_year: i32,
    pub term: Term,
}

/// `dataQuery.action` with `dataType=semesterCalendar`.
///
/// The body is near-JSON; `semesters` maps year keys (`y0`, `y1`, ...) to
/// arrays of `{id, schoolYear, name}`.
pub struct SemesterCalendar;

impl SemesterCalendar {
    fn map_entry(entry: &Value, school_year: &regex::Regex) -> Result<Semester, RowError> {
        let id = entry["id"]
            .as_i64()
            .ok_or_else(|| RowError::MissingField("id".to_string()))?;
        let year = entry["schoolYear"]
            .as_str()
            .ok_or_else(|| RowError::MissingField("schoolYear".to_string()))?;
        let name = entry["name"]
            .as_str()
            .ok_or_else(|| RowError::MissingField("name".to_string()))?;

        let start = first_capture(year, school_year, "start")
            .ok_or_else(|| RowError::Invalid(format!("school year {year:?}")))?;
        let start_year = start.parse().map_err(|_| RowError::InvalidNumber {
            field: "schoolYear".to_string(),
            value: start.to_owned(),
        })?;

        Ok(Semester {
            id,
            start_year,
            term: Term::from_name(name),
        })
    }
}

impl ScrapeTarget for SemesterCalendar {
    type Output = Vec<Semester>;

    const NAME: &'static str = "semester_calendar";
    const VERSION: u32 = 1;
    const SHAPE: ResponseShape = ResponseShape::JsonIsh;

    fn decode(bytes: &[u8]) -> Result<Self::Output, DecodeError> {
        let value = decode_jsonish(bytes)?;
        let years = value
            .get("semesters")
            .and_then(Value::as_object)
            .ok_or_else(|| DecodeError::MalformedResponse("missing `semesters`".to_string()))?;
        let school_year = compile_pattern(SCHOOL_YEAR_PATTERN)?;

        let mut semesters: Vec<Semester> = years
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|entry| match Self::map_entry(entry, &school_year) {
                Ok(semester) => Some(semester),
                Err(e) => {
                    tracing::debug!(error = %e, "Dropping semester entry");
                    None
                }
            })
            .collect();
        semesters.sort_by_key(|s| s.id);

        Ok(semesters)
    }
}
