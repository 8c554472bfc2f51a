use serde::Serialize;

use super::ScrapeTarget;
use crate::{
    error::DecodeError,
    pattern::{compile_pattern, first_capture},
    shape::ResponseShape,
};

const IDS_PATTERN: &str = r#"bg\.form\.addInput\(form,\s*"ids",\s*"(?P<ids>\d+)"\);"#;
const SEMESTER_PATTERN: &str = r#"empty:\s*"false",\s*onChange:\s*"",\s*value:\s*"(?P<semester>\d+)""#;

/// Parameters the course table query needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseTableQuery {
    pub semester_id: u64,
    pub ids: String,
}

impl CourseTableQuery {
    pub fn form(&self, start_week: u32) -> Vec<(String, String)> {
        vec![
            ("ignoreHead".to_string(), "1".to_string()),
            ("setting.kind".to_string(), "std".to_string()),
            ("startWeek".to_string(), start_week.to_string()),
            ("semester.id".to_string(), self.semester_id.to_string()),
            ("ids".to_string(), self.ids.clone()),
        ]
    }
}

/// Course table entry page (`courseTableForStd.action`), which embeds the
/// student's `ids` and the current semester in inline script.
pub struct CourseTableParams;

impl ScrapeTarget for CourseTableParams {
    type Output = CourseTableQuery;

    const NAME: &'static str = "course_table_params";
    const VERSION: u32 = 1;
    const SHAPE: ResponseShape = ResponseShape::Html;

    fn decode(bytes: &[u8]) -> Result<Self::Output, DecodeError> {
        let text = String::from_utf8_lossy(bytes);

        let ids = first_capture(&text, &compile_pattern(IDS_PATTERN)?, "ids")
            .ok_or_else(|| DecodeError::MalformedResponse("missing `ids`".to_string()))?;
        let semester = first_capture(&text, &compile_pattern(SEMESTER_PATTERN)?, "semester")
            .ok_or_else(|| DecodeError::MalformedResponse("missing semester id".to_string()))?;
        let semester_id = semester
            .parse()
            .map_err(|_| DecodeError::MalformedResponse(format!("semester id {semester:?}")))?;

        Ok(CourseTableQuery {
            semester_id,
            ids: ids.to_owned(),
        })
    }
}
