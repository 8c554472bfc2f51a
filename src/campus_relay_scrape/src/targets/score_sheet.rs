use serde::Serialize;

use super::ScrapeTarget;
use crate::{
    error::{DecodeError, RowError},
    rows::{RowView, decode_rows},
    shape::ResponseShape,
};

const ROW_SELECTOR: &str = "tbody > tr";
const MIN_CELLS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    pub course_id: String,
    pub name: String,
    pub course_type: String,
    pub credit: String,
    pub grade: String,
    pub grade_point: String,
}

/// Per-semester grade table (`person!search.action?semesterId=`).
pub struct ScoreSheet;

impl ScoreSheet {
    fn map_row(row: &RowView<'_>) -> Result<Score, RowError> {
        if row.cell_count() < MIN_CELLS {
            return Err(RowError::MissingCell(MIN_CELLS - 1));
        }
        Ok(Score {
            course_id: row.cell_text(2)?,
            name: row.cell_text(3)?,
            course_type: row.cell_text(4)?,
            credit: row.cell_text(5)?,
            grade: row.cell_text(6)?,
            grade_point: row.cell_text(7)?,
        })
    }
}

impl ScrapeTarget for ScoreSheet {
    type Output = Vec<Score>;

    const NAME: &'static str = "score_sheet";
    const VERSION: u32 = 1;
    const SHAPE: ResponseShape = ResponseShape::Html;

    fn decode(bytes: &[u8]) -> Result<Self::Output, DecodeError> {
        Ok(decode_rows(bytes, ROW_SELECTOR, Self::map_row))
    }
}
