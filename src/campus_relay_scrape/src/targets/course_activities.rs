use serde::Serialize;

use super::ScrapeTarget;
use crate::{
    error::{DecodeError, RowError},
    html::{parse_html, script_blocks},
    pattern::{PatternMatch, compile_pattern, decode_pattern},
    shape::ResponseShape,
};

const ACTIVITY_MARKER: &str = "new TaskActivity";
const ACTIVITY_PATTERN: &str = r#"new TaskActivity\(".*","(?P<teacher>.*)","(?P<id>\d+)\((?P<code>.*)\)","(?P<name>.*)\(.*\)","(.*?)","(?P<location>.*)","(?P<weeks>[01]+)"\);"#;
const SLOT_PATTERN: &str = r"index\s*=\s*(?P<weekday>\d+)\s*\*\s*unitCount\s*\+\s*(?P<unit>\d+)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub weekday: u8,
    pub unit: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseActivity {
    pub teacher: String,
    pub course_id: u64,
    pub code: String,
    pub name: String,
    pub location: String,
    /// Zero-based teaching weeks, from the `[01]+` week bitmap.
    pub weeks: Vec<u32>,
    pub slots: Vec<TimeSlot>,
}

impl CourseActivity {
    pub fn weekday(&self) -> Option<u8> {
        self.slots.last().map(|s| s.weekday)
    }

    /// First and last teaching unit of the day.
    pub fn units(&self) -> Option<(u8, u8)> {
        let first = self.slots.iter().map(|s| s.unit).min()?;
        let last = self.slots.iter().map(|s| s.unit).max()?;
        Some((first, last))
    }
}

/// Course table page (`courseTableForStd!courseTable.action`).
///
/// Each activity is a `new TaskActivity(...)` statement followed by one
/// `index = weekday*unitCount+unit;` statement per occupied unit.
pub struct CourseActivities;

impl CourseActivities {
    fn map_activity(m: &PatternMatch<'_>) -> Result<(usize, CourseActivity), RowError> {
        let weeks = m
            .name("weeks")?
            .chars()
            .enumerate()
            .filter(|(_, bit)| *bit == '1')
            .map(|(week, _)| week as u32)
            .collect();

        Ok((
            m.start(),
            CourseActivity {
                teacher: m.name("teacher")?.to_owned(),
                course_id: m.parse("id")?,
                code: m.name("code")?.to_owned(),
                name: m.name("name")?.to_owned(),
                location: m.name("location")?.to_owned(),
                weeks,
                slots: Vec::new(),
            },
        ))
    }

    fn map_slot(m: &PatternMatch<'_>) -> Result<(usize, TimeSlot), RowError> {
        Ok((
            m.start(),
            TimeSlot {
                weekday: m.parse("weekday")?,
                unit: m.parse("unit")?,
            },
        ))
    }
}

impl ScrapeTarget for CourseActivities {
    type Output = Vec<CourseActivity>;

    const NAME: &'static str = "course_activities";
    const VERSION: u32 = 1;
    const SHAPE: ResponseShape = ResponseShape::Script;

    fn decode(bytes: &[u8]) -> Result<Self::Output, DecodeError> {
        let scripts = script_blocks(&parse_html(bytes));
        // A semester without courses has no activity script at all
        let Some(script) = scripts.iter().find(|s| s.contains(ACTIVITY_MARKER)) else {
            return Ok(Vec::new());
        };

        let activity_pattern = compile_pattern(ACTIVITY_PATTERN)?;
        let slot_pattern = compile_pattern(SLOT_PATTERN)?;

        let mut activities = decode_pattern(script, &activity_pattern, Self::map_activity);
        let slots = decode_pattern(script, &slot_pattern, Self::map_slot);

        // Slots of an activity that failed to decode must not leak into the previous one
        let declarations: Vec<usize> = script
            .match_indices(ACTIVITY_MARKER)
            .map(|(offset, _)| offset)
            .collect();

        for (offset, slot) in slots {
            let Some(owner) = declarations.iter().rev().find(|start| **start < offset) else {
                continue;
            };
            if let Some((_, activity)) = activities.iter_mut().find(|(start, _)| start == owner) {
                activity.slots.push(slot);
            }
        }

        Ok(activities
            .into_iter()
            .map(|(_, activity)| activity)
            .filter(|activity| !activity.slots.is_empty())
            .collect())
    }
}
