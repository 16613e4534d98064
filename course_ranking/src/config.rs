// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// One rating question of the survey: the position of the column in the
/// sheet and the name of the course it rates.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct CourseColumn {
    pub index: usize,
    pub name: String,
}

/// The fixed list of course columns that responses are read from.
///
/// Built through [`ResponseSchema::new`], which guarantees that the list is not
/// empty and that no two columns share a course name.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResponseSchema {
    courses: Vec<CourseColumn>,
}

impl ResponseSchema {
    /// Position of the first rating column in the survey export (column L).
    pub const DEFAULT_FIRST_COLUMN: usize = 11;
    /// Number of rating columns in the survey export (columns L to S).
    pub const DEFAULT_COLUMN_COUNT: usize = 8;

    pub fn new(courses: Vec<CourseColumn>) -> Result<ResponseSchema, RankingErrors> {
        if courses.is_empty() {
            return Err(RankingErrors::EmptySchema);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for c in courses.iter() {
            if !seen.insert(c.name.as_str()) {
                return Err(RankingErrors::DuplicateCourse {
                    name: c.name.clone(),
                });
            }
        }
        Ok(ResponseSchema { courses })
    }

    /// Builds the schema from raw header texts, one per column starting at
    /// `first_index`. The course names are parsed out of the headers.
    pub fn from_headers(
        first_index: usize,
        headers: &[String],
    ) -> Result<ResponseSchema, RankingErrors> {
        let courses = headers
            .iter()
            .enumerate()
            .map(|(offset, h)| CourseColumn {
                index: first_index + offset,
                name: crate::course_name(h).to_string(),
            })
            .collect();
        ResponseSchema::new(courses)
    }

    pub fn courses(&self) -> &[CourseColumn] {
        &self.courses
    }

    pub fn course_names(&self) -> Vec<String> {
        self.courses.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// The answers of one respondent, restricted to the course columns.
/// `None` marks a cell that is missing or not a number.
pub type ResponseRow = Vec<Option<f64>>;

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct RankingRow {
    pub course: String,
    pub average_rating: f64,
    pub count: u64,
}

/// How many responses survived the cleaning step.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CleaningStats {
    pub initial_rows: usize,
    pub final_rows: usize,
}

impl CleaningStats {
    pub fn dropped_rows(&self) -> usize {
        self.initial_rows - self.final_rows
    }
}

/// The courses, best first.
#[derive(PartialEq, Debug, Clone)]
pub struct RankingTable {
    pub rows: Vec<RankingRow>,
    pub cleaning: CleaningStats,
}

impl RankingTable {
    /// The rows from worst to best, which is the order a horizontal bar chart
    /// draws them from the bottom up.
    pub fn worst_first(&self) -> Vec<RankingRow> {
        self.rows.iter().rev().cloned().collect()
    }
}

impl Display for RankingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.course.chars().count())
            .max()
            .unwrap_or(0)
            .max("Course".len());
        writeln!(
            f,
            "{:>4}  {:<width$}  {:>14}  {:>6}",
            "Rank",
            "Course",
            "Average Rating",
            "Count",
            width = width
        )?;
        for (idx, r) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{:>4}  {:<width$}  {:>14.4}  {:>6}",
                idx + 1,
                r.course,
                r.average_rating,
                r.count,
                width = width
            )?;
        }
        Ok(())
    }
}

/// Errors that prevent the ranking from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RankingErrors {
    EmptySchema,
    DuplicateCourse { name: String },
    RowWidth { expected: usize, found: usize },
    /// No response has a valid number in every course column, so no average
    /// can be computed.
    NoCompleteResponses,
}

impl Error for RankingErrors {}

impl Display for RankingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingErrors::EmptySchema => write!(f, "no course columns were selected"),
            RankingErrors::DuplicateCourse { name } => {
                write!(f, "course {:?} appears in more than one column", name)
            }
            RankingErrors::RowWidth { expected, found } => write!(
                f,
                "response row has {} values, expected {}",
                found, expected
            ),
            RankingErrors::NoCompleteResponses => {
                write!(f, "no response has a valid rating for every course")
            }
        }
    }
}
