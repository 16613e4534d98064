// Primitives shared by the survey readers.

use log::{debug, info};
use snafu::prelude::*;

use crate::ranking::*;

/// A survey export once read: the question texts of the header row and the
/// responses below it, every cell already read as a number when possible.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyTable {
    /// One label per column of the sheet.
    pub header: Vec<String>,
    pub body: Vec<SurveyRow>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SurveyRow {
    /// 1-based line in the source file, for diagnostics.
    pub lineno: usize,
    pub cells: Vec<Option<f64>>,
}

/// The label of a header cell. Blank headers get a positional placeholder.
pub fn header_label(col_idx: usize, text: Option<String>) -> String {
    match text {
        Some(s) if !s.trim().is_empty() => s,
        _ => format!("Unnamed: {}", col_idx),
    }
}

/// Restricts the survey to the course columns.
///
/// The first row of the body is the metadata row of the survey tool when
/// `skip_metadata_row` is set, and is left out.
pub fn select_courses(
    survey: &SurveyTable,
    first_column: usize,
    column_count: usize,
    skip_metadata_row: bool,
) -> RankResult<(ResponseSchema, Vec<ResponseRow>)> {
    let required = first_column + column_count;
    ensure!(
        survey.header.len() >= required,
        HeaderTooNarrowSnafu {
            width: survey.header.len(),
            required,
        }
    );
    let headers = &survey.header[first_column..required];
    let schema = ResponseSchema::from_headers(first_column, headers).context(RankingSnafu {})?;
    info!("select_courses: courses: {:?}", schema.course_names());

    let mut body = survey.body.iter();
    if skip_metadata_row {
        if let Some(metadata) = body.next() {
            debug!("select_courses: skipping metadata row {:?}", metadata.lineno);
        }
    }

    let rows: Vec<ResponseRow> = body
        .map(|row| {
            schema
                .courses()
                .iter()
                .map(|c| row.cells.get(c.index).cloned().flatten())
                .collect()
        })
        .collect();
    Ok((schema, rows))
}
