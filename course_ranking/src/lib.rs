/*!
Ranking of courses by student preference.

Each survey response rates every course with a number (1 is the favourite).
The ranking keeps only the responses that rated all the courses, averages the
ratings of each course, and orders the courses by lowest average first. Among
courses with the same average, the one with more responses ranks higher.

```
use course_ranking::*;

let schema = ResponseSchema::from_headers(
    0,
    &["Q1_1 - Taxation".to_string(), "Q1_2 - Audit".to_string()],
)?;
let rows = vec![
    vec![Some(1.0), Some(2.0)],
    vec![Some(2.0), None],
    vec![Some(1.0), Some(2.0)],
];
let table = run_ranking(&schema, &rows)?;
assert_eq!(table.rows[0].course, "Taxation");
assert_eq!(table.rows[0].count, 2);
assert_eq!(table.cleaning.dropped_rows(), 1);
# Ok::<(), RankingErrors>(())
```
*/

pub mod builder;
mod config;
use log::{debug, info};

use std::cmp::Ordering;

pub use crate::config::*;

/// The separator between the question prefix and the course name in a
/// header, as in `"Q35_1 - Taxation"`.
pub const COURSE_SEPARATOR: &str = " - ";

/// Extracts the course name from the text of a column header.
///
/// The name is what follows the last separator. Without a separator, the whole
/// header is the name.
pub fn course_name(header: &str) -> &str {
    match header.rsplit_once(COURSE_SEPARATOR) {
        Some((_, name)) => name,
        None => header,
    }
}

/// Reads a rating out of some free text.
///
/// Returns None for anything that is not a finite number (blank cells, "N/A",
/// "NaN", "inf", ...).
pub fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Keeps the responses that have a rating for every course.
///
/// A single missing rating removes the whole response.
pub fn clean_rows(
    schema: &ResponseSchema,
    rows: &[ResponseRow],
) -> Result<(Vec<Vec<f64>>, CleaningStats), RankingErrors> {
    let mut res: Vec<Vec<f64>> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != schema.len() {
            return Err(RankingErrors::RowWidth {
                expected: schema.len(),
                found: row.len(),
            });
        }
        let complete: Option<Vec<f64>> = row.iter().cloned().collect();
        match complete {
            Some(values) => res.push(values),
            None => debug!("clean_rows: dropping row {}: {:?}", idx, row),
        }
    }
    let stats = CleaningStats {
        initial_rows: rows.len(),
        final_rows: res.len(),
    };
    Ok((res, stats))
}

/// Orders rows by average rating (lowest first), then by count (highest
/// first). The sort is stable: complete ties keep their input order.
pub fn sort_ranking(rows: &mut [RankingRow]) {
    rows.sort_by(|a, b| match a.average_rating.total_cmp(&b.average_rating) {
        Ordering::Equal => b.count.cmp(&a.count),
        o => o,
    });
}

fn aggregate(schema: &ResponseSchema, cleaned: &[Vec<f64>]) -> Vec<RankingRow> {
    let count = cleaned.len() as u64;
    schema
        .courses()
        .iter()
        .enumerate()
        .map(|(col, course)| {
            let total: f64 = cleaned.iter().map(|row| row[col]).sum();
            RankingRow {
                course: course.name.clone(),
                average_rating: total / count as f64,
                count,
            }
        })
        .collect()
}

/// Computes the ranking of the courses of the schema from the given responses.
///
/// Arguments:
/// * `schema` the course columns, in the order of the values of each row
/// * `rows` the responses, one value per course column
pub fn run_ranking(
    schema: &ResponseSchema,
    rows: &[ResponseRow],
) -> Result<RankingTable, RankingErrors> {
    info!(
        "Processing {:?} responses, courses: {:?}",
        rows.len(),
        schema.course_names()
    );
    let (cleaned, cleaning) = clean_rows(schema, rows)?;
    info!(
        "run_ranking: kept {} of {} responses",
        cleaning.final_rows, cleaning.initial_rows
    );
    if cleaned.is_empty() {
        return Err(RankingErrors::NoCompleteResponses);
    }

    let mut ranking = aggregate(schema, &cleaned);
    sort_ranking(&mut ranking);
    for (idx, r) in ranking.iter().enumerate() {
        debug!(
            "run_ranking: rank {}: {} avg {} count {}",
            idx + 1,
            r.course,
            r.average_rating,
            r.count
        );
    }
    Ok(RankingTable {
        rows: ranking,
        cleaning,
    })
}
