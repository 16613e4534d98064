// Primitives for reading and writing CSV files.

use std::io::Write;

use course_ranking::{parse_numeric, RankingTable};
use log::debug;
use snafu::prelude::*;

use crate::ranking::{
    io_common::{header_label, SurveyRow, SurveyTable},
    *,
};

pub const RANKING_HEADER: [&str; 3] = ["Course", "Average Rating", "Count"];

/// Reads a survey export saved as CSV. The layout is the same as the
/// spreadsheet: a row of codes, the header row, then the responses.
pub fn read_csv_survey(path: &Path, header_row: usize) -> RankResult<SurveyTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path.display().to_string(),
        })?;

    let mut header: Option<Vec<String>> = None;
    let mut body: Vec<SurveyRow> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        if idx < header_row {
            continue;
        }
        if idx == header_row {
            header = Some(
                line.iter()
                    .enumerate()
                    .map(|(col, s)| header_label(col, Some(s.to_string())))
                    .collect(),
            );
            continue;
        }
        if line.iter().all(|s| s.trim().is_empty()) {
            debug!("read_csv_survey: skipping empty line {}", lineno);
            continue;
        }
        body.push(SurveyRow {
            lineno,
            cells: line.iter().map(parse_numeric).collect(),
        });
    }
    let header = header.context(MissingHeaderRowSnafu { row: header_row })?;
    Ok(SurveyTable { header, body })
}

/// Formats an average the way the ranking file reports it: as short as
/// possible, but always with a decimal part.
pub fn format_rating(x: f64) -> String {
    let s = x.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

pub fn write_ranking<W: Write>(table: &RankingTable, w: W) -> RankResult<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(RANKING_HEADER).context(CsvWriteSnafu {})?;
    for r in table.rows.iter() {
        wtr.write_record(&[
            r.course.clone(),
            format_rating(r.average_rating),
            r.count.to_string(),
        ])
        .context(CsvWriteSnafu {})?;
    }
    wtr.flush()
        .map_err(csv::Error::from)
        .context(CsvWriteSnafu {})?;
    Ok(())
}

pub fn write_ranking_file(table: &RankingTable, path: &Path) -> RankResult<()> {
    let f = fs::File::create(path).context(OutputIoSnafu {
        path: path.display().to_string(),
    })?;
    write_ranking(table, f)
}

pub fn ranking_csv_string(table: &RankingTable) -> RankResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_ranking(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
