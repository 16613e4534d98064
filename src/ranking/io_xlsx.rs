use calamine::{open_workbook_auto, DataType, Range, Reader};
use log::debug;
use snafu::prelude::*;

use crate::ranking::{
    io_common::{header_label, SurveyRow, SurveyTable},
    *,
};

pub fn read_spreadsheet_survey(
    path: &Path,
    worksheet_name: Option<&str>,
    header_row: usize,
) -> RankResult<SurveyTable> {
    let wrange = get_range(path, worksheet_name)?;
    range_to_survey(&wrange, header_row)
}

fn get_range(path: &Path, worksheet_name: Option<&str>) -> RankResult<Range<DataType>> {
    let p = path.display().to_string();
    debug!("get_range: path: {:?} worksheet: {:?}", &p, &worksheet_name);
    let mut workbook = open_workbook_auto(path).context(OpeningWorkbookSnafu { path: &p })?;

    match worksheet_name {
        // A worksheet name was provided, use it.
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingSheetSnafu { name })?
            .context(OpeningWorkbookSnafu { path: &p }),
        None => {
            debug!("get_range: sheets: {:?}", workbook.sheet_names());
            workbook
                .worksheet_range_at(0)
                .context(EmptyWorkbookSnafu {})?
                .context(OpeningWorkbookSnafu { path: &p })
        }
    }
}

/// Reads the header row and the rows below it out of a worksheet.
///
/// Positions are absolute in the sheet: `header_row` 1 is the second row of the
/// sheet even when the first one is blank.
pub fn range_to_survey(wrange: &Range<DataType>, header_row: usize) -> RankResult<SurveyTable> {
    let (height, width) = match wrange.end() {
        Some((r, c)) => (r as usize + 1, c as usize + 1),
        None => return EmptyWorkbookSnafu {}.fail(),
    };
    ensure!(header_row < height, MissingHeaderRowSnafu { row: header_row });

    let cell = |row: usize, col: usize| wrange.get_value((row as u32, col as u32));

    let header: Vec<String> = (0..width)
        .map(|col| header_label(col, cell(header_row, col).and_then(header_text)))
        .collect();
    debug!("range_to_survey: header: {:?}", header);

    let mut body: Vec<SurveyRow> = Vec::new();
    for row in (header_row + 1)..height {
        let raw: Vec<Option<&DataType>> = (0..width).map(|col| cell(row, col)).collect();
        if raw.iter().all(|c| c.map_or(true, is_blank)) {
            debug!("range_to_survey: skipping empty row {}", row + 1);
            continue;
        }
        body.push(SurveyRow {
            lineno: row + 1,
            cells: raw.into_iter().map(|c| c.and_then(read_cell)).collect(),
        });
    }
    Ok(SurveyTable { header, body })
}

fn header_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty => None,
        DataType::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_blank(cell: &DataType) -> bool {
    match cell {
        DataType::Empty => true,
        DataType::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// The numeric value of a cell, if it holds one.
pub fn read_cell(cell: &DataType) -> Option<f64> {
    match cell {
        DataType::Int(i) => Some(*i as f64),
        DataType::Float(f) if f.is_finite() => Some(*f),
        DataType::String(s) => parse_numeric(s),
        // Booleans, dates and errors are not ratings.
        _ => None,
    }
}
