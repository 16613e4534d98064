use log::debug;
use snafu::prelude::*;
use std::fs;

use crate::ranking::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT_PATH: &str = "Grad Program Exit Survey Data 2024.xlsx";
pub const DEFAULT_OUTPUT_DIR: &str = "results";
pub const DEFAULT_HEADER_ROW_INDEX: usize = 1;
pub const DEFAULT_CHART_AXIS_LABEL: &str = "MAcc CORE Courses";

/// The optional JSON configuration of a ranking run. Every entry can be left
/// out, in which case the default for the survey export is used.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(rename = "inputPath")]
    pub input_path: Option<String>,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    /// 0-based index of the row holding the question texts.
    #[serde(rename = "headerRowIndex")]
    pub header_row_index: Option<usize>,
    /// 0-based index of the first rating column.
    #[serde(rename = "firstCourseColumnIndex")]
    pub first_course_column_index: Option<usize>,
    #[serde(rename = "courseColumnCount")]
    pub course_column_count: Option<usize>,
    #[serde(rename = "skipMetadataRow")]
    pub skip_metadata_row: Option<bool>,
    #[serde(rename = "renderChart")]
    pub render_chart: Option<bool>,
    #[serde(rename = "chartAxisLabel")]
    pub chart_axis_label: Option<String>,
}

pub fn read_config(path: &str) -> RankResult<RankingConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: content: {:?}", contents);
    let config: RankingConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let config: RankingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RankingConfig::default());
    }

    #[test]
    fn camel_case_keys() {
        let config: RankingConfig = serde_json::from_str(
            r#"{
                "inputPath": "survey.xlsx",
                "excelWorksheetName": "Sheet1",
                "headerRowIndex": 0,
                "firstCourseColumnIndex": 3,
                "skipMetadataRow": false,
                "chartAxisLabel": "Courses"
            }"#,
        )
        .unwrap();
        assert_eq!(config.input_path.as_deref(), Some("survey.xlsx"));
        assert_eq!(config.excel_worksheet_name.as_deref(), Some("Sheet1"));
        assert_eq!(config.header_row_index, Some(0));
        assert_eq!(config.first_course_column_index, Some(3));
        assert_eq!(config.course_column_count, None);
        assert_eq!(config.skip_metadata_row, Some(false));
        assert_eq!(config.chart_axis_label.as_deref(), Some("Courses"));
    }

    #[test]
    fn missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json").display().to_string();
        assert!(matches!(
            read_config(&missing),
            Err(RankError::OpeningJson { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{\"headerRowIndex\": \"one\"}").unwrap();
        assert!(matches!(
            read_config(&bad.display().to_string()),
            Err(RankError::ParsingJson { .. })
        ));
    }
}
