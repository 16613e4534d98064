use log::{debug, info, warn};

use course_ranking::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::ranking::config_reader::*;

mod chart;
mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

pub const CSV_FILE_NAME: &str = "program_ranking.csv";
pub const CHART_FILE_NAME: &str = "program_ranking.png";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RankError {
    #[snafu(display("File {path} not found."))]
    InputNotFound { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningWorkbook {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The workbook has no worksheet"))]
    EmptyWorkbook {},
    #[snafu(display("Worksheet {name} not found"))]
    MissingSheet { name: String },
    #[snafu(display("The sheet has no header row at index {row}"))]
    MissingHeaderRow { row: usize },
    #[snafu(display(
        "The header has {width} columns, at least {required} are needed for the course columns"
    ))]
    HeaderTooNarrow { width: usize, required: usize },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing the ranking CSV"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error writing {path}"))]
    OutputIo {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Unknown input type {name:?} (expected xlsx or csv)"))]
    UnknownInputType { name: String },
    #[snafu(display("Error drawing the chart: {message}"))]
    Chart { message: String },
    #[snafu(display("Error computing the ranking"))]
    Ranking { source: RankingErrors },
    #[snafu(display("Error reading reference ranking {path}"))]
    ReadingReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between computed ranking and reference ranking"))]
    ReferenceMismatch {},
}

pub type RankResult<T> = Result<T, RankError>;

/// The format of the survey export.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    /// Any spreadsheet calamine can open (xlsx, xls, xlsb, ods).
    Spreadsheet,
    Csv,
}

impl InputType {
    fn parse(name: &str) -> RankResult<InputType> {
        match name.to_lowercase().as_str() {
            "xlsx" | "xls" | "xlsb" | "ods" | "excel" => Ok(InputType::Spreadsheet),
            "csv" => Ok(InputType::Csv),
            _ => UnknownInputTypeSnafu { name }.fail(),
        }
    }

    fn from_extension(path: &Path) -> InputType {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputType::Csv,
            _ => InputType::Spreadsheet,
        }
    }
}

/// All the settings of one run, after merging the command line, the
/// configuration file and the defaults.
#[derive(PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input_path: PathBuf,
    pub input_type: InputType,
    pub worksheet_name: Option<String>,
    pub output_dir: PathBuf,
    pub header_row_index: usize,
    pub first_course_column: usize,
    pub course_column_count: usize,
    pub skip_metadata_row: bool,
    pub render_chart: bool,
    pub chart_axis_label: String,
}

impl RunSettings {
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(CSV_FILE_NAME)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(CHART_FILE_NAME)
    }
}

/// The outcome of the transform, before anything is written.
#[derive(PartialEq, Debug, Clone)]
pub struct ComputedRanking {
    /// The course names in column order.
    pub courses: Vec<String>,
    pub table: RankingTable,
}

pub fn build_settings(args: &Args) -> RankResult<RunSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (RankingConfig::default(), PathBuf::new()),
    };
    info!("build_settings: config: {:?}", config);

    // The command line wins over the configuration file.
    let input_path = match &args.input {
        Some(p) => PathBuf::from(p),
        None => resolve_path(&root, config.input_path.as_deref(), DEFAULT_INPUT_PATH),
    };
    let output_dir = match &args.out {
        Some(p) => PathBuf::from(p),
        None => resolve_path(&root, config.output_directory.as_deref(), DEFAULT_OUTPUT_DIR),
    };
    let input_type = match args.input_type.as_ref().or(config.input_type.as_ref()) {
        Some(name) => InputType::parse(name)?,
        None => InputType::from_extension(&input_path),
    };

    Ok(RunSettings {
        input_path,
        input_type,
        worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or(config.excel_worksheet_name),
        output_dir,
        header_row_index: config.header_row_index.unwrap_or(DEFAULT_HEADER_ROW_INDEX),
        first_course_column: config
            .first_course_column_index
            .unwrap_or(ResponseSchema::DEFAULT_FIRST_COLUMN),
        course_column_count: config
            .course_column_count
            .unwrap_or(ResponseSchema::DEFAULT_COLUMN_COUNT),
        skip_metadata_row: config.skip_metadata_row.unwrap_or(true),
        render_chart: config.render_chart.unwrap_or(true),
        chart_axis_label: config
            .chart_axis_label
            .unwrap_or_else(|| DEFAULT_CHART_AXIS_LABEL.to_string()),
    })
}

fn resolve_path(root: &Path, configured: Option<&str>, default: &str) -> PathBuf {
    let p = Path::new(configured.unwrap_or(default));
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// Reads the survey and computes the ranking. Nothing is written to disk.
pub fn compute_ranking(settings: &RunSettings) -> RankResult<ComputedRanking> {
    let path = settings.input_path.display().to_string();
    ensure!(settings.input_path.exists(), InputNotFoundSnafu { path: &path });
    info!("Attempting to read survey file {:?}", path);

    let survey = match settings.input_type {
        InputType::Spreadsheet => io_xlsx::read_spreadsheet_survey(
            &settings.input_path,
            settings.worksheet_name.as_deref(),
            settings.header_row_index,
        )?,
        InputType::Csv => io_csv::read_csv_survey(&settings.input_path, settings.header_row_index)?,
    };
    debug!("compute_ranking: header: {:?}", survey.header);

    let (schema, rows) = io_common::select_courses(
        &survey,
        settings.first_course_column,
        settings.course_column_count,
        settings.skip_metadata_row,
    )?;
    let table = run_ranking(&schema, &rows).context(RankingSnafu {})?;
    Ok(ComputedRanking {
        courses: schema.course_names(),
        table,
    })
}

/// Writes the ranking CSV and the chart into the output directory.
pub fn write_outputs(table: &RankingTable, settings: &RunSettings) -> RankResult<()> {
    fs::create_dir_all(&settings.output_dir).context(OutputIoSnafu {
        path: settings.output_dir.display().to_string(),
    })?;

    let csv_path = settings.csv_path();
    io_csv::write_ranking_file(table, &csv_path)?;
    println!("Saved ranking to {}", csv_path.display());

    if settings.render_chart {
        let chart_path = settings.chart_path();
        chart::render_chart(table, &chart_path, &settings.chart_axis_label)?;
        println!("Saved plot to {}", chart_path.display());
    } else {
        info!("write_outputs: chart rendering disabled");
    }
    Ok(())
}

/// Compares the computed ranking with a reference ranking CSV.
pub fn check_reference(table: &RankingTable, reference_path: &str) -> RankResult<()> {
    let reference = fs::read_to_string(reference_path).context(ReadingReferenceSnafu {
        path: reference_path,
    })?;
    let computed = io_csv::ranking_csv_string(table)?;
    info!("check_reference: reference: {:?}", reference);
    let reference = reference.replace("\r\n", "\n");
    if reference.trim_end() != computed.trim_end() {
        warn!("Found differences with the reference ranking");
        print_diff(reference.as_str(), computed.as_str(), "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

pub fn run_program(args: &Args) -> RankResult<RankingTable> {
    let settings = build_settings(args)?;
    info!("run_program: settings: {:?}", settings);
    println!("Loading data from {}...", settings.input_path.display());

    let computed = compute_ranking(&settings)?;
    let table = computed.table;
    println!("Identified courses: {:?}", computed.courses);
    println!(
        "Data cleaning: {} rows -> {} rows (dropped {} rows with missing values).",
        table.cleaning.initial_rows,
        table.cleaning.final_rows,
        table.cleaning.dropped_rows()
    );
    println!("Ranking calculated:");
    print!("{}", table);

    write_outputs(&table, &settings)?;

    if let Some(reference_path) = &args.reference {
        check_reference(&table, reference_path)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER_CODES: &str = "StartDate,EndDate,Status,IPAddress,Progress,Duration,Finished,RecordedDate,ResponseId,LocationLatitude,LocationLongitude,Q35_1,Q35_2,Q35_3,Q35_4,Q35_5,Q35_6,Q35_7,Q35_8,Q36";
    const HEADER_TEXT: &str = "Start Date,End Date,Response Type,IP Address,Progress,Duration (in seconds),Finished,Recorded Date,Response ID,Location Latitude,Location Longitude,Rank the courses - Taxation,Rank the courses - Audit,Rank the courses - Ethics,Rank the courses - Data Analytics,Rank the courses - Financial Reporting,Rank the courses - Managerial Accounting,Rank the courses - Systems,Rank the courses - Governance,Comments";
    const METADATA: &str = "\"{\"\"ImportId\"\":\"\"startDate\"\"}\",\"{\"\"ImportId\"\":\"\"endDate\"\"}\",x,x,x,x,x,x,x,x,x,\"{\"\"ImportId\"\":\"\"QID35_1\"\"}\",\"{\"\"ImportId\"\":\"\"QID35_2\"\"}\",\"{\"\"ImportId\"\":\"\"QID35_3\"\"}\",\"{\"\"ImportId\"\":\"\"QID35_4\"\"}\",\"{\"\"ImportId\"\":\"\"QID35_5\"\"}\",\"{\"\"ImportId\"\":\"\"QID35_6\"\"}\",\"{\"\"ImportId\"\":\"\"QID35_7\"\"}\",\"{\"\"ImportId\"\":\"\"QID35_8\"\"}\",x";

    fn response(ratings: &[&str]) -> String {
        let prefix = "2024-05-01,2024-05-01,IP,1.2.3.4,100,300,True,2024-05-01,R_1,0,0";
        format!("{},{},ok", prefix, ratings.join(","))
    }

    /// 10 data rows, 2 of them with a non-numeric rating.
    fn write_survey(dir: &Path) -> PathBuf {
        let mut lines: Vec<String> = vec![
            HEADER_CODES.to_string(),
            HEADER_TEXT.to_string(),
            METADATA.to_string(),
        ];
        for i in 0..8 {
            let (a, b) = if i % 2 == 0 { ("1", "2") } else { ("2", "1") };
            lines.push(response(&[a, b, "3", "4", "5", "6", "8", "7"]));
            if i == 3 {
                lines.push(response(&["1", "1", "N/A", "1", "1", "1", "1", "1"]));
            }
        }
        lines.push(response(&["", "1", "1", "1", "1", "1", "1", "1"]));
        let p = dir.join("survey.csv");
        let mut f = fs::File::create(&p).unwrap();
        writeln!(f, "{}", lines.join("\n")).unwrap();
        p
    }

    fn test_args(input: &Path, out: &Path) -> Args {
        Args {
            input: Some(input.display().to_string()),
            out: Some(out.display().to_string()),
            ..Args::default()
        }
    }

    fn no_chart(args: &Args) -> RunSettings {
        let mut settings = build_settings(args).unwrap();
        settings.render_chart = false;
        settings
    }

    #[test]
    fn default_settings() {
        let settings = build_settings(&Args::default()).unwrap();
        assert_eq!(
            settings.input_path,
            PathBuf::from("Grad Program Exit Survey Data 2024.xlsx")
        );
        assert_eq!(settings.input_type, InputType::Spreadsheet);
        assert_eq!(settings.output_dir, PathBuf::from("results"));
        assert_eq!(settings.csv_path(), PathBuf::from("results/program_ranking.csv"));
        assert_eq!(settings.chart_path(), PathBuf::from("results/program_ranking.png"));
        assert_eq!(settings.header_row_index, 1);
        assert_eq!(settings.first_course_column, 11);
        assert_eq!(settings.course_column_count, 8);
        assert!(settings.skip_metadata_row);
        assert!(settings.render_chart);
        assert_eq!(settings.chart_axis_label, "MAcc CORE Courses");
    }

    #[test]
    fn config_file_paths_resolve_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("ranking.json");
        fs::write(
            &config_path,
            r#"{"inputPath": "survey.csv", "outputDirectory": "out", "courseColumnCount": 4, "renderChart": false}"#,
        )
        .unwrap();
        let args = Args {
            config: Some(config_path.display().to_string()),
            ..Args::default()
        };
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.input_path, dir.path().join("survey.csv"));
        assert_eq!(settings.input_type, InputType::Csv);
        assert_eq!(settings.output_dir, dir.path().join("out"));
        assert_eq!(settings.course_column_count, 4);
        assert!(!settings.render_chart);

        // The command line overrides the configuration.
        let args = Args {
            out: Some("elsewhere".to_string()),
            input_type: Some("xlsx".to_string()),
            ..args
        };
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("elsewhere"));
        assert_eq!(settings.input_type, InputType::Spreadsheet);
    }

    #[test]
    fn unknown_input_type() {
        let args = Args {
            input_type: Some("parquet".to_string()),
            ..Args::default()
        };
        assert!(matches!(
            build_settings(&args),
            Err(RankError::UnknownInputType { .. })
        ));
    }

    #[test]
    fn missing_input_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let args = test_args(&dir.path().join("missing.xlsx"), &out);
        let res = run_program(&args);
        assert!(matches!(res, Err(RankError::InputNotFound { .. })));
        assert!(!out.exists());
    }

    #[test]
    fn end_to_end_csv_survey() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_survey(dir.path());
        let out = dir.path().join("results");
        let settings = no_chart(&test_args(&input, &out));

        let computed = compute_ranking(&settings).unwrap();
        assert!(!out.exists());
        assert_eq!(computed.courses.len(), 8);
        assert_eq!(computed.courses[0], "Taxation");
        let table = computed.table;
        assert_eq!(table.cleaning.initial_rows, 10);
        assert_eq!(table.cleaning.final_rows, 8);
        assert_eq!(table.rows.len(), 8);
        assert_eq!(table.rows[0].course, "Taxation");
        assert_eq!(table.rows[0].average_rating, 1.5);
        assert_eq!(table.rows[0].count, 8);
        assert_eq!(table.rows[7].course, "Systems");

        write_outputs(&table, &settings).unwrap();
        let written = fs::read_to_string(settings.csv_path()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "Course,Average Rating,Count");
        assert_eq!(lines[1], "Taxation,1.5,8");
        assert_eq!(lines[2], "Audit,1.5,8");
        assert_eq!(lines[8], "Systems,8.0,8");
        assert!(!settings.chart_path().exists());

        check_reference(&table, &settings.csv_path().display().to_string()).unwrap();
    }

    #[test]
    fn reference_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_survey(dir.path());
        let settings = no_chart(&test_args(&input, &dir.path().join("results")));
        let table = compute_ranking(&settings).unwrap().table;
        let reference = dir.path().join("reference.csv");
        fs::write(&reference, "Course,Average Rating,Count\nAudit,1.5,8\n").unwrap();
        assert!(matches!(
            check_reference(&table, &reference.display().to_string()),
            Err(RankError::ReferenceMismatch {})
        ));
    }

    #[test]
    fn narrow_sheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("narrow.csv");
        fs::write(&input, "a,b,c\nA,B,C\nx,y,z\n1,2,3\n").unwrap();
        let settings = no_chart(&test_args(&input, &dir.path().join("results")));
        assert!(matches!(
            compute_ranking(&settings),
            Err(RankError::HeaderTooNarrow {
                width: 3,
                required: 19
            })
        ));
    }

    #[test]
    fn only_incomplete_rows_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey.csv");
        let lines = vec![
            HEADER_CODES.to_string(),
            HEADER_TEXT.to_string(),
            METADATA.to_string(),
            response(&["1", "2", "3", "4", "5", "6", "7", "N/A"]),
        ];
        fs::write(&input, lines.join("\n")).unwrap();
        let settings = no_chart(&test_args(&input, &dir.path().join("results")));
        assert!(matches!(
            compute_ranking(&settings),
            Err(RankError::Ranking {
                source: RankingErrors::NoCompleteResponses
            })
        ));
    }
}
