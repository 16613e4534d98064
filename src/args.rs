use clap::Parser;

/// Ranks courses by student preference from a survey spreadsheet.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the settings of the ranking (input file, output directory,
    /// position of the rating columns, ...). Relative paths inside it are resolved against its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference ranking in CSV format. If provided, courserank will
    /// check that the computed ranking matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (directory, default 'results') The directory where program_ranking.csv and program_ranking.png
    /// are written. Setting this option overrides the directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, default 'Grad Program Exit Survey Data 2024.xlsx') The survey export to read.
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. By default it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using a spreadsheet, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
