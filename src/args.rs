use clap::Parser;

/// This is a preference-tiered lottery draw program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The registration table. Csv and xlsx inputs are supported.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (default: inferred from the input file extension) The type of the input: 'csv' or 'xlsx'.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, optional) A JSON configuration file with the per-option capacities and
    /// prices, the blacklist, the random seed and the output directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, 'stdout' or empty) Where the summary of the draw is written in JSON format.
    /// Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (integer, optional) Seed for the random draw. Overrides the seed from --config.
    /// When no seed is given anywhere, the draw is seeded from the system entropy source.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// When using an Excel file, indicates the name of the worksheet to use. Defaults to the
    /// only worksheet of the workbook.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
