use log::info;

use pref_lottery::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use serde_json::json;
use serde_json::Value as JSValue;

pub mod config_reader;
pub mod export;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;

use crate::args::Args;
use crate::draw::config_reader::*;
use crate::draw::io_common::ParsedTable;

#[derive(Debug, Snafu)]
pub enum DrawError {
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file has no worksheet"))]
    EmptyExcel {},
    #[snafu(display("Worksheet {name} was not found in the workbook"))]
    MissingWorksheet { name: String },
    #[snafu(display("Error opening csv file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a csv record"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Cannot parse the random seed {seed:?} as an unsigned integer"))]
    ParsingSeed { seed: String },
    #[snafu(display("The input table has no header row"))]
    EmptyTable {},
    #[snafu(display(
        "No preference columns detected. Expected headers matching one of: {expected}"
    ))]
    NoPreferenceColumns { expected: String },
    #[snafu(display("Required column {name} was not found in the input header"))]
    MissingColumn { name: String },
    #[snafu(display("Unknown input type {input_type}. Supported types: csv, xlsx"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing sheet {path}"))]
    WritingSheet { source: csv::Error, path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DrawCliResult<T> = Result<T, DrawError>;

fn read_registrants(args: &Args) -> DrawCliResult<ParsedTable> {
    let input_type = match args.input_type.as_deref() {
        Some(t) => t.to_lowercase(),
        None => Path::new(&args.input)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_lowercase(),
    };
    match input_type.as_str() {
        "csv" => io_csv::read_table(&args.input),
        "xlsx" => io_xlsx::read_table(&args.input, args.excel_worksheet_name.as_deref()),
        other => Err(DrawError::UnknownInputType {
            input_type: other.to_string(),
        }),
    }
}

fn build_summary_js(config: &DrawConfig, stats: &DrawStats, seed: Option<u64>) -> JSValue {
    let group_js = |g: &GroupStats| json!({"count": g.count, "ticketSum": g.ticket_sum});
    let options: Vec<JSValue> = stats
        .per_option
        .iter()
        .map(|os| {
            json!({
                "label": os.label,
                "winnerCount": os.winner_count,
                "ticketSum": os.ticket_sum,
                "price": os.price,
                "cost": os.cost,
            })
        })
        .collect();
    json!({
        "config": {
            "randomSeed": seed.map(|s| s.to_string()),
            "outputDirectory": config.output_directory,
            "blacklistSize": normalize_blacklist(&config.blacklist).len(),
        },
        "options": options,
        "totalCost": stats.total_cost,
        "losers": group_js(&stats.losers),
        "violations": group_js(&stats.violations),
        "excluded": group_js(&stats.excluded),
    })
}

/// Runs the whole pipeline once: configuration, ingestion, draw, summary,
/// export. This is the single unit of work behind the command line.
pub fn run_lottery(args: &Args) -> DrawCliResult<()> {
    let config = match args.config.as_deref() {
        Some(path) => read_config(path)?,
        None => DrawConfig::default(),
    };
    info!("config: {:?}", config);

    let table = read_registrants(args)?;
    info!(
        "Detected {} preference columns: {:?}",
        table.schema.preferences.len(),
        table
            .schema
            .preferences
            .iter()
            .map(|c| c.header.as_str())
            .collect::<Vec<_>>()
    );
    info!(
        "Read {} registrants from {}",
        table.registrants.len(),
        args.input
    );

    let seed = match args.seed {
        Some(s) => Some(s),
        None => config.random_seed()?,
    };
    let mut rng: StdRng = match seed {
        Some(s) => {
            info!("Seeding the draw with {}", s);
            StdRng::seed_from_u64(s)
        }
        None => StdRng::from_entropy(),
    };

    let rules = config.draw_rules();
    let result = run_draw(&table.registrants, &rules, &mut rng);
    let stats = aggregate_stats(&table.registrants, &result);

    let summary_js = build_summary_js(&config, &stats, seed);
    let pretty = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    match args.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty),
        Some(path) => {
            fs::write(path, pretty.as_bytes()).context(WritingOutputSnafu { path })?;
            info!("Wrote the summary to {}", path);
        }
    }

    if let Some(dir) = config.output_directory.as_deref() {
        export::write_workbook(Path::new(dir), &table, &result)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_fixture() -> DrawStats {
        DrawStats {
            per_option: vec![OptionStats {
                label: "X".to_string(),
                winner_count: 2,
                ticket_sum: 5,
                price: 300,
                cost: 600,
            }],
            total_cost: 600,
            losers: GroupStats {
                count: 1,
                ticket_sum: 4,
            },
            violations: GroupStats::default(),
            excluded: GroupStats::default(),
        }
    }

    #[test]
    fn summary_contains_the_per_option_costs() {
        let config = DrawConfig::default();
        let js = build_summary_js(&config, &stats_fixture(), Some(42));
        assert_eq!(js["totalCost"], json!(600));
        assert_eq!(js["options"][0]["label"], json!("X"));
        assert_eq!(js["options"][0]["cost"], json!(600));
        assert_eq!(js["losers"]["ticketSum"], json!(4));
        assert_eq!(js["config"]["randomSeed"], json!("42"));
    }

    #[test]
    fn summary_omits_the_seed_when_drawing_from_entropy() {
        let config = DrawConfig::default();
        let js = build_summary_js(&config, &stats_fixture(), None);
        assert_eq!(js["config"]["randomSeed"], JSValue::Null);
    }
}
