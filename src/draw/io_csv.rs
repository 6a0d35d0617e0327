// Primitives for reading csv registration tables.

use crate::draw::io_common::{map_columns, row_to_registrant, ParsedTable};
use crate::draw::{CsvLineParseSnafu, CsvOpenSnafu, DrawCliResult, EmptyTableSnafu};

use log::debug;
use snafu::prelude::*;

pub fn read_table(path: &str) -> DrawCliResult<ParsedTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header_record = records
        .next()
        .context(EmptyTableSnafu {})?
        .context(CsvLineParseSnafu {})?;
    let header: Vec<String> = header_record.iter().map(|s| s.to_string()).collect();
    let schema = map_columns(&header)?;

    let mut registrants = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_table: line {}: {:?}", lineno, line);
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        registrants.push(row_to_registrant(&schema, &cells, lineno));
    }
    Ok(ParsedTable {
        schema,
        registrants,
    })
}
