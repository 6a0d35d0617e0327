// Primitives for reading xlsx registration tables.

use crate::draw::io_common::{map_columns, row_to_registrant, ParsedTable};
use crate::draw::{
    DrawCliResult, EmptyExcelSnafu, EmptyTableSnafu, MissingWorksheetSnafu, OpeningExcelSnafu,
};

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

pub fn read_table(path: &str, worksheet_name: Option<&str>) -> DrawCliResult<ParsedTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut rows = wrange.rows();
    let header_row = rows.next().context(EmptyTableSnafu {})?;
    let header: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let schema = map_columns(&header)?;

    let mut registrants = Vec::new();
    for (idx, row) in rows.enumerate() {
        let lineno = idx + 2;
        debug!("read_table: row {}: {:?}", lineno, row);
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        registrants.push(row_to_registrant(&schema, &cells, lineno));
    }
    Ok(ParsedTable {
        schema,
        registrants,
    })
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        // Spreadsheets store counts as floats; render whole numbers
        // without the fractional part.
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn get_range(
    path: &str,
    worksheet_name_o: Option<&str>,
) -> DrawCliResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu {}.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: using the only worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            many => {
                // Be predictable with multi-sheet workbooks: take the first
                // sheet, like the original single-upload flow.
                let (worksheet_name, wrange) = &many[0];
                debug!(
                    "get_range: multiple worksheets, using the first one {:?}",
                    worksheet_name
                );
                Ok(wrange.clone())
            }
        }
    }
}
