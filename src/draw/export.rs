// Workbook-style export of the draw results.
//
// One sheet per option plus the fixed Losers / Violations sheets (and an
// Excluded sheet when the blacklist removed anyone), each holding the
// identifying columns and the original preference columns of its
// registrants. Sheets are rendered as csv files inside the output
// directory; names follow the xlsx sheet-name rules (path-special
// characters replaced, 31 characters max).

use crate::draw::io_common::ParsedTable;
use crate::draw::{DrawCliResult, WritingOutputSnafu, WritingSheetSnafu};

use log::info;
use pref_lottery::{violator_ids, DrawResult, RegistrantId};
use snafu::prelude::*;

use std::fs;
use std::path::Path;

const SHEET_NAME_MAX_CHARS: usize = 31;

/// Sanitizes an option label into a sheet name: `\ / * ? : [ ]` become
/// `_` and the result is truncated to the xlsx 31-character limit.
pub fn sanitize_sheet_name(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if matches!(c, '\\' | '/' | '*' | '?' | ':' | '[' | ']') {
                '_'
            } else {
                c
            }
        })
        .take(SHEET_NAME_MAX_CHARS)
        .collect()
}

pub fn write_workbook(dir: &Path, table: &ParsedTable, result: &DrawResult) -> DrawCliResult<()> {
    fs::create_dir_all(dir).context(WritingOutputSnafu {
        path: dir.display().to_string(),
    })?;

    let mut sheets = 0;
    for oo in result.options.iter() {
        write_sheet(dir, &sanitize_sheet_name(&oo.label), table, &oo.winners)?;
        sheets += 1;
    }
    write_sheet(dir, "Losers", table, &result.losers)?;
    write_sheet(dir, "Violations", table, &violator_ids(result))?;
    sheets += 2;
    if !result.excluded.is_empty() {
        write_sheet(dir, "Excluded", table, &result.excluded)?;
        sheets += 1;
    }
    info!(
        "write_workbook: wrote {} sheets under {}",
        sheets,
        dir.display()
    );
    Ok(())
}

fn write_sheet(
    dir: &Path,
    sheet_name: &str,
    table: &ParsedTable,
    ids: &[RegistrantId],
) -> DrawCliResult<()> {
    let path = dir.join(format!("{}.csv", sheet_name));
    let path_s = path.display().to_string();
    let mut wtr = csv::Writer::from_path(&path).context(WritingSheetSnafu { path: path_s.clone() })?;
    wtr.write_record(table.schema.display_headers())
        .context(WritingSheetSnafu { path: path_s.clone() })?;
    for id in ids.iter() {
        let r = &table.registrants[id.0 as usize];
        let mut record = vec![
            r.email.clone(),
            r.name.clone(),
            r.identifier.clone(),
            r.tickets.to_string(),
        ];
        record.extend(r.raw_preferences.iter().cloned());
        wtr.write_record(&record)
            .context(WritingSheetSnafu { path: path_s.clone() })?;
    }
    wtr.flush().context(WritingOutputSnafu { path: path_s.clone() })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_drop_path_special_characters() {
        assert_eq!(sanitize_sheet_name("A/B:C*D?E[F]G\\H"), "A_B_C_D_E_F_G_H");
        assert_eq!(sanitize_sheet_name("第一廳 10:30"), "第一廳 10_30");
    }

    #[test]
    fn sheet_names_are_truncated_to_the_xlsx_limit() {
        let long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), 31);
        // Truncation counts characters, not bytes.
        let wide = "廳".repeat(40);
        assert_eq!(sanitize_sheet_name(&wide).chars().count(), 31);
    }
}
