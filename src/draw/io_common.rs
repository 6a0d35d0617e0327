// Header schema mapping, shared by the csv and xlsx readers.

use crate::draw::{DrawCliResult, DrawError, MissingColumnSnafu};

use log::{debug, warn};
use pref_lottery::Registrant;
use snafu::prelude::*;

/// The fixed, ordered set of preference column labels the input may carry.
/// A header matches a label either exactly or by containing it (e.g.
/// "第一志願 First Preference").
pub const PREFERENCE_LABELS: [&str; 4] = ["第一志願", "第二志願", "第三志願", "第四志願"];

const EMAIL_MARKERS: [&str; 3] = ["email", "e-mail", "電子郵件"];
const NAME_MARKERS: [&str; 2] = ["name", "姓名"];
const IDENTIFIER_MARKERS: [&str; 2] = ["psid", "工號"];
const TICKET_MARKERS: [&str; 2] = ["登記票數", "tickets"];

/// A column of the input table: its position and its original header.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnRef {
    pub index: usize,
    pub header: String,
}

/// The mapping from the expected columns to the columns of the actual
/// input, validated once at ingestion.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableSchema {
    pub email: ColumnRef,
    pub name: Option<ColumnRef>,
    pub identifier: Option<ColumnRef>,
    pub tickets: ColumnRef,
    /// In tier order. Never empty.
    pub preferences: Vec<ColumnRef>,
}

impl TableSchema {
    /// The headers of the projection used for display and export: the
    /// identifying columns followed by the original preference columns.
    pub fn display_headers(&self) -> Vec<String> {
        let mut headers = vec![
            self.email.header.clone(),
            self.name
                .as_ref()
                .map(|c| c.header.clone())
                .unwrap_or_else(|| "Name".to_string()),
            self.identifier
                .as_ref()
                .map(|c| c.header.clone())
                .unwrap_or_else(|| "PSID".to_string()),
            self.tickets.header.clone(),
        ];
        headers.extend(self.preferences.iter().map(|c| c.header.clone()));
        headers
    }
}

/// The ingested table: the schema it was read with and the registrants.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedTable {
    pub schema: TableSchema,
    pub registrants: Vec<Registrant>,
}

fn find_preference_columns(header: &[String]) -> Vec<ColumnRef> {
    let mut cols: Vec<ColumnRef> = Vec::new();
    for label in PREFERENCE_LABELS.iter() {
        // Exact match first, then the first partial match.
        let found = header
            .iter()
            .position(|h| h == label)
            .or_else(|| header.iter().position(|h| h.contains(label)));
        if let Some(index) = found {
            cols.push(ColumnRef {
                index,
                header: header[index].clone(),
            });
        }
    }
    cols
}

fn find_column(header: &[String], markers: &[&str]) -> Option<ColumnRef> {
    let lowered: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();
    for marker in markers.iter() {
        if let Some(index) = lowered.iter().position(|h| h.contains(marker)) {
            return Some(ColumnRef {
                index,
                header: header[index].clone(),
            });
        }
    }
    None
}

/// Maps the header row to a [TableSchema].
///
/// Zero detected preference columns is a fatal input-shape error reporting
/// the expected labels; the email and ticket-count columns are required as
/// well. Name and identifier columns are optional.
pub fn map_columns(header: &[String]) -> DrawCliResult<TableSchema> {
    debug!("map_columns: header: {:?}", header);
    let preferences = find_preference_columns(header);
    if preferences.is_empty() {
        return Err(DrawError::NoPreferenceColumns {
            expected: PREFERENCE_LABELS.join(", "),
        });
    }
    let email = find_column(header, &EMAIL_MARKERS).context(MissingColumnSnafu { name: "Email" })?;
    let tickets = find_column(header, &TICKET_MARKERS).context(MissingColumnSnafu {
        name: "登記票數 Number of tickets",
    })?;
    Ok(TableSchema {
        email,
        name: find_column(header, &NAME_MARKERS),
        identifier: find_column(header, &IDENTIFIER_MARKERS),
        tickets,
        preferences,
    })
}

fn cell(cells: &[String], col: &ColumnRef) -> String {
    cells.get(col.index).cloned().unwrap_or_default()
}

/// Projects one data row onto a [Registrant]. Rows are never rejected:
/// missing cells read as blanks and an unreadable ticket count falls back
/// to one lottery unit.
pub fn row_to_registrant(schema: &TableSchema, cells: &[String], lineno: usize) -> Registrant {
    let tickets_raw = cell(cells, &schema.tickets);
    let tickets = match tickets_raw.trim().parse::<u64>() {
        Ok(t) => t,
        Err(_) => match tickets_raw.trim().parse::<f64>() {
            Ok(f) if f >= 0.0 => f as u64,
            _ => {
                if !tickets_raw.trim().is_empty() {
                    warn!(
                        "row {}: cannot read ticket count {:?}, defaulting to 1",
                        lineno, tickets_raw
                    );
                }
                1
            }
        },
    };
    Registrant {
        email: cell(cells, &schema.email),
        name: schema
            .name
            .as_ref()
            .map(|c| cell(cells, c))
            .unwrap_or_default(),
        identifier: schema
            .identifier
            .as_ref()
            .map(|c| cell(cells, c))
            .unwrap_or_default(),
        tickets,
        raw_preferences: schema
            .preferences
            .iter()
            .map(|c| cell(cells, c))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn maps_exact_headers() {
        let schema = map_columns(&header(&[
            "Email",
            "Name",
            "PSID",
            "登記票數 Number of tickets",
            "第一志願",
            "第二志願",
        ]))
        .unwrap();
        assert_eq!(schema.email.index, 0);
        assert_eq!(schema.tickets.index, 3);
        assert_eq!(schema.preferences.len(), 2);
        assert_eq!(schema.preferences[0].header, "第一志願");
        assert_eq!(schema.preferences[1].index, 5);
    }

    #[test]
    fn maps_partial_preference_headers_in_label_order() {
        // The tier order comes from the label set, not the column order.
        let schema = map_columns(&header(&[
            "Email Address",
            "tickets",
            "第二志願 Second Preference",
            "第一志願 First Preference",
        ]))
        .unwrap();
        let indices: Vec<usize> = schema.preferences.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![3, 2]);
    }

    #[test]
    fn missing_preference_columns_is_fatal() {
        let res = map_columns(&header(&["Email", "tickets", "whatever"]));
        match res {
            Err(DrawError::NoPreferenceColumns { expected }) => {
                assert!(expected.contains("第一志願"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_email_column_is_fatal() {
        let res = map_columns(&header(&["tickets", "第一志願"]));
        assert!(matches!(res, Err(DrawError::MissingColumn { .. })));
    }

    #[test]
    fn rows_project_onto_registrants() {
        let schema = map_columns(&header(&[
            "Email",
            "Name",
            "PSID",
            "登記票數 Number of tickets",
            "第一志願",
            "第二志願",
        ]))
        .unwrap();
        let r = row_to_registrant(
            &schema,
            &header(&["a@t.com", "Anna", "P123", "3", "X", ""]),
            2,
        );
        assert_eq!(r.email, "a@t.com");
        assert_eq!(r.tickets, 3);
        assert_eq!(r.raw_preferences, vec!["X".to_string(), String::new()]);

        // Unreadable ticket counts fall back to one unit; short rows read
        // as blanks.
        let r2 = row_to_registrant(&schema, &header(&["b@t.com", "Bob", "P124", "??"]), 3);
        assert_eq!(r2.tickets, 1);
        assert_eq!(r2.raw_preferences, vec![String::new(), String::new()]);
    }
}
