// ********* Input data structures ***********

use std::collections::BTreeMap;

/// One registration row, as ingested from the registration table.
///
/// The raw preference cells are kept in tier order (first choice, second
/// choice, ...). Blank cells are empty strings and duplicates are allowed
/// here; both are resolved by the cleaning pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Registrant {
    pub email: String,
    pub name: String,
    pub identifier: String,
    pub tickets: u64,
    pub raw_preferences: Vec<String>,
}

/// Capacity and ticket price for one option.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct OptionSettings {
    pub capacity: u32,
    pub price: u64,
}

impl OptionSettings {
    pub const DEFAULT: OptionSettings = OptionSettings {
        capacity: 1,
        price: 300,
    };
}

impl Default for OptionSettings {
    fn default() -> OptionSettings {
        OptionSettings::DEFAULT
    }
}

/// The external configuration of a draw: per-option settings and the
/// blacklist. Options that appear in the registrations but not in
/// `option_settings` use [OptionSettings::DEFAULT].
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DrawRules {
    pub option_settings: BTreeMap<String, OptionSettings>,
    pub blacklist: Vec<String>,
}

/// An option taking part in the draw, with its settings resolved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DrawOption {
    pub label: String,
    pub capacity: u32,
    pub price: u64,
}

// ******** Output data structures *********

/// The identity of a registrant: its row index in the registrant slice.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct RegistrantId(pub u32);

/// The outcome of the cleaning pass for one registrant.
///
/// `cleaned` keeps the first occurrence of every non-blank label, in tier
/// order. `violations` lists the duplicate occurrences that were dropped,
/// in the order they appeared. A violation is informational only and does
/// not disqualify the registrant.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CleanedPreferences {
    pub cleaned: Vec<String>,
    pub violations: Vec<String>,
}

/// The winners drawn for one option. The winner set only ever grows during
/// a draw and is bounded by the option capacity.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OptionOutcome {
    pub label: String,
    pub capacity: u32,
    pub price: u64,
    pub winners: Vec<RegistrantId>,
}

/// The full outcome of one draw.
///
/// Every eligible registrant appears in exactly one winner set or in
/// `losers`. Blacklisted registrants appear only in `excluded`. `cleaned`
/// is parallel to the registrant slice the draw ran on.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DrawResult {
    /// In ascending label order.
    pub options: Vec<OptionOutcome>,
    pub losers: Vec<RegistrantId>,
    pub excluded: Vec<RegistrantId>,
    pub cleaned: Vec<CleanedPreferences>,
}

/// Head count and ticket total for a group of registrants.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct GroupStats {
    pub count: u64,
    pub ticket_sum: u64,
}

/// Statistics for one option.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OptionStats {
    pub label: String,
    pub winner_count: u64,
    pub ticket_sum: u64,
    pub price: u64,
    pub cost: u64,
}

/// Statistics for a whole draw. A pure function of the draw result and the
/// ticket table, fully deterministic given its inputs.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DrawStats {
    pub per_option: Vec<OptionStats>,
    pub total_cost: u64,
    pub losers: GroupStats,
    pub violations: GroupStats,
    pub excluded: GroupStats,
}
