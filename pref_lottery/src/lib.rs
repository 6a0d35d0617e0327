mod config;
pub mod builder;

use log::{debug, info, warn};

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::seq::index::sample;
use rand::Rng;

pub use crate::config::*;

/// Deduplicates one raw preference list.
///
/// The raw sequence is scanned in tier order. Blank cells are skipped. The
/// first occurrence of a label is kept in `cleaned`; every later occurrence
/// of an already-seen label goes to `violations` instead. Total over any
/// input: an empty list yields empty `cleaned` and empty `violations`.
pub fn clean_preferences(raw: &[String]) -> CleanedPreferences {
    let mut cleaned: Vec<String> = Vec::new();
    let mut violations: Vec<String> = Vec::new();
    for cell in raw.iter() {
        let label = cell.trim();
        if label.is_empty() {
            continue;
        }
        if cleaned.iter().any(|c| c == label) {
            violations.push(label.to_string());
        } else {
            cleaned.push(label.to_string());
        }
    }
    CleanedPreferences {
        cleaned,
        violations,
    }
}

/// Normalizes a raw blacklist: entries are trimmed and lowercased, entries
/// without an `@` are dropped, and duplicates are collapsed keeping the
/// first occurrence.
pub fn normalize_blacklist(entries: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<String> = Vec::new();
    for entry in entries.iter() {
        let normalized = entry.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        if !normalized.contains('@') {
            warn!(
                "normalize_blacklist: dropping invalid entry {:?}",
                entry.trim()
            );
            continue;
        }
        if seen.insert(normalized.clone()) {
            res.push(normalized);
        }
    }
    res
}

/// Splits the registrants into the eligible pool and the excluded set.
///
/// Email comparison is case-insensitive on trimmed addresses. The blacklist
/// is normalized with [normalize_blacklist] before comparison. This runs
/// once, before any draw: excluded registrants never participate in any
/// tier and are not counted as losers.
pub fn filter_eligible(
    registrants: &[Registrant],
    blacklist: &[String],
) -> (Vec<RegistrantId>, Vec<RegistrantId>) {
    let normalized: HashSet<String> = normalize_blacklist(blacklist).into_iter().collect();
    let mut eligible: Vec<RegistrantId> = Vec::new();
    let mut excluded: Vec<RegistrantId> = Vec::new();
    for (idx, r) in registrants.iter().enumerate() {
        let id = RegistrantId(idx as u32);
        if normalized.contains(&r.email.trim().to_lowercase()) {
            excluded.push(id);
        } else {
            eligible.push(id);
        }
    }
    debug!(
        "filter_eligible: {} eligible, {} excluded",
        eligible.len(),
        excluded.len()
    );
    (eligible, excluded)
}

/// Runs the tiered draw over the eligible pool.
///
/// `options` must be in ascending label order; within every tier the options
/// are visited in that order and each option consumes its remaining capacity
/// greedily. For a tier `t` and option, the candidates are the
/// still-unassigned eligible registrants whose cleaned preference at tier
/// `t` is that option's label. When the candidates fit in the remaining
/// slots they all win and the random source is left untouched; otherwise
/// exactly `slots` ids are drawn uniformly without replacement. Ticket
/// counts have no effect on the draw: every registrant is one lottery unit.
///
/// Returns the per-option winner sets and the losers (the eligible
/// registrants left unassigned after the last tier).
pub fn allocate<R: Rng>(
    cleaned: &[CleanedPreferences],
    eligible: &[RegistrantId],
    options: &[DrawOption],
    tier_count: usize,
    rng: &mut R,
) -> (Vec<OptionOutcome>, Vec<RegistrantId>) {
    debug_assert!(
        options.windows(2).all(|w| w[0].label < w[1].label),
        "options must be sorted by label and unique"
    );

    let label_index: HashMap<&str, usize> = options
        .iter()
        .enumerate()
        .map(|(idx, opt)| (opt.label.as_str(), idx))
        .collect();

    // Resolve each eligible registrant's cleaned labels to option indices
    // once, keeping the tier positions. Labels with no matching option
    // never produce a candidacy.
    let prefs: HashMap<RegistrantId, Vec<Option<usize>>> = eligible
        .iter()
        .map(|id| {
            let cp = &cleaned[id.0 as usize];
            let resolved = cp
                .cleaned
                .iter()
                .map(|label| label_index.get(label.as_str()).copied())
                .collect();
            (*id, resolved)
        })
        .collect();

    // BTreeSet keeps the candidate enumeration order deterministic, so a
    // fixed seed reproduces the same partition.
    let mut available: BTreeSet<RegistrantId> = eligible.iter().copied().collect();
    let mut winners: Vec<Vec<RegistrantId>> = vec![Vec::new(); options.len()];

    for tier in 0..tier_count {
        for (opt_idx, opt) in options.iter().enumerate() {
            let candidates: Vec<RegistrantId> = available
                .iter()
                .copied()
                .filter(|id| prefs[id].get(tier).copied().flatten() == Some(opt_idx))
                .collect();
            let slots = (opt.capacity as usize).saturating_sub(winners[opt_idx].len());
            let k = candidates.len().min(slots);
            debug!(
                "allocate: tier {} option {}: {} candidates for {} slots",
                tier,
                opt.label,
                candidates.len(),
                slots
            );
            if k == 0 {
                continue;
            }
            let picked: Vec<RegistrantId> = if k == candidates.len() {
                // Everyone fits: deterministic full take, no randomness
                // consumed.
                candidates
            } else {
                sample(rng, candidates.len(), k)
                    .iter()
                    .map(|i| candidates[i])
                    .collect()
            };
            for id in picked.iter() {
                available.remove(id);
            }
            winners[opt_idx].extend(picked);
        }
    }

    let outcomes: Vec<OptionOutcome> = options
        .iter()
        .zip(winners)
        .map(|(opt, w)| OptionOutcome {
            label: opt.label.clone(),
            capacity: opt.capacity,
            price: opt.price,
            winners: w,
        })
        .collect();
    (outcomes, available.into_iter().collect())
}

/// Runs the whole pipeline for one draw: cleaning, eligibility filtering,
/// tiered allocation.
///
/// The option list is the union of every label appearing in the cleaned
/// preferences and every label named in `rules.option_settings`, in
/// ascending label order; unconfigured labels use the default capacity and
/// price. The tier count is the length of the longest raw preference list.
///
/// The only nondeterminism is the rationed draw inside [allocate]; seeding
/// `rng` makes the whole run reproducible.
pub fn run_draw<R: Rng>(
    registrants: &[Registrant],
    rules: &DrawRules,
    rng: &mut R,
) -> DrawResult {
    info!("run_draw: processing {} registrants", registrants.len());

    let cleaned: Vec<CleanedPreferences> = registrants
        .iter()
        .map(|r| clean_preferences(&r.raw_preferences))
        .collect();

    let (eligible, excluded) = filter_eligible(registrants, &rules.blacklist);

    let mut labels: BTreeSet<String> = cleaned
        .iter()
        .flat_map(|cp| cp.cleaned.iter().cloned())
        .collect();
    labels.extend(rules.option_settings.keys().cloned());
    let options: Vec<DrawOption> = labels
        .into_iter()
        .map(|label| {
            let settings = rules
                .option_settings
                .get(&label)
                .copied()
                .unwrap_or_default();
            DrawOption {
                label,
                capacity: settings.capacity,
                price: settings.price,
            }
        })
        .collect();
    for opt in options.iter() {
        info!(
            "run_draw: option {}: capacity {}, price {}",
            opt.label, opt.capacity, opt.price
        );
    }

    let tier_count = registrants
        .iter()
        .map(|r| r.raw_preferences.len())
        .max()
        .unwrap_or(0);

    let (outcomes, losers) = allocate(&cleaned, &eligible, &options, tier_count, rng);
    DrawResult {
        options: outcomes,
        losers,
        excluded,
        cleaned,
    }
}

/// The registrants whose cleaning pass recorded at least one violation, in
/// row order. This spans the whole registrant set, winners and excluded
/// registrants included.
pub fn violator_ids(result: &DrawResult) -> Vec<RegistrantId> {
    result
        .cleaned
        .iter()
        .enumerate()
        .filter(|(_, cp)| !cp.violations.is_empty())
        .map(|(idx, _)| RegistrantId(idx as u32))
        .collect()
}

/// Aggregates the statistics for a draw result. Pure and deterministic:
/// re-running on the same inputs yields an identical value.
pub fn aggregate_stats(registrants: &[Registrant], result: &DrawResult) -> DrawStats {
    let ticket_sum = |ids: &[RegistrantId]| -> u64 {
        ids.iter().map(|id| registrants[id.0 as usize].tickets).sum()
    };
    let group = |ids: &[RegistrantId]| GroupStats {
        count: ids.len() as u64,
        ticket_sum: ticket_sum(ids),
    };

    let mut per_option: Vec<OptionStats> = Vec::new();
    let mut total_cost: u64 = 0;
    for oo in result.options.iter() {
        let winner_count = oo.winners.len() as u64;
        let cost = winner_count * oo.price;
        total_cost += cost;
        per_option.push(OptionStats {
            label: oo.label.clone(),
            winner_count,
            ticket_sum: ticket_sum(&oo.winners),
            price: oo.price,
            cost,
        });
    }

    let violators = violator_ids(result);
    DrawStats {
        per_option,
        total_cost,
        losers: group(&result.losers),
        violations: group(&violators),
        excluded: group(&result.excluded),
    }
}
