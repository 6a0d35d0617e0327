pub use crate::config::*;
use crate::run_draw;

use rand::Rng;

/// A builder for assembling a draw.
///
/// ```
/// use pref_lottery::builder::Builder;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut builder = Builder::new()
///     .option("Morning show", 2, 300)
///     .blacklist(&["spam@example.com".to_string()]);
///
/// builder.add_registrant("anna@example.com", 1, &["Morning show"]);
/// builder.add_registrant("bob@example.com", 2, &["Morning show", ""]);
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let result = builder.draw(&mut rng);
/// assert_eq!(result.options[0].winners.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _rules: DrawRules,
    pub(crate) _registrants: Vec<Registrant>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Sets the capacity and price for one option label.
    pub fn option(mut self, label: &str, capacity: u32, price: u64) -> Builder {
        self._rules
            .option_settings
            .insert(label.to_string(), OptionSettings { capacity, price });
        self
    }

    /// Sets the raw blacklist. Entries are normalized at draw time.
    pub fn blacklist(mut self, emails: &[String]) -> Builder {
        self._rules.blacklist = emails.to_vec();
        self
    }

    /// Adds a registrant with only the fields the draw needs. Blank
    /// preference cells are allowed.
    pub fn add_registrant(&mut self, email: &str, tickets: u64, preferences: &[&str]) {
        self.add_registrant_full(Registrant {
            email: email.to_string(),
            name: String::new(),
            identifier: String::new(),
            tickets,
            raw_preferences: preferences.iter().map(|s| s.to_string()).collect(),
        });
    }

    pub fn add_registrant_full(&mut self, registrant: Registrant) {
        self._registrants.push(registrant);
    }

    /// Runs the draw over everything accumulated so far. The builder is
    /// left untouched, so repeated calls are independent trials.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> DrawResult {
        run_draw(&self._registrants, &self._rules, rng)
    }
}
