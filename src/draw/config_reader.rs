use crate::draw::{DrawCliResult, OpeningJsonSnafu, ParsingJsonSnafu, ParsingSeedSnafu};

use pref_lottery::{DrawRules, OptionSettings};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use std::collections::BTreeMap;
use std::fs;

/// Settings for one option, as declared in the configuration file. Missing
/// fields fall back to the library defaults (capacity 1, price 300).
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    pub label: String,
    pub capacity: Option<u32>,
    pub price: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawConfig {
    #[serde(default)]
    pub options: Vec<OptionConfig>,
    /// Raw blacklist entries, one email each. Normalization (trimming,
    /// lowercasing, dropping entries without '@') happens in the library.
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

impl DrawConfig {
    pub fn draw_rules(&self) -> DrawRules {
        let defaults = OptionSettings::DEFAULT;
        let option_settings: BTreeMap<String, OptionSettings> = self
            .options
            .iter()
            .map(|oc| {
                (
                    oc.label.clone(),
                    OptionSettings {
                        capacity: oc.capacity.unwrap_or(defaults.capacity),
                        price: oc.price.unwrap_or(defaults.price),
                    },
                )
            })
            .collect();
        DrawRules {
            option_settings,
            blacklist: self.blacklist.clone(),
        }
    }

    pub fn random_seed(&self) -> DrawCliResult<Option<u64>> {
        match self.random_seed.as_deref() {
            None => Ok(None),
            Some(s) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .ok()
                .context(ParsingSeedSnafu { seed: s }),
        }
    }
}

pub fn read_config(path: &str) -> DrawCliResult<DrawConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DrawConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_configuration() {
        let config: DrawConfig = serde_json::from_str(
            r#"{
                "options": [
                    {"label": "第一廳", "capacity": 3, "price": 250},
                    {"label": "第二廳"}
                ],
                "blacklist": ["Spam@Example.com "],
                "randomSeed": "42",
                "outputDirectory": "out"
            }"#,
        )
        .unwrap();
        assert_eq!(config.random_seed().unwrap(), Some(42));
        assert_eq!(config.output_directory.as_deref(), Some("out"));

        let rules = config.draw_rules();
        assert_eq!(
            rules.option_settings["第一廳"],
            OptionSettings {
                capacity: 3,
                price: 250
            }
        );
        // Missing fields keep the defaults.
        assert_eq!(rules.option_settings["第二廳"], OptionSettings::DEFAULT);
        assert_eq!(rules.blacklist, vec!["Spam@Example.com ".to_string()]);
    }

    #[test]
    fn an_empty_document_is_a_valid_configuration() {
        let config: DrawConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DrawConfig::default());
        assert_eq!(config.random_seed().unwrap(), None);
    }

    #[test]
    fn a_bad_seed_is_reported() {
        let config: DrawConfig =
            serde_json::from_str(r#"{"randomSeed": "not-a-number"}"#).unwrap();
        assert!(config.random_seed().is_err());
    }
}
