//! Field resolvers over a [`Dataset`].
//!
//! Every function here is a pure lookup, scan or join against the dataset. A
//! key that does not resolve is a legitimate "not found" and is answered with
//! `None`, an empty list or a partially populated object, never with an error.
//!
//! Outputs are owned copies of the dataset records with their key assigned
//! explicitly, so nothing handed to the execution engine can reach back into
//! the canonical tables.

use crate::dataset::Country;
use crate::dataset::Dataset;
use crate::dataset::Language;

/// A country as returned by the API: its record plus the code it is keyed by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountryNode {
    pub code: String,
    pub record: Country,
}

impl CountryNode {
    pub fn new(code: impl Into<String>, record: &Country) -> Self {
        Self {
            code: code.into(),
            record: record.clone(),
        }
    }
}

/// A language as returned by the API.
///
/// `name` and `native` are absent when `code` is not in the language table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LanguageNode {
    pub code: String,
    pub name: Option<String>,
    pub native: Option<String>,
}

impl LanguageNode {
    pub fn new(code: impl Into<String>, record: Option<&Language>) -> Self {
        let (name, native) = record
            .map(|language| (language.name.clone(), language.native.clone()))
            .unwrap_or_default();
        Self {
            code: code.into(),
            name,
            native,
        }
    }
}

/// A continent as returned by the API. `name` is absent for unknown codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContinentNode {
    pub code: String,
    pub name: Option<String>,
}

impl ContinentNode {
    pub fn new(code: impl Into<String>, dataset: &Dataset) -> Self {
        let code = code.into();
        let name = dataset.continent_name(&code).map(str::to_string);
        Self { code, name }
    }
}

/// Every country, in table order.
pub fn countries(dataset: &Dataset) -> Vec<CountryNode> {
    dataset
        .countries()
        .map(|(code, country)| CountryNode::new(code, country))
        .collect()
}

/// Exact, case-sensitive lookup.
pub fn country(dataset: &Dataset, code: &str) -> Option<CountryNode> {
    dataset
        .country(code)
        .map(|country| CountryNode::new(code, country))
}

/// Every language, in table order.
pub fn languages(dataset: &Dataset) -> Vec<LanguageNode> {
    dataset
        .languages()
        .map(|(code, language)| LanguageNode::new(code, Some(language)))
        .collect()
}

/// Exact, case-sensitive lookup.
pub fn language(dataset: &Dataset, code: &str) -> Option<LanguageNode> {
    dataset
        .language(code)
        .map(|language| LanguageNode::new(code, Some(language)))
}

/// The continent identified by `code`.
///
/// The code is not validated: an unknown code still yields a continent, with
/// no name and no countries.
pub fn continent(dataset: &Dataset, code: &str) -> ContinentNode {
    ContinentNode::new(code, dataset)
}

/// Countries whose continent code equals the parent's, in table order.
pub fn continent_countries(dataset: &Dataset, continent: &ContinentNode) -> Vec<CountryNode> {
    dataset
        .countries()
        .filter(|(_, country)| country.continent == continent.code)
        .map(|(code, country)| CountryNode::new(code, country))
        .collect()
}

pub fn country_continent(dataset: &Dataset, country: &CountryNode) -> ContinentNode {
    ContinentNode::new(country.record.continent.as_str(), dataset)
}

/// One language per listed code, in the listed order.
///
/// Codes missing from the language table still produce an entry carrying only
/// the code.
pub fn country_languages(dataset: &Dataset, country: &CountryNode) -> Vec<LanguageNode> {
    country
        .record
        .languages
        .iter()
        .map(|code| LanguageNode::new(code.as_str(), dataset.language(code)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture() -> Dataset {
        Dataset::builder()
            .continent("EU", "Europe")
            .continent("AS", "Asia")
            .country(
                "FR",
                Country {
                    name: Some("France".to_string()),
                    native: Some("France".to_string()),
                    phone: Some("33".to_string()),
                    continent: "EU".to_string(),
                    capital: Some("Paris".to_string()),
                    currency: Some("EUR".to_string()),
                    languages: vec!["fr".to_string()],
                    ..Default::default()
                },
            )
            .country(
                "JP",
                Country {
                    name: Some("Japan".to_string()),
                    continent: "AS".to_string(),
                    languages: vec!["ja".to_string()],
                    ..Default::default()
                },
            )
            .country(
                "BE",
                Country {
                    name: Some("Belgium".to_string()),
                    continent: "EU".to_string(),
                    languages: vec!["nl".to_string(), "fr".to_string(), "de".to_string()],
                    ..Default::default()
                },
            )
            .country(
                "ZZ",
                Country {
                    name: Some("Atlantis".to_string()),
                    continent: "AT".to_string(),
                    ..Default::default()
                },
            )
            .language(
                "fr",
                Language {
                    name: Some("French".to_string()),
                    native: Some("Français".to_string()),
                },
            )
            .language(
                "nl",
                Language {
                    name: Some("Dutch".to_string()),
                    native: Some("Nederlands".to_string()),
                },
            )
            .build()
    }

    #[test]
    fn countries_are_listed_in_table_order_with_their_code() {
        let dataset = fixture();
        let codes: Vec<String> = countries(&dataset).into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["FR", "JP", "BE", "ZZ"]);
    }

    #[test]
    fn country_lookup_returns_the_record() {
        let dataset = fixture();
        let france = country(&dataset, "FR").unwrap();
        assert_eq!(france.code, "FR");
        assert_eq!(&france.record, dataset.country("FR").unwrap());
        assert_eq!(france.record.emoji, "🇫🇷");
    }

    #[test]
    fn country_lookup_is_exact() {
        let dataset = fixture();
        assert_eq!(country(&dataset, "fr"), None);
        assert_eq!(country(&dataset, " FR"), None);
        assert_eq!(country(&dataset, "XX"), None);
    }

    #[test]
    fn language_lookup() {
        let dataset = fixture();
        assert_eq!(
            language(&dataset, "fr"),
            Some(LanguageNode {
                code: "fr".to_string(),
                name: Some("French".to_string()),
                native: Some("Français".to_string()),
            })
        );
        assert_eq!(language(&dataset, "FR"), None);
    }

    #[test]
    fn languages_are_listed_in_table_order() {
        let dataset = fixture();
        let codes: Vec<String> = languages(&dataset).into_iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["fr", "nl"]);
    }

    #[test]
    fn continent_is_built_from_any_code() {
        let dataset = fixture();
        assert_eq!(
            continent(&dataset, "EU"),
            ContinentNode {
                code: "EU".to_string(),
                name: Some("Europe".to_string()),
            }
        );
        assert_eq!(
            continent(&dataset, "Europe"),
            ContinentNode {
                code: "Europe".to_string(),
                name: None,
            }
        );
    }

    #[test]
    fn continent_countries_match_on_code() {
        let dataset = fixture();
        let europe = continent(&dataset, "EU");
        let codes: Vec<String> = continent_countries(&dataset, &europe)
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["FR", "BE"]);

        let nowhere = continent(&dataset, "XX");
        assert!(continent_countries(&dataset, &nowhere).is_empty());
    }

    #[test]
    fn every_continent_partitions_the_countries() {
        let dataset = Dataset::builtin();
        let mut seen = BTreeSet::new();
        for (code, _) in dataset.continents() {
            let continent = continent(&dataset, code);
            for country in continent_countries(&dataset, &continent) {
                assert_eq!(country.record.continent, code);
                assert!(seen.insert(country.code), "country listed twice");
            }
        }
        assert_eq!(seen.len(), dataset.countries().count());
    }

    #[test]
    fn country_continent_resolves_the_name() {
        let dataset = fixture();
        let japan = country(&dataset, "JP").unwrap();
        assert_eq!(
            country_continent(&dataset, &japan),
            ContinentNode {
                code: "AS".to_string(),
                name: Some("Asia".to_string()),
            }
        );
    }

    #[test]
    fn country_continent_tolerates_unknown_codes() {
        let dataset = fixture();
        let atlantis = country(&dataset, "ZZ").unwrap();
        assert_eq!(
            country_continent(&dataset, &atlantis),
            ContinentNode {
                code: "AT".to_string(),
                name: None,
            }
        );
    }

    #[test]
    fn country_languages_keep_order_and_tolerate_misses() {
        let dataset = fixture();
        let belgium = country(&dataset, "BE").unwrap();
        assert_eq!(
            country_languages(&dataset, &belgium),
            vec![
                LanguageNode {
                    code: "nl".to_string(),
                    name: Some("Dutch".to_string()),
                    native: Some("Nederlands".to_string()),
                },
                LanguageNode {
                    code: "fr".to_string(),
                    name: Some("French".to_string()),
                    native: Some("Français".to_string()),
                },
                LanguageNode {
                    code: "de".to_string(),
                    name: None,
                    native: None,
                },
            ]
        );
    }

    #[test]
    fn country_languages_follow_the_stored_codes() {
        let dataset = Dataset::builtin();
        for node in countries(&dataset) {
            let codes: Vec<String> = country_languages(&dataset, &node)
                .into_iter()
                .map(|l| l.code)
                .collect();
            assert_eq!(codes, node.record.languages);
        }
    }

    #[test]
    fn outputs_do_not_alias_the_dataset() {
        let dataset = fixture();
        let mut france = country(&dataset, "FR").unwrap();
        france.record.name = Some("Gaul".to_string());
        assert_eq!(
            dataset.country("FR").unwrap().name.as_deref(),
            Some("France")
        );
    }
}
