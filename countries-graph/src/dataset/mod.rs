//! The immutable tables the API is served from.
//!
//! A [`Dataset`] is loaded once at startup, either from the bundled
//! `data/countries.json` or from a file in the same layout, and is then only
//! ever shared behind an `Arc`.
mod emoji;

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use self::emoji::flag_emoji;
use crate::error::DatasetError;

const BUILTIN_DATASET: &str = include_str!("../../data/countries.json");

/// A country record, keyed by its ISO 3166-1 alpha-2 code in [`Dataset`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Country {
    pub name: Option<String>,
    pub native: Option<String>,
    pub phone: Option<String>,
    /// Code of the continent this country belongs to.
    #[serde(default)]
    pub continent: String,
    pub capital: Option<String>,
    pub currency: Option<String>,
    /// Language codes, in the order they were listed.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Flag glyph. Derived from the country code when the source omits it.
    #[serde(default)]
    pub emoji: String,
}

/// A language record, keyed by its ISO 639-1 code in [`Dataset`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Language {
    pub name: Option<String>,
    pub native: Option<String>,
}

/// A foreign key in the country table that does not resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DanglingReference {
    Continent { country: String, continent: String },
    Language { country: String, language: String },
}

/// Countries, languages and continent names.
///
/// Every table iterates in the order its entries were loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    #[serde(default)]
    continents: IndexMap<String, String>,
    #[serde(default)]
    countries: IndexMap<String, Country>,
    #[serde(default)]
    languages: IndexMap<String, Language>,
}

impl Dataset {
    /// The world dataset bundled with this crate.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_DATASET)
            .expect("the bundled dataset is embedded at compile time and checked by tests; qed")
    }

    /// Parse a dataset from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Ok(dataset.with_derived_emoji())
    }

    /// Read and parse a dataset file.
    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path).map_err(|error| DatasetError::ReadFile {
            path: path.to_path_buf(),
            error,
        })?;
        let dataset = Self::from_json_str(&json)?;
        tracing::debug!(
            countries = dataset.countries.len(),
            languages = dataset.languages.len(),
            continents = dataset.continents.len(),
            "loaded dataset from {}",
            path.display()
        );
        Ok(dataset)
    }

    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    pub fn country(&self, code: &str) -> Option<&Country> {
        self.countries.get(code)
    }

    pub fn language(&self, code: &str) -> Option<&Language> {
        self.languages.get(code)
    }

    pub fn continent_name(&self, code: &str) -> Option<&str> {
        self.continents.get(code).map(String::as_str)
    }

    pub fn countries(&self) -> impl Iterator<Item = (&str, &Country)> {
        self.countries
            .iter()
            .map(|(code, country)| (code.as_str(), country))
    }

    pub fn languages(&self) -> impl Iterator<Item = (&str, &Language)> {
        self.languages
            .iter()
            .map(|(code, language)| (code.as_str(), language))
    }

    pub fn continents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.continents
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }

    /// Country references to continents or languages missing from their tables.
    ///
    /// These are legal: resolvers degrade to partial objects for them.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for (code, country) in &self.countries {
            if !self.continents.contains_key(&country.continent) {
                dangling.push(DanglingReference::Continent {
                    country: code.clone(),
                    continent: country.continent.clone(),
                });
            }
            dangling.extend(
                country
                    .languages
                    .iter()
                    .filter(|language| !self.languages.contains_key(*language))
                    .map(|language| DanglingReference::Language {
                        country: code.clone(),
                        language: language.clone(),
                    }),
            );
        }
        dangling
    }

    /// Log every dangling reference at `warn`.
    pub fn report_dangling_references(&self) {
        for reference in self.dangling_references() {
            match reference {
                DanglingReference::Continent { country, continent } => {
                    tracing::warn!(
                        %country,
                        %continent,
                        "country refers to an unknown continent, its name will resolve to null"
                    )
                }
                DanglingReference::Language { country, language } => {
                    tracing::warn!(
                        %country,
                        %language,
                        "country refers to an unknown language, it will resolve without a name"
                    )
                }
            }
        }
    }

    fn with_derived_emoji(mut self) -> Self {
        for (code, country) in self.countries.iter_mut() {
            if country.emoji.is_empty() {
                country.emoji = flag_emoji(code);
            }
        }
        self
    }
}

/// Assembles a [`Dataset`] in memory, mostly for fixtures.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    dataset: Dataset,
}

impl DatasetBuilder {
    pub fn continent(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.dataset.continents.insert(code.into(), name.into());
        self
    }

    pub fn country(mut self, code: impl Into<String>, country: Country) -> Self {
        self.dataset.countries.insert(code.into(), country);
        self
    }

    pub fn language(mut self, code: impl Into<String>, language: Language) -> Self {
        self.dataset.languages.insert(code.into(), language);
        self
    }

    pub fn build(self) -> Dataset {
        self.dataset.with_derived_emoji()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_dataset_parses() {
        let dataset = Dataset::from_json_str(BUILTIN_DATASET).expect("bundled dataset must parse");
        assert_eq!(dataset.countries().count(), 250);
        assert_eq!(dataset.continents().count(), 7);
        assert!(dataset.languages().count() > 100);
    }

    #[test]
    fn builtin_dataset_is_the_bundled_file() {
        let dataset = Dataset::builtin();
        assert_eq!(dataset, Dataset::from_json_str(BUILTIN_DATASET).unwrap());
        assert_ne!(dataset, Dataset::default());
    }

    #[test]
    fn builtin_dataset_has_no_dangling_references() {
        assert!(Dataset::builtin().dangling_references().is_empty());
    }

    #[test]
    fn builtin_dataset_keeps_file_order() {
        let dataset = Dataset::builtin();
        let codes: Vec<&str> = dataset.countries().map(|(code, _)| code).take(3).collect();
        assert_eq!(codes, vec!["AD", "AE", "AF"]);
    }

    #[test]
    fn every_builtin_country_has_a_flag() {
        let dataset = Dataset::builtin();
        for (code, country) in dataset.countries() {
            assert_eq!(country.emoji.chars().count(), 2, "{code} has no flag");
        }
        assert_eq!(dataset.country("FR").unwrap().emoji, "🇫🇷");
    }

    #[test]
    fn explicit_emoji_is_kept() {
        let dataset = Dataset::from_json_str(
            r#"{"countries": {"XX": {"name": "Nowhere", "continent": "EU", "emoji": "🏳"}}}"#,
        )
        .unwrap();
        assert_eq!(dataset.country("XX").unwrap().emoji, "🏳");
    }

    #[test]
    fn missing_fields_are_absent_not_empty() {
        let dataset =
            Dataset::from_json_str(r#"{"countries": {"FR": {"continent": "EU"}}}"#).unwrap();
        let france = dataset.country("FR").unwrap();
        assert_eq!(france.name, None);
        assert_eq!(france.languages, Vec::<String>::new());
        assert_eq!(france.emoji, "🇫🇷");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let error = Dataset::from_json_str("{\"countries\": [").unwrap_err();
        assert!(matches!(error, DatasetError::Malformed(_)));
    }

    #[test]
    fn unknown_tables_are_rejected() {
        let error = Dataset::from_json_str(r#"{"cities": {}}"#).unwrap_err();
        assert!(matches!(error, DatasetError::Malformed(_)));
    }

    #[test]
    fn it_reads_a_dataset_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"continents": {{"EU": "Europe"}}, "countries": {{"FR": {{"name": "France", "continent": "EU", "languages": ["fr"]}}}}, "languages": {{"fr": {{"name": "French", "native": "Français"}}}}}}"#
        )
        .unwrap();

        let dataset = Dataset::from_file(file.path()).unwrap();
        assert_eq!(dataset.continent_name("EU"), Some("Europe"));
        assert_eq!(
            dataset.language("fr").and_then(|l| l.name.as_deref()),
            Some("French")
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let error = Dataset::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(error, DatasetError::ReadFile { .. }));
    }

    #[test]
    fn it_reports_dangling_references() {
        let dataset = Dataset::builder()
            .continent("EU", "Europe")
            .country(
                "FR",
                Country {
                    continent: "EU".to_string(),
                    languages: vec!["fr".to_string(), "xx".to_string()],
                    ..Default::default()
                },
            )
            .country(
                "ZZ",
                Country {
                    continent: "ZZ".to_string(),
                    ..Default::default()
                },
            )
            .build();

        assert_eq!(
            dataset.dangling_references(),
            vec![
                DanglingReference::Language {
                    country: "FR".to_string(),
                    language: "fr".to_string(),
                },
                DanglingReference::Language {
                    country: "FR".to_string(),
                    language: "xx".to_string(),
                },
                DanglingReference::Continent {
                    country: "ZZ".to_string(),
                    continent: "ZZ".to_string(),
                },
            ]
        );
    }
}
