use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for the legacy-compatibility inference heuristics.
///
/// Historical form data predates mandatory field typing, so the schema
/// validator infers a kind for untyped fields and synthesizes an option
/// list for optionless selects, keyed on keywords in the field name. The
/// keyword tables are arbitrary and deployment-specific, so they live here
/// as configuration rather than in the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct InferenceConfig {
    /// Field names containing any of these keywords (case-insensitively)
    /// are inferred as single-select when their kind is absent.
    select_keywords: Vec<String>,

    /// Keyword-matched default option sets for optionless select fields.
    /// The first matching entry wins.
    option_sets: Vec<KeywordOptions>,

    /// Options synthesized when no keyword entry matches.
    fallback_options: Vec<String>,
}

/// One keyword-matched default option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordOptions {
    /// Keywords matched case-insensitively against the field name.
    pub keywords: Vec<String>,
    /// The option list synthesized on a match.
    pub options: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(ToString::to_string).collect::<Vec<_>>();
        Self {
            select_keywords: strings(&["reject", "code", "status", "category", "type"]),
            option_sets: vec![
                KeywordOptions {
                    keywords: strings(&["reject", "code"]),
                    options: strings(&[
                        "Code 131 - Wrong Material",
                        "Code 132 - Streaked Print",
                        "Code 133 - Wrong Blade",
                        "Code 134 - Scratch",
                        "Other",
                    ]),
                },
                KeywordOptions {
                    keywords: strings(&["status"]),
                    options: strings(&["Pass", "Hold", "Reject"]),
                },
                KeywordOptions {
                    keywords: strings(&["category"]),
                    options: strings(&["Category A", "Category B", "Category C", "Other"]),
                },
            ],
            fallback_options: strings(&["Option 1", "Option 2", "Option 3"]),
        }
    }
}

impl InferenceConfig {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content
    /// is invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML
    /// or if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Whether the field name suggests a select kind.
    #[must_use]
    pub fn suggests_select(&self, field_name: &str) -> bool {
        let lowered = field_name.to_lowercase();
        self.select_keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    }

    /// The default option set for the field name.
    ///
    /// Returns the first keyword-matched set, or the fallback set if no
    /// entry matches. May be empty if the configuration was authored with
    /// empty tables; the validator treats that as a hard error.
    #[must_use]
    pub fn options_for(&self, field_name: &str) -> Vec<String> {
        let lowered = field_name.to_lowercase();
        self.option_sets
            .iter()
            .find(|set| {
                set.keywords
                    .iter()
                    .any(|keyword| lowered.contains(&keyword.to_lowercase()))
            })
            .map_or_else(|| self.fallback_options.clone(), |set| set.options.clone())
    }
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the
/// domain type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_select_keywords")]
        select_keywords: Vec<String>,

        #[serde(default = "default_option_sets")]
        option_sets: Vec<KeywordOptions>,

        #[serde(default = "default_fallback_options")]
        fallback_options: Vec<String>,
    },
}

fn default_select_keywords() -> Vec<String> {
    InferenceConfig::default().select_keywords
}

fn default_option_sets() -> Vec<KeywordOptions> {
    InferenceConfig::default().option_sets
}

fn default_fallback_options() -> Vec<String> {
    InferenceConfig::default().fallback_options
}

impl From<Versions> for InferenceConfig {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                select_keywords,
                option_sets,
                fallback_options,
            } => Self {
                select_keywords,
                option_sets,
                fallback_options,
            },
        }
    }
}

impl From<InferenceConfig> for Versions {
    fn from(config: InferenceConfig) -> Self {
        Self::V1 {
            select_keywords: config.select_keywords,
            option_sets: config.option_sets,
            fallback_options: config.fallback_options,
        }
    }
}
