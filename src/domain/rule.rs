//! Administrator-defined abnormality rules.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A per-field rule marking submitted answers as abnormal.
///
/// One rule is owned by exactly one field. The choice-kind sets and the
/// measurement bounds coexist on the same struct; the flag evaluator only
/// consults the parts that apply to the owning field's kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagRule {
    /// Whether the rule is in effect. A disabled rule never flags.
    pub enabled: bool,

    /// Choice kinds: answers in this set are abnormal. Checked first.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub abnormal_values: BTreeSet<String>,

    /// Choice kinds: if non-empty, answers outside this set are abnormal.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub normal_values: BTreeSet<String>,

    /// Measurement kind: a missing reading is abnormal.
    pub required: bool,

    /// Measurement kind: readings strictly below this are abnormal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Measurement kind: readings strictly above this are abnormal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FlagRule {
    /// A rule that flags nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let rule: FlagRule = serde_json::from_str(r#"{"enabled": true}"#).unwrap();
        assert!(rule.enabled);
        assert!(!rule.required);
        assert!(rule.abnormal_values.is_empty());
        assert!(rule.min.is_none());
    }

    #[test]
    fn empty_sets_are_not_serialized() {
        let json = serde_json::to_string(&FlagRule::disabled()).unwrap();
        assert!(!json.contains("abnormal_values"));
        assert!(!json.contains("normal_values"));
    }
}
