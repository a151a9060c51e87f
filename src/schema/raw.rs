//! The raw, pre-normalization field shape.
//!
//! This is the loosely typed document an administrator collaborator sends
//! when creating or editing a form: the kind may be absent, `is_required`
//! may arrive in any truthy/falsy shape, option lists may be empty. The
//! schema validator turns it into a normalized [`Field`], and a normalized
//! field converts back losslessly, which is how [`Field`] serializes.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        Branch, BoundsMode, Field, FieldControl, FieldId, FlagRule, InferenceConfig,
        MeasurementBounds,
    },
    schema::{FieldPath, SchemaError, Validator},
};

/// One unvalidated field definition, order-preserving and recursive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawField {
    /// Schema identity, if already assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<FieldId>,

    /// The field name. Must be non-blank.
    pub name: String,

    /// The declared kind, if any. Absent kinds are inferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Accepts any truthy/falsy shape (bool, number, string, null).
    #[serde(deserialize_with = "truthy")]
    pub is_required: bool,

    /// Display and evaluation order among siblings.
    pub order: i64,

    /// Declared options, meaningful for select kinds.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Declared measurement bounds, meaningful for the measurement kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_bounds: Option<RawBounds>,

    /// Administrator-defined abnormality rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_rule: Option<FlagRule>,

    /// Nested fields, meaningful for the grouped-entry kind.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested_fields: Vec<RawField>,

    /// Conditional branches.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<RawBranch>,
}

/// One unvalidated conditional branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBranch {
    /// The answer value that activates the branch.
    pub trigger_value: String,
    /// The fields revealed on activation, in order.
    pub revealed_fields: Vec<RawField>,
}

/// Unvalidated measurement bounds; every part may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBounds {
    /// The comparison mode. Defaults to `between` during normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BoundsMode>,
    /// Lower bound. Defaults to `0` during normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound. Defaults to `100` during normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl From<MeasurementBounds> for RawBounds {
    fn from(bounds: MeasurementBounds) -> Self {
        Self {
            mode: Some(bounds.mode),
            min: Some(bounds.min),
            max: Some(bounds.max),
        }
    }
}

/// Accepts `true`/`false`, numbers, strings, and null as booleans.
///
/// Historical clients sent `is_required` as whatever their form library
/// produced; all falsy shapes normalize to `false`.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Truthy {
        Bool(bool),
        Int(i64),
        Float(f64),
        Str(String),
    }

    let value = Option::<Truthy>::deserialize(deserializer)?;
    Ok(match value {
        None => false,
        Some(Truthy::Bool(b)) => b,
        Some(Truthy::Int(i)) => i != 0,
        Some(Truthy::Float(f)) => f.abs() > f64::EPSILON,
        Some(Truthy::Str(s)) => !(s.is_empty() || s.eq_ignore_ascii_case("false") || s == "0"),
    })
}

impl TryFrom<RawField> for Field {
    type Error = SchemaError;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        let config = InferenceConfig::default();
        Validator::new(&config).validate(raw, &FieldPath::root())
    }
}

impl From<Field> for RawField {
    fn from(field: Field) -> Self {
        let kind = field.kind();
        let (options, measurement_bounds, nested_fields) = match field.control {
            FieldControl::SingleSelect { options } | FieldControl::SearchableSelect { options } => {
                (options.into(), None, Vec::new())
            }
            FieldControl::Measurement { bounds } => (Vec::new(), Some(bounds.into()), Vec::new()),
            FieldControl::GroupedEntry { fields } => (
                Vec::new(),
                None,
                Vec::<Field>::from(*fields).into_iter().map(Self::from).collect(),
            ),
            _ => (Vec::new(), None, Vec::new()),
        };

        Self {
            id: field.id,
            name: field.name.to_string(),
            kind: Some(kind.as_str().to_string()),
            is_required: field.is_required,
            order: field.order,
            options,
            measurement_bounds,
            flag_rule: field.flag_rule,
            nested_fields,
            branches: field.branches.into_iter().map(RawBranch::from).collect(),
        }
    }
}

impl From<Branch> for RawBranch {
    fn from(branch: Branch) -> Self {
        Self {
            trigger_value: branch.trigger,
            revealed_fields: branch.revealed.into_iter().map(RawField::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(r"true", true; "bool true")]
    #[test_case(r"false", false; "bool false")]
    #[test_case(r"1", true; "int one")]
    #[test_case(r"0", false; "int zero")]
    #[test_case(r#""yes""#, true; "nonempty string")]
    #[test_case(r#""false""#, false; "string false")]
    #[test_case(r#""0""#, false; "string zero")]
    #[test_case(r#""""#, false; "empty string")]
    #[test_case(r"null", false; "null")]
    fn is_required_accepts_truthy_shapes(json: &str, expected: bool) {
        let doc = format!(r#"{{"name": "Operator", "is_required": {json}}}"#);
        let raw: RawField = serde_json::from_str(&doc).unwrap();
        assert_eq!(raw.is_required, expected);
    }

    #[test]
    fn missing_is_required_defaults_to_false() {
        let raw: RawField = serde_json::from_str(r#"{"name": "Operator"}"#).unwrap();
        assert!(!raw.is_required);
    }

    #[test]
    fn nested_shape_deserializes_recursively() {
        let raw: RawField = serde_json::from_str(
            r#"{
                "name": "Defect",
                "kind": "single_select",
                "options": ["None", "Found"],
                "branches": [{
                    "trigger_value": "Found",
                    "revealed_fields": [{"name": "Defect Detail", "kind": "free_notes"}]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(raw.branches.len(), 1);
        assert_eq!(raw.branches[0].revealed_fields[0].name, "Defect Detail");
    }
}
