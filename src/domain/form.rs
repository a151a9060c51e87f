//! Form schemas.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::field::Field;

/// Stable identifier of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(Uuid);

impl FormId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for FormId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A normalized form: display name plus ordered field tree.
///
/// Created and edited by an administrator collaborator; read by the
/// resolver and flag evaluator at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// The form's identity.
    pub id: FormId,
    /// Free-form display name. Also the source of the sequence abbreviation.
    pub name: String,
    /// The normalized field tree, in display order.
    pub fields: Vec<Field>,
}

impl FormSchema {
    /// Calculates a fingerprint of the field tree.
    ///
    /// The fingerprint is a SHA-256 hash of the canonical JSON encoding of
    /// the normalized fields. Any edit to the tree changes it, so
    /// collaborators can detect that an inspection was submitted against an
    /// earlier revision of the form.
    ///
    /// # Panics
    ///
    /// Panics if JSON serialization fails (which should never happen for
    /// this data structure).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let encoded = serde_json::to_vec(&self.fields).expect("this should never fail");
        let hash = Sha256::digest(encoded);
        format!("{hash:x}")
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::field::{FieldControl, FieldName};

    use super::*;

    fn schema(fields: Vec<Field>) -> FormSchema {
        FormSchema {
            id: FormId::new(),
            name: "Line Check".to_string(),
            fields,
        }
    }

    fn text_field(name: &str) -> Field {
        Field {
            id: None,
            name: FieldName::new(name.to_string()).unwrap(),
            control: FieldControl::ShortText,
            is_required: false,
            order: 0,
            flag_rule: None,
            branches: Vec::new(),
        }
    }

    #[test]
    fn fingerprint_is_stable() {
        let a = schema(vec![text_field("Operator")]);
        let mut b = a.clone();
        b.id = FormId::new();
        b.name = "Renamed".to_string();
        // Identity and display name are metadata; only the tree contributes.
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn editing_the_tree_changes_the_fingerprint() {
        let a = schema(vec![text_field("Operator")]);
        let b = schema(vec![text_field("Operator"), text_field("Shift")]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
