//! Conditional resolution of visible fields.
//!
//! Given the normalized field tree and the answers given so far, the
//! resolver computes which fields are currently active, in display order. It
//! is a pure recursive walk: no hidden state, no randomness, so re-rendering
//! a partially completed inspection never drops or reorders fields.
//!
//! Resolution is total over any normalized tree and deliberately does not
//! validate answer *correctness* against options or bounds; that is the
//! submission-time layer's job (see
//! [`check_group_submission`](crate::schema::check_group_submission)).

use std::collections::HashMap;

use crate::{
    domain::{Field, FieldControl},
    schema::FieldPath,
};

/// The answers given so far, keyed by field breadcrumb path.
///
/// Built incrementally by the caller as the inspector answers top-to-bottom.
/// Paths are the same breadcrumbs the resolver hands out in
/// [`ActiveField::path`], so feeding an answer back is a straight insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerValues(HashMap<FieldPath, String>);

impl AnswerValues {
    /// An empty answer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the answer for a field, replacing any earlier value.
    pub fn insert(&mut self, path: FieldPath, value: impl Into<String>) -> Option<String> {
        self.0.insert(path, value.into())
    }

    /// The answer recorded for a field, if any.
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Number of recorded answers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no answers are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One currently visible field, with the breadcrumb identifying its
/// instance in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveField<'a> {
    /// The field's breadcrumb path (unique per instance, even for repeated
    /// names in different scopes).
    pub path: FieldPath,
    /// The field definition.
    pub field: &'a Field,
}

/// Computes the ordered set of currently visible fields.
///
/// Rules, applied recursively:
///
/// - every root field is active;
/// - a grouped-entry field's nested fields are active as a unit whenever
///   the group itself is active (group membership is never independently
///   conditional);
/// - if the recorded answer for an active field equals a branch's trigger
///   value, that branch's revealed fields become active immediately after
///   the field (after its group members, if any), in authored order;
///   unmatched branches contribute nothing;
/// - revealed fields are evaluated by the same rules, so conditionals nest
///   to the depth of the authored schema.
///
/// Deterministic: identical inputs always produce the identical ordered
/// output.
#[must_use]
pub fn resolve_visible_fields<'a>(
    roots: &'a [Field],
    answers: &AnswerValues,
) -> Vec<ActiveField<'a>> {
    let mut active = Vec::new();
    let root = FieldPath::root();
    for field in roots {
        walk(field, &root, answers, &mut active);
    }
    active
}

fn walk<'a>(
    field: &'a Field,
    parent: &FieldPath,
    answers: &AnswerValues,
    active: &mut Vec<ActiveField<'a>>,
) {
    let path = parent.child(field.name.as_str());
    active.push(ActiveField { path: path.clone(), field });

    if let FieldControl::GroupedEntry { fields } = &field.control {
        for nested in fields.iter() {
            walk(nested, &path, answers, active);
        }
    }

    if let Some(answer) = answers.get(&path) {
        for branch in &field.branches {
            if branch.trigger == answer {
                for revealed in &branch.revealed {
                    walk(revealed, &path, answers, active);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nonempty::NonEmpty;

    use crate::domain::{Branch, FieldName};

    use super::*;

    fn text(name: &str) -> Field {
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

    fn select(name: &str, options: &[&str], branches: Vec<Branch>) -> Field {
        Field {
            id: None,
            name: FieldName::new(name.to_string()).unwrap(),
            control: FieldControl::SingleSelect {
                options: NonEmpty::from_vec(
                    options.iter().map(ToString::to_string).collect(),
                )
                .unwrap(),
            },
            is_required: false,
            order: 0,
            flag_rule: None,
            branches,
        }
    }

    fn branch(trigger: &str, revealed: Vec<Field>) -> Branch {
        Branch {
            trigger: trigger.to_string(),
            revealed,
        }
    }

    fn names<'a>(active: &'a [ActiveField<'a>]) -> Vec<&'a str> {
        active.iter().map(|a| a.field.name.as_str()).collect()
    }

    #[test]
    fn root_fields_are_always_active_in_order() {
        let roots = vec![text("Operator"), text("Shift")];
        let active = resolve_visible_fields(&roots, &AnswerValues::new());
        assert_eq!(names(&active), ["Operator", "Shift"]);
    }

    #[test]
    fn matched_branch_reveals_immediately_after_the_trigger() {
        let roots = vec![
            select(
                "Result",
                &["Pass", "Fail"],
                vec![branch("Fail", vec![text("Failure Notes")])],
            ),
            text("Sign-off"),
        ];

        let mut answers = AnswerValues::new();
        answers.insert(FieldPath::root().child("Result"), "Fail");

        let active = resolve_visible_fields(&roots, &answers);
        assert_eq!(names(&active), ["Result", "Failure Notes", "Sign-off"]);
    }

    #[test]
    fn unmatched_branches_contribute_nothing() {
        let roots = vec![select(
            "Result",
            &["Pass", "Fail"],
            vec![branch("Fail", vec![text("Failure Notes")])],
        )];

        let mut answers = AnswerValues::new();
        answers.insert(FieldPath::root().child("Result"), "Pass");

        let active = resolve_visible_fields(&roots, &answers);
        assert_eq!(names(&active), ["Result"]);

        // No answer at all behaves the same.
        let active = resolve_visible_fields(&roots, &AnswerValues::new());
        assert_eq!(names(&active), ["Result"]);
    }

    #[test]
    fn revealed_fields_may_branch_further() {
        let inner = select(
            "Severity",
            &["Minor", "Major"],
            vec![branch("Major", vec![text("Escalation")])],
        );
        let roots = vec![select(
            "Result",
            &["Pass", "Fail"],
            vec![branch("Fail", vec![inner])],
        )];

        let result_path = FieldPath::root().child("Result");
        let severity_path = result_path.child("Severity");

        let mut answers = AnswerValues::new();
        answers.insert(result_path, "Fail");
        answers.insert(severity_path, "Major");

        let active = resolve_visible_fields(&roots, &answers);
        assert_eq!(names(&active), ["Result", "Severity", "Escalation"]);
    }

    #[test]
    fn grouped_entry_members_are_active_with_the_group() {
        let group = Field {
            id: None,
            name: FieldName::new("Checklist".to_string()).unwrap(),
            control: FieldControl::GroupedEntry {
                fields: Box::new(NonEmpty::from_vec(vec![text("Item A"), text("Item B")]).unwrap()),
            },
            is_required: false,
            order: 0,
            flag_rule: None,
            branches: Vec::new(),
        };
        let roots = [group];
        let active = resolve_visible_fields(&roots, &AnswerValues::new());
        assert_eq!(names(&active), ["Checklist", "Item A", "Item B"]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let roots = vec![select(
            "Result",
            &["Pass", "Fail"],
            vec![branch("Fail", vec![text("Notes"), text("Photo Ref")])],
        )];
        let mut answers = AnswerValues::new();
        answers.insert(FieldPath::root().child("Result"), "Fail");

        let first = resolve_visible_fields(&roots, &answers);
        let second = resolve_visible_fields(&roots, &answers);
        assert_eq!(first, second);
    }

    #[test]
    fn repeated_names_in_different_scopes_have_distinct_paths() {
        let roots = vec![
            select(
                "Stage 1",
                &["OK", "NG"],
                vec![branch("NG", vec![text("Notes")])],
            ),
            select(
                "Stage 2",
                &["OK", "NG"],
                vec![branch("NG", vec![text("Notes")])],
            ),
        ];
        let mut answers = AnswerValues::new();
        answers.insert(FieldPath::root().child("Stage 1"), "NG");
        answers.insert(FieldPath::root().child("Stage 2"), "NG");

        let active = resolve_visible_fields(&roots, &answers);
        let paths: Vec<String> = active.iter().map(|a| a.path.to_string()).collect();
        assert_eq!(
            paths,
            [
                "Stage 1",
                "Stage 1 > Notes",
                "Stage 2",
                "Stage 2 > Notes"
            ]
        );
    }
}
