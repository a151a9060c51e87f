//! Abnormality evaluation of submitted answers.
//!
//! Pure functions: no side effects, never panic, never fail. Anything that
//! cannot be evaluated cleanly (for example a non-finite reading) is logged
//! and treated as "not flagged" — a false negative is judged less harmful
//! than rejecting a valid submission over an administrator misconfiguration.

use std::collections::HashMap;

use crate::domain::{AnswerRecord, Field, FieldControl, FieldId, FieldKind, FlagRule};

/// Decides whether one submitted answer is abnormal under one rule.
///
/// An absent or disabled rule never flags. Choice kinds check
/// abnormal-set membership first (short-circuiting), then flag answers
/// outside a non-empty normal set. The measurement kind flags a missing
/// reading when the rule requires one, and readings strictly outside
/// `[min, max]`; the boundary values themselves are acceptable. All other
/// kinds are never flagged — they have no well-defined abnormal value
/// space.
#[must_use]
pub fn evaluate(rule: Option<&FlagRule>, kind: FieldKind, answer: &AnswerRecord) -> bool {
    let Some(rule) = rule else {
        return false;
    };
    if !rule.enabled {
        return false;
    }

    match kind {
        FieldKind::SingleSelect | FieldKind::SearchableSelect | FieldKind::ButtonChoice => {
            evaluate_choice(rule, answer.text_value.as_deref())
        }
        FieldKind::Measurement => evaluate_measurement(rule, answer.numeric_value),
        FieldKind::ShortText
        | FieldKind::Photo
        | FieldKind::Signature
        | FieldKind::FreeNotes
        | FieldKind::Date
        | FieldKind::DateTime
        | FieldKind::Time
        | FieldKind::GroupedEntry => false,
    }
}

/// Decides whether one submitted answer to the given field is abnormal.
///
/// The result is persisted on the answer record by the caller and later
/// surfaced in reports.
#[must_use]
pub fn evaluate_flag(field: &Field, answer: &AnswerRecord) -> bool {
    evaluate(field.flag_rule.as_ref(), field.kind(), answer)
}

/// Evaluates a whole submission, stamping `is_flagged` on every record.
///
/// Rules are looked up by `field_id` across the entire tree, including
/// grouped-entry members and branch fields that carry an identity. Answers
/// whose `field_id` is null or unknown are left unflagged — they belong to
/// dynamically revealed fields outside the stored schema.
pub fn flag_answers(fields: &[Field], answers: &mut [AnswerRecord]) {
    let mut rules = HashMap::new();
    collect_rules(fields, &mut rules);

    for answer in answers {
        answer.is_flagged = answer
            .field_id
            .and_then(|id| rules.get(&id))
            .is_some_and(|(rule, kind)| evaluate(*rule, *kind, answer));
    }
}

fn collect_rules<'a>(
    fields: impl IntoIterator<Item = &'a Field>,
    rules: &mut HashMap<FieldId, (Option<&'a FlagRule>, FieldKind)>,
) {
    for field in fields {
        if let Some(id) = field.id {
            rules.insert(id, (field.flag_rule.as_ref(), field.kind()));
        }
        if let FieldControl::GroupedEntry { fields: nested } = &field.control {
            collect_rules(&**nested, rules);
        }
        for branch in &field.branches {
            collect_rules(&branch.revealed, rules);
        }
    }
}

fn evaluate_choice(rule: &FlagRule, value: Option<&str>) -> bool {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return false;
    };

    if !rule.abnormal_values.is_empty() && rule.abnormal_values.contains(value) {
        return true;
    }

    if !rule.normal_values.is_empty() && !rule.normal_values.contains(value) {
        return true;
    }

    false
}

fn evaluate_measurement(rule: &FlagRule, value: Option<f64>) -> bool {
    let Some(value) = value else {
        return rule.required;
    };

    if !value.is_finite() {
        // Treated as an evaluation error: swallowed, visible to operators.
        tracing::error!(value, "non-finite measurement reading; not flagging");
        return false;
    }

    rule.min.is_some_and(|min| value < min) || rule.max.is_some_and(|max| value > max)
}
