//! Legacy-compatibility inference fallbacks.
//!
//! Historical form data predates mandatory field typing, so untyped fields
//! and optionless selects must remain loadable. The functions here are a
//! best-effort heuristic keyed on [`InferenceConfig`] keyword tables, not a
//! correctness guarantee, and are kept out of the core validation walk so
//! they can be replaced or disabled without touching it. Every synthesized
//! default is logged for administrator review.

use crate::{
    domain::{FieldKind, FieldName, InferenceConfig},
    schema::FieldPath,
};

/// Picks a kind for a field that declared none.
///
/// Names carrying a configured select keyword become single-select;
/// everything else becomes short text.
pub(super) fn infer_kind(config: &InferenceConfig, name: &FieldName) -> FieldKind {
    if config.suggests_select(name.as_str()) {
        tracing::warn!(
            field = %name,
            "field kind absent; inferred single_select from name keywords"
        );
        FieldKind::SingleSelect
    } else {
        tracing::debug!(field = %name, "field kind absent; defaulted to short_text");
        FieldKind::ShortText
    }
}

/// Synthesizes a default option set for an optionless select field.
///
/// The result may be empty if the configured tables are empty; the caller
/// treats that as a hard error rather than accepting an unusable field.
pub(super) fn synthesize_options(
    config: &InferenceConfig,
    name: &FieldName,
    path: &FieldPath,
) -> Vec<String> {
    let options = config.options_for(name.as_str());
    tracing::warn!(
        field = %path,
        count = options.len(),
        "select field had no options; synthesized defaults pending administrator review"
    );
    options
}
