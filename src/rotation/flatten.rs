//! Flattening of the content tree into an ordered quote list.
//!
//! The output order is fully deterministic: parts in tree order, and within
//! each part the six single-value fields in a fixed order followed by the
//! three list fields. The daily permutation depends on this determinism.

use crate::models::{ContentTree, Part, QuoteItem, QuoteKind};

/// Walk the tree and emit one `QuoteItem` per present, non-empty field.
/// Absent or empty fields are skipped silently.
pub fn flatten(tree: &ContentTree) -> Vec<QuoteItem> {
    let mut items = Vec::new();
    for part in &tree.parts {
        flatten_part(part, &mut items);
    }
    items
}

fn flatten_part(part: &Part, out: &mut Vec<QuoteItem>) {
    let content = &part.content;

    let singles = [
        (&content.statement, QuoteKind::Statement),
        (&content.problem, QuoteKind::Problem),
        (&content.consequences, QuoteKind::Consequences),
        (&content.preservation, QuoteKind::Preservation),
        (&content.self_damage, QuoteKind::SelfDamage),
        (&content.external_damage, QuoteKind::ExternalDamage),
    ];
    for (field, kind) in singles {
        if let Some(text) = field {
            push_item(part, text, kind, out);
        }
    }

    let lists = [
        (&content.quotes, QuoteKind::Quote),
        (&content.questions, QuoteKind::Question),
        (&content.conclusions, QuoteKind::Conclusion),
    ];
    for (list, kind) in lists {
        for text in list {
            push_item(part, text, kind, out);
        }
    }
}

fn push_item(part: &Part, text: &str, kind: QuoteKind, out: &mut Vec<QuoteItem>) {
    if text.is_empty() {
        return;
    }
    out.push(QuoteItem {
        theme: part.theme.clone(),
        text: text.to_string(),
        kind,
        theme_id: part.id.clone(),
    });
}
