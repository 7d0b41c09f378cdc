//! Suggested directives shown next to a freshly analysed JD.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::scores::directive::{Directive, DirectiveKind};
use crate::scores::models::ScoreStore;

pub const DEFAULT_SAMPLE_PROMPT_COUNT: usize = 5;

const MAX_RATING: f64 = 10.0;
const MAX_PERCENT: f64 = 100.0;

/// Every candidate suggestion for `store`: four per entry, nudging the
/// rating by 1, importance by 5 points and selection/rejection by 10 points.
pub fn candidate_prompts(store: &ScoreStore) -> Vec<Directive> {
    let mut candidates = Vec::new();

    for (_, record) in store.roles() {
        for (_, name, entry) in record.entries() {
            candidates.push(
                Directive::new(
                    DirectiveKind::Rating,
                    name.as_str(),
                    (entry.rating + 1.0).min(MAX_RATING),
                )
                .with_previous(entry.rating),
            );
            candidates.push(
                Directive::new(
                    DirectiveKind::Importance,
                    name.as_str(),
                    (entry.importance + 5.0).min(MAX_PERCENT),
                )
                .with_previous(entry.importance),
            );
            candidates.push(
                Directive::new(
                    DirectiveKind::SelectionScore,
                    name.as_str(),
                    (entry.selection_score + 10.0).min(MAX_PERCENT),
                )
                .with_previous(entry.selection_score),
            );
            candidates.push(
                Directive::new(
                    DirectiveKind::RejectionScore,
                    name.as_str(),
                    (entry.rejection_score + 10.0).min(MAX_PERCENT),
                )
                .with_previous(entry.rejection_score),
            );
        }
    }

    candidates
}

/// Picks up to `count` distinct suggestions at random and renders them as
/// directive sentences.
pub fn sample_prompts<R: Rng + ?Sized>(store: &ScoreStore, count: usize, rng: &mut R) -> Vec<String> {
    candidate_prompts(store)
        .choose_multiple(rng, count)
        .map(ToString::to_string)
        .collect()
}
