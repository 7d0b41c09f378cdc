//! Applies directives to a `ScoreStore` copy-on-write.
//!
//! The input store is never touched: `apply` clones it up front and returns the
//! mutated clone together with a report of what changed and what was skipped.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scores::directive::{
    Directive, DirectiveParser, LineScan, SkipReason, ZeroValuePolicy,
};
use crate::scores::models::{Category, ScoreField, ScoreStore};

/// Which role of the store directives are applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSelector {
    /// The first role key of the store.
    #[default]
    First,
    Named(String),
}

impl From<Option<String>> for RoleSelector {
    fn from(role: Option<String>) -> Self {
        role.map(RoleSelector::Named).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub role: RoleSelector,
    pub zero_policy: ZeroValuePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedChange {
    pub line: usize,
    pub target: String,
    pub category: Category,
    pub field: ScoreField,
    pub previous: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// The role directives were resolved against, if any.
    pub role: Option<String>,
    pub applied: Vec<AppliedChange>,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub store: ScoreStore,
    pub report: ApplyReport,
}

/// Applies `directives` in order to a clone of `store`.
///
/// Each target is looked up in skills, achievements then activities; only the
/// first category holding that exact name is written. Unknown names and an
/// unresolvable role are skipped, never errors.
pub fn apply<I>(store: &ScoreStore, directives: I, role: &RoleSelector) -> ApplyOutcome
where
    I: IntoIterator<Item = Directive>,
{
    let mut updated = store.clone();
    let mut report = ApplyReport::default();

    let role_key = match role {
        RoleSelector::First => updated.first_role().map(str::to_string),
        RoleSelector::Named(name) => updated.role(name).map(|_| name.clone()),
    };

    let record = match role_key.as_deref() {
        Some(key) => updated.role_mut(key),
        None => None,
    };

    let Some(record) = record else {
        for directive in directives {
            warn!(
                "No role available for directive on '{}' ({:?})",
                directive.target, role
            );
            report.skipped.push(SkippedLine {
                line: directive.line,
                text: directive.to_string(),
                reason: SkipReason::RoleMissing,
            });
        }
        return ApplyOutcome {
            store: updated,
            report,
        };
    };

    for directive in directives {
        let field = directive.field();
        match record.locate_mut(&directive.target) {
            Some((category, entry)) => {
                let previous = entry.get(field);
                entry.set(field, directive.value);
                debug!(
                    "Updated {}/{} {} {} -> {}",
                    category.as_str(),
                    directive.target,
                    field,
                    previous,
                    directive.value
                );
                report.applied.push(AppliedChange {
                    line: directive.line,
                    target: directive.target,
                    category,
                    field,
                    previous,
                    value: directive.value,
                });
            }
            None => {
                warn!("Could not find '{}' in any category", directive.target);
                report.skipped.push(SkippedLine {
                    line: directive.line,
                    text: directive.to_string(),
                    reason: SkipReason::NotFound,
                });
            }
        }
    }

    report.role = role_key;
    ApplyOutcome {
        store: updated,
        report,
    }
}

/// Parses `text` and applies every recognised directive. Lines the parser
/// dropped are merged into the report, ordered by line number.
pub fn run_prompt(store: &ScoreStore, text: &str, options: &ApplyOptions) -> ApplyOutcome {
    let mut parse_skips = Vec::new();
    let directives: Vec<Directive> = DirectiveParser::new(options.zero_policy)
        .scan(text)
        .filter_map(|scan| match scan {
            LineScan::Directive(d) => Some(d),
            LineScan::Skipped { line, text, reason } => {
                debug!("Skipping line {line} ({reason:?}): {text}");
                parse_skips.push(SkippedLine { line, text, reason });
                None
            }
        })
        .collect();

    let mut outcome = apply(store, directives, &options.role);
    outcome.report.skipped.extend(parse_skips);
    outcome.report.skipped.sort_by_key(|s| s.line);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::directive::{parse_directives, DirectiveKind};
    use crate::scores::models::{RoleRecord, SkillEntry};

    fn entry(rating: f64, importance: f64) -> SkillEntry {
        SkillEntry {
            rating,
            importance,
            ..Default::default()
        }
    }

    fn sample_store() -> ScoreStore {
        let mut role = RoleRecord::default();
        role.skills.insert(
            "Natural Language Processing".to_string(),
            SkillEntry {
                selection_score: 25.0,
                rejection_score: 15.0,
                ..entry(3.0, 60.0)
            },
        );
        role.skills.insert("Python".to_string(), entry(8.0, 40.0));
        role.achievements
            .insert("Pipeline Development".to_string(), entry(5.0, 40.0));
        role.achievements.insert("Python".to_string(), entry(1.0, 1.0));
        role.activities.insert("Mentoring".to_string(), entry(4.0, 100.0));

        let mut store = ScoreStore::default();
        store.insert_role("ML Engineer", role);
        store
    }

    #[test]
    fn test_empty_batch_returns_equal_copy() {
        let store = sample_store();
        let outcome = apply(&store, Vec::new(), &RoleSelector::First);
        assert_eq!(outcome.store, store);
        assert!(outcome.report.applied.is_empty());
        assert_eq!(outcome.report.role.as_deref(), Some("ML Engineer"));
    }

    #[test]
    fn test_input_store_is_not_mutated() {
        let store = sample_store();
        let before = store.clone();
        let outcome = apply(
            &store,
            parse_directives("Update Python's rating from 8.0 to 9.0"),
            &RoleSelector::First,
        );
        assert_eq!(store, before);
        assert_ne!(outcome.store, store);
    }

    #[test]
    fn test_selection_score_sets_importance_only() {
        let store = sample_store();
        let outcome = apply(
            &store,
            parse_directives(
                "Set Natural Language Processing's selection score from 60.0% to 70.0%",
            ),
            &RoleSelector::First,
        );
        let nlp = outcome.store.role("ML Engineer").unwrap().skills["Natural Language Processing"];
        assert_eq!(nlp.importance, 70.0);
        assert_eq!(nlp.rating, 3.0);
        assert_eq!(nlp.selection_score, 25.0);
        assert_eq!(nlp.rejection_score, 15.0);
        assert_eq!(outcome.report.applied.len(), 1);
        assert_eq!(outcome.report.applied[0].previous, 60.0);
    }

    #[test]
    fn test_default_role_is_first_in_input() {
        let json = r#"{
            "ML Engineer": {"skills": {"Python": {"rating": 8.0}}},
            "Data Analyst": {"skills": {"Python": {"rating": 2.0}}}
        }"#;
        let store: ScoreStore = serde_json::from_str(json).unwrap();

        let outcome = run_prompt(
            &store,
            "Update Python's rating from 8.0 to 9.0",
            &ApplyOptions::default(),
        );

        assert_eq!(outcome.report.role.as_deref(), Some("ML Engineer"));
        assert_eq!(outcome.store.role("ML Engineer").unwrap().skills["Python"].rating, 9.0);
        assert_eq!(outcome.store.role("Data Analyst").unwrap().skills["Python"].rating, 2.0);

        let out = serde_json::to_string(&outcome.store).unwrap();
        assert!(out.find("ML Engineer").unwrap() < out.find("Data Analyst").unwrap());
    }

    #[test]
    fn test_rating_found_in_achievements() {
        let store = sample_store();
        let outcome = apply(
            &store,
            parse_directives("Update Pipeline Development's rating from 10.0 to 10.0"),
            &RoleSelector::First,
        );
        let pd = outcome.store.role("ML Engineer").unwrap().achievements["Pipeline Development"];
        assert_eq!(pd.rating, 10.0);
        assert_eq!(pd.importance, 40.0);
        assert_eq!(outcome.report.applied[0].category, Category::Achievements);
    }

    #[test]
    fn test_last_write_wins() {
        let store = sample_store();
        let text = "Update Python's rating from 8.0 to 9.0\nUpdate Python's rating from 9.0 to 6.5";
        let outcome = apply(&store, parse_directives(text), &RoleSelector::First);
        assert_eq!(
            outcome.store.role("ML Engineer").unwrap().skills["Python"].rating,
            6.5
        );
    }

    #[test]
    fn test_skills_category_searched_first() {
        let store = sample_store();
        let outcome = apply(
            &store,
            vec![Directive::new(DirectiveKind::Importance, "Python", 55.0)],
            &RoleSelector::First,
        );
        let role = outcome.store.role("ML Engineer").unwrap();
        assert_eq!(role.skills["Python"].importance, 55.0);
        assert_eq!(role.achievements["Python"].importance, 1.0);
    }

    #[test]
    fn test_unknown_target_is_reported_not_applied() {
        let store = sample_store();
        let outcome = apply(
            &store,
            parse_directives("Update Cobol's rating from 1.0 to 2.0"),
            &RoleSelector::First,
        );
        assert_eq!(outcome.store, store);
        assert_eq!(outcome.report.skipped.len(), 1);
        assert_eq!(outcome.report.skipped[0].reason, SkipReason::NotFound);
    }

    #[test]
    fn test_name_match_is_case_sensitive() {
        let store = sample_store();
        let outcome = apply(
            &store,
            parse_directives("Update python's rating from 1.0 to 2.0"),
            &RoleSelector::First,
        );
        assert_eq!(outcome.store, store);
    }

    #[test]
    fn test_empty_store_is_noop() {
        let store = ScoreStore::default();
        let outcome = apply(
            &store,
            parse_directives("Update Python's rating from 1.0 to 2.0"),
            &RoleSelector::First,
        );
        assert!(outcome.store.is_empty());
        assert_eq!(outcome.report.role, None);
        assert_eq!(outcome.report.skipped[0].reason, SkipReason::RoleMissing);
    }

    #[test]
    fn test_named_role_selects_record() {
        let mut store = sample_store();
        let mut other = RoleRecord::default();
        other.skills.insert("Python".to_string(), entry(2.0, 10.0));
        store.insert_role("Data Analyst", other);

        // "Data Analyst" sorts first; naming the role overrides that.
        let outcome = apply(
            &store,
            parse_directives("Update Python's rating from 8.0 to 9.0"),
            &RoleSelector::Named("ML Engineer".to_string()),
        );
        assert_eq!(outcome.store.role("ML Engineer").unwrap().skills["Python"].rating, 9.0);
        assert_eq!(outcome.store.role("Data Analyst").unwrap().skills["Python"].rating, 2.0);

        let missing = apply(
            &store,
            parse_directives("Update Python's rating from 8.0 to 9.0"),
            &RoleSelector::Named("Designer".to_string()),
        );
        assert_eq!(missing.store, store);
        assert_eq!(missing.report.skipped[0].reason, SkipReason::RoleMissing);
    }

    #[test]
    fn test_run_prompt_reports_parse_and_apply_skips_in_line_order() {
        let store = sample_store();
        let text = "Update Cobol's rating from 1.0 to 2.0\n\
                    hello there\n\
                    Change Mentoring's importance from 100.0% to 0.0%\n\
                    Change Mentoring's importance from 100.0% to 80.0%";
        let outcome = run_prompt(&store, text, &ApplyOptions::default());

        let reasons: Vec<(usize, SkipReason)> = outcome
            .report
            .skipped
            .iter()
            .map(|s| (s.line, s.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (1, SkipReason::NotFound),
                (2, SkipReason::Unrecognized),
                (3, SkipReason::ZeroValue),
            ]
        );
        assert_eq!(
            outcome.store.role("ML Engineer").unwrap().activities["Mentoring"].importance,
            80.0
        );
    }

    #[test]
    fn test_run_prompt_zero_applied_when_allowed() {
        let store = sample_store();
        let options = ApplyOptions {
            zero_policy: ZeroValuePolicy::Apply,
            ..Default::default()
        };
        let outcome = run_prompt(
            &store,
            "Change Mentoring's importance from 100.0% to 0.0%",
            &options,
        );
        assert_eq!(
            outcome.store.role("ML Engineer").unwrap().activities["Mentoring"].importance,
            0.0
        );
    }
}
