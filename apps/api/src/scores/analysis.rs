//! JD analysis — turns the LLM's line-oriented analysis report into a `ScoreStore`.
//!
//! Expected shape (one block per role):
//!
//! ```text
//! Role: Machine Learning Engineer
//! Skills:
//! - Python: Importance: 30.0% Selection Score: 25.0% Rejection Score: 20.0% Rating: 10.0/10
//! Achievements/Certifications:
//! - AWS Certified: Importance: 50.0% Selection Score: 10.0% Rejection Score: 5.0% Rating: 8.0/10
//! Skilled Activities:
//! - Model Deployment: Importance: 100.0% Selection Score: 15.0% Rejection Score: 10.0% Rating: 10.0/10
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::prompts::PLAIN_TEXT_ONLY;
use crate::llm_client::LlmClient;
use crate::scores::models::{Category, RoleRecord, ScoreStore, SkillEntry};
use crate::scores::prompts::{
    JD_ANALYSIS_PROMPT_TEMPLATE, JD_ANALYSIS_SYSTEM, SCORE_REVISION_PROMPT_TEMPLATE,
};

/// Roles in the order they appeared, plus their scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedAnalysis {
    pub roles: Vec<String>,
    pub store: ScoreStore,
}

// ────────────────────────────────────────────────────────────────────────────
// Analyzer trait
// ────────────────────────────────────────────────────────────────────────────

/// Produces analysis reports: from a job description, or by revising an
/// existing score store against a free-text instruction.
///
/// Carried in `AppState` as `Arc<dyn JdAnalyzer>` so handlers can be tested
/// without a network.
#[async_trait]
pub trait JdAnalyzer: Send + Sync {
    async fn analyze(&self, jd_text: &str) -> Result<String, AppError>;

    async fn revise(&self, scores: &ScoreStore, instruction: &str) -> Result<String, AppError>;
}

/// Analyzer backed by the Anthropic Messages API.
pub struct LlmJdAnalyzer(pub LlmClient);

#[async_trait]
impl JdAnalyzer for LlmJdAnalyzer {
    async fn analyze(&self, jd_text: &str) -> Result<String, AppError> {
        let prompt = JD_ANALYSIS_PROMPT_TEMPLATE.replace("{jd_text}", jd_text);
        let system = format!("{JD_ANALYSIS_SYSTEM} {PLAIN_TEXT_ONLY}");
        self.0
            .call_text(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("JD analysis failed: {e}")))
    }

    async fn revise(&self, scores: &ScoreStore, instruction: &str) -> Result<String, AppError> {
        let current = serde_json::to_string_pretty(scores)
            .map_err(|e| AppError::Internal(e.into()))?;
        let prompt = SCORE_REVISION_PROMPT_TEMPLATE
            .replace("{skills_data}", &current)
            .replace("{instruction}", instruction);
        let system = format!("{JD_ANALYSIS_SYSTEM} {PLAIN_TEXT_ONLY}");
        self.0
            .call_text(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Score revision failed: {e}")))
    }
}

/// Runs the analyzer and parses its report. Fails if no role could be read.
pub async fn analyze_job_description(
    jd_text: &str,
    analyzer: &dyn JdAnalyzer,
) -> Result<(ParsedAnalysis, String), AppError> {
    let raw = analyzer.analyze(jd_text).await?;
    let parsed = parse_analysis(&raw);
    if parsed.roles.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Analysis did not contain any roles".to_string(),
        ));
    }
    Ok((parsed, raw))
}

/// Asks the analyzer to rewrite `scores` per `instruction` and parses the
/// reply. The input store is not modified; a reply without roles is rejected.
pub async fn revise_scores(
    scores: &ScoreStore,
    instruction: &str,
    analyzer: &dyn JdAnalyzer,
) -> Result<(ParsedAnalysis, String), AppError> {
    let raw = analyzer.revise(scores, instruction).await?;
    let parsed = parse_analysis(&raw);
    if parsed.roles.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Revised analysis did not contain any roles".to_string(),
        ));
    }
    Ok((parsed, raw))
}

// ────────────────────────────────────────────────────────────────────────────
// Report parser
// ────────────────────────────────────────────────────────────────────────────

const ROLE_MARKER: &str = "Role:";

/// Parses an analysis report. Never fails: unreadable items are skipped.
pub fn parse_analysis(content: &str) -> ParsedAnalysis {
    let mut parsed = ParsedAnalysis::default();

    for section in content.split(ROLE_MARKER).skip(1) {
        let mut lines = section.trim().lines();
        let role_name = lines.next().unwrap_or_default().trim().to_string();

        let mut record = RoleRecord::default();
        let mut current: Option<Category> = None;

        for line in lines {
            let line = line.trim();
            if let Some(category) = category_header(line) {
                current = Some(category);
            } else if let (Some(item), Some(category)) = (line.strip_prefix('-'), current) {
                match parse_item(item) {
                    Some((name, entry)) => {
                        record.category_mut(category).insert(name, entry);
                    }
                    None => debug!("Skipping unparseable analysis line: {line}"),
                }
            }
        }

        if !parsed.roles.contains(&role_name) {
            parsed.roles.push(role_name.clone());
        }
        parsed.store.insert_role(role_name, record);
    }

    parsed
}

fn category_header(line: &str) -> Option<Category> {
    if line.contains("Skills:") {
        Some(Category::Skills)
    } else if line.contains("Achievements/Certifications:") {
        Some(Category::Achievements)
    } else if line.contains("Skilled Activities:") {
        Some(Category::Activities)
    } else {
        None
    }
}

/// `Name: Importance: X% Selection Score: Y% Rejection Score: Z% Rating: R/10`
///
/// A bare `Name` without metrics is kept with every score at 0.
fn parse_item(item: &str) -> Option<(String, SkillEntry)> {
    let item = item.trim();
    let (name, metrics) = item.split_once(':').unwrap_or((item, ""));
    if name.trim().is_empty() {
        return None;
    }
    let mut entry = SkillEntry::default();

    for metric in metrics.split('%').map(str::trim) {
        if metric.contains("Importance") {
            entry.importance = metric_value(metric, "Importance:")?;
        } else if metric.contains("Selection Score") {
            entry.selection_score = metric_value(metric, "Selection Score:")?;
        } else if metric.contains("Rejection Score") {
            entry.rejection_score = metric_value(metric, "Rejection Score:")?;
        } else if metric.contains("Rating") {
            let raw = metric.rsplit("Rating:").next()?;
            let raw = raw.split('/').next()?;
            entry.rating = raw.trim().parse().ok()?;
        }
    }

    Some((name.trim().to_string(), entry))
}

fn metric_value(metric: &str, label: &str) -> Option<f64> {
    metric.rsplit(label).next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"Here is the analysis.

Role: Machine Learning Engineer
Skills:
- Python: Importance: 40.0% Selection Score: 25.0% Rejection Score: 20.0% Rating: 10.0/10
- Natural Language Processing (NLP): Importance: 60.0% Selection Score: 30.0% Rejection Score: 25.0% Rating: 8.5/10

Achievements/Certifications:
- AWS Certified ML Specialty: Importance: 100.0% Selection Score: 10.0% Rejection Score: 5.0% Rating: 10.0/10

Skilled Activities:
- Pipeline Development: Importance: 100.0% Selection Score: 35.0% Rejection Score: 50.0% Rating: 10.0/10

Role: Data Analyst
Skills:
- SQL: Importance: 100.0% Selection Score: 100.0% Rejection Score: 100.0% Rating: 10.0/10
"#;

    #[test]
    fn test_parses_roles_in_text_order() {
        let parsed = parse_analysis(REPORT);
        assert_eq!(parsed.roles, vec!["Machine Learning Engineer", "Data Analyst"]);
        assert_eq!(parsed.store.0.len(), 2);
    }

    #[test]
    fn test_parses_metrics_per_category() {
        let parsed = parse_analysis(REPORT);
        let role = parsed.store.role("Machine Learning Engineer").unwrap();

        let nlp = role.skills["Natural Language Processing (NLP)"];
        assert_eq!(nlp.importance, 60.0);
        assert_eq!(nlp.selection_score, 30.0);
        assert_eq!(nlp.rejection_score, 25.0);
        assert_eq!(nlp.rating, 8.5);

        assert!(role.achievements.contains_key("AWS Certified ML Specialty"));
        assert_eq!(role.activities["Pipeline Development"].rejection_score, 50.0);
    }

    #[test]
    fn test_skips_item_with_bad_number() {
        let text = "Role: QA\nSkills:\n- Testing: Importance: lots% Rating: 5/10\n- Automation: Importance: 20.0% Rating: 4.0/10\n";
        let parsed = parse_analysis(text);
        let role = parsed.store.role("QA").unwrap();
        assert!(!role.skills.contains_key("Testing"));
        assert_eq!(role.skills["Automation"].rating, 4.0);
    }

    #[test]
    fn test_item_without_metrics_defaults_to_zero() {
        let parsed = parse_analysis("Role: QA\nSkills:\n- Python\n- Go: Importance: 20.0%\n");
        let role = parsed.store.role("QA").unwrap();

        let names: Vec<&String> = role.skills.keys().collect();
        assert_eq!(names, vec!["Python", "Go"]);
        assert_eq!(role.skills["Python"], SkillEntry::default());
        assert_eq!(role.skills["Go"].importance, 20.0);
    }

    #[test]
    fn test_items_before_any_header_are_ignored() {
        let text = "Role: QA\n- Stray: Importance: 20.0%\nSkills:\n- Kept: Importance: 20.0%\n";
        let parsed = parse_analysis(text);
        let role = parsed.store.role("QA").unwrap();
        assert_eq!(role.skills.len(), 1);
        assert_eq!(role.skills["Kept"].rating, 0.0);
    }

    #[test]
    fn test_no_roles_yields_empty_analysis() {
        let parsed = parse_analysis("I could not find any roles.");
        assert!(parsed.roles.is_empty());
        assert!(parsed.store.is_empty());
    }

    struct CannedAnalyzer(&'static str);

    #[async_trait]
    impl JdAnalyzer for CannedAnalyzer {
        async fn analyze(&self, _jd_text: &str) -> Result<String, AppError> {
            Ok(self.0.to_string())
        }

        async fn revise(&self, _scores: &ScoreStore, _instruction: &str) -> Result<String, AppError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_analyze_job_description_returns_raw_and_parsed() {
        let (parsed, raw) = analyze_job_description("Hiring ML engineers", &CannedAnalyzer(REPORT))
            .await
            .unwrap();
        assert_eq!(raw, REPORT);
        assert_eq!(parsed.roles.len(), 2);
    }

    #[tokio::test]
    async fn test_analyze_job_description_rejects_roleless_report() {
        let result =
            analyze_job_description("Hiring", &CannedAnalyzer("Nothing useful here")).await;
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
    }

    #[tokio::test]
    async fn test_revise_scores_parses_reply_and_keeps_input() {
        let current = parse_analysis("Role: Data Analyst\nSkills:\n- SQL: Importance: 10.0%\n").store;
        let before = current.clone();

        let (parsed, raw) = revise_scores(&current, "Make SQL critical", &CannedAnalyzer(REPORT))
            .await
            .unwrap();

        assert_eq!(raw, REPORT);
        assert_eq!(parsed.roles, vec!["Machine Learning Engineer", "Data Analyst"]);
        assert_eq!(parsed.store.role("Data Analyst").unwrap().skills["SQL"].importance, 100.0);
        assert_eq!(current, before);
    }

    #[tokio::test]
    async fn test_revise_scores_rejects_roleless_reply() {
        let result =
            revise_scores(&ScoreStore::default(), "anything", &CannedAnalyzer("Sorry")).await;
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
    }
}
