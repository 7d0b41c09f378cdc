//! Axum route handlers for the Thresholds API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::scores::analysis::{
    analyze_job_description, parse_analysis, revise_scores, ParsedAnalysis,
};
use crate::scores::directive::ZeroValuePolicy;
use crate::scores::models::ScoreStore;
use crate::scores::mutator::{run_prompt, ApplyOptions, ApplyReport, RoleSelector};
use crate::scores::sample_prompts::sample_prompts;
use crate::scores::thresholds::{compute_thresholds, ThresholdScores};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub jd_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseAnalysisRequest {
    pub analysis_text: String,
}

#[derive(Debug, Serialize)]
pub struct JobAnalysisResponse {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub roles: Vec<String>,
    pub skills_data: ScoreStore,
    pub selection_threshold: f64,
    pub rejection_threshold: f64,
    pub sample_prompts: Vec<String>,
    pub raw_response: String,
}

/// A directive block, either as one newline-separated string or as lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PromptInput {
    Text(String),
    Lines(Vec<String>),
}

impl PromptInput {
    fn into_text(self) -> String {
        match self {
            PromptInput::Text(text) => text,
            PromptInput::Lines(lines) => lines.join("\n"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub skills_data: ScoreStore,
    pub prompt: PromptInput,
    /// Role to update; the first role when omitted.
    pub role: Option<String>,
    /// Overrides the configured zero-value policy.
    pub zero_is_value: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub skills_data: ScoreStore,
    pub report: ApplyReport,
    pub thresholds: ThresholdScores,
}

#[derive(Debug, Deserialize)]
pub struct CustomPromptRequest {
    pub skills_data: ScoreStore,
    /// Free-text instruction for the LLM, e.g. "Make SQL twice as important".
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct CustomPromptResponse {
    pub roles: Vec<String>,
    pub skills_data: ScoreStore,
    pub selection_threshold: f64,
    pub rejection_threshold: f64,
    pub raw_response: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoresRequest {
    pub skills_data: ScoreStore,
}

#[derive(Debug, Deserialize)]
pub struct SamplePromptsRequest {
    pub skills_data: ScoreStore,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SamplePromptsResponse {
    pub prompts: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/thresholds/analyze
///
/// Sends the JD to the LLM and returns the parsed scores, thresholds and a
/// handful of suggested directives.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<JobAnalysisResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let analyzer = state.analyzer.as_deref().ok_or_else(|| {
        AppError::Unavailable("JD analysis requires ANTHROPIC_API_KEY".to_string())
    })?;

    let (parsed, raw) = analyze_job_description(&request.jd_text, analyzer).await?;
    info!("Analysed JD into {} role(s)", parsed.roles.len());

    Ok(Json(analysis_response(&state, parsed, raw)))
}

/// POST /api/v1/thresholds/parse
///
/// Same response as `analyze`, for an analysis report produced elsewhere.
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(request): Json<ParseAnalysisRequest>,
) -> Result<Json<JobAnalysisResponse>, AppError> {
    if request.analysis_text.trim().is_empty() {
        return Err(AppError::Validation(
            "analysis_text cannot be empty".to_string(),
        ));
    }

    let parsed = parse_analysis(&request.analysis_text);
    if parsed.roles.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "analysis_text does not contain any 'Role:' section".to_string(),
        ));
    }

    Ok(Json(analysis_response(&state, parsed, request.analysis_text)))
}

/// POST /api/v1/thresholds/apply
///
/// Applies a directive block to the supplied scores. The request's store is
/// echoed back modified; skipped lines are listed in the report.
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<ApplyResponse>, AppError> {
    let text = request.prompt.into_text();
    if text.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let options = ApplyOptions {
        role: RoleSelector::from(request.role),
        zero_policy: ZeroValuePolicy::from_flag(
            request.zero_is_value.unwrap_or(state.config.zero_is_value),
        ),
    };

    let outcome = run_prompt(&request.skills_data, &text, &options);
    info!(
        "Applied {} directive(s), skipped {}",
        outcome.report.applied.len(),
        outcome.report.skipped.len()
    );

    let thresholds = compute_thresholds(&outcome.store);
    Ok(Json(ApplyResponse {
        skills_data: outcome.store,
        report: outcome.report,
        thresholds,
    }))
}

/// POST /api/v1/thresholds/custom-prompt
///
/// Lets the LLM rewrite the supplied scores from a free-text instruction and
/// returns the revised scores with fresh thresholds.
pub async fn handle_custom_prompt(
    State(state): State<AppState>,
    Json(request): Json<CustomPromptRequest>,
) -> Result<Json<CustomPromptResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    if request.skills_data.is_empty() {
        return Err(AppError::Validation("skills_data cannot be empty".to_string()));
    }

    let analyzer = state.analyzer.as_deref().ok_or_else(|| {
        AppError::Unavailable("Custom prompts require ANTHROPIC_API_KEY".to_string())
    })?;

    let (parsed, raw) = revise_scores(&request.skills_data, &request.prompt, analyzer).await?;
    info!("Revised scores into {} role(s)", parsed.roles.len());

    let thresholds = compute_thresholds(&parsed.store);
    Ok(Json(CustomPromptResponse {
        roles: parsed.roles,
        skills_data: parsed.store,
        selection_threshold: thresholds.selection_threshold,
        rejection_threshold: thresholds.rejection_threshold,
        raw_response: raw,
    }))
}

/// POST /api/v1/thresholds/compute
pub async fn handle_compute(Json(request): Json<ScoresRequest>) -> Json<ThresholdScores> {
    Json(compute_thresholds(&request.skills_data))
}

/// POST /api/v1/thresholds/sample-prompts
pub async fn handle_sample_prompts(
    State(state): State<AppState>,
    Json(request): Json<SamplePromptsRequest>,
) -> Json<SamplePromptsResponse> {
    let count = request.count.unwrap_or(state.config.sample_prompt_count);
    let prompts = sample_prompts(&request.skills_data, count, &mut rand::thread_rng());
    Json(SamplePromptsResponse { prompts })
}

fn analysis_response(state: &AppState, parsed: ParsedAnalysis, raw: String) -> JobAnalysisResponse {
    let thresholds = compute_thresholds(&parsed.store);
    let prompts = sample_prompts(
        &parsed.store,
        state.config.sample_prompt_count,
        &mut rand::thread_rng(),
    );

    JobAnalysisResponse {
        analysis_id: Uuid::new_v4(),
        analyzed_at: Utc::now(),
        roles: parsed.roles,
        skills_data: parsed.store,
        selection_threshold: thresholds.selection_threshold,
        rejection_threshold: thresholds.rejection_threshold,
        sample_prompts: prompts,
        raw_response: raw,
    }
}
