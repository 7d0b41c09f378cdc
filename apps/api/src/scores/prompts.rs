// LLM prompt constants for threshold analysis.
// The analyzer appends llm_client::prompts::PLAIN_TEXT_ONLY to the system prompt.

/// System prompt for JD analysis.
pub const JD_ANALYSIS_SYSTEM: &str = "You are an expert technical recruiter. \
    You analyse job descriptions and weight the skills, certifications and \
    activities a candidate needs for each role. \
    You MUST follow the requested output format exactly.";

/// JD analysis prompt template. Replace `{jd_text}` before sending.
pub const JD_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze this job description and extract the following information:

1. The job roles mentioned (at least one role must be extracted)
2. Required skills for each role and their importance (%)
3. Selection score weightage for each skill (%)
4. Rejection score weightage for each skill (%)
5. Skill rating out of 10 based on importance
6. Required achievements/certifications and their importance (%)
7. Required skilled activities (with experience) and their importance (%)

Importance Score (Sum: 100% per category): relative priority of each item.
Selection Score (Sum: 100%): how much having each item contributes to candidate selection.
Rejection Score (Sum: 100%): how much lacking each item leads to candidate rejection.
Rating: score out of 10, calculated as (Importance x 10 / highest importance percentage in that category).

Format your response EXACTLY as follows with one blank line between each section:

Role: [Role Name]
Skills:
- [Skill Name]: Importance: [X]% Selection Score: [Y]% Rejection Score: [Z]% Rating: [R]/10

Achievements/Certifications:
- [Achievement/Cert Name]: Importance: [X]% Selection Score: [Y]% Rejection Score: [Z]% Rating: [R]/10

Skilled Activities:
- [Activity Name]: Importance: [X]% Selection Score: [Y]% Rejection Score: [Z]% Rating: [R]/10

Rules:
- List ALL roles found in the text
- Importance percentages sum to 100% within each category
- Selection and Rejection scores each sum to 100% across all items per role
- Use exact numbers, not ranges, rounded to one decimal place
- Each role has at least one item in each category
- Include a Rating for each item
- Item names must not contain a colon

Job Description:
{jd_text}"#;

/// Score revision prompt. Replace `{skills_data}` and `{instruction}` before
/// sending.
pub const SCORE_REVISION_PROMPT_TEMPLATE: &str = r#"Current Skills Data:
{skills_data}

Instruction: {instruction}

Update the skills data according to the instruction and return the complete
updated data for every role in EXACTLY the following format:

Role: [Role Name]
Skills:
- [Skill Name]: Importance: [X]% Selection Score: [Y]% Rejection Score: [Z]% Rating: [R]/10

Achievements/Certifications:
- [Achievement/Cert Name]: Importance: [X]% Selection Score: [Y]% Rejection Score: [Z]% Rating: [R]/10

Skilled Activities:
- [Activity Name]: Importance: [X]% Selection Score: [Y]% Rejection Score: [Z]% Rating: [R]/10

Rules:
- Keep every role and item that the instruction does not remove
- Keep the role and item names exactly as given
- Use exact numbers rounded to one decimal place"#;
