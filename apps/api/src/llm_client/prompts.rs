// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment for replies that are parsed line by line.
pub const PLAIN_TEXT_ONLY: &str = "Respond in plain text only. \
    Do NOT use markdown code fences, bold markers or tables. \
    Do NOT include explanations or apologies before or after the requested format.";
