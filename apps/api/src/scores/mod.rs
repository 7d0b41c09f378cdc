// Threshold scoring: JD analysis, directive parsing and application,
// threshold computation and suggested prompts.

pub mod analysis;
pub mod directive;
pub mod handlers;
pub mod models;
pub mod mutator;
pub mod prompts;
pub mod sample_prompts;
pub mod thresholds;
