use thiserror::Error;

/// Errors surfaced by the workout compiler.
///
/// The engine is fail-safe toward restriction: only `Validation` refuses to
/// produce a plan. Everything else degrades (defaults, all-rest days,
/// in-memory plans) and is reported alongside the result.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Safety configuration unavailable: {0}")]
    Config(String),

    #[error("Rule {rule_id} failed to evaluate: {reason}")]
    RuleEvaluation { rule_id: String, reason: String },

    #[error("No candidates available for slot {slot}")]
    Assembly { slot: String },

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Invalid profile: {0}")]
    Validation(String),
}

impl EngineError {
    /// Stable error code exposed at the API boundary.
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::Config(_) => "CONFIG_UNAVAILABLE",
            EngineError::RuleEvaluation { .. } => "RULE_EVALUATION_FAILED",
            EngineError::Assembly { .. } => "LIBRARY_EMPTY_FOR_USER",
            EngineError::Persistence(_) => "PERSISTENCE_FAILED",
            EngineError::Validation(_) => "PROFILE_INVALID",
        }
    }

    /// Soft errors degrade to a usable plan; hard errors refuse generation.
    pub fn is_hard(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}
