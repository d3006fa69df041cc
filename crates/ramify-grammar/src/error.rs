use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("duplicate rule key: {0}")]
    DuplicateRuleKey(String),

    #[error("invalid arithmetic expression `{expr}`: {reason}")]
    InvalidExpression { expr: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GrammarError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
