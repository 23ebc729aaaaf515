use crate::error::{CriteriaErrorExt, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// The evaluator has no binding for the member, method or constructor.
    Unsupported,
    /// The binding exists but raised while evaluating.
    Failed,
}

#[derive(Debug, Clone)]
pub struct EvalError {
    level: Level,
    kind: EvalErrorKind,
    message: String,
    issuer: String,
}

impl EvalError {
    pub fn unsupported(what: impl std::fmt::Display) -> Self {
        EvalError {
            level: Level::Info,
            kind: EvalErrorKind::Unsupported,
            message: format!("No evaluator binding for '{}'.", what),
            issuer: "criteria.eval".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        EvalError {
            level: Level::Error,
            kind: EvalErrorKind::Failed,
            message: message.into(),
            issuer: "criteria.eval".to_string(),
        }
    }

    pub fn with(level: Level, kind: EvalErrorKind, message: String, issuer: String) -> Self {
        EvalError { level, kind, message, issuer }
    }

    pub fn kind(&self) -> EvalErrorKind {
        self.kind
    }

    pub fn is_unsupported(&self) -> bool {
        self.kind == EvalErrorKind::Unsupported
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

impl CriteriaErrorExt for EvalError {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }
}
