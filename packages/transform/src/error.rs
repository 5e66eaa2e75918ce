use markweave_parser::ParseError;
use thiserror::Error;

pub type TransformResult<T> = Result<T, TransformError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("module {module} is not registered; register() it on the container first")]
    ModuleMissing { module: &'static str },

    #[error("module {module} is registered but not initialized; call init() before use")]
    ModuleUninitialized { module: &'static str },

    #[error("no rule set available; the Rules module is required to run a transformation")]
    MissingRules,
}
