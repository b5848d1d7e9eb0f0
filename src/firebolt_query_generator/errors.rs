use thiserror::Error;

use crate::render_plan::SqlType;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FireboltSqlGeneratorError {
    #[error("Unsupported expression shape: {0} (the plan producer must reject this earlier)")]
    UnsupportedExpression(String),
    #[error("Lambda argument outside a function call (lambdas are only valid as higher-order function arguments)")]
    MisplacedLambda,
    #[error("Unsupported operator in lambda body: {0} (allowed: >, >=, <, <=, =, !=, %, coalesce)")]
    UnsupportedLambdaOperator(String),
    #[error("Unsupported method in lambda body: {0}")]
    UnsupportedLambdaMethod(String),
    #[error("Lambda body has no parameters (at least one row value must be named)")]
    EmptyLambdaParameters,
    #[error("Lambda return type mismatch: expected {expected:?}, body declares {actual:?}")]
    LambdaTypeMismatch { expected: SqlType, actual: SqlType },
    #[error("Template placeholder {{{0}}} has no matching argument")]
    TemplateArgumentMissing(usize),
    #[error("Cross join carries ON conditions (cross joins must not be conditional)")]
    CrossJoinWithCondition,
    #[error("Higher-order function {0} takes exactly one lambda argument")]
    MultipleLambdaArguments(String),
}
