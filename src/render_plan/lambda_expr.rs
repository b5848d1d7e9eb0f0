use serde::{Deserialize, Serialize};

use super::render_expr::{BinaryOp, SqlType, SqlValue};

/// An unexecuted function body passed to a higher-order array function
/// (ARRAY_FILTER, ARRAY_SORT, ...). Firebolt has no closures, so the body is
/// flattened into inline `param -> expr` syntax by the lambda compiler.
///
/// The body is deliberately restricted: no aggregate or window calls, no
/// sub-queries. Anything outside [`LambdaBody`] is rejected at compile time
/// by the closed enum, anything inside it but outside the compiler's
/// whitelist is a fatal render error.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LambdaExpr {
    /// Row values the body closes over, in declaration order.
    pub params: Vec<String>,
    pub body: LambdaBody,
    /// Declared result type of the body, checked against the calling
    /// function's expectation for single-parameter lambdas.
    pub return_type: SqlType,
}

impl LambdaExpr {
    pub fn new(params: Vec<String>, body: LambdaBody, return_type: SqlType) -> Self {
        Self {
            params,
            body,
            return_type,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum LambdaBody {
    /// `if/else` expression; renders as `IF(test,if_true,if_false)`.
    Conditional {
        test: Box<LambdaBody>,
        if_true: Box<LambdaBody>,
        if_false: Box<LambdaBody>,
    },

    Negate(Box<LambdaBody>),

    /// Type coercion; renders a `::TYPE` suffix unless the target is a
    /// nullable type.
    Coerce { expr: Box<LambdaBody>, ty: SqlType },

    /// Only the seven comparison/modulo operators plus `Coalesce` are
    /// accepted; anything else is a fatal error in the lambda compiler.
    Binary {
        op: BinaryOp,
        lhs: Box<LambdaBody>,
        rhs: Box<LambdaBody>,
    },

    /// Member access on the element's anonymous shape; renders bare.
    Member(String),

    /// Reference to a declared lambda parameter; renders bare.
    Param(String),

    Literal(SqlValue),

    /// Whitelisted method call (string length, no-op passthrough, regex
    /// match).
    MethodCall { name: String, args: Vec<LambdaBody> },
}
