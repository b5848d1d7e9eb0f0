use serde::{Deserialize, Serialize};

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::lambda_expr::LambdaExpr;

/// Declared value type carried by every expression node.
///
/// Used for cast decisions, literal formatting and the Firebolt type-name
/// mapping. `Nullable` wraps the non-null counterpart; most type checks look
/// through it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum SqlType {
    Bool,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Text,
    Date,
    Timestamp,
    Uuid,
    Array(Box<SqlType>),
    Nullable(Box<SqlType>),
}

impl SqlType {
    /// Strip a `Nullable` wrapper, if any.
    pub fn base(&self) -> &SqlType {
        match self {
            SqlType::Nullable(inner) => inner.base(),
            other => other,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.base(), SqlType::Int | SqlType::Long)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self.base(), SqlType::Float | SqlType::Double)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating() || matches!(self.base(), SqlType::Decimal)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self.base(), SqlType::Text)
    }
}

/// A scalar (or array) value as it appears in literals and bound parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Canonical decimal digits with an invariant decimal point, e.g. "12.50".
    Decimal(String),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
    Array(Vec<SqlValue>),
}

impl SqlValue {
    /// Best-effort declared type of a bare value.
    pub fn sql_type(&self) -> SqlType {
        match self {
            SqlValue::Null => SqlType::Nullable(Box::new(SqlType::Text)),
            SqlValue::Bool(_) => SqlType::Bool,
            SqlValue::Int(_) => SqlType::Long,
            SqlValue::Float(_) => SqlType::Double,
            SqlValue::Decimal(_) => SqlType::Decimal,
            SqlValue::Text(_) => SqlType::Text,
            SqlValue::Date(_) => SqlType::Date,
            SqlValue::Timestamp(_) => SqlType::Timestamp,
            SqlValue::Uuid(_) => SqlType::Uuid,
            SqlValue::Array(items) => {
                let elem = items
                    .first()
                    .map(SqlValue::sql_type)
                    .unwrap_or(SqlType::Text);
                SqlType::Array(Box::new(elem))
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    /// Firebolt spells exponentiation `#`; produced by the rewriter, never by
    /// plan producers.
    HashPower,
    /// String concatenation `||`; produced by the rewriter for textual `+`.
    Concat,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    /// Renders as `COALESCE(l, r)`, not as an infix token.
    Coalesce,
}

impl BinaryOp {
    pub fn token(&self) -> Option<&'static str> {
        let token = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "^",
            BinaryOp::HashPower => "#",
            BinaryOp::Concat => "||",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Coalesce => return None,
        };
        Some(token)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Negate,
}

/// Expression tree consumed (read-only) by the rewriter and the text
/// compiler. Rewriting produces replacement nodes, never mutates these.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum RenderExpr {
    Literal(SqlValue),

    /// Raw SQL fragment passed through verbatim.
    Raw(String),

    Star,

    Column(Column),

    QualifiedColumn(QualifiedColumn),

    Parameter(Parameter),

    Binary(BinaryExpr),

    Unary(UnaryExpr),

    Cast(CastExpr),

    FnCall(FnCall),

    /// Dialect text with `{0}`-style holes; produced by the rewrite pass.
    Template(Template),

    Conditional(ConditionalExpr),

    /// Function-body argument to a higher-order array function. Only valid
    /// inside a `FnCall` argument list.
    Lambda(LambdaExpr),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: SqlType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct QualifiedColumn {
    pub table_alias: String,
    pub column: String,
    pub ty: SqlType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: SqlValue,
    pub ty: SqlType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<RenderExpr>,
    pub rhs: Box<RenderExpr>,
    pub ty: SqlType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<RenderExpr>,
    pub ty: SqlType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CastExpr {
    pub expr: Box<RenderExpr>,
    pub ty: SqlType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FnCall {
    pub name: String,
    pub args: Vec<RenderExpr>,
    pub ty: SqlType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Template {
    pub format: String,
    pub args: Vec<RenderExpr>,
    pub ty: SqlType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ConditionalExpr {
    pub test: Box<RenderExpr>,
    pub if_true: Box<RenderExpr>,
    pub if_false: Box<RenderExpr>,
    pub ty: SqlType,
}

impl RenderExpr {
    /// Declared type of this node.
    pub fn ty(&self) -> SqlType {
        match self {
            RenderExpr::Literal(value) => value.sql_type(),
            RenderExpr::Raw(_) | RenderExpr::Star => SqlType::Text,
            RenderExpr::Column(c) => c.ty.clone(),
            RenderExpr::QualifiedColumn(c) => c.ty.clone(),
            RenderExpr::Parameter(p) => p.ty.clone(),
            RenderExpr::Binary(b) => b.ty.clone(),
            RenderExpr::Unary(u) => u.ty.clone(),
            RenderExpr::Cast(c) => c.ty.clone(),
            RenderExpr::FnCall(f) => f.ty.clone(),
            RenderExpr::Template(t) => t.ty.clone(),
            RenderExpr::Conditional(c) => c.ty.clone(),
            RenderExpr::Lambda(l) => l.return_type.clone(),
        }
    }

    pub fn binary(op: BinaryOp, lhs: RenderExpr, rhs: RenderExpr, ty: SqlType) -> RenderExpr {
        RenderExpr::Binary(BinaryExpr {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            ty,
        })
    }

    pub fn fn_call(name: impl Into<String>, args: Vec<RenderExpr>, ty: SqlType) -> RenderExpr {
        RenderExpr::FnCall(FnCall {
            name: name.into(),
            args,
            ty,
        })
    }

    pub fn template(format: impl Into<String>, args: Vec<RenderExpr>, ty: SqlType) -> RenderExpr {
        RenderExpr::Template(Template {
            format: format.into(),
            args,
            ty,
        })
    }

    pub fn column(name: impl Into<String>, ty: SqlType) -> RenderExpr {
        RenderExpr::Column(Column {
            name: name.into(),
            ty,
        })
    }

    pub fn qualified(
        table_alias: impl Into<String>,
        column: impl Into<String>,
        ty: SqlType,
    ) -> RenderExpr {
        RenderExpr::QualifiedColumn(QualifiedColumn {
            table_alias: table_alias.into(),
            column: column.into(),
            ty,
        })
    }

    pub fn int(value: i64) -> RenderExpr {
        RenderExpr::Literal(SqlValue::Int(value))
    }
}
