//! The portable query-plan representation consumed by the SQL generator.
//!
//! Plans are built upstream and treated as read-only input here: one
//! statement is a [`RenderPlan`] owning CTE definitions, a from/join chain,
//! a predicate tree, grouping/ordering keys and a projection list.

use serde::{Deserialize, Serialize};

pub mod lambda_expr;
pub mod render_expr;

pub use lambda_expr::{LambdaBody, LambdaExpr};
pub use render_expr::{
    BinaryExpr, BinaryOp, CastExpr, Column, ConditionalExpr, FnCall, Parameter, QualifiedColumn,
    RenderExpr, SqlType, SqlValue, Template, UnaryExpr, UnaryOp,
};

/// Sentinel suffix a plan producer appends to a CTE name to request
/// materialization. Detected and stripped by [`Cte::new`]; the emitted SQL
/// never contains it.
pub const CTE_MATERIALIZED_SUFFIX: &str = "__mat__cte__";

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct RenderPlan {
    pub ctes: CteItems,
    pub select: SelectItems,
    pub from: FromItem,
    pub joins: JoinItems,
    pub filters: FilterItems,
    pub group_by: GroupByExpressions,
    pub having: Option<RenderExpr>,
    pub order_by: OrderByItems,
    pub limit: LimitItem,
    pub offset: OffsetItem,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct SelectItems {
    pub items: Vec<SelectItem>,
    pub distinct: bool,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SelectItem {
    pub expression: RenderExpr,
    pub col_alias: Option<String>,
}

impl SelectItem {
    pub fn expr(expression: RenderExpr) -> Self {
        Self {
            expression,
            col_alias: None,
        }
    }

    pub fn aliased(expression: RenderExpr, alias: impl Into<String>) -> Self {
        Self {
            expression,
            col_alias: Some(alias.into()),
        }
    }
}

/// Table reference used by FROM and JOIN clauses.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct FromItem(pub Option<TableRef>);

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct JoinItems(pub Vec<Join>);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Join {
    pub table: TableRef,
    pub join_type: JoinType,
    /// Conjunction of ON conditions; empty only for cross joins.
    pub on: Vec<RenderExpr>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct FilterItems(pub Option<RenderExpr>);

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct GroupByExpressions(pub Vec<RenderExpr>);

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct OrderByItems(pub Vec<OrderByItem>);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expression: RenderExpr,
    pub order: OrderByOrder,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum OrderByOrder {
    Asc,
    Desc,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct LimitItem(pub Option<i64>);

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct OffsetItem(pub Option<i64>);

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct CteItems(pub Vec<Cte>);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum CteBody {
    Structured(Box<RenderPlan>),
    RawSql(String),
}

/// One common table expression. Created once per statement render and
/// discarded after text is produced.
///
/// Materialization carries an explicit flag; the textual
/// [`CTE_MATERIALIZED_SUFFIX`] convention survives only at this constructor
/// boundary for compatibility with plan producers that encode the request in
/// the name.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Cte {
    /// Visible name, sentinel already stripped.
    pub name: String,
    /// Ordered field list; empty means no explicit field list is emitted.
    pub fields: Vec<String>,
    pub body: CteBody,
    pub recursive: bool,
    pub materialized: bool,
}

impl Cte {
    /// Build a CTE, honoring the name-suffix materialization convention: a
    /// name containing [`CTE_MATERIALIZED_SUFFIX`] requests materialization
    /// and the suffix is removed from the visible name.
    pub fn new(name: impl Into<String>, fields: Vec<String>, body: CteBody) -> Self {
        let raw: String = name.into();
        let materialized = raw.contains(CTE_MATERIALIZED_SUFFIX);
        let name = if materialized {
            raw.replacen(CTE_MATERIALIZED_SUFFIX, "", 1)
        } else {
            raw
        };
        Self {
            name,
            fields,
            body,
            recursive: false,
            materialized,
        }
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Request materialization explicitly, without the naming convention.
    pub fn materialized(mut self) -> Self {
        self.materialized = true;
        self
    }
}
