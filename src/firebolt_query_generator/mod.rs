//! Firebolt SQL generation from a [`RenderPlan`](crate::render_plan::RenderPlan).
//!
//! The pipeline is two passes over an immutable plan: the dialect rewriter
//! replaces portable operator/function shapes with their Firebolt spellings,
//! then the text compiler renders the result into a single statement,
//! collecting bound parameters along the way.

pub mod errors;
pub mod function_registry;
pub mod lambda;
pub mod literal;
pub mod rewrite;
pub mod to_sql_query;

use serde::{Deserialize, Serialize};

use crate::render_plan::{RenderPlan, SqlType, SqlValue};

pub use errors::FireboltSqlGeneratorError;
pub use to_sql_query::{RenderContext, ToSql};

/// A parameter referenced by the generated statement, in plan order of first
/// appearance. Values travel out-of-band; the SQL text only carries the
/// `@name` placeholder.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BoundParameter {
    pub name: String,
    pub value: SqlValue,
    pub ty: SqlType,
}

impl BoundParameter {
    /// Best-effort inline rendering of the value, for log output only. The
    /// statement itself always uses the placeholder.
    pub fn echo_sql(&self) -> String {
        literal::render_literal(&self.value)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CompiledSql {
    pub sql: String,
    pub parameters: Vec<BoundParameter>,
}

/// Compile a plan to Firebolt SQL text plus its bound parameters.
pub fn generate_sql(plan: &RenderPlan) -> Result<CompiledSql, FireboltSqlGeneratorError> {
    let plan = rewrite::rewrite_plan(plan);
    let mut ctx = RenderContext::default();
    let sql = plan.to_sql(&mut ctx)?;
    let parameters = ctx.into_parameters();

    if log::log_enabled!(log::Level::Debug) {
        for param in &parameters {
            log::debug!("bound parameter @{} = {}", param.name, param.echo_sql());
        }
    }

    Ok(CompiledSql {
        sql: sql.trim_end().to_string(),
        parameters,
    })
}
