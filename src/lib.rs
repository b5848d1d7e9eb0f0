//! Firebolt SQL generation.
//!
//! Compiles an immutable [`render_plan::RenderPlan`] into a Firebolt SQL
//! statement plus bound parameters. The dialect-specific behavior (operator
//! spellings, literal formats, inline lambdas, CTE materialization) lives in
//! [`firebolt_query_generator`]; the plan data model in [`render_plan`] is
//! dialect-neutral.

pub mod firebolt_query_generator;
pub mod render_plan;

pub use firebolt_query_generator::{
    generate_sql, BoundParameter, CompiledSql, FireboltSqlGeneratorError,
};
pub use render_plan::RenderPlan;
