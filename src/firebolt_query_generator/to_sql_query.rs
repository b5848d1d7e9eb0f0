//! Plan-to-text compilation.
//!
//! Every plan and clause type implements [`ToSql`], appending dialect text
//! and recording bound parameters in the shared [`RenderContext`]. Rendering
//! is all-or-nothing: any unsupported shape aborts the whole statement, so
//! partial SQL never escapes the compiler.

use crate::render_plan::{
    Cte, CteBody, CteItems, FilterItems, FromItem, GroupByExpressions, Join, JoinItems, JoinType,
    OrderByItems, OrderByOrder, Parameter, RenderExpr, RenderPlan, SelectItems, SqlType, TableRef,
};

use super::errors::FireboltSqlGeneratorError;
use super::function_registry::get_function_mapping;
use super::lambda::build_lambda;
use super::literal::{conv_identifier, firebolt_type_name, render_literal};
use super::BoundParameter;

/// Per-statement render state. Created fresh for every statement; plans
/// themselves stay read-only, so concurrent renders never share state.
#[derive(Debug, Default)]
pub struct RenderContext {
    parameters: Vec<BoundParameter>,
}

impl RenderContext {
    /// Record a parameter and return its sigil-prefixed placeholder. A name
    /// that already carries the `@` sigil is not double-prefixed.
    fn bind(&mut self, param: &Parameter) -> String {
        if !self.parameters.iter().any(|p| p.name == param.name) {
            self.parameters.push(BoundParameter {
                name: param.name.clone(),
                value: param.value.clone(),
                ty: param.ty.clone(),
            });
        }
        if param.name.starts_with('@') {
            param.name.clone()
        } else {
            format!("@{}", param.name)
        }
    }

    pub fn into_parameters(self) -> Vec<BoundParameter> {
        self.parameters
    }
}

pub trait ToSql {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError>;
}

impl ToSql for RenderPlan {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        let mut sql = String::new();
        sql.push_str(&self.ctes.to_sql(ctx)?);
        sql.push_str(&self.select.to_sql(ctx)?);
        sql.push_str(&self.from.to_sql(ctx)?);
        sql.push_str(&self.joins.to_sql(ctx)?);
        sql.push_str(&self.filters.to_sql(ctx)?);
        sql.push_str(&self.group_by.to_sql(ctx)?);
        if let Some(having) = &self.having {
            sql.push_str("HAVING ");
            sql.push_str(&having.to_sql(ctx)?);
            sql.push('\n');
        }
        sql.push_str(&self.order_by.to_sql(ctx)?);
        if let Some(limit) = self.limit.0 {
            sql.push_str(&format!("LIMIT {limit}\n"));
        }
        if let Some(offset) = self.offset.0 {
            sql.push_str(&format!("OFFSET {offset}\n"));
        }
        Ok(sql)
    }
}

impl ToSql for SelectItems {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        if self.items.is_empty() {
            return Err(FireboltSqlGeneratorError::UnsupportedExpression(
                "statement has no projection".to_string(),
            ));
        }

        let mut sql = String::new();
        if self.distinct {
            sql.push_str("SELECT DISTINCT ");
        } else {
            sql.push_str("SELECT ");
        }
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&item.expression.to_sql(ctx)?);
            if let Some(alias) = &item.col_alias {
                sql.push_str(" AS ");
                sql.push_str(&conv_identifier(alias));
            }
        }
        sql.push('\n');
        Ok(sql)
    }
}

fn table_ref_sql(table: &TableRef) -> String {
    let mut sql = String::new();
    if let Some(schema) = &table.schema {
        sql.push_str(&conv_identifier(schema));
        sql.push('.');
    }
    sql.push_str(&conv_identifier(&table.name));
    if let Some(alias) = &table.alias {
        sql.push_str(" AS ");
        sql.push_str(&conv_identifier(alias));
    }
    sql
}

impl ToSql for FromItem {
    fn to_sql(&self, _ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        match &self.0 {
            Some(table) => Ok(format!("FROM {}\n", table_ref_sql(table))),
            None => Ok(String::new()),
        }
    }
}

impl ToSql for JoinItems {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        let mut sql = String::new();
        for join in &self.0 {
            sql.push_str(&join.to_sql(ctx)?);
        }
        Ok(sql)
    }
}

impl ToSql for Join {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        let keyword = match self.join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        };

        if self.join_type == JoinType::Cross {
            if !self.on.is_empty() {
                return Err(FireboltSqlGeneratorError::CrossJoinWithCondition);
            }
            return Ok(format!("{keyword} {}\n", table_ref_sql(&self.table)));
        }

        let mut conditions = Vec::with_capacity(self.on.len());
        for condition in &self.on {
            conditions.push(condition.to_sql(ctx)?);
        }
        Ok(format!(
            "{keyword} {} ON {}\n",
            table_ref_sql(&self.table),
            conditions.join(" AND ")
        ))
    }
}

impl ToSql for FilterItems {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        match &self.0 {
            Some(expr) => Ok(format!("WHERE {}\n", expr.to_sql(ctx)?)),
            None => Ok(String::new()),
        }
    }
}

impl ToSql for GroupByExpressions {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        if self.0.is_empty() {
            return Ok(String::new());
        }
        let mut keys = Vec::with_capacity(self.0.len());
        for expr in &self.0 {
            keys.push(expr.to_sql(ctx)?);
        }
        Ok(format!("GROUP BY {}\n", keys.join(", ")))
    }
}

impl ToSql for OrderByItems {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        if self.0.is_empty() {
            return Ok(String::new());
        }
        let mut keys = Vec::with_capacity(self.0.len());
        for item in &self.0 {
            let direction = match item.order {
                OrderByOrder::Asc => "ASC",
                OrderByOrder::Desc => "DESC",
            };
            keys.push(format!("{} {direction}", item.expression.to_sql(ctx)?));
        }
        Ok(format!("ORDER BY {}\n", keys.join(", ")))
    }
}

impl ToSql for CteItems {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        if self.0.is_empty() {
            return Ok(String::new());
        }

        let mut sql = String::new();
        if self.0.iter().any(|cte| cte.recursive) {
            sql.push_str("WITH RECURSIVE ");
        } else {
            sql.push_str("WITH ");
        }
        for (i, cte) in self.0.iter().enumerate() {
            if i > 0 {
                sql.push_str(",\n");
            }
            sql.push_str(&cte.to_sql(ctx)?);
        }
        sql.push('\n');
        Ok(sql)
    }
}

impl ToSql for Cte {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        let mut sql = String::new();
        sql.push_str(&conv_identifier(&self.name));

        // Wide field lists go one per line; short ones stay inline.
        if !self.fields.is_empty() {
            let quoted: Vec<String> = self.fields.iter().map(|f| conv_identifier(f)).collect();
            if self.fields.len() > 3 {
                sql.push_str(" (\n    ");
                sql.push_str(&quoted.join(",\n    "));
                sql.push_str("\n)");
            } else {
                sql.push_str(" (");
                sql.push_str(&quoted.join(", "));
                sql.push(')');
            }
        }

        sql.push_str(" AS ");
        if self.materialized {
            sql.push_str("MATERIALIZED ");
        }
        match &self.body {
            CteBody::Structured(plan) => {
                // Bodies render one level deeper than the WITH clause; nested
                // CTEs accumulate indentation naturally.
                let body = plan.to_sql(ctx)?;
                sql.push_str("(\n");
                for line in body.trim_end().lines() {
                    sql.push_str("    ");
                    sql.push_str(line);
                    sql.push('\n');
                }
                sql.push(')');
            }
            CteBody::RawSql(raw) => {
                sql.push('(');
                sql.push_str(raw);
                sql.push(')');
            }
        }
        Ok(sql)
    }
}

impl ToSql for RenderExpr {
    fn to_sql(&self, ctx: &mut RenderContext) -> Result<String, FireboltSqlGeneratorError> {
        match self {
            RenderExpr::Literal(value) => Ok(render_literal(value)),
            RenderExpr::Raw(text) => Ok(text.clone()),
            RenderExpr::Star => Ok("*".to_string()),
            RenderExpr::Column(c) => Ok(conv_identifier(&c.name)),
            RenderExpr::QualifiedColumn(c) => Ok(format!(
                "{}.{}",
                conv_identifier(&c.table_alias),
                conv_identifier(&c.column)
            )),
            RenderExpr::Parameter(p) => Ok(ctx.bind(p)),
            RenderExpr::Binary(b) => {
                if b.op.is_comparison() && b.rhs.ty().base() == &SqlType::Uuid {
                    return uuid_comparison_sql(b, ctx);
                }
                match b.op.token() {
                    Some(token) => Ok(format!(
                        "({} {token} {})",
                        b.lhs.to_sql(ctx)?,
                        b.rhs.to_sql(ctx)?
                    )),
                    // Coalesce is the one binary op with no infix spelling.
                    None => Ok(format!(
                        "COALESCE({}, {})",
                        b.lhs.to_sql(ctx)?,
                        b.rhs.to_sql(ctx)?
                    )),
                }
            }
            RenderExpr::Unary(u) => {
                let operand = u.operand.to_sql(ctx)?;
                match u.op {
                    crate::render_plan::UnaryOp::Not => Ok(format!("NOT ({operand})")),
                    crate::render_plan::UnaryOp::Negate => Ok(format!("-{operand}")),
                }
            }
            RenderExpr::Cast(c) => Ok(format!(
                "Cast({} as {})",
                c.expr.to_sql(ctx)?,
                firebolt_type_name(&c.ty)
            )),
            RenderExpr::FnCall(f) => fn_call_sql(f, ctx),
            RenderExpr::Template(t) => template_sql(t, ctx),
            RenderExpr::Conditional(c) => Ok(format!(
                "IF({}, {}, {})",
                c.test.to_sql(ctx)?,
                c.if_true.to_sql(ctx)?,
                c.if_false.to_sql(ctx)?
            )),
            RenderExpr::Lambda(_) => Err(FireboltSqlGeneratorError::MisplacedLambda),
        }
    }
}

/// The server compares uuid text case-sensitively, but uuids arrive in mixed
/// case from clients. Comparisons fold the column side with LOWER and force
/// quoting on the value side.
fn uuid_comparison_sql(
    b: &crate::render_plan::BinaryExpr,
    ctx: &mut RenderContext,
) -> Result<String, FireboltSqlGeneratorError> {
    let lhs = b.lhs.to_sql(ctx)?;
    let lhs = if b.lhs.ty().base() == &SqlType::Uuid
        && !matches!(b.lhs.as_ref(), RenderExpr::Parameter(_))
    {
        format!("LOWER({lhs})")
    } else {
        lhs
    };

    let rhs = b.rhs.to_sql(ctx)?;
    let rhs = if rhs.starts_with('\'') || matches!(b.rhs.as_ref(), RenderExpr::Parameter(_)) {
        rhs
    } else {
        format!("'{rhs}'")
    };

    let token = b.op.token().ok_or_else(|| {
        FireboltSqlGeneratorError::UnsupportedExpression("comparison without token".to_string())
    })?;
    Ok(format!("({lhs} {token} {rhs})"))
}

fn fn_call_sql(
    f: &crate::render_plan::FnCall,
    ctx: &mut RenderContext,
) -> Result<String, FireboltSqlGeneratorError> {
    let mapping = get_function_mapping(&f.name);
    let name = match &mapping {
        Some(m) => m.firebolt_name.to_string(),
        None => {
            log::debug!("no registry mapping for function '{}', passing through", f.name);
            f.name.clone()
        }
    };

    let lambda_count = f
        .args
        .iter()
        .filter(|arg| matches!(arg, RenderExpr::Lambda(_)))
        .count();
    if lambda_count > 1 {
        return Err(FireboltSqlGeneratorError::MultipleLambdaArguments(
            f.name.clone(),
        ));
    }

    if lambda_count == 1 {
        // Higher-order call: the lambda renders first, then the array
        // arguments in plan order.
        let expected = mapping.as_ref().and_then(|m| m.lambda_result.as_ref());
        let mut rendered = Vec::with_capacity(f.args.len());
        for arg in &f.args {
            if let RenderExpr::Lambda(lambda) = arg {
                rendered.insert(0, build_lambda(lambda, expected)?);
            } else {
                rendered.push(arg.to_sql(ctx)?);
            }
        }
        return Ok(format!("{name}({})", rendered.join(", ")));
    }

    let mut rendered = Vec::with_capacity(f.args.len());
    for arg in &f.args {
        rendered.push(arg.to_sql(ctx)?);
    }
    Ok(format!("{name}({})", rendered.join(", ")))
}

/// Substitute `{0}`-style holes with rendered arguments. A hole with no
/// matching argument is fatal; stray braces without a digit index pass
/// through verbatim.
fn template_sql(
    t: &crate::render_plan::Template,
    ctx: &mut RenderContext,
) -> Result<String, FireboltSqlGeneratorError> {
    let mut rendered_args = Vec::with_capacity(t.args.len());
    for arg in &t.args {
        rendered_args.push(arg.to_sql(ctx)?);
    }

    let mut out = String::with_capacity(t.format.len());
    let mut chars = t.format.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let rest = &t.format[i + 1..];
        let digits: String = rest.chars().take_while(|ch| ch.is_ascii_digit()).collect();
        if digits.is_empty() || !rest[digits.len()..].starts_with('}') {
            out.push(c);
            continue;
        }
        let index: usize = digits.parse().unwrap_or(usize::MAX);
        let arg = rendered_args
            .get(index)
            .ok_or(FireboltSqlGeneratorError::TemplateArgumentMissing(index))?;
        out.push_str(arg);
        for _ in 0..digits.len() + 1 {
            chars.next();
        }
    }
    Ok(out)
}
