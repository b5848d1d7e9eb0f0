//! Operator/function dialect rewriter.
//!
//! A single bottom-up pass over the expression layer: children are rewritten
//! first, then the parent is matched against the rule table. Unmatched
//! shapes pass through with their (already rewritten) children substituted —
//! the rewriter itself never fails; invalid input is the plan producer's
//! problem.
//!
//! The pass is single-shot, not run to a fixed point. Re-applying it to its
//! own output is a no-op for the `%`, `^` and textual-`+` rules; the
//! three-argument CharIndex decomposition is excluded from that guarantee
//! (its nested Length/Substring calls are routed back through the pass at
//! decomposition time instead).

use crate::render_plan::{
    BinaryExpr, BinaryOp, CastExpr, ConditionalExpr, Cte, CteBody, FnCall, OrderByItem,
    RenderExpr, RenderPlan, SelectItem, SqlType, Template, UnaryExpr,
};

use super::literal::firebolt_type_name;

/// Run the dialect pass over every expression position in a plan, CTE bodies
/// included.
pub fn rewrite_plan(plan: &RenderPlan) -> RenderPlan {
    RenderPlan {
        ctes: crate::render_plan::CteItems(plan.ctes.0.iter().map(rewrite_cte).collect()),
        select: crate::render_plan::SelectItems {
            items: plan
                .select
                .items
                .iter()
                .map(|item| SelectItem {
                    expression: rewrite(&item.expression),
                    col_alias: item.col_alias.clone(),
                })
                .collect(),
            distinct: plan.select.distinct,
        },
        from: plan.from.clone(),
        joins: crate::render_plan::JoinItems(
            plan.joins
                .0
                .iter()
                .map(|join| crate::render_plan::Join {
                    table: join.table.clone(),
                    join_type: join.join_type,
                    on: join.on.iter().map(rewrite).collect(),
                })
                .collect(),
        ),
        filters: crate::render_plan::FilterItems(plan.filters.0.as_ref().map(rewrite)),
        group_by: crate::render_plan::GroupByExpressions(
            plan.group_by.0.iter().map(rewrite).collect(),
        ),
        having: plan.having.as_ref().map(rewrite),
        order_by: crate::render_plan::OrderByItems(
            plan.order_by
                .0
                .iter()
                .map(|item| OrderByItem {
                    expression: rewrite(&item.expression),
                    order: item.order,
                })
                .collect(),
        ),
        limit: plan.limit.clone(),
        offset: plan.offset.clone(),
    }
}

fn rewrite_cte(cte: &Cte) -> Cte {
    Cte {
        name: cte.name.clone(),
        fields: cte.fields.clone(),
        body: match &cte.body {
            CteBody::Structured(plan) => CteBody::Structured(Box::new(rewrite_plan(plan))),
            CteBody::RawSql(raw) => CteBody::RawSql(raw.clone()),
        },
        recursive: cte.recursive,
        materialized: cte.materialized,
    }
}

/// Apply the Firebolt dialect rules to an expression tree, producing a
/// replacement tree. Input nodes are never mutated.
pub fn rewrite(expr: &RenderExpr) -> RenderExpr {
    let expr = rewrite_children(expr);

    match expr {
        RenderExpr::Binary(b) if b.op == BinaryOp::Modulo => rewrite_modulo(b),
        RenderExpr::Binary(b) if b.op == BinaryOp::Power => RenderExpr::Binary(BinaryExpr {
            op: BinaryOp::HashPower,
            ..b
        }),
        RenderExpr::Binary(b) if b.op == BinaryOp::Add && b.ty.is_textual() => {
            RenderExpr::Binary(BinaryExpr {
                op: BinaryOp::Concat,
                ..b
            })
        }
        RenderExpr::Cast(c) => rewrite_cast(c),
        RenderExpr::FnCall(f) if f.name == "CharIndex" && f.args.len() == 2 => {
            RenderExpr::Template(Template {
                format: "Position({0} in {1})".to_string(),
                args: f.args,
                ty: f.ty,
            })
        }
        RenderExpr::FnCall(f) if f.name == "CharIndex" && f.args.len() == 3 => {
            rewrite_char_index_with_offset(f)
        }
        other => other,
    }
}

/// Rebuild a node with each child rewritten. Lambda bodies are left alone;
/// they compile through a separate path.
fn rewrite_children(expr: &RenderExpr) -> RenderExpr {
    match expr {
        RenderExpr::Binary(b) => RenderExpr::Binary(BinaryExpr {
            op: b.op,
            lhs: Box::new(rewrite(&b.lhs)),
            rhs: Box::new(rewrite(&b.rhs)),
            ty: b.ty.clone(),
        }),
        RenderExpr::Unary(u) => RenderExpr::Unary(UnaryExpr {
            op: u.op,
            operand: Box::new(rewrite(&u.operand)),
            ty: u.ty.clone(),
        }),
        RenderExpr::Cast(c) => RenderExpr::Cast(CastExpr {
            expr: Box::new(rewrite(&c.expr)),
            ty: c.ty.clone(),
        }),
        RenderExpr::FnCall(f) => RenderExpr::FnCall(FnCall {
            name: f.name.clone(),
            args: f.args.iter().map(rewrite).collect(),
            ty: f.ty.clone(),
        }),
        RenderExpr::Template(t) => RenderExpr::Template(Template {
            format: t.format.clone(),
            args: t.args.iter().map(rewrite).collect(),
            ty: t.ty.clone(),
        }),
        RenderExpr::Conditional(c) => RenderExpr::Conditional(ConditionalExpr {
            test: Box::new(rewrite(&c.test)),
            if_true: Box::new(rewrite(&c.if_true)),
            if_false: Box::new(rewrite(&c.if_false)),
            ty: c.ty.clone(),
        }),
        other => other.clone(),
    }
}

/// `a % b` has no operator form in Firebolt; it becomes `Mod(a, b)`, with a
/// `::BIGINT` pre-cast on the left operand when its declared type is not an
/// integer family type.
fn rewrite_modulo(b: BinaryExpr) -> RenderExpr {
    let lhs = if b.lhs.ty().is_integer() {
        *b.lhs
    } else {
        RenderExpr::template("{0}::BIGINT", vec![*b.lhs], SqlType::Long)
    };
    RenderExpr::fn_call("Mod", vec![lhs, *b.rhs], b.ty)
}

fn rewrite_cast(c: CastExpr) -> RenderExpr {
    if c.ty.base() == &SqlType::Bool {
        if let Some(converted) = alternative_convert_to_boolean(&c.expr) {
            return converted;
        }
    }
    explicit_cast(c)
}

/// Boolean coercion without a literal CAST: numeric sources compare against
/// zero. Declines (returns None) for everything else.
fn alternative_convert_to_boolean(expr: &RenderExpr) -> Option<RenderExpr> {
    if expr.ty().is_numeric() {
        Some(RenderExpr::binary(
            BinaryOp::NotEq,
            expr.clone(),
            RenderExpr::int(0),
            SqlType::Bool,
        ))
    } else {
        None
    }
}

fn explicit_cast(c: CastExpr) -> RenderExpr {
    let target = c.ty.clone();
    let value = floor_before_cast(*c.expr, &target);
    RenderExpr::template(
        format!("Cast({{0}} as {})", firebolt_type_name(&target)),
        vec![value],
        target,
    )
}

/// Firebolt truncates toward zero on float-to-int casts; a Floor wrapper
/// keeps the result consistent with integer division semantics.
fn floor_before_cast(expr: RenderExpr, target: &SqlType) -> RenderExpr {
    let source = expr.ty();
    if target.is_integer() && (source.is_floating() || source.base() == &SqlType::Decimal) {
        RenderExpr::fn_call("Floor", vec![expr], target.clone())
    } else {
        expr
    }
}

/// `CharIndex(needle, haystack, offset)` has no direct equivalent; it
/// decomposes into a Position over a Substring that skips the offset, plus
/// `(offset - 1)` to restore 1-based indexing. The nested Length/Substring
/// calls go back through the rewrite pass themselves.
fn rewrite_char_index_with_offset(f: FnCall) -> RenderExpr {
    let [needle, haystack, offset] = match <[RenderExpr; 3]>::try_from(f.args) {
        Ok(args) => args,
        Err(args) => {
            return RenderExpr::FnCall(FnCall {
                name: f.name,
                args,
                ty: f.ty,
            })
        }
    };

    let length = rewrite(&RenderExpr::fn_call(
        "Length",
        vec![haystack.clone()],
        SqlType::Int,
    ));
    let substring = rewrite(&RenderExpr::fn_call(
        "Substring",
        vec![
            haystack,
            offset.clone(),
            RenderExpr::binary(BinaryOp::Subtract, length, offset.clone(), SqlType::Int),
        ],
        SqlType::Text,
    ));
    let position = RenderExpr::template(
        "Position({0} in {1})",
        vec![needle, substring],
        f.ty.clone(),
    );

    RenderExpr::binary(
        BinaryOp::Add,
        position,
        RenderExpr::binary(BinaryOp::Subtract, offset, RenderExpr::int(1), SqlType::Int),
        f.ty,
    )
}
