//! Inline lambda compiler for higher-order array functions.
//!
//! Firebolt lambdas are plain text of the form `param -> expr` (or
//! `a, b -> expr` for multi-parameter lambdas). The body grammar is tiny and
//! closed; anything outside the operator and method whitelists is a fatal
//! error rather than a silent passthrough, since emitting a guessed spelling
//! would produce SQL that fails server-side with a worse message.

use crate::render_plan::{BinaryOp, LambdaBody, LambdaExpr, SqlType, SqlValue};

use super::errors::FireboltSqlGeneratorError;
use super::literal::firebolt_type_name;

/// Compile a lambda to its inline text form. `expected` is the result type
/// the calling function requires; it is enforced only for single-parameter
/// lambdas (multi-parameter bodies have no reliable declared type upstream).
pub fn build_lambda(
    lambda: &LambdaExpr,
    expected: Option<&SqlType>,
) -> Result<String, FireboltSqlGeneratorError> {
    if lambda.params.is_empty() {
        return Err(FireboltSqlGeneratorError::EmptyLambdaParameters);
    }
    if let Some(expected) = expected {
        if lambda.params.len() == 1 && lambda.return_type != *expected {
            return Err(FireboltSqlGeneratorError::LambdaTypeMismatch {
                expected: expected.clone(),
                actual: lambda.return_type.clone(),
            });
        }
    }

    let mut out = lambda.params.join(", ");
    out.push_str(" -> ");
    write_body(&lambda.body, &mut out)?;
    Ok(out)
}

fn write_body(body: &LambdaBody, out: &mut String) -> Result<(), FireboltSqlGeneratorError> {
    match body {
        LambdaBody::Conditional {
            test,
            if_true,
            if_false,
        } => {
            out.push_str("IF(");
            write_body(test, out)?;
            out.push(',');
            write_body(if_true, out)?;
            out.push(',');
            write_body(if_false, out)?;
            out.push(')');
        }
        LambdaBody::Negate(operand) => {
            out.push('-');
            write_body(operand, out)?;
        }
        LambdaBody::Coerce { expr, ty } => {
            write_body(expr, out)?;
            // Coercion to a nullable type carries no information the server
            // needs; only concrete targets get a suffix.
            if !matches!(ty, SqlType::Nullable(_)) {
                out.push_str("::");
                out.push_str(&firebolt_type_name(ty));
            }
        }
        LambdaBody::Binary { op, lhs, rhs } => match op {
            BinaryOp::Coalesce => {
                out.push_str("COALESCE(");
                write_body(lhs, out)?;
                out.push_str(", ");
                write_body(rhs, out)?;
                out.push(')');
            }
            other => {
                let token = lambda_operator(*other)?;
                out.push('(');
                write_body(lhs, out)?;
                out.push(' ');
                out.push_str(token);
                out.push(' ');
                write_body(rhs, out)?;
                out.push(')');
            }
        },
        LambdaBody::Member(name) | LambdaBody::Param(name) => out.push_str(name),
        LambdaBody::Literal(value) => write_constant(value, out),
        LambdaBody::MethodCall { name, args } => {
            let sql_name = method_name(name)?;
            if !sql_name.is_empty() {
                out.push_str(sql_name);
                out.push('(');
            }
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_body(arg, out)?;
            }
            if !sql_name.is_empty() {
                out.push(')');
            }
        }
    }
    Ok(())
}

/// Operators legal inside a lambda body. Arithmetic beyond `%` is expressed
/// upstream through methods or negation, so it is rejected here.
fn lambda_operator(op: BinaryOp) -> Result<&'static str, FireboltSqlGeneratorError> {
    match op {
        BinaryOp::Gt => Ok(">"),
        BinaryOp::GtEq => Ok(">="),
        BinaryOp::Lt => Ok("<"),
        BinaryOp::LtEq => Ok("<="),
        BinaryOp::Eq => Ok("="),
        BinaryOp::NotEq => Ok("!="),
        BinaryOp::Modulo => Ok("%"),
        other => Err(FireboltSqlGeneratorError::UnsupportedLambdaOperator(
            format!("{other:?}"),
        )),
    }
}

fn method_name(name: &str) -> Result<&'static str, FireboltSqlGeneratorError> {
    match name {
        // Null-forgiving accessor; vanishes in SQL where every value is
        // already a plain column value.
        "ToNotNull" => Ok(""),
        "Length" => Ok("LENGTH"),
        "IsMatch" => Ok("REGEXP_LIKE"),
        other => Err(FireboltSqlGeneratorError::UnsupportedLambdaMethod(
            other.to_string(),
        )),
    }
}

/// Constant rendering inside lambda bodies. Textual values are wrapped in
/// single quotes with no escaping of embedded quotes; lambda constants come
/// from compile-time expression trees, not user input.
fn write_constant(value: &SqlValue, out: &mut String) {
    match value {
        SqlValue::Null => out.push_str("NULL"),
        SqlValue::Bool(b) => out.push_str(if *b { "True" } else { "False" }),
        SqlValue::Int(i) => out.push_str(&i.to_string()),
        SqlValue::Float(f) => out.push_str(&f.to_string()),
        SqlValue::Decimal(digits) => out.push_str(digits),
        SqlValue::Text(s) => {
            out.push('\'');
            out.push_str(s);
            out.push('\'');
        }
        SqlValue::Date(d) => {
            out.push('\'');
            out.push_str(&d.to_string());
            out.push('\'');
        }
        SqlValue::Timestamp(ts) => {
            out.push('\'');
            out.push_str(&ts.to_string());
            out.push('\'');
        }
        SqlValue::Uuid(u) => {
            out.push('\'');
            out.push_str(&u.to_string());
            out.push('\'');
        }
        SqlValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_constant(item, out);
            }
            out.push(']');
        }
    }
}
