//! Literal and identifier rendering for the Firebolt dialect.
//!
//! Pure functions plus two build-once lookup tables (reserved words, type
//! names). The tables are immutable after initialization, so concurrent
//! renders share them without locking.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::render_plan::{SqlType, SqlValue};

/// Firebolt reserved words. An identifier matching one of these must be
/// double-quoted even when it is otherwise lower_snake_case.
static RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "all",
        "alter",
        "and",
        "array",
        "between",
        "bigint",
        "bool",
        "boolean",
        "both",
        "case",
        "cast",
        "char",
        "concat",
        "copy",
        "create",
        "cross",
        "current_date",
        "current_timestamp",
        "database",
        "date",
        "datetime",
        "decimal",
        "delete",
        "describe",
        "distinct",
        "double",
        "drop",
        "except",
        "execute",
        "exists",
        "explain",
        "extract",
        "false",
        "fetch",
        "first",
        "float",
        "from",
        "full",
        "generate",
        "group",
        "having",
        "if",
        "ilike",
        "in",
        "inner",
        "insert",
        "int",
        "integer",
        "intersect",
        "interval",
        "is",
        "isnull",
        "join",
        "leading",
        "left",
        "like",
        "limit",
        "localtimestamp",
        "long",
        "natural",
        "next",
        "not",
        "null",
        "numeric",
        "offset",
        "on",
        "only",
        "or",
        "order",
        "outer",
        "over",
        "partition",
        "precision",
        "prepare",
        "primary",
        "right",
        "row",
        "rows",
        "sample",
        "select",
        "set",
        "show",
        "text",
        "time",
        "timestamp",
        "trailing",
        "trim",
        "true",
        "truncate",
        "union",
        "unnest",
        "update",
        "using",
        "varchar",
        "when",
        "where",
        "with",
    ])
});

/// Whether `name` can be emitted without quoting: non-empty, not reserved,
/// starts with a letter, and is lower_snake_case throughout.
pub fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && !RESERVED_WORDS.contains(name)
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Quote an identifier when [`is_safe_identifier`] rejects it; the quoted
/// form wraps the name verbatim in double quotes. Applies identically to
/// table, column, alias, schema, sequence and trigger names.
pub fn conv_identifier(name: &str) -> String {
    if is_safe_identifier(name) {
        name.to_string()
    } else {
        format!("\"{name}\"")
    }
}

/// Firebolt spelling for a declared type. Nullable wrappers are transparent;
/// the dialect has no nullability modifier in type names.
pub fn firebolt_type_name(ty: &SqlType) -> String {
    match ty.base() {
        SqlType::Bool => "BOOLEAN".to_string(),
        SqlType::Int => "INT".to_string(),
        SqlType::Long => "LONG".to_string(),
        SqlType::Float => "FLOAT".to_string(),
        SqlType::Double => "DOUBLE".to_string(),
        SqlType::Decimal => "DECIMAL".to_string(),
        SqlType::Text => "TEXT".to_string(),
        SqlType::Date => "DATE".to_string(),
        SqlType::Timestamp => "TIMESTAMP".to_string(),
        SqlType::Uuid => "TEXT".to_string(),
        SqlType::Array(inner) => format!("ARRAY({})", firebolt_type_name(inner)),
        SqlType::Nullable(_) => unreachable!("base() strips Nullable"),
    }
}

/// Render a value as a Firebolt literal. Locale-invariant; strings escape
/// embedded single quotes by doubling them; uuids render as bare folded text
/// because the dialect has no uuid literal syntax (the comparison workaround
/// in the query compiler supplies quotes where needed).
pub fn render_literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(b) => {
            if *b {
                "True".to_string()
            } else {
                "False".to_string()
            }
        }
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Float(f) => format_float(*f),
        SqlValue::Decimal(digits) => digits.clone(),
        SqlValue::Text(s) => format!("'{}'", escape_quotes(s)),
        SqlValue::Date(d) => format!("'{d}'"),
        SqlValue::Timestamp(ts) => format!("'{ts}'"),
        SqlValue::Uuid(u) => u.to_string(),
        SqlValue::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render_literal).collect();
            format!("[{}]", rendered.join(","))
        }
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\'', "''")
}

/// Shortest round-trip fixed notation with at least one decimal digit so the
/// value reads as floating-point on the server side. `f64`'s `Display` never
/// produces scientific notation, so extreme magnitudes expand to their full
/// digit string. Non-finite values have no Firebolt literal and pass through
/// verbatim; keeping them out of plans is the producer's contract.
fn format_float(f: f64) -> String {
    let s = f.to_string();
    if s.contains('.') || !f.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn safe_identifiers() {
        assert!(is_safe_identifier("users"));
        assert!(is_safe_identifier("a1_b2"));
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier("date")); // reserved
        assert!(!is_safe_identifier("_leading"));
        assert!(!is_safe_identifier("MixedCase"));
        assert!(!is_safe_identifier("UPPER"));
        assert!(!is_safe_identifier("1starts_with_digit"));
        assert!(!is_safe_identifier("has space"));
    }

    #[test]
    fn unsafe_identifiers_are_quoted_verbatim() {
        assert_eq!(conv_identifier("users"), "users");
        assert_eq!(conv_identifier("Date"), "\"Date\"");
        assert_eq!(conv_identifier("date"), "\"date\"");
        assert_eq!(conv_identifier("_x"), "\"_x\"");
    }

    #[test]
    fn float_literals_keep_one_decimal_digit() {
        assert_eq!(render_literal(&SqlValue::Float(1.0)), "1.0");
        assert_eq!(render_literal(&SqlValue::Float(0.25)), "0.25");
        assert_eq!(render_literal(&SqlValue::Float(-3.0)), "-3.0");
        assert_eq!(render_literal(&SqlValue::Float(1.5)), "1.5");
    }

    #[test]
    fn extreme_float_magnitudes_stay_in_fixed_notation() {
        assert_eq!(
            render_literal(&SqlValue::Float(1e300)),
            format!("1{}.0", "0".repeat(300))
        );
        assert_eq!(render_literal(&SqlValue::Float(1e-7)), "0.0000001");
    }

    #[test]
    fn non_finite_floats_pass_through_verbatim() {
        assert_eq!(render_literal(&SqlValue::Float(f64::INFINITY)), "inf");
        assert_eq!(render_literal(&SqlValue::Float(f64::NEG_INFINITY)), "-inf");
        assert_eq!(render_literal(&SqlValue::Float(f64::NAN)), "NaN");
    }

    #[test]
    fn string_literal_escaping_round_trips() {
        let original = "O'Brien's 'data'";
        let rendered = render_literal(&SqlValue::Text(original.to_string()));
        assert_eq!(rendered, "'O''Brien''s ''data'''");
        let stripped = &rendered[1..rendered.len() - 1];
        assert_eq!(stripped.replace("''", "'"), original);
    }

    #[test]
    fn booleans_render_as_capitalized_words() {
        assert_eq!(render_literal(&SqlValue::Bool(true)), "True");
        assert_eq!(render_literal(&SqlValue::Bool(false)), "False");
    }

    #[test]
    fn arrays_render_bracketed_with_bare_null() {
        let v = SqlValue::Array(vec![
            SqlValue::Int(1),
            SqlValue::Null,
            SqlValue::Text("a'b".to_string()),
        ]);
        assert_eq!(render_literal(&v), "[1,NULL,'a''b']");
    }

    #[test]
    fn date_and_timestamp_literals_are_quoted() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(render_literal(&SqlValue::Date(d)), "'2024-03-09'");
        let ts = d.and_hms_opt(13, 30, 5).unwrap();
        assert_eq!(
            render_literal(&SqlValue::Timestamp(ts)),
            "'2024-03-09 13:30:05'"
        );
    }

    #[test]
    fn uuid_literal_is_bare_folded_text() {
        let u = Uuid::parse_str("A1A2A3A4-B1B2-C1C2-D1D2-D3D4D5D6D7D8").unwrap();
        assert_eq!(
            render_literal(&SqlValue::Uuid(u)),
            "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8"
        );
    }

    #[test]
    fn type_names_match_the_dialect() {
        assert_eq!(firebolt_type_name(&SqlType::Long), "LONG");
        assert_eq!(firebolt_type_name(&SqlType::Decimal), "DECIMAL");
        assert_eq!(
            firebolt_type_name(&SqlType::Nullable(Box::new(SqlType::Double))),
            "DOUBLE"
        );
        assert_eq!(
            firebolt_type_name(&SqlType::Array(Box::new(SqlType::Text))),
            "ARRAY(TEXT)"
        );
    }
}
