//! Portable-name to Firebolt function mapping table.
//!
//! Pure data: each entry maps a portable function name to its Firebolt
//! spelling and, for higher-order array functions, the result type the
//! embedded lambda is expected to declare. The renderer consults this table;
//! names with no entry pass through unchanged.
//!
//! Lookup is exact-match. Portable names are lower_snake_case by contract,
//! while the rewriter emits calls already in their final dialect spelling
//! (`Mod`, `Substring`, `Length`, `Floor`); a case-folding lookup would
//! remap those and break the dialect constants.

use std::collections::HashMap;

use crate::render_plan::SqlType;

#[derive(Clone)]
pub struct FunctionMapping {
    pub firebolt_name: &'static str,
    /// Expected lambda result type for higher-order functions; `None` means
    /// the lambda result is unconstrained (or the function takes no lambda).
    pub lambda_result: Option<SqlType>,
}

/// Look up a mapping by portable name (exact match).
pub fn get_function_mapping(name: &str) -> Option<FunctionMapping> {
    FUNCTION_MAPPINGS.get(name).cloned()
}

lazy_static::lazy_static! {
    static ref FUNCTION_MAPPINGS: HashMap<&'static str, FunctionMapping> = {
        let mut m = HashMap::new();

        // ===== HIGHER-ORDER ARRAY FUNCTIONS =====
        // Predicate-style functions require a boolean-returning lambda;
        // key-extraction and transform functions accept any result type.

        m.insert("array_sort", FunctionMapping {
            firebolt_name: "ARRAY_SORT",
            lambda_result: None,
        });
        m.insert("array_reverse_sort", FunctionMapping {
            firebolt_name: "ARRAY_REVERSE_SORT",
            lambda_result: None,
        });
        m.insert("array_transform", FunctionMapping {
            firebolt_name: "ARRAY_TRANSFORM",
            lambda_result: None,
        });
        m.insert("array_filter", FunctionMapping {
            firebolt_name: "ARRAY_FILTER",
            lambda_result: Some(SqlType::Bool),
        });
        m.insert("array_count", FunctionMapping {
            firebolt_name: "ARRAY_COUNT",
            lambda_result: Some(SqlType::Bool),
        });
        m.insert("array_any_match", FunctionMapping {
            firebolt_name: "ARRAY_ANY_MATCH",
            lambda_result: Some(SqlType::Bool),
        });

        // ===== SCALAR FUNCTIONS =====

        m.insert("regexp_like", FunctionMapping {
            firebolt_name: "REGEXP_LIKE",
            lambda_result: None,
        });
        m.insert("regexp_like_any", FunctionMapping {
            firebolt_name: "REGEXP_LIKE_ANY",
            lambda_result: None,
        });
        m.insert("length", FunctionMapping {
            firebolt_name: "LENGTH",
            lambda_result: None,
        });
        m.insert("lower", FunctionMapping {
            firebolt_name: "LOWER",
            lambda_result: None,
        });
        m.insert("upper", FunctionMapping {
            firebolt_name: "UPPER",
            lambda_result: None,
        });
        m.insert("array_intersect", FunctionMapping {
            firebolt_name: "ARRAY_INTERSECT",
            lambda_result: None,
        });
        m.insert("array_agg", FunctionMapping {
            firebolt_name: "ARRAY_AGG",
            lambda_result: None,
        });

        m
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_matches_portable_names_exactly() {
        assert_eq!(
            get_function_mapping("array_filter").unwrap().firebolt_name,
            "ARRAY_FILTER"
        );
        assert!(get_function_mapping("Array_Filter").is_none());
    }

    #[test]
    fn dialect_spellings_pass_the_registry_untouched() {
        assert!(get_function_mapping("Mod").is_none());
        assert!(get_function_mapping("Substring").is_none());
        assert!(get_function_mapping("Length").is_none());
        assert!(get_function_mapping("Floor").is_none());
    }

    #[test]
    fn predicate_functions_expect_boolean_lambdas() {
        assert_eq!(
            get_function_mapping("array_any_match").unwrap().lambda_result,
            Some(SqlType::Bool)
        );
        assert_eq!(get_function_mapping("array_sort").unwrap().lambda_result, None);
    }

    #[test]
    fn unknown_names_have_no_mapping() {
        assert!(get_function_mapping("no_such_fn").is_none());
    }
}
