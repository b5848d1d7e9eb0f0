//! End-to-end statement rendering through the public `generate_sql` entry.

use firebolt_sqlgen::firebolt_query_generator::FireboltSqlGeneratorError;
use firebolt_sqlgen::generate_sql;
use firebolt_sqlgen::render_plan::{
    BinaryOp, Cte, CteBody, CteItems, FilterItems, FromItem, Join, JoinItems, JoinType,
    LambdaBody, LambdaExpr, LimitItem, OffsetItem, OrderByItem, OrderByItems, OrderByOrder,
    Parameter, RenderExpr, RenderPlan, SelectItem, SelectItems, SqlType, SqlValue, TableRef,
    CTE_MATERIALIZED_SUFFIX,
};
use uuid::Uuid;

fn select(items: Vec<SelectItem>) -> SelectItems {
    SelectItems {
        items,
        distinct: false,
    }
}

fn star() -> SelectItems {
    select(vec![SelectItem::expr(RenderExpr::Star)])
}

#[test]
fn cte_field_lists_wrap_past_three_fields() {
    let plan = RenderPlan {
        ctes: CteItems(vec![
            Cte::new(
                format!("big_totals{CTE_MATERIALIZED_SUFFIX}"),
                vec![
                    "customer_id".to_string(),
                    "order_count".to_string(),
                    "total_amount".to_string(),
                    "first_order".to_string(),
                    "last_order".to_string(),
                ],
                CteBody::RawSql("SELECT 1".to_string()),
            ),
            Cte::new(
                "small",
                vec!["id".to_string(), "n".to_string()],
                CteBody::RawSql("SELECT 2".to_string()),
            ),
        ]),
        select: star(),
        from: FromItem(Some(TableRef::new("small"))),
        ..Default::default()
    };

    let compiled = generate_sql(&plan).unwrap();
    assert_eq!(
        compiled.sql,
        "WITH big_totals (\n\
         \x20   customer_id,\n\
         \x20   order_count,\n\
         \x20   total_amount,\n\
         \x20   first_order,\n\
         \x20   last_order\n\
         ) AS MATERIALIZED (SELECT 1),\n\
         small (id, n) AS (SELECT 2)\n\
         SELECT *\n\
         FROM small"
    );
}

#[test]
fn structured_cte_body_renders_indented() {
    let inner = RenderPlan {
        select: select(vec![SelectItem::aliased(
            RenderExpr::column("id", SqlType::Long),
            "user_id",
        )]),
        from: FromItem(Some(TableRef::new("users"))),
        ..Default::default()
    };
    let plan = RenderPlan {
        ctes: CteItems(vec![Cte::new(
            "ids",
            vec![],
            CteBody::Structured(Box::new(inner)),
        )]),
        select: star(),
        from: FromItem(Some(TableRef::new("ids"))),
        ..Default::default()
    };

    let compiled = generate_sql(&plan).unwrap();
    assert_eq!(
        compiled.sql,
        "WITH ids AS (\n\
         \x20   SELECT id AS user_id\n\
         \x20   FROM users\n\
         )\n\
         SELECT *\n\
         FROM ids"
    );
}

#[test]
fn recursive_cte_emits_the_recursive_keyword() {
    let plan = RenderPlan {
        ctes: CteItems(vec![Cte::new(
            "chain",
            vec![],
            CteBody::RawSql("SELECT 1".to_string()),
        )
        .recursive()]),
        select: star(),
        from: FromItem(Some(TableRef::new("chain"))),
        ..Default::default()
    };
    let compiled = generate_sql(&plan).unwrap();
    assert!(compiled.sql.starts_with("WITH RECURSIVE chain AS (SELECT 1)"));
}

#[test]
fn dialect_rewrites_flow_through_a_whole_statement() {
    let plan = RenderPlan {
        select: select(vec![
            SelectItem::aliased(
                RenderExpr::binary(
                    BinaryOp::Modulo,
                    RenderExpr::column("score", SqlType::Double),
                    RenderExpr::int(7),
                    SqlType::Double,
                ),
                "bucket",
            ),
            SelectItem::aliased(
                RenderExpr::binary(
                    BinaryOp::Power,
                    RenderExpr::column("base", SqlType::Double),
                    RenderExpr::int(2),
                    SqlType::Double,
                ),
                "squared",
            ),
            SelectItem::aliased(
                RenderExpr::binary(
                    BinaryOp::Add,
                    RenderExpr::column("first_name", SqlType::Text),
                    RenderExpr::column("last_name", SqlType::Text),
                    SqlType::Text,
                ),
                "full_name",
            ),
        ]),
        from: FromItem(Some(TableRef::new("players"))),
        ..Default::default()
    };

    let compiled = generate_sql(&plan).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT Mod(score::BIGINT, 7) AS bucket, (base # 2) AS squared, (first_name || last_name) AS full_name\n\
         FROM players"
    );
}

#[test]
fn char_index_with_offset_decomposes_end_to_end() {
    let plan = RenderPlan {
        select: select(vec![SelectItem::expr(RenderExpr::fn_call(
            "CharIndex",
            vec![
                RenderExpr::Literal(SqlValue::Text("x".to_string())),
                RenderExpr::column("body", SqlType::Text),
                RenderExpr::int(5),
            ],
            SqlType::Int,
        ))]),
        from: FromItem(Some(TableRef::new("posts"))),
        ..Default::default()
    };

    let compiled = generate_sql(&plan).unwrap();
    // The decomposition keeps its dialect spellings verbatim; a case-folding
    // registry lookup would turn Length into LENGTH here.
    assert_eq!(
        compiled.sql,
        "SELECT (Position('x' in Substring(body, 5, (Length(body) - 5))) + (5 - 1))\n\
         FROM posts"
    );
}

#[test]
fn uuid_predicate_lowers_and_quotes() {
    let u = Uuid::parse_str("F0E1D2C3-B4A5-9687-7869-5A4B3C2D1E0F").unwrap();
    let plan = RenderPlan {
        select: star(),
        from: FromItem(Some(TableRef::aliased("sessions", "s"))),
        filters: FilterItems(Some(RenderExpr::binary(
            BinaryOp::Eq,
            RenderExpr::qualified("s", "session_id", SqlType::Uuid),
            RenderExpr::Literal(SqlValue::Uuid(u)),
            SqlType::Bool,
        ))),
        ..Default::default()
    };

    let compiled = generate_sql(&plan).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT *\n\
         FROM sessions AS s\n\
         WHERE (LOWER(s.session_id) = 'f0e1d2c3-b4a5-9687-7869-5a4b3c2d1e0f')"
    );
}

#[test]
fn higher_order_functions_compile_their_lambdas() {
    let lambda = LambdaExpr::new(
        vec!["price".to_string()],
        LambdaBody::Binary {
            op: BinaryOp::Lt,
            lhs: Box::new(LambdaBody::Param("price".to_string())),
            rhs: Box::new(LambdaBody::Literal(SqlValue::Int(10))),
        },
        SqlType::Bool,
    );
    let plan = RenderPlan {
        select: select(vec![
            SelectItem::aliased(RenderExpr::column("order_id", SqlType::Long), "order_id"),
            SelectItem::aliased(
                RenderExpr::fn_call(
                    "array_count",
                    vec![
                        RenderExpr::column("prices", SqlType::Array(Box::new(SqlType::Double))),
                        RenderExpr::Lambda(lambda),
                    ],
                    SqlType::Long,
                ),
                "cheap_stuff",
            ),
        ]),
        from: FromItem(Some(TableRef::new("order_totals"))),
        order_by: OrderByItems(vec![OrderByItem {
            expression: RenderExpr::column("cheap_stuff", SqlType::Long),
            order: OrderByOrder::Desc,
        }]),
        ..Default::default()
    };

    let compiled = generate_sql(&plan).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT order_id AS order_id, ARRAY_COUNT(price -> (price < 10), prices) AS cheap_stuff\n\
         FROM order_totals\n\
         ORDER BY cheap_stuff DESC"
    );
}

#[test]
fn parameters_are_collected_in_order_of_first_use() {
    let min = Parameter {
        name: "min_total".to_string(),
        value: SqlValue::Decimal("100.00".to_string()),
        ty: SqlType::Decimal,
    };
    let country = Parameter {
        name: "country".to_string(),
        value: SqlValue::Text("NO".to_string()),
        ty: SqlType::Text,
    };
    let plan = RenderPlan {
        select: star(),
        from: FromItem(Some(TableRef::new("orders"))),
        filters: FilterItems(Some(RenderExpr::binary(
            BinaryOp::And,
            RenderExpr::binary(
                BinaryOp::GtEq,
                RenderExpr::column("total", SqlType::Decimal),
                RenderExpr::Parameter(min),
                SqlType::Bool,
            ),
            RenderExpr::binary(
                BinaryOp::Eq,
                RenderExpr::column("country", SqlType::Text),
                RenderExpr::Parameter(country),
                SqlType::Bool,
            ),
            SqlType::Bool,
        ))),
        limit: LimitItem(Some(50)),
        offset: OffsetItem(Some(100)),
        ..Default::default()
    };

    let compiled = generate_sql(&plan).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT *\n\
         FROM orders\n\
         WHERE ((total >= @min_total) AND (country = @country))\n\
         LIMIT 50\n\
         OFFSET 100"
    );
    let names: Vec<&str> = compiled
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["min_total", "country"]);
    assert_eq!(compiled.parameters[0].echo_sql(), "100.00");
    assert_eq!(compiled.parameters[1].echo_sql(), "'NO'");
}

#[test]
fn cross_join_with_condition_aborts_the_statement() {
    let plan = RenderPlan {
        select: star(),
        from: FromItem(Some(TableRef::new("a"))),
        joins: JoinItems(vec![Join {
            table: TableRef::new("b"),
            join_type: JoinType::Cross,
            on: vec![RenderExpr::int(1)],
        }]),
        ..Default::default()
    };
    assert_eq!(
        generate_sql(&plan),
        Err(FireboltSqlGeneratorError::CrossJoinWithCondition)
    );
}

#[test]
fn plans_round_trip_through_serde() {
    let plan = RenderPlan {
        select: select(vec![SelectItem::aliased(
            RenderExpr::column("id", SqlType::Long),
            "id",
        )]),
        from: FromItem(Some(TableRef::aliased("users", "u"))),
        filters: FilterItems(Some(RenderExpr::binary(
            BinaryOp::Gt,
            RenderExpr::qualified("u", "age", SqlType::Long),
            RenderExpr::int(18),
            SqlType::Bool,
        ))),
        ..Default::default()
    };

    let json = serde_json::to_string(&plan).unwrap();
    let restored: RenderPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, plan);
    assert_eq!(
        generate_sql(&restored).unwrap().sql,
        generate_sql(&plan).unwrap().sql
    );
}
