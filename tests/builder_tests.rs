use palisade::builder::SafeQueryBuilder;
use palisade::driver::SqlValue;
use palisade::error::BuilderError;
use palisade::guard::validate_statement;

#[test]
fn worked_example_from_the_model_layer() {
    let query = SafeQueryBuilder::new()
        .select(&["id", "title"])
        .unwrap()
        .from("ads")
        .unwrap()
        .where_clause("state", "=", "SP")
        .unwrap()
        .limit(10)
        .unwrap()
        .build();

    assert_eq!(
        query.text,
        "SELECT id, title FROM ads WHERE state = $1 LIMIT $2"
    );
    assert_eq!(
        query.values,
        vec![SqlValue::Text("SP".to_string()), SqlValue::Int(10)]
    );
}

#[test]
fn built_queries_always_pass_the_guard_validator() {
    // Representative legal chains; every one must satisfy the guard's
    // contiguous-placeholder invariant untouched
    let chains: Vec<palisade::builder::BuiltQuery> = vec![
        SafeQueryBuilder::new().from("ads").unwrap().build(),
        SafeQueryBuilder::new()
            .select(&["id"])
            .unwrap()
            .from("users")
            .unwrap()
            .where_clause("email", "=", "a@b.c")
            .unwrap()
            .build(),
        SafeQueryBuilder::new()
            .from("ads")
            .unwrap()
            .where_clause("price", ">=", 100i64)
            .unwrap()
            .where_clause("price", "<=", 500i64)
            .unwrap()
            .order_by("price", "asc")
            .unwrap()
            .limit(25)
            .unwrap()
            .offset(50)
            .unwrap()
            .build(),
        SafeQueryBuilder::new()
            .from("favorites")
            .unwrap()
            .where_clause("user_id", "=", 7i64)
            .unwrap()
            .where_clause(
                "ad_id",
                "IN",
                vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)],
            )
            .unwrap()
            .build(),
        SafeQueryBuilder::new()
            .from("comments")
            .unwrap()
            .where_clause("deleted_at", "=", SqlValue::Null)
            .unwrap()
            .where_clause("body", "ILIKE", "%bike%")
            .unwrap()
            .build(),
    ];

    for query in chains {
        assert!(
            validate_statement(&query.text, query.values.len()).is_ok(),
            "guard rejected builder output: {}",
            query.text
        );
    }
}

#[test]
fn multiple_conditions_join_with_and() {
    let query = SafeQueryBuilder::new()
        .from("ads")
        .unwrap()
        .where_clause("state", "=", "SP")
        .unwrap()
        .where_clause("category", "=", "bikes")
        .unwrap()
        .build();

    assert_eq!(
        query.text,
        "SELECT * FROM ads WHERE state = $1 AND category = $2"
    );
    assert_eq!(query.values.len(), 2);
}

#[test]
fn order_by_accepts_both_directions_case_insensitively() {
    let query = SafeQueryBuilder::new()
        .from("ads")
        .unwrap()
        .order_by("created_at", "desc")
        .unwrap()
        .order_by("id", "ASC")
        .unwrap()
        .build();

    assert_eq!(query.text, "SELECT * FROM ads ORDER BY created_at DESC, id ASC");
}

#[test]
fn operator_whitelist_is_enforced() {
    let err = SafeQueryBuilder::new()
        .from("ads")
        .unwrap()
        .where_clause("state", "= OR 1=1 --", "SP")
        .unwrap_err();
    assert!(matches!(err, BuilderError::InvalidOperator(_)));

    // IN without a list value is also a call-site error
    let err = SafeQueryBuilder::new()
        .from("ads")
        .unwrap()
        .where_clause("state", "IN", "SP")
        .unwrap_err();
    assert!(matches!(err, BuilderError::InvalidOperator(_)));
}

#[test]
fn injection_shaped_identifiers_are_rejected() {
    assert!(SafeQueryBuilder::new().select(&["id, password FROM users"]).is_err());
    assert!(SafeQueryBuilder::new().from("ads; DELETE FROM ads").is_err());
    assert!(SafeQueryBuilder::new()
        .from("ads")
        .unwrap()
        .where_clause("state'--", "=", "SP")
        .is_err());
}
