//! Filter compiler integration tests.
//!
//! These tests compile predicates over the fixture entities with each
//! dialect and check the exact filter text.

mod common;

use chrono::{FixedOffset, NaiveDate, TimeZone};

use common::*;
use odata_queryable::compiler::FilterCompiler;
use odata_queryable::error::CompileError;
use odata_queryable::expr::{ComparisonOp, Expr, Param, Predicate, Value};
use odata_queryable::metadata::{Entity, EntityMetadata, MetadataCache};

fn user_metadata() -> EntityMetadata {
    User::metadata()
}

fn compile_with(
    compiler: &FilterCompiler,
    build: impl FnOnce(&Param) -> Expr,
) -> Result<String, CompileError> {
    compiler.compile(&user_metadata(), &Predicate::build("u", build))
}

fn compile(build: impl FnOnce(&Param) -> Expr) -> Result<String, CompileError> {
    compile_with(&FilterCompiler::odata(), build)
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_end_to_end_example() {
    let filter = compile(|u| u.field("Age").ge(18).and(u.field("Country").eq("US"))).unwrap();
    assert_eq!(filter, "(age ge 18) and (country eq 'US')");
}

#[test]
fn test_every_operator_keyword() {
    let cases = [
        (ComparisonOp::Eq, "age eq 5"),
        (ComparisonOp::Ne, "age ne 5"),
        (ComparisonOp::Gt, "age gt 5"),
        (ComparisonOp::Ge, "age ge 5"),
        (ComparisonOp::Lt, "age lt 5"),
        (ComparisonOp::Le, "age le 5"),
    ];
    for (op, expected) in cases {
        assert_eq!(compile(|u| u.field("Age").compare(op, 5)).unwrap(), expected);
    }
}

#[test]
fn test_operator_inversion_for_every_pair() {
    let ops = [
        ComparisonOp::Eq,
        ComparisonOp::Ne,
        ComparisonOp::Gt,
        ComparisonOp::Ge,
        ComparisonOp::Lt,
        ComparisonOp::Le,
    ];
    for op in ops {
        let mirrored = compile(|u| Expr::constant(5).compare(op, u.field("Age"))).unwrap();
        let direct = compile(|u| u.field("Age").compare(op.inverted(), 5)).unwrap();
        assert_eq!(mirrored, direct, "operator {}", op);
    }
    assert_eq!(
        compile(|u| Expr::constant(5).gt(u.field("Age"))).unwrap(),
        "age lt 5"
    );
}

#[test]
fn test_undeclared_field_uses_identifier() {
    assert_eq!(
        compile(|u| u.field("Nickname").eq("bob")).unwrap(),
        "Nickname eq 'bob'"
    );
}

#[test]
fn test_field_to_field_comparison_is_rejected() {
    let err = compile(|u| u.field("Age").lt(u.field("Score"))).unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedExpression { .. }));
}

#[test]
fn test_null_comparison_is_rejected() {
    let err = compile(|u| u.field("Country").ne(Value::Null)).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnsupportedComparison {
            field: "country".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "null values comparison is not supported: country"
    );
}

#[test]
fn test_unsupported_literal_type() {
    let err = compile(|u| u.field("Tags").eq(Value::bytes(vec![0u8, 1]))).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnsupportedType {
            field: "tags".to_string(),
            type_name: "bytes"
        }
    );
}

#[test]
fn test_string_quotes_are_doubled() {
    assert_eq!(
        compile(|u| u.field("Name").eq("O'Neil")).unwrap(),
        "name eq 'O''Neil'"
    );
}

// ============================================================================
// Logical Operators
// ============================================================================

#[test]
fn test_logical_operands_always_parenthesized() {
    let filter = compile(|u| {
        u.field("Age")
            .lt(13)
            .or(u.field("Age").gt(65))
            .and(u.field("Country").eq("US"))
    })
    .unwrap();
    assert_eq!(filter, "((age lt 13) or (age gt 65)) and (country eq 'US')");
}

#[test]
fn test_not_and_bare_boolean() {
    assert_eq!(compile(|u| !u.field("Active")).unwrap(), "not (active)");
    assert_eq!(
        compile(|u| u.field("Active").and(!u.field("Age").ge(18))).unwrap(),
        "(active) and (not (age ge 18))"
    );
}

// ============================================================================
// Enumerations
// ============================================================================

#[test]
fn test_enum_alias_round_trip() {
    assert_eq!(
        compile(|u| u.field("Status").eq(Value::enumeration("Status", 2))).unwrap(),
        "status eq 'on-hold'"
    );
    assert_eq!(
        compile(|u| u.field("Status").ne(Value::enumeration("Status", 3))).unwrap(),
        "status ne 'Deleted'"
    );
    assert_eq!(
        compile(|u| Expr::constant(Value::enumeration("Status", 1)).eq(u.field("Status"))).unwrap(),
        "status eq 'Active'"
    );
}

#[test]
fn test_enum_through_numeric_conversion() {
    assert_eq!(
        compile(|u| u.field("Status").as_number().eq(2)).unwrap(),
        "status eq 'on-hold'"
    );
}

#[test]
fn test_unknown_enum_member() {
    let err = compile(|u| u.field("Status").eq(42)).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownEnumMember {
            enum_type: "Status".to_string(),
            value: "42".to_string()
        }
    );
}

#[test]
fn test_enum_strings_must_name_a_member() {
    assert_eq!(
        compile(|u| u.field("Status").eq("Suspended")).unwrap(),
        "status eq 'on-hold'"
    );
    assert_eq!(
        compile(|u| u.field("Status").eq("on-hold")).unwrap(),
        "status eq 'on-hold'"
    );

    let err = compile(|u| u.field("Status").eq("garbage")).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownEnumMember {
            enum_type: "Status".to_string(),
            value: "garbage".to_string()
        }
    );
}

// ============================================================================
// Quantifiers
// ============================================================================

#[test]
fn test_literal_collection_quantifiers() {
    let x = Param::new("x");
    let any = compile(|u| Expr::from(vec!["a", "b"]).any(&x, u.field("Tags").eq(&x))).unwrap();
    assert_eq!(any, "(tags eq 'a') or (tags eq 'b')");

    let all = compile(|u| Expr::from(vec!["a", "b"]).all(&x, u.field("Tags").eq(&x))).unwrap();
    assert_eq!(all, "(tags eq 'a') and (tags eq 'b')");
}

#[test]
fn test_empty_collection_is_consistent() {
    let x = Param::new("x");
    let empty = || Expr::from(Vec::<String>::new());

    let first = compile(|u| empty().any(&x, u.field("Tags").eq(&x))).unwrap();
    let second = compile(|u| empty().any(&x, u.field("Tags").eq(&x))).unwrap();
    assert_eq!(first, "(false)");
    assert_eq!(first, second);

    let all = compile(|u| empty().all(&x, u.field("Tags").eq(&x))).unwrap();
    assert_eq!(all, "(true)");
}

#[test]
fn test_literal_collection_from_closure() {
    let x = Param::new("x");
    let allowed = vec!["US".to_string(), "NZ".to_string()];
    let filter = compile(|u| {
        Expr::closure(move |_| Value::from(allowed.clone())).any(&x, u.field("Country").eq(&x))
    })
    .unwrap();
    assert_eq!(filter, "(country eq 'US') or (country eq 'NZ')");
}

#[test]
fn test_closure_reads_element_binding() {
    let x = Param::new("x");
    let filter = compile(|u| {
        Expr::from(vec![1i32, 2]).any(
            &x,
            u.field("Age").gt(Expr::closure(|b| {
                let base = b.get_named("x").and_then(Value::as_i64).unwrap_or(0);
                Value::from(base * 10)
            })),
        )
    })
    .unwrap();
    assert_eq!(filter, "(age gt 10) or (age gt 20)");
}

#[test]
fn test_field_collection_quantifiers() {
    let a = Param::new("a");
    assert_eq!(
        compile(|u| u.field("Addresses").any(&a, a.field("City").eq("Oslo"))).unwrap(),
        "addresses/any(item: item/city eq 'Oslo')"
    );

    let t = Param::new("t");
    assert_eq!(
        compile(|u| u.field("Tags").all(&t, t.expr().ne("spam"))).unwrap(),
        "tags/all(item: item ne 'spam')"
    );
}

#[test]
fn test_field_collection_lambda_can_reference_root() {
    let a = Param::new("a");
    assert_eq!(
        compile(|u| {
            u.field("Addresses")
                .any(&a, a.field("Zip").eq("0150").and(u.field("Country").eq("NO")))
        })
        .unwrap(),
        "addresses/any(item: (item/zip eq '0150') and (country eq 'NO'))"
    );
}

#[test]
fn test_exists_without_predicate() {
    assert_eq!(compile(|u| u.field("Tags").exists()).unwrap(), "tags/any()");
}

#[test]
fn test_nested_field_lambda_is_rejected() {
    let a = Param::new("a");
    let t = Param::new("t");
    let err = compile(|u| {
        u.field("Addresses")
            .any(&a, u.field("Tags").any(&t, t.expr().eq("x")))
    })
    .unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedExpression { .. }));
}

// ============================================================================
// Dialects
// ============================================================================

#[test]
fn test_date_literal_per_dialect() {
    let at = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2021, 6, 1, 12, 0, 0)
        .unwrap();

    let odata = compile_with(&FilterCompiler::odata(), |u| u.field("JoinedAt").ge(at)).unwrap();
    let search = compile_with(&FilterCompiler::search(), |u| u.field("JoinedAt").ge(at)).unwrap();
    let table = compile_with(&FilterCompiler::table(), |u| u.field("JoinedAt").ge(at)).unwrap();

    assert_eq!(odata, "joined_at ge '2021-06-01T12:00:00Z'");
    assert_eq!(search, "joined_at ge 2021-06-01T12:00:00Z");
    assert_eq!(table, "joined_at ge datetime'2021-06-01T12:00:00Z'");
}

#[test]
fn test_local_date_time_renders_as_utc() {
    let naive = NaiveDate::from_ymd_opt(2021, 6, 1)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap();
    assert_eq!(
        compile(|u| u.field("JoinedAt").lt(naive)).unwrap(),
        "joined_at lt '2021-06-01T08:30:00Z'"
    );
}

#[test]
fn test_numeric_literal_per_dialect() {
    let odata = compile_with(&FilterCompiler::odata(), |u| {
        u.field("Score").ge(7i64).and(u.field("Score").lt(9.0f64))
    })
    .unwrap();
    let table = compile_with(&FilterCompiler::table(), |u| {
        u.field("Score").ge(7i64).and(u.field("Score").lt(9.0f64))
    })
    .unwrap();

    assert_eq!(odata, "(score ge 7) and (score lt 9)");
    assert_eq!(table, "(score ge 7L) and (score lt 9.0)");
}

#[test]
fn test_non_finite_double_per_dialect() {
    let build = |u: &Param| u.field("Score").lt(f64::INFINITY).or(u.field("Score").ne(f64::NAN));

    assert_eq!(
        compile_with(&FilterCompiler::odata(), build).unwrap(),
        "(score lt INF) or (score ne NaN)"
    );
    assert_eq!(
        compile_with(&FilterCompiler::search(), |u| u.field("Score").gt(f64::NEG_INFINITY)).unwrap(),
        "score gt -INF"
    );
    assert!(matches!(
        compile_with(&FilterCompiler::table(), build),
        Err(CompileError::UnsupportedType { type_name: "double", .. })
    ));
}

#[test]
fn test_ordinal_comparison_only_in_table_dialect() {
    let build = |u: &Param| Expr::compare_ordinal(u.field("Name"), "m").lt(0);

    assert_eq!(
        compile_with(&FilterCompiler::table(), build).unwrap(),
        "name lt 'm'"
    );
    assert!(matches!(
        compile_with(&FilterCompiler::odata(), build),
        Err(CompileError::UnsupportedExpression { .. })
    ));
}

#[test]
fn test_compile_with_bindings() {
    let threshold = Param::new("threshold");
    let predicate = Predicate::build("u", |u| u.field("Age").ge(&threshold));
    let filter = FilterCompiler::odata()
        .compile_with_bindings(
            &user_metadata(),
            &predicate,
            vec![(threshold.clone(), Value::from(30))],
        )
        .unwrap();
    assert_eq!(filter, "age ge 30");

    let unbound = FilterCompiler::odata().compile(&user_metadata(), &predicate);
    assert!(matches!(
        unbound,
        Err(CompileError::UnsupportedExpression { .. })
    ));
}

#[test]
fn test_compiler_is_reentrant_across_threads() {
    let compiler = FilterCompiler::search();
    let cache = MetadataCache::new();
    let metadata = cache.get::<User>();

    std::thread::scope(|scope| {
        for age in 0..4 {
            let compiler = &compiler;
            let metadata = &metadata;
            scope.spawn(move || {
                let predicate = Predicate::build("u", |u| u.field("Age").eq(age));
                let filter = compiler.compile(metadata, &predicate).unwrap();
                assert_eq!(filter, format!("age eq {}", age));
            });
        }
    });
}
