mod common;

use common::{ids, people, person};
use repokit_query::{
    Condition, FilterDescriptor, LogicalOperator, NumberOperator, Predicate, PredicateBuilder,
    QueryError, TextOperator,
};

fn select(predicate: &Predicate) -> Vec<u64> {
    let matched: Vec<_> = people().into_iter().filter(|p| predicate.matches(p)).collect();
    ids(&matched)
}

// ── Empty / value filters ────────────────────────────────────────

#[test]
fn empty_builder_is_always_true() {
    let builder = PredicateBuilder::new();
    assert!(builder.is_empty());
    assert!(builder.build().unwrap().is_always_true());
}

#[test]
fn value_filter_matches_listed_names() {
    let predicate = PredicateBuilder::new()
        .values("name", ["Doe", "Lo"])
        .build()
        .unwrap();

    assert!(predicate.matches(&person(1, "Doe", 1)));
    assert!(!predicate.matches(&person(1, "Smith", 1)));
}

#[test]
fn empty_value_list_adds_nothing() {
    let builder = PredicateBuilder::new().values("name", Vec::<String>::new());
    assert!(builder.is_empty());
}

#[test]
fn value_filters_join_with_concat_operator() {
    let and = PredicateBuilder::new()
        .values("name", ["Doe", "Lo"])
        .values("age", [25])
        .build()
        .unwrap();
    assert_eq!(select(&and), vec![2]);

    let or = PredicateBuilder::new()
        .concat_with(LogicalOperator::Or)
        .values("name", ["Doe", "Lo"])
        .values("age", [25])
        .build()
        .unwrap();
    assert_eq!(select(&or), vec![1, 2, 4]);
}

// ── Raw conditions and composites ────────────────────────────────

#[test]
fn raw_conditions_are_anded() {
    let predicate = PredicateBuilder::new()
        .condition(Predicate::compare("age", NumberOperator::GreaterThan, 20))
        .condition(Predicate::text("city", TextOperator::Equal, "Oslo"))
        .build()
        .unwrap();
    assert_eq!(select(&predicate), vec![1, 4]);
}

#[test]
fn composite_single_condition() {
    let predicate = PredicateBuilder::new()
        .filter(FilterDescriptor::new(
            "name",
            Condition::text(TextOperator::StartsWith, "B"),
        ))
        .build()
        .unwrap();
    assert_eq!(select(&predicate), vec![5]);
}

#[test]
fn composite_double_condition_and() {
    let filter = FilterDescriptor::new("age", Condition::number(NumberOperator::GreaterOrEqual, 25))
        .and(Condition::number(NumberOperator::LessThan, 40));
    let predicate = PredicateBuilder::new().filter(filter).build().unwrap();
    assert_eq!(select(&predicate), vec![2, 3, 4]);
}

#[test]
fn composite_double_condition_or() {
    let filter = FilterDescriptor::new("city", Condition::text_empty())
        .or(Condition::text(TextOperator::Equal, "Lima"));
    let predicate = PredicateBuilder::new().filter(filter).build().unwrap();
    assert_eq!(select(&predicate), vec![2, 3, 5]);
}

#[test]
fn composite_and_value_filter_combine_with_or() {
    let predicate = PredicateBuilder::new()
        .concat_with(LogicalOperator::Or)
        .filter(FilterDescriptor::new("age", Condition::number(NumberOperator::GreaterThan, 60)))
        .values("name", ["Doe"])
        .build()
        .unwrap();
    assert_eq!(select(&predicate), vec![1, 5]);
}

// ── Invalid filter state ─────────────────────────────────────────

#[test]
fn promised_second_condition_missing_fails() {
    let mut filter = FilterDescriptor::new("age", Condition::number(NumberOperator::GreaterThan, 1));
    filter.logic = Some(LogicalOperator::And);

    let err = PredicateBuilder::new().filter(filter).build().unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilterState(_)));
}

#[test]
fn second_condition_without_operator_fails() {
    let mut filter = FilterDescriptor::new("age", Condition::number(NumberOperator::GreaterThan, 1));
    filter.second = Some(Condition::number(NumberOperator::LessThan, 9));

    let err = filter.to_predicate().unwrap_err();
    assert!(matches!(err, QueryError::InvalidFilterState(_)));
}

#[test]
fn operand_required_for_comparisons() {
    let filter = FilterDescriptor::new(
        "name",
        Condition::Text {
            op: TextOperator::Contains,
            value: None,
        },
    );
    assert!(matches!(
        filter.to_predicate(),
        Err(QueryError::InvalidFilterState(_))
    ));
}

#[test]
fn descriptor_deserializes_from_json() {
    let json = r#"{
        "field": "age",
        "first": {"type": "number", "op": "greater_than", "value": {"kind": "int", "value": 30}},
        "logic": "and"
    }"#;
    let filter: FilterDescriptor = serde_json::from_str(json).unwrap();
    assert_eq!(filter.logic, Some(LogicalOperator::And));
    assert!(filter.second.is_none());
    assert!(matches!(
        filter.to_predicate(),
        Err(QueryError::InvalidFilterState(_))
    ));
}
