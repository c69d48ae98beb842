use cladarium::error::CladariumError;
use cladarium::query::{
    BulkOperation, DisplayFormat, Grouping, Modifier, ModifierKind, Ordering, SearchQuery,
};

#[test]
fn clause_splits_into_name_and_value() {
    let modifier = Modifier::parse("zone:abyssal").expect("parse ok");
    assert_eq!(modifier.name(), "zone");
    assert_eq!(modifier.value(), "abyssal");
    assert_eq!(modifier.kind(), ModifierKind::Zone);
    assert!(!modifier.subtractive());
}

#[test]
fn leading_dash_makes_clause_subtractive() {
    let modifier = Modifier::parse("-status:extinct").expect("parse ok");
    assert_eq!(modifier.name(), "status");
    assert!(modifier.subtractive());
}

#[test]
fn aliases_resolve_to_canonical_kinds() {
    assert_eq!(Modifier::parse("z:reef").unwrap().kind(), ModifierKind::Zone);
    assert_eq!(
        Modifier::parse("gb:genus").unwrap().kind(),
        ModifierKind::GroupBy(Some(Grouping::Genus))
    );
    assert_eq!(
        Modifier::parse("sort:newest").unwrap().kind(),
        ModifierKind::OrderBy(Some(Ordering::Newest))
    );
    assert_eq!(
        Modifier::parse("fmt:leaderboard").unwrap().kind(),
        ModifierKind::Format(Some(DisplayFormat::Leaderboard))
    );
}

#[test]
fn unknown_names_and_enum_values_do_not_fail() {
    let modifier = Modifier::parse("sparkle:yes").expect("parse ok");
    assert_eq!(modifier.kind(), ModifierKind::Unknown);
    // a meta modifier with a bad value keeps an empty payload
    let modifier = Modifier::parse("groupby:sparkle").expect("parse ok");
    assert_eq!(modifier.kind(), ModifierKind::GroupBy(None));
}

#[test]
fn quotes_around_the_value_are_stripped() {
    let modifier = Modifier::parse("creator:\"Dame Alba\"").expect("parse ok");
    assert_eq!(modifier.value(), "Dame Alba");
    // a quoted colon does not count as a clause separator
    let modifier = Modifier::parse("creator:\"a:b\"").expect("parse ok");
    assert_eq!(modifier.value(), "a:b");
}

#[test]
fn malformed_clauses_are_rejected() {
    for clause in ["zone", "zone:", "zone:a:b"] {
        let err = Modifier::parse(clause).unwrap_err();
        assert!(
            matches!(err, CladariumError::MalformedQuery { .. }),
            "clause {clause} should be malformed"
        );
        assert!(format!("{err}").contains("Malformed clause"));
    }
}

#[test]
fn query_separates_keywords_from_modifiers() {
    let query = SearchQuery::parse("giant \"deep sea\" zone:abyssal -role:predator")
        .expect("parse ok");
    assert_eq!(query.keywords(), ["giant", "deep sea"]);
    assert_eq!(query.modifiers().len(), 2);
    assert_eq!(query.modifiers()[0].kind(), ModifierKind::Zone);
    assert!(query.modifiers()[1].subtractive());
}

#[test]
fn bare_word_is_a_keyword_not_a_clause() {
    let query = SearchQuery::parse("zone").expect("parse ok");
    assert_eq!(query.keywords(), ["zone"]);
    assert!(query.modifiers().is_empty());
}

#[test]
fn malformed_clause_fails_the_whole_query() {
    let err = SearchQuery::parse("lantern zone:").unwrap_err();
    assert!(matches!(err, CladariumError::MalformedQuery { .. }));
}

#[test]
fn comma_separated_values_are_normalized() {
    let modifier = Modifier::parse("zone:Abyssal, Coastal ,").expect("parse ok");
    assert_eq!(modifier.values(), ["abyssal", "coastal"]);
}

#[test]
fn bulk_operation_splits_on_last_gt() {
    let operation =
        BulkOperation::parse("\"a > b\" zone:reef > rename Reefborn").expect("parse ok");
    assert_eq!(operation.query().keywords(), ["a > b"]);
    assert_eq!(operation.operation(), "rename");
    assert_eq!(operation.args(), ["Reefborn"]);
}

#[test]
fn bulk_operation_requires_both_sides() {
    for input in ["lantern addzone reef", "> addzone reef", "lantern >", "  > "] {
        let err = BulkOperation::parse(input).unwrap_err();
        assert!(
            matches!(err, CladariumError::MalformedOperation { .. }),
            "input {input:?} should be malformed"
        );
    }
}
