use super::*;

#[test]
fn normalize_strips_and_lowercases() {
    assert_eq!(normalize_join_id("Two_Word"), "twoword");
    assert_eq!(normalize_join_id("twoWord"), "twoword");
    assert_eq!(normalize_join_id("A-1 b.2"), "a1b2");
    assert_eq!(normalize_join_id("__"), "");
}

#[test]
fn normalize_is_ascii_only() {
    assert_eq!(normalize_join_id("Café"), "caf");
    assert_eq!(normalize_join_id("ÄRGER_1"), "rger1");
    let mut joins: Joins<u8> = Joins::new(true);
    joins.add_join("Cafe", 1).unwrap();
    assert!(joins.get_join_id("café").is_err());
    assert_eq!(joins.get_join_id("CAFE").unwrap(), "Cafe");
}

#[test]
fn ambiguous_loose_ids_are_rejected() {
    let mut joins: Joins<u8> = Joins::new(true);
    joins.add_join("Two_Word", 1).unwrap();
    let err = joins.add_join("twoWord", 2).unwrap_err();
    assert_eq!(err, JoinError::ambiguous("twoWord", "Two_Word"));
    // The rejected join is not registered.
    assert_eq!(joins.ids(), vec!["Two_Word"]);
    assert_eq!(*joins.get_join("twoWord").unwrap(), 1);
}

#[test]
fn exact_ids_coexist_without_loose_matching() {
    let mut joins: Joins<u8> = Joins::new(false);
    joins.add_join("Two_Word", 1).unwrap();
    joins.add_join("twoWord", 2).unwrap();
    assert_eq!(*joins.get_join("Two_Word").unwrap(), 1);
    assert_eq!(*joins.get_join("twoWord").unwrap(), 2);
    assert!(matches!(joins.get_join_id("twoword"), Err(JoinError::JoinNotFound { .. })));
}

#[test]
fn readding_same_id_is_rejected() {
    let mut loose: Joins<u8> = Joins::new(true);
    loose.add_join("List", 1).unwrap();
    assert!(matches!(loose.add_join("List", 2), Err(JoinError::AmbiguousJoin { .. })));
    assert_eq!(*loose.get_join("List").unwrap(), 1);

    let mut exact: Joins<u8> = Joins::new(false);
    exact.add_join("List", 1).unwrap();
    assert!(exact.add_join("List", 2).is_err());
}

#[test]
fn empty_join_id_is_allowed() {
    let mut joins: Joins<u8> = Joins::new(true);
    joins.add_join("", 1).unwrap();
    assert_eq!(joins.get_join_id("").unwrap(), "");
    assert_eq!(joins.get_join_id("_").unwrap(), "");
    assert!(joins.add_join("--", 2).is_err());
}

#[test]
fn loose_resolution_depends_on_flag() {
    let mut on: Joins<u8> = Joins::new(true);
    on.add_join("Exact_Match", 1).unwrap();
    assert_eq!(on.get_join_id("exactMatch").unwrap(), "Exact_Match");
    assert_eq!(on.get_join_id("Exact_Match").unwrap(), "Exact_Match");

    let mut off: Joins<u8> = Joins::new(false);
    off.add_join("Exact_Match", 1).unwrap();
    assert_eq!(off.get_join_id("exactMatch").unwrap_err(), JoinError::not_found("exactMatch"));
    assert_eq!(off.get_join_id("Exact_Match").unwrap(), "Exact_Match");
}

#[test]
fn unknown_join_not_found() {
    let joins: Joins<u8> = Joins::new(true);
    assert!(matches!(joins.get_join("Nope"), Err(JoinError::JoinNotFound { .. })));
    assert!(joins.is_empty());
}
