use joinery::{Columnar, Join, JoinError, JoinSpec, Records, Row, Tabular};
use serde_json::{json, Value};

fn rows(v: Value) -> Vec<Row> { joinery::row::rows_from_value(v).unwrap() }

fn spec_rows() -> Vec<Row> {
    rows(json!([
        {"T1st_T_ID": 1, "T1st_T_A": 1, "T1st_T_B": "B 1", "T2nd_T_ID": 1, "T2nd_T_X": 1, "T2nd_T_Y": "Y 1"},
        {"T1st_T_ID": 1, "T1st_T_A": 1, "T1st_T_B": "B 1", "T2nd_T_ID": 2, "T2nd_T_X": 2, "T2nd_T_Y": "Y 2"},
        {"T1st_T_ID": 2, "T1st_T_A": 2, "T1st_T_B": "B 2", "T2nd_T_ID": null, "T2nd_T_X": null, "T2nd_T_Y": null}
    ]))
}

#[test]
fn tabular_join_from_spec_file_matches_builder() {
    let spec = JoinSpec::from_json(
        r#"{"kind": "tabular", "table": "T1st", "keys": ["ID"],
            "joins": {"List": {"kind": "tabular", "table": "T2nd", "keys": ["ID"]}}}"#,
    )
    .unwrap();
    let from_spec = spec.build().unwrap().arrange_flat_data(&spec_rows()).unwrap();
    let built = Tabular::new("T1st")
        .with_join("List", Tabular::new("T2nd"))
        .unwrap()
        .arrange_flat_data(&spec_rows())
        .unwrap();
    assert_eq!(from_spec, built);
    joinery::tprintln!("arranged: {}", serde_json::to_string(&built).unwrap());
    assert_eq!(
        serde_json::to_value(&built).unwrap(),
        json!({
            "1": {"A": 1, "B": "B 1", "Joint_Data": {"List": {"1": {"X": 1, "Y": "Y 1"}, "2": {"X": 2, "Y": "Y 2"}}}},
            "2": {"A": 2, "B": "B 2", "Joint_Data": {"List": {}}}
        })
    );
}

#[test]
fn columnar_join_example() {
    let out = Columnar::new(["F1"]).arrange_flat_data(&rows(json!([{"F1": "r1", "ID": 1}, {"F1": "r2", "ID": 2}]))).unwrap();
    assert_eq!(out.to_value().unwrap(), json!({"1": {"F1": "r1"}, "2": {"F1": "r2"}}));
}

#[test]
fn loose_join_names() {
    let on = Tabular::new("A").with_join("Exact_Match", Tabular::new("B")).unwrap();
    assert_eq!(on.get_join_id("exactMatch").unwrap(), "Exact_Match");

    let off = Tabular::new("A")
        .with_alpha_num_match(false)
        .unwrap()
        .with_join("Exact_Match", Tabular::new("B"))
        .unwrap();
    assert!(matches!(off.get_join_id("exactMatch"), Err(JoinError::JoinNotFound { .. })));

    let err = Tabular::new("A")
        .with_join("Two_Word", Tabular::new("B"))
        .unwrap()
        .with_join("twoWord", Tabular::new("C"))
        .unwrap_err();
    assert_eq!(err.code_str(), "ambiguous_join");
}

#[test]
fn concurrent_arrangement_shares_one_tree() {
    let join = Tabular::new("T1st").with_join("List", Tabular::new("T2nd")).unwrap();
    let expected = join.arrange_flat_data(&spec_rows()).unwrap();
    let results: Vec<Records> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| join.arrange_flat_data(&spec_rows()).unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for r in results {
        assert_eq!(r, expected);
    }
}

#[test]
fn mixed_tree_walks_records_by_loose_names() {
    let items = Tabular::new("Item").require_all_tabular_fields(false);
    let join = Columnar::new(["Name"]).with_keys(["Order_ID"]).with_join("Line_Items", items).unwrap();
    let data = rows(json!([
        {"Order_ID": 7, "Name": "ann", "Item_T_ID": 1, "Item_T_Sku": "a"},
        {"Order_ID": 7, "Name": "ann", "Item_T_ID": 2, "Item_T_Sku": "b"},
        {"Order_ID": 8, "Name": "bob", "Item_T_ID": null, "Item_T_Sku": null}
    ]));
    let out = join.arrange_flat_data(&data).unwrap();
    let ann = out.get("7").unwrap();
    let skus: Vec<&Value> = ann.joined(&join, "lineItems").unwrap().iter().map(|(_, r)| &r.fields["Sku"]).collect();
    assert_eq!(skus, vec![&json!("a"), &json!("b")]);
    assert!(out.get("8").unwrap().joined(&join, "line_items").unwrap().is_empty());
    assert!(out.get("8").unwrap().joint.is_none());
}
