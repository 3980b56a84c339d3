use crate::*;

fn def(key: &str, parent: Option<&str>) -> CapabilityDefinition {
    CapabilityDefinition {
        key: key.to_string(),
        name: key.to_uppercase(),
        description: String::new(),
        parent_key: parent.map(str::to_string),
    }
}

#[test]
fn catalog_builds_levels_and_children() {
    let model = CapabilityModel::from_catalog(&[
        def("payments", None),
        def("cards", Some("payments")),
        def("wallets", Some("payments")),
        def("tokenization", Some("cards")),
    ]);

    let payments = model.get("payments").unwrap();
    assert_eq!(payments.level, 1);
    assert_eq!(payments.child_keys, vec!["cards", "wallets"]);
    assert_eq!(model.get("tokenization").unwrap().level, 3);
    assert_eq!(
        model.get("cards").unwrap().parent_key.as_deref(),
        Some("payments")
    );
    assert_eq!(model.roots().count(), 1);
}

#[test]
fn unknown_parents_and_loops_become_roots() {
    let model = CapabilityModel::from_catalog(&[
        def("a", Some("b")),
        def("b", Some("a")),
        def("c", Some("a")),
        def("d", Some("missing")),
    ]);
    assert_eq!(model.get("a").unwrap().level, 1);
    assert_eq!(model.get("b").unwrap().level, 1);
    assert_eq!(model.get("c").unwrap().level, 2);
    assert!(model.get("d").unwrap().parent_key.is_none());
}
