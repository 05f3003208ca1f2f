use pagemark_outline::{
    diff, filter_language, flatten, group_by_language, nest, relink, OutlineDiff, OutlineEntry,
    OutlineNode, OutlinePatch,
};
use pagemark_types::{Language, OutlineId};
use pretty_assertions::assert_eq;

fn id(s: &str) -> OutlineId {
    OutlineId::parse(s).unwrap()
}

fn entry(name: &str, parent: Option<&str>, language: &Language) -> OutlineEntry {
    let mut e = OutlineEntry::draft(name.to_uppercase(), 1, parent.map(id), language.clone());
    e.id = id(name);
    e
}

fn ids(tree: &[OutlineNode]) -> Vec<&str> {
    tree.iter().map(|n| n.id().as_str()).collect()
}

// ── nest ────────────────────────────────────────────────────────

#[test]
fn nest_empty_list() {
    assert!(nest(Vec::new()).is_empty());
}

#[test]
fn nest_keeps_root_and_sibling_order() {
    let uz = Language::default();
    let tree = nest(vec![
        entry("b", None, &uz),
        entry("b2", Some("a"), &uz),
        entry("a", None, &uz),
        entry("b1", Some("a"), &uz),
    ]);

    assert_eq!(ids(&tree), vec!["b", "a"]);
    assert_eq!(ids(&tree[1].children), vec!["b2", "b1"]);
}

#[test]
fn nest_child_listed_before_parent() {
    let uz = Language::default();
    let tree = nest(vec![entry("c", Some("p"), &uz), entry("p", None, &uz)]);

    assert_eq!(ids(&tree), vec!["p"]);
    assert_eq!(ids(&tree[0].children), vec!["c"]);
}

#[test]
fn nest_orphan_becomes_root() {
    let uz = Language::default();
    let tree = nest(vec![entry("a", None, &uz), entry("o", Some("gone"), &uz)]);

    assert_eq!(ids(&tree), vec!["a", "o"]);
    // The dangling reference is kept verbatim.
    assert_eq!(tree[1].entry.parent_id, Some(id("gone")));
}

#[test]
fn nest_cross_language_parent_is_root() {
    let tree = nest(vec![
        entry("a", None, &Language::en()),
        entry("b", Some("a"), &Language::ru()),
    ]);

    assert_eq!(ids(&tree), vec!["a", "b"]);
    assert!(tree[0].children.is_empty());
}

#[test]
fn nest_same_id_in_two_languages() {
    let tree = nest(vec![
        entry("a", None, &Language::en()),
        entry("a", None, &Language::ru()),
        entry("x", Some("a"), &Language::ru()),
    ]);

    assert_eq!(tree.len(), 2);
    assert!(tree[0].children.is_empty());
    assert_eq!(ids(&tree[1].children), vec!["x"]);
}

#[test]
fn nest_three_cycle_promotes_first_member() {
    let uz = Language::default();
    let tree = nest(vec![
        entry("r", None, &uz),
        entry("a", Some("c"), &uz),
        entry("b", Some("a"), &uz),
        entry("c", Some("b"), &uz),
    ]);

    assert_eq!(ids(&tree), vec!["r", "a"]);
    assert_eq!(tree[1].size(), 3);
}

// ── flatten / relink ────────────────────────────────────────────

#[test]
fn flatten_pre_order() {
    let uz = Language::default();
    let tree = nest(vec![
        entry("a", None, &uz),
        entry("b", None, &uz),
        entry("a1", Some("a"), &uz),
        entry("a1x", Some("a1"), &uz),
        entry("a2", Some("a"), &uz),
    ]);

    let flat = flatten(&tree);
    let order: Vec<&str> = flat.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(order, vec!["a", "a1", "a1x", "a2", "b"]);
}

#[test]
fn relink_sets_parent_ids_from_shape() {
    let uz = Language::default();
    let mut child = OutlineNode::leaf(entry("c", Some("stale"), &uz));
    child.children.push(OutlineNode::leaf(entry("g", None, &uz)));
    let mut root = OutlineNode::leaf(entry("r", Some("stale"), &uz));
    root.children.push(child);
    let mut tree = vec![root];

    relink(&mut tree);

    let flat = flatten(&tree);
    assert_eq!(flat[0].parent_id, None);
    assert_eq!(flat[1].parent_id, Some(id("r")));
    assert_eq!(flat[2].parent_id, Some(id("c")));
}

// ── languages ───────────────────────────────────────────────────

#[test]
fn group_by_language_keeps_order() {
    let flat = vec![
        entry("1", None, &Language::ru()),
        entry("2", None, &Language::en()),
        entry("3", None, &Language::ru()),
    ];

    let groups = group_by_language(flat.clone());
    assert_eq!(groups.len(), 2);
    let ru: Vec<&str> = groups[&Language::ru()].iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ru, vec!["1", "3"]);

    assert_eq!(filter_language(&flat, &Language::en()).len(), 1);
    assert!(filter_language(&flat, &Language::uz()).is_empty());
}

// ── diff ────────────────────────────────────────────────────────

#[test]
fn diff_identical_is_unchanged() {
    let uz = Language::default();
    let flat = vec![entry("a", None, &uz), entry("b", Some("a"), &uz)];
    assert_eq!(diff(&flat, &flat.clone()), OutlineDiff::Unchanged);
}

#[test]
fn diff_retitle_is_field_edit() {
    let uz = Language::default();
    let before = vec![entry("a", None, &uz), entry("b", Some("a"), &uz)];
    let mut after = before.clone();
    after[1].title = "Renamed".into();
    after[1].page = 7;

    let expected = OutlineDiff::FieldEdits(vec![(
        id("b"),
        OutlinePatch {
            title: Some("Renamed".into()),
            page: Some(7),
            parent_id: None,
        },
    )]);
    assert_eq!(diff(&before, &after), expected);
}

#[test]
fn diff_structural_changes() {
    let uz = Language::default();
    let before = vec![entry("a", None, &uz), entry("b", None, &uz)];

    let mut reparented = before.clone();
    reparented[1].parent_id = Some(id("a"));
    assert_eq!(diff(&before, &reparented), OutlineDiff::Structural);

    let reordered = vec![before[1].clone(), before[0].clone()];
    assert_eq!(diff(&before, &reordered), OutlineDiff::Structural);

    assert_eq!(diff(&before, &before[..1]), OutlineDiff::Structural);
}

// ── serde ───────────────────────────────────────────────────────

#[test]
fn node_json_is_camel_case_with_children() {
    let uz = Language::default();
    let mut root = OutlineNode::leaf(entry("r", None, &uz));
    root.children.push(OutlineNode::leaf(entry("c", Some("r"), &uz)));

    let json = serde_json::to_value(&root).unwrap();
    assert_eq!(json["id"], "r");
    assert_eq!(json["parentId"], serde_json::Value::Null);
    assert!(json.get("createdAt").is_some());
    assert_eq!(json["children"][0]["parentId"], "r");

    let back: OutlineNode = serde_json::from_value(json).unwrap();
    assert_eq!(back, root);
}

#[test]
fn patch_skips_absent_fields() {
    let patch = OutlinePatch {
        title: Some("T".into()),
        ..OutlinePatch::default()
    };
    assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"title":"T"}"#);

    let clear_parent = OutlinePatch {
        parent_id: Some(None),
        ..OutlinePatch::default()
    };
    assert_eq!(serde_json::to_string(&clear_parent).unwrap(), r#"{"parentId":null}"#);
}
