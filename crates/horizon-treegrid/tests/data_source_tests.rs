//! Integration tests for the tree-grid data source.

use std::sync::Arc;

use horizon_treegrid::model::{DataChange, FilterMatch, RowRange, TreeGridDataSource, TreeItem, TreeToggled};
use horizon_treegrid::{TreeGridConfig, TreeGridError};
use parking_lot::Mutex;

type Item = TreeItem<u32>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn record(id: &str, parent: Option<&str>, rank: u32) -> Arc<Item> {
    let item = TreeItem::new(id, rank);
    Arc::new(match parent {
        Some(parent) => item.with_parent(parent),
        None => item,
    })
}

/// A(A1(A1a, A1b), A2), B(B1), C
fn sample_records() -> Vec<Arc<Item>> {
    vec![
        record("A", None, 0),
        record("A1", Some("A"), 0),
        record("A1a", Some("A1"), 0),
        record("A1b", Some("A1"), 0),
        record("A2", Some("A"), 0),
        record("B", None, 0),
        record("B1", Some("B"), 0),
        record("C", None, 0),
    ]
}

fn loaded(config: TreeGridConfig) -> TreeGridDataSource<Item> {
    init_tracing();
    let source = TreeGridDataSource::from_records(sample_records(), config);
    source.load().unwrap();
    source
}

fn names(rows: &[Arc<Item>]) -> Vec<String> {
    rows.iter().map(|r| r.name().to_string()).collect()
}

fn view(source: &TreeGridDataSource<Item>) -> Vec<String> {
    names(&source.get_data(..).unwrap())
}

fn get(source: &TreeGridDataSource<Item>, id: &str) -> Arc<Item> {
    source.get_record_by_id(&id.to_string()).unwrap()
}

fn capture_ranges(signal: &horizon_treegrid::Signal<RowRange>) -> Arc<Mutex<Vec<RowRange>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_clone = received.clone();
    signal.connect(move |range| {
        received_clone.lock().push(*range);
    });
    received
}

fn ancestors(source: &TreeGridDataSource<Item>, record: &Item) -> Vec<String> {
    let mut chain = Vec::new();
    let mut parent = source.parent(record);
    while let Some(id) = parent {
        let next = get(source, &id);
        parent = source.parent(&next);
        chain.push(id);
    }
    chain
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_basic_expand() {
    init_tracing();
    let records = vec![record("A", None, 0), record("A1", Some("A"), 0), record("A2", Some("A"), 0)];
    let source = TreeGridDataSource::from_records(records, TreeGridConfig::default());
    source.load().unwrap();
    assert_eq!(view(&source), vec!["A"]);

    let added = capture_ranges(&source.signals().rows_added);
    source.expand(&get(&source, "A")).unwrap();

    assert_eq!(view(&source), vec!["A", "A1", "A2"]);
    assert_eq!(*added.lock(), vec![RowRange::new(1, 3)]);
}

#[test]
fn test_filter_pulls_ancestor_regardless_of_expansion() {
    init_tracing();
    let records = vec![record("A", None, 0), record("A1", Some("A"), 0), record("A2", Some("A"), 0)];

    for depth in [0, 1] {
        let config = TreeGridConfig::default().with_initial_tree_depth(depth);
        let source = TreeGridDataSource::from_records(records.clone(), config);
        source.load().unwrap();

        source.apply_filter(|r: &Item| r.name() == "A2").unwrap();
        assert_eq!(view(&source), vec!["A", "A2"]);
        assert_eq!(source.is_expanded(&get(&source, "A")), depth == 1);
    }
}

#[test]
fn test_collapse_removes_exact_subtree() {
    init_tracing();
    let records = vec![record("A", None, 0), record("A1", Some("A"), 0), record("A1a", Some("A1"), 0)];
    let config = TreeGridConfig::default().with_initial_tree_depth(2);
    let source = TreeGridDataSource::from_records(records, config);
    source.load().unwrap();
    assert_eq!(view(&source), vec!["A", "A1", "A1a"]);

    let removed = capture_ranges(&source.signals().rows_removed);
    let added = capture_ranges(&source.signals().rows_added);
    source.collapse(&get(&source, "A1")).unwrap();

    assert_eq!(view(&source), vec!["A", "A1"]);
    assert_eq!(*removed.lock(), vec![RowRange::new(2, 3)]);
    assert!(added.lock().is_empty());
}

#[test]
fn test_dangling_parent_fails_load() {
    init_tracing();
    let source = TreeGridDataSource::from_records(vec![record("1", Some("2"), 0)], TreeGridConfig::default());

    let err = source.load().unwrap_err();
    assert!(matches!(err, TreeGridError::DanglingReference { .. }));
    assert!(err.to_string().contains("\"2\""));
    assert!(!source.is_ready());
    assert!(matches!(source.record_count(), Err(TreeGridError::NotReady)));
}

// =========================================================================
// Properties
// =========================================================================

#[test]
fn test_matches_keep_all_ancestors() {
    let cases: [&[&str]; 4] = [&["A1b"], &["A1a", "A2"], &["B", "B1"], &[]];

    for wanted in cases {
        let source = loaded(TreeGridConfig::default());
        let predicate = move |r: &Item| wanted.iter().any(|w| *w == r.name());
        source.apply_filter(predicate).unwrap();
        let rows = view(&source);

        for (position, name) in rows.iter().enumerate() {
            let row = get(&source, name);
            if !predicate(&*row) {
                continue;
            }
            for ancestor in ancestors(&source, &row) {
                let ancestor_position = rows.iter().position(|r| *r == ancestor);
                assert!(
                    ancestor_position.is_some_and(|p| p < position),
                    "{wanted:?}: ancestor {ancestor} of {name} missing or misplaced in {rows:?}"
                );
            }
        }
    }
}

#[test]
fn test_expand_then_collapse_restores_view() {
    for filter in [None, Some("A1"), Some("A1b"), Some("B1")] {
        let source = loaded(TreeGridConfig::default());
        if let Some(wanted) = filter {
            source.apply_filter(move |r: &Item| r.name() == wanted).unwrap();
        }

        for name in ["A", "A1", "B"] {
            let target = get(&source, name);
            let before = view(&source);
            source.expand(&target).unwrap();
            source.collapse(&target).unwrap();
            assert_eq!(view(&source), before, "round trip on {name} with filter {filter:?}");
        }
    }
}

#[test]
fn test_expand_splices_flattened_subtree() {
    let source = loaded(TreeGridConfig::default());
    source.expand(&get(&source, "A1")).unwrap();

    let a = get(&source, "A");
    let before = view(&source);
    let added = capture_ranges(&source.signals().rows_added);
    source.expand(&a).unwrap();

    let after = view(&source);
    let range = added.lock()[0];
    let subtree = names(&source.flatten_subtree(&a));
    assert_eq!(range, RowRange::new(1, 1 + subtree.len()));
    assert_eq!(after[range.start..range.end], subtree[..]);
    assert_eq!(subtree, vec!["A1", "A1a", "A1b", "A2"]);

    let mut outside = after[..range.start].to_vec();
    outside.extend_from_slice(&after[range.end..]);
    assert_eq!(outside, before);
}

#[test]
fn test_filtered_expand_replaces_pulled_rows() {
    let source = loaded(TreeGridConfig::default());
    source.apply_filter(|r: &Item| r.name() == "A1").unwrap();
    assert_eq!(view(&source), vec!["A", "A1"]);

    let added = capture_ranges(&source.signals().rows_added);
    let a1 = get(&source, "A1");
    source.expand(&a1).unwrap();

    assert_eq!(view(&source), vec!["A", "A1", "A1a", "A1b"]);
    assert_eq!(*added.lock(), vec![RowRange::new(2, 4)]);
    assert_eq!(names(&source.flatten_subtree(&a1)), vec!["A1a", "A1b"]);

    // A is shown only as an ancestor; expanding it keeps the rows unique.
    source.expand(&get(&source, "A")).unwrap();
    assert_eq!(view(&source), vec!["A", "A1", "A1a", "A1b"]);
}

#[test]
fn test_expand_and_collapse_are_idempotent() {
    let source = loaded(TreeGridConfig::default());
    let a = get(&source, "A");

    let toggled = Arc::new(Mutex::new(Vec::new()));
    let toggled_clone = toggled.clone();
    source.signals().tree_toggled.connect(move |event: &TreeToggled<String>| {
        toggled_clone.lock().push(event.clone());
    });
    let added = capture_ranges(&source.signals().rows_added);
    let removed = capture_ranges(&source.signals().rows_removed);

    source.expand(&a).unwrap();
    let once = view(&source);
    source.expand(&a).unwrap();
    assert_eq!(view(&source), once);
    assert_eq!(added.lock().len(), 1);
    assert_eq!(toggled.lock().len(), 1);

    source.collapse(&a).unwrap();
    source.collapse(&a).unwrap();
    assert_eq!(removed.lock().len(), 1);
    assert_eq!(toggled.lock().len(), 2);
    assert_eq!(
        toggled.lock()[1],
        TreeToggled {
            id: "A".to_string(),
            index: Some(0),
            expanded: false
        }
    );
}

#[test]
fn test_sort_is_stable_and_hierarchical() {
    init_tracing();
    let records = vec![
        record("x", None, 2),
        record("y", None, 1),
        record("z", None, 1),
        record("x1", Some("x"), 5),
        record("x2", Some("x"), 3),
        record("x3", Some("x"), 5),
    ];
    let config = TreeGridConfig::default().with_initial_tree_depth(1);
    let source = TreeGridDataSource::from_records(records, config);
    source.load().unwrap();
    assert_eq!(view(&source), vec!["x", "x1", "x2", "x3", "y", "z"]);

    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = changes.clone();
    source.signals().data_changed.connect(move |change: &DataChange<Item>| {
        changes_clone.lock().push((names(&change.old_data), names(&change.data)));
    });

    source.sort(|a: &Item, b: &Item| a.data.cmp(&b.data)).unwrap();
    let sorted = vec!["y", "z", "x", "x2", "x1", "x3"];
    assert_eq!(view(&source), sorted);
    assert_eq!(changes.lock().len(), 1);
    assert_eq!(changes.lock()[0].0, vec!["x", "x1", "x2", "x3", "y", "z"]);

    source.load().unwrap();
    assert_eq!(view(&source), sorted);
}

// =========================================================================
// Operations
// =========================================================================

#[test]
fn test_initial_depth_from_config() {
    let config = TreeGridConfig::from_toml_str("initial_tree_depth = 2").unwrap();
    let source = loaded(config);
    assert_eq!(view(&source), vec!["A", "A1", "A1a", "A1b", "A2", "B", "B1", "C"]);

    let a1 = get(&source, "A1");
    assert!(source.is_expanded(&a1));
    assert_eq!(source.tree_settings(&get(&source, "A1b")).depth, 2);
    assert!(!source.is_expanded(&get(&source, "A1b")));
}

#[test]
fn test_load_resets_expansion() {
    let source = loaded(TreeGridConfig::default());
    source.toggle(&"A".to_string()).unwrap();
    assert_eq!(source.record_count().unwrap(), 5);

    let loads = Arc::new(Mutex::new(0));
    let loads_clone = loads.clone();
    source.signals().data_loaded.connect(move |_| {
        *loads_clone.lock() += 1;
    });

    source.load().unwrap();
    assert_eq!(view(&source), vec!["A", "B", "C"]);
    assert_eq!(*loads.lock(), 1);
}

#[test]
fn test_toggle_dispatches_and_rejects_unknown_ids() {
    let source = loaded(TreeGridConfig::default());

    source.toggle(&"B".to_string()).unwrap();
    assert_eq!(view(&source), vec!["A", "B", "B1", "C"]);
    source.toggle(&"B".to_string()).unwrap();
    assert_eq!(view(&source), vec!["A", "B", "C"]);

    let err = source.toggle(&"nope".to_string()).unwrap_err();
    assert!(matches!(err, TreeGridError::UnknownRecord { .. }));
    let err = source.expand_all(Some(&"nope".to_string())).unwrap_err();
    assert!(matches!(err, TreeGridError::UnknownRecord { .. }));
}

fn capture_toggles(source: &TreeGridDataSource<Item>) -> Arc<Mutex<Vec<String>>> {
    let toggled = Arc::new(Mutex::new(Vec::new()));
    let toggled_clone = toggled.clone();
    source.signals().tree_toggled.connect(move |event: &TreeToggled<String>| {
        toggled_clone.lock().push(event.id.clone());
    });
    toggled
}

#[test]
fn test_expand_all_splices_each_visible_subtree_once() {
    let source = loaded(TreeGridConfig::default());
    let added = capture_ranges(&source.signals().rows_added);
    let toggled = capture_toggles(&source);

    source.expand_all(None).unwrap();
    assert_eq!(view(&source), vec!["A", "A1", "A1a", "A1b", "A2", "B", "B1", "C"]);
    assert_eq!(
        *added.lock(),
        vec![RowRange::new(1, 5), RowRange::new(6, 7), RowRange::new(8, 8)]
    );
    assert_eq!(*toggled.lock(), vec!["A1a", "A1b", "A1", "A2", "A", "B1", "B", "C"]);

    for leaf in ["A1a", "A1b", "A2", "B1", "C"] {
        assert!(source.is_expanded(&get(&source, leaf)), "{leaf} not expanded");
    }
}

#[test]
fn test_expand_all_from_root() {
    let source = loaded(TreeGridConfig::default());
    let toggled = capture_toggles(&source);

    source.expand_all(Some(&"A".to_string())).unwrap();
    assert_eq!(view(&source), vec!["A", "A1", "A1a", "A1b", "A2", "B", "C"]);
    assert_eq!(*toggled.lock(), vec!["A1a", "A1b", "A1", "A2", "A"]);
    assert!(source.is_expanded(&get(&source, "A2")));
    assert!(!source.is_expanded(&get(&source, "B")));
    assert!(!source.is_expanded(&get(&source, "B1")));
}

#[test]
fn test_expand_all_marks_single_leaf() {
    init_tracing();
    let records = vec![record("A", None, 0), record("A1", Some("A"), 0)];
    let source = TreeGridDataSource::from_records(records, TreeGridConfig::default());
    source.load().unwrap();
    let toggled = capture_toggles(&source);

    source.expand_all(None).unwrap();
    assert!(source.is_expanded(&get(&source, "A1")));
    assert_eq!(*toggled.lock(), vec!["A1", "A"]);
    assert_eq!(view(&source), vec!["A", "A1"]);
}

#[test]
fn test_filter_reports_old_and_new_views() {
    let source = loaded(TreeGridConfig::default());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = changes.clone();
    source.signals().data_changed.connect(move |change: &DataChange<Item>| {
        changes_clone.lock().push((names(&change.old_data), names(&change.data)));
    });

    source.apply_filter(|r: &Item| r.name() == "B1").unwrap();
    assert_eq!(view(&source), vec!["B", "B1"]);
    assert!(!source.is_expanded(&get(&source, "B")));

    source.clear_filter().unwrap();
    assert_eq!(view(&source), vec!["A", "B", "C"]);

    let changes = changes.lock();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].0, vec!["A", "B", "C"]);
    assert_eq!(changes[0].1, vec!["B", "B1"]);
    assert_eq!(changes[1].0, vec!["B", "B1"]);
}

#[test]
fn test_tri_state_filter() {
    let source = loaded(TreeGridConfig::default());
    source
        .apply_filter(|r: &Item| match r.name() {
            "A" => FilterMatch::Include,
            "A1" => FilterMatch::Exclude,
            _ => FilterMatch::Neutral,
        })
        .unwrap();
    assert_eq!(view(&source), vec!["A"]);
    assert!(source.row_or_ancestor_matches(&get(&source, "A")));

    source.expand(&get(&source, "A")).unwrap();
    assert_eq!(view(&source), vec!["A", "A2"]);
    assert!(source.row_or_ancestor_matches(&get(&source, "A2")));
    assert!(!source.row_or_ancestor_matches(&get(&source, "A1")));
}

#[test]
fn test_listener_can_reenter() {
    let source = Arc::new(loaded(TreeGridConfig::default()));
    let weak = Arc::downgrade(&source);
    source.signals().tree_toggled.connect(move |event| {
        if event.id == "A" && event.expanded {
            if let Some(source) = weak.upgrade() {
                let a1 = source.get_record_by_id(&"A1".to_string()).unwrap();
                source.expand(&a1).unwrap();
            }
        }
    });

    source.toggle(&"A".to_string()).unwrap();
    assert_eq!(view(&source), vec!["A", "A1", "A1a", "A1b", "A2", "B", "C"]);
}

#[test]
fn test_filter_with_lineage_captured_up_front() {
    let source = loaded(TreeGridConfig::default());
    let a = get(&source, "A");
    let mut under_a: Vec<String> = Vec::new();
    let mut pending = source.children(&a).unwrap_or_default();
    while let Some(node) = pending.pop() {
        under_a.push(node.name().to_string());
        pending.extend(source.children(&node).unwrap_or_default());
    }

    source
        .apply_filter(move |r: &Item| under_a.iter().any(|n| n == r.name()) && r.name().ends_with('b'))
        .unwrap();
    assert_eq!(view(&source), vec!["A", "A1", "A1b"]);
}

#[test]
fn test_tree_queries() {
    let source = loaded(TreeGridConfig::default());
    let a = get(&source, "A");

    assert_eq!(names(&source.roots()), vec!["A", "B", "C"]);
    assert_eq!(names(&source.children(&a).unwrap()), vec!["A1", "A2"]);
    assert!(source.has_children(&a));
    assert!(!source.has_children(&get(&source, "C")));
    assert_eq!(source.parent(&get(&source, "A1a")).as_deref(), Some("A1"));
    assert!(source.row_or_ancestor_matches(&a));
}
