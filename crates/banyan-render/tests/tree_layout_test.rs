mod common;

use banyan_render::LayoutOptions;
use banyan_render::tree::layout_tree;

#[test]
fn tree_layout_produces_rows_and_finite_positions() {
    let family = common::sample_family();
    let layout = layout_tree(&family, 3, &LayoutOptions::default()).unwrap();

    // George + Ada, Harold, Peter.
    assert_eq!(layout.nodes.len(), 4);
    for node in &layout.nodes {
        assert!(node.width.is_finite() && node.width > 0.0);
        assert!(node.height.is_finite() && node.height > 0.0);
        assert!(node.x.is_finite() && node.y.is_finite());
    }

    let george = layout.node(1).expect("George placed");
    let harold = layout.node(3).expect("Harold placed");
    let peter = layout.node(6).expect("Peter placed");
    assert!(george.y < harold.y, "parents above the subject");
    assert!(harold.y < peter.y, "children below the subject");

    assert!(harold.is_subject);
    assert!(!george.is_subject);
}

#[test]
fn rows_do_not_overlap_horizontally() {
    let family = common::sample_family();
    let layout = layout_tree(&family, 6, &LayoutOptions::default()).unwrap();

    let mut rows: std::collections::BTreeMap<i64, Vec<(f64, f64)>> = Default::default();
    for node in &layout.nodes {
        rows.entry(node.y as i64)
            .or_default()
            .push((node.x, node.x + node.width));
    }
    for spans in rows.values_mut() {
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "boxes overlap: {pair:?}");
        }
    }
}

#[test]
fn married_parents_get_a_solid_couple_join() {
    let family = common::sample_family();
    let layout = layout_tree(&family, 3, &LayoutOptions::default()).unwrap();

    let join = layout
        .couples
        .iter()
        .find(|c| c.key == "r1")
        .expect("George and Ada joined");
    assert!(join.married);
    assert_eq!((join.left, join.right), (1, 2));

    let george = layout.node(1).unwrap();
    let ada = layout.node(2).unwrap();
    assert!(join.x > george.x && join.x < ada.x + ada.width);
    assert!((join.y - (george.y + george.height / 2.0)).abs() < 1e-9);
}

#[test]
fn connectors_drop_from_parents_to_each_child() {
    let family = common::sample_family();
    let layout = layout_tree(&family, 3, &LayoutOptions::default()).unwrap();

    // George+Ada -> Harold, and Harold (single known parent) -> Peter.
    assert_eq!(layout.connectors.len(), 2);

    let to_harold = layout
        .connectors
        .iter()
        .find(|c| c.group == "r1")
        .expect("connector to Harold");
    let harold = layout.node(3).unwrap();
    assert_eq!(to_harold.drops.len(), 1);
    let drop = to_harold.drops[0];
    assert!((drop[1].1 - harold.y).abs() < 1e-9, "drop lands on the box top");

    let to_peter = layout
        .connectors
        .iter()
        .find(|c| c.group == "3_x")
        .expect("connector to Peter");
    // Stem hangs from Harold's box bottom.
    assert!((to_peter.stem[0].1 - harold.bottom()).abs() < 1e-9);
}

#[test]
fn bounds_enclose_every_node() {
    let family = common::sample_family();
    let layout = layout_tree(&family, 1, &LayoutOptions::default()).unwrap();
    for node in &layout.nodes {
        assert!(node.x >= layout.bounds.min_x);
        assert!(node.y >= layout.bounds.min_y);
        assert!(node.x + node.width <= layout.bounds.max_x);
        assert!(node.y + node.height <= layout.bounds.max_y);
    }
}

#[test]
fn sibling_option_widens_the_subject_row() {
    let family = common::sample_family();
    let options = LayoutOptions {
        include_siblings: true,
        ..Default::default()
    };
    let layout = layout_tree(&family, 3, &options).unwrap();
    let harold = layout.node(3).unwrap();
    let edith = layout.node(4).expect("sibling placed");
    assert_eq!(harold.y, edith.y);
}
