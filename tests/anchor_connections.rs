//! Integration tests for wiring anchors between widgets.

use anchor_layout::{AnchorId, AnchorType, ConnectError, LayoutGraph, WidgetId};
use pretty_assertions::assert_eq;

fn id(widget: WidgetId, kind: AnchorType) -> AnchorId {
    AnchorId::new(widget, kind)
}

fn siblings(count: usize) -> (LayoutGraph, WidgetId, Vec<WidgetId>) {
    let mut graph = LayoutGraph::new();
    let root = graph.add_root();
    graph[root].set_size(300, 200);
    let widgets = (0..count).map(|_| graph.add_leaf(root).unwrap()).collect();
    (graph, root, widgets)
}

#[test]
fn test_connection_registers_dependent() {
    let (mut graph, root, w) = siblings(2);
    assert!(graph.connect(id(w[0], AnchorType::Left), id(root, AnchorType::Left), 8));
    assert!(graph.connect(id(w[1], AnchorType::Left), id(root, AnchorType::Left), 0));

    let target = graph.anchor(id(root, AnchorType::Left)).unwrap();
    let dependents: Vec<AnchorId> = target.dependents().unwrap().iter().copied().collect();
    assert_eq!(
        dependents,
        vec![id(w[0], AnchorType::Left), id(w[1], AnchorType::Left)]
    );
    assert_eq!(graph.margin(id(w[0], AnchorType::Left)), 8);

    graph.reset_anchor(id(w[0], AnchorType::Left));
    graph.reset_anchor(id(w[1], AnchorType::Left));
    assert!(!graph.anchor(id(root, AnchorType::Left)).unwrap().has_dependents());
}

#[test]
fn test_reconnecting_moves_the_dependent() {
    let (mut graph, root, w) = siblings(2);
    assert!(graph.connect(id(w[0], AnchorType::Left), id(root, AnchorType::Left), 0));
    assert!(graph.connect(id(w[0], AnchorType::Left), id(w[1], AnchorType::Right), 4));

    assert!(!graph.anchor(id(root, AnchorType::Left)).unwrap().has_dependents());
    assert_eq!(
        graph[w[0]].anchor(AnchorType::Left).target(),
        Some(id(w[1], AnchorType::Right))
    );
}

#[test]
fn test_incompatible_types_leave_graph_untouched() {
    let (mut graph, root, w) = siblings(1);
    let err = graph
        .try_connect(id(w[0], AnchorType::Left), id(root, AnchorType::Top), 0, None)
        .unwrap_err();
    assert_eq!(err, ConnectError::incompatible(AnchorType::Left, AnchorType::Top));
    assert!(!graph[w[0]].anchor(AnchorType::Left).is_connected());
    assert!(!graph.anchor(id(root, AnchorType::Top)).unwrap().has_dependents());

    assert!(!graph.connect(id(w[0], AnchorType::Baseline), id(root, AnchorType::Left), 0));
}

#[test]
fn test_cycle_through_third_widget_is_rejected() {
    let (mut graph, _, w) = siblings(3);
    assert!(graph.connect(id(w[0], AnchorType::Left), id(w[1], AnchorType::Right), 0));
    assert!(graph.connect(id(w[1], AnchorType::Left), id(w[2], AnchorType::Right), 0));

    let err = graph
        .try_connect(id(w[2], AnchorType::Left), id(w[0], AnchorType::Right), 0, None)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("connecting {}.left to {}.right would create a cycle", w[2], w[0])
    );
    assert!(!graph[w[2]].anchor(AnchorType::Left).is_connected());
}

#[test]
fn test_binary_pair_is_allowed() {
    let (mut graph, _, w) = siblings(2);
    assert!(graph.connect(id(w[0], AnchorType::Right), id(w[1], AnchorType::Left), 0));
    assert!(graph.connect(id(w[1], AnchorType::Left), id(w[0], AnchorType::Right), 0));
}

#[test]
fn test_deep_cycle_check_does_not_overflow() {
    let (mut graph, _, w) = siblings(10_000);
    for pair in w.windows(2) {
        let (source, target) = (id(pair[1], AnchorType::Left), id(pair[0], AnchorType::Right));
        assert!(graph.force_connect(source, target, 0, None));
    }
    let last = w[w.len() - 1];
    let err = graph
        .try_connect(id(w[0], AnchorType::Left), id(last, AnchorType::Right), 0, None)
        .unwrap_err();
    assert!(matches!(err, ConnectError::WouldCycle { .. }));
}

#[test]
fn test_targets_must_be_reachable() {
    let mut graph = LayoutGraph::new();
    let root = graph.add_root();
    let inner = graph.add_container(root).unwrap();
    let nested = graph.add_leaf(inner).unwrap();
    let outer = graph.add_leaf(root).unwrap();

    // into a sibling's subtree is fine
    assert!(graph.connect(id(outer, AnchorType::Left), id(nested, AnchorType::Right), 0));

    let err = graph
        .try_connect(id(nested, AnchorType::Top), id(outer, AnchorType::Bottom), 0, None)
        .unwrap_err();
    assert!(matches!(err, ConnectError::NotReachable { .. }));

    // the parent is always reachable
    assert!(graph.connect(id(nested, AnchorType::Top), id(inner, AnchorType::Top), 0));
}

#[test]
fn test_center_fans_out_and_resets() {
    let (mut graph, root, w) = siblings(1);
    assert!(graph.connect_widgets(w[0], AnchorType::Center, root, AnchorType::Center, 0));
    for (kind, target) in [
        (AnchorType::Left, AnchorType::Left),
        (AnchorType::Right, AnchorType::Right),
        (AnchorType::Top, AnchorType::Top),
        (AnchorType::Bottom, AnchorType::Bottom),
    ] {
        assert_eq!(graph[w[0]].anchor(kind).target(), Some(id(root, target)));
    }

    // the sides point at different anchors, so only CENTER itself goes
    graph.reset_anchor(id(w[0], AnchorType::Center));
    assert!(!graph[w[0]].anchor(AnchorType::Center).is_connected());
    assert!(graph[w[0]].anchor(AnchorType::Left).is_connected());
}

#[test]
fn test_reset_center_detaches_sides_sharing_a_target() {
    let (mut graph, _, w) = siblings(2);
    assert!(graph.connect_widgets(w[0], AnchorType::Center, w[1], AnchorType::Left, 0));
    assert_eq!(graph[w[0]].anchor(AnchorType::Left).target(), Some(id(w[1], AnchorType::Left)));
    assert_eq!(graph[w[0]].anchor(AnchorType::Right).target(), Some(id(w[1], AnchorType::Left)));

    graph[w[0]].set_bias(anchor_layout::Axis::Horizontal, 0.2);
    graph.reset_anchor(id(w[0], AnchorType::Center));
    for kind in [AnchorType::Left, AnchorType::Right, AnchorType::Center] {
        assert!(!graph[w[0]].anchor(kind).is_connected());
    }
    assert_eq!(graph[w[0]].bias(anchor_layout::Axis::Horizontal), 0.5);
    assert!(!graph.anchor(id(w[1], AnchorType::Left)).unwrap().has_dependents());
}

#[test]
fn test_reset_widget_clears_outgoing_connections() {
    let (mut graph, root, w) = siblings(2);
    assert!(graph.connect(id(w[0], AnchorType::Left), id(root, AnchorType::Left), 0));
    assert!(graph.connect(id(w[1], AnchorType::Left), id(w[0], AnchorType::Right), 10));

    graph.reset_widget(w[0]);
    assert!(!graph[w[0]].anchor(AnchorType::Left).is_connected());
    assert!(!graph.anchor(id(root, AnchorType::Left)).unwrap().has_dependents());
}
