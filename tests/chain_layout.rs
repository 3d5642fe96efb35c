//! Integration tests for chains of widgets.

use anchor_layout::{
    AnchorId, AnchorType, Axis, ChainStyle, DimensionBehavior, LayoutGraph, Rect, Visibility,
    WidgetId,
};
use pretty_assertions::assert_eq;

fn id(widget: WidgetId, kind: AnchorType) -> AnchorId {
    AnchorId::new(widget, kind)
}

/// A 300 x 100 root with `widths.len()` children of height 20 chained
/// horizontally between its left and right edges.
fn horizontal_chain(width: i32, widths: &[i32]) -> (LayoutGraph, WidgetId, Vec<WidgetId>) {
    let mut graph = LayoutGraph::new();
    let root = graph.add_root();
    graph[root].set_size(width, 100);
    let members: Vec<WidgetId> = widths
        .iter()
        .map(|w| {
            let child = graph.add_leaf(root).unwrap();
            graph[child].set_size(*w, 20);
            child
        })
        .collect();

    assert!(graph.connect(id(members[0], AnchorType::Left), id(root, AnchorType::Left), 0));
    for pair in members.windows(2) {
        assert!(graph.connect(id(pair[0], AnchorType::Right), id(pair[1], AnchorType::Left), 0));
        assert!(graph.connect(id(pair[1], AnchorType::Left), id(pair[0], AnchorType::Right), 0));
    }
    let last = members[members.len() - 1];
    assert!(graph.connect(id(last, AnchorType::Right), id(root, AnchorType::Right), 0));
    (graph, root, members)
}

fn xs(graph: &LayoutGraph, members: &[WidgetId]) -> Vec<i32> {
    members.iter().map(|m| graph[*m].x()).collect()
}

#[test]
fn test_chain_is_detected() {
    let (graph, _, members) = horizontal_chain(300, &[50, 50, 50]);
    assert!(graph.is_chain_head(members[0], Axis::Horizontal));
    assert!(!graph.is_chain_head(members[1], Axis::Horizontal));
    assert_eq!(graph.next_in_chain(members[0], Axis::Horizontal), Some(members[1]));
    assert!(!graph.is_in_chain(members[0], Axis::Vertical));
}

#[test]
fn test_match_constraint_members_share_space_equally() {
    let (mut graph, root, members) = horizontal_chain(300, &[0, 0]);
    for m in &members {
        graph[*m].set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint);
    }
    let report = graph.layout_with_frames(root).unwrap();
    assert!(report.converged);
    assert_eq!(graph[members[0]].frame(), Rect::new(0, 0, 150, 20));
    assert_eq!(graph[members[1]].frame(), Rect::new(150, 0, 150, 20));
}

#[test]
fn test_weights_split_space_proportionally() {
    let (mut graph, root, members) = horizontal_chain(300, &[0, 0]);
    for (m, weight) in members.iter().zip([2.0, 1.0]) {
        graph[*m]
            .set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint)
            .set_weight(Axis::Horizontal, Some(weight));
    }
    graph.layout_with_frames(root).unwrap();
    assert_eq!(graph[members[0]].width(), 200);
    assert_eq!(graph[members[1]].width(), 100);
    assert_eq!(graph[members[1]].x(), 200);
}

#[test]
fn test_spread_distributes_free_space() {
    let (mut graph, root, members) = horizontal_chain(280, &[40, 40, 40]);
    graph.layout_with_frames(root).unwrap();
    assert_eq!(xs(&graph, &members), vec![40, 120, 200]);
}

#[test]
fn test_spread_inside_pins_the_ends() {
    let (mut graph, root, members) = horizontal_chain(300, &[50, 50, 50]);
    graph[members[0]].set_chain_style(Axis::Horizontal, ChainStyle::SpreadInside);
    graph.layout_with_frames(root).unwrap();
    assert_eq!(xs(&graph, &members), vec![0, 125, 250]);
}

#[test]
fn test_packed_chain_is_centered() {
    let (mut graph, root, members) = horizontal_chain(300, &[50, 50, 50]);
    graph[members[0]].set_chain_style(Axis::Horizontal, ChainStyle::Packed);
    graph.layout_with_frames(root).unwrap();
    assert_eq!(xs(&graph, &members), vec![75, 125, 175]);

    let frames: Vec<String> = members.iter().map(|m| graph[*m].frame().to_string()).collect();
    insta::assert_snapshot!(frames.join("\n"), @r"
    [75, 0, 50 x 20]
    [125, 0, 50 x 20]
    [175, 0, 50 x 20]
    ");
}

#[test]
fn test_packed_chain_follows_head_bias() {
    let (mut graph, root, members) = horizontal_chain(300, &[50, 50, 50]);
    graph[members[0]]
        .set_chain_style(Axis::Horizontal, ChainStyle::Packed)
        .set_bias(Axis::Horizontal, 0.0);
    graph.layout_with_frames(root).unwrap();
    assert_eq!(xs(&graph, &members), vec![0, 50, 100]);
}

#[test]
fn test_gone_member_collapses() {
    let (mut graph, root, members) = horizontal_chain(300, &[0, 0, 0]);
    for m in &members {
        graph[*m].set_behavior(Axis::Horizontal, DimensionBehavior::MatchConstraint);
    }
    graph[members[1]].set_visibility(Visibility::Gone);
    graph.layout_with_frames(root).unwrap();

    assert_eq!(graph[members[1]].width(), 0);
    assert_eq!(graph[members[0]].width(), 150);
    assert_eq!(graph[members[2]].width(), 150);
    assert_eq!(graph[members[2]].x(), 150);
}
