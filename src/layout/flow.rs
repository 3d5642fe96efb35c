//! Flow helpers
//!
//! A flow arranges its references into rows (or columns, for a vertical
//! flow) before the container is solved. Each row becomes a chain between
//! the flow's padded edges; the tallest member of each row anchors the row
//! on the cross axis and the other members align to it. After wiring, the
//! references are ordinary chain members and the solver does the rest.

use crate::model::{
    AnchorId, AnchorType, ChainStyle, DimensionBehavior, Flow, FlowAlign, FlowWrap, LayoutGraph,
    WidgetId, WidgetKind,
};

use super::types::Axis;

/// Rows of references, in order
type Rows = Vec<Vec<WidgetId>>;

/// Wire the references of every flow of `scope`. Returns the number of flows.
pub(crate) fn prepare_flows(graph: &mut LayoutGraph, scope: WidgetId, wrap: [bool; 2]) -> usize {
    let flows: Vec<(WidgetId, Flow)> = graph
        .children(scope)
        .iter()
        .filter_map(|id| match &graph[*id].kind {
            WidgetKind::Flow(flow) => Some((*id, flow.clone())),
            _ => None,
        })
        .collect();

    for (id, flow) in &flows {
        prepare_flow(graph, scope, wrap, *id, flow);
    }
    flows.len()
}

fn prepare_flow(
    graph: &mut LayoutGraph,
    scope: WidgetId,
    wrap: [bool; 2],
    id: WidgetId,
    flow: &Flow,
) {
    let refs: Vec<WidgetId> = flow
        .references()
        .iter()
        .copied()
        .filter(|r| *r != id && graph.widget(*r).is_some_and(|w| w.parent == Some(scope)))
        .collect();
    for r in &refs {
        graph.detach_all(*r);
    }
    let refs: Vec<WidgetId> = refs.into_iter().filter(|r| !graph[*r].is_gone()).collect();

    let main = flow.orientation();
    let cross = main.opposite();
    let available = available_span(graph, scope, wrap, id, flow, main);

    let (rows, columns): (Rows, Option<Vec<WidgetId>>) = match flow.wrap() {
        FlowWrap::None => (vec![refs.clone()], None),
        FlowWrap::Chain => (chain_rows(graph, &refs, flow, main, available), None),
        FlowWrap::Aligned => {
            let count = aligned_columns(graph, &refs, flow, main, available);
            let rows: Rows = refs.chunks(count.max(1)).map(|c| c.to_vec()).collect();
            let columns = (0..count)
                .filter_map(|c| {
                    let column: Vec<WidgetId> =
                        rows.iter().filter_map(|row| row.get(c).copied()).collect();
                    largest(graph, &column, main)
                })
                .collect();
            (rows, Some(columns))
        }
    };
    tracing::debug!(
        flow = %id,
        references = refs.len(),
        rows = rows.len(),
        available,
        "flow prepared"
    );
    if rows.iter().all(|row| row.is_empty()) {
        size_wrapped_flow(graph, id, flow, 0, 0);
        return;
    }

    // Main axis
    match &columns {
        None => {
            let last = rows.len() - 1;
            for (index, row) in rows.iter().enumerate() {
                let (style, bias) = line_style(flow, main, index, last);
                wire_line(graph, id, flow, main, row, style, bias);
            }
        }
        Some(columns) => {
            let (style, bias) = (flow.style[main.index()], flow.bias[main.index()]);
            wire_line(graph, id, flow, main, columns, style, bias);
            for row in &rows {
                for (c, member) in row.iter().enumerate() {
                    if let Some(anchor) = columns.get(c).filter(|a| *a != member) {
                        align(graph, *member, *anchor, main, FlowAlign::Center);
                    }
                }
            }
        }
    }

    // Cross axis: the tallest member of each row stands for the row
    let anchors: Vec<WidgetId> = rows
        .iter()
        .filter_map(|row| largest(graph, row, cross))
        .collect();
    let (style, bias) = (flow.style[cross.index()], flow.bias[cross.index()]);
    wire_line(graph, id, flow, cross, &anchors, style, bias);
    for (row, anchor) in rows.iter().zip(&anchors) {
        for member in row.iter().filter(|m| *m != anchor) {
            align(graph, *member, *anchor, cross, flow.align[cross.index()]);
        }
    }

    let main_extent = match &columns {
        Some(columns) => line_extent(graph, columns, flow.gap(main), main),
        None => rows
            .iter()
            .map(|row| line_extent(graph, row, flow.gap(main), main))
            .max()
            .unwrap_or(0),
    };
    let cross_extent = line_extent(graph, &anchors, flow.gap(cross), cross);
    size_wrapped_flow(graph, id, flow, main_extent, cross_extent);
}

/// First member with the largest extent on `axis`
fn largest(graph: &LayoutGraph, members: &[WidgetId], axis: Axis) -> Option<WidgetId> {
    let mut best: Option<(WidgetId, i32)> = None;
    for &m in members {
        let length = graph[m].length(axis);
        if best.map_or(true, |(_, l)| length > l) {
            best = Some((m, length));
        }
    }
    best.map(|(m, _)| m)
}

/// Span available to one row, inside the padding
fn available_span(
    graph: &LayoutGraph,
    scope: WidgetId,
    wrap: [bool; 2],
    id: WidgetId,
    flow: &Flow,
    axis: Axis,
) -> i32 {
    let widget = &graph[id];
    let outer = match widget.behavior(axis) {
        DimensionBehavior::Fixed => Some(widget.frame.extent(axis)),
        _ if !wrap[axis.index()] => {
            let margins = widget.begin(axis).raw_margin() + widget.end(axis).raw_margin();
            Some(graph[scope].frame.extent(axis) - margins)
        }
        _ => {
            let bound = graph[scope].max_size(axis);
            (bound < i32::MAX).then_some(bound)
        }
    };
    match outer {
        Some(span) => (span - flow.padding_begin(axis) - flow.padding_end(axis)).max(0),
        None => i32::MAX,
    }
}

/// Extent of members laid end to end with gaps
fn line_extent(graph: &LayoutGraph, line: &[WidgetId], gap: i32, axis: Axis) -> i32 {
    let sum: i32 = line.iter().map(|w| graph[*w].length(axis)).sum();
    sum + gap * (line.len() as i32 - 1).max(0)
}

/// Greedy rows: a new row starts when the next member would overflow
fn chain_rows(
    graph: &LayoutGraph,
    refs: &[WidgetId],
    flow: &Flow,
    main: Axis,
    available: i32,
) -> Rows {
    let gap = flow.gap(main);
    let mut rows: Rows = Vec::new();
    let mut current: Vec<WidgetId> = Vec::new();
    let mut used = 0i32;
    for &r in refs {
        let length = graph[r].length(main);
        let needed = if current.is_empty() {
            length
        } else {
            used.saturating_add(gap).saturating_add(length)
        };
        let full = flow.max_elements > 0 && current.len() >= flow.max_elements;
        if !current.is_empty() && (needed > available || full) {
            rows.push(std::mem::take(&mut current));
            used = length;
        } else {
            used = needed;
        }
        current.push(r);
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Largest column count whose widest cells and gaps fit
fn aligned_columns(
    graph: &LayoutGraph,
    refs: &[WidgetId],
    flow: &Flow,
    main: Axis,
    available: i32,
) -> usize {
    let mut count = if flow.max_elements > 0 {
        flow.max_elements.min(refs.len())
    } else {
        refs.len()
    };
    while count > 1 {
        let mut widths = vec![0; count];
        for (i, r) in refs.iter().enumerate() {
            let c = i % count;
            widths[c] = widths[c].max(graph[*r].length(main));
        }
        let total = widths.iter().sum::<i32>() + flow.gap(main) * (count as i32 - 1);
        if total <= available {
            break;
        }
        count -= 1;
    }
    count.max(1)
}

fn line_style(flow: &Flow, axis: Axis, index: usize, last: usize) -> (ChainStyle, f32) {
    let i = axis.index();
    let (style, bias) = if index == 0 {
        (flow.first_style[i], flow.first_bias[i])
    } else if index == last {
        (flow.last_style[i], flow.last_bias[i])
    } else {
        (None, None)
    };
    (style.unwrap_or(flow.style[i]), bias.unwrap_or(flow.bias[i]))
}

/// Chain `line` between the flow's padded edges on `axis`
fn wire_line(
    graph: &mut LayoutGraph,
    flow_id: WidgetId,
    flow: &Flow,
    axis: Axis,
    line: &[WidgetId],
    style: ChainStyle,
    bias: f32,
) {
    let (Some(first), Some(last)) = (line.first().copied(), line.last().copied()) else {
        return;
    };
    let begin = AnchorType::begin(axis);
    let end = AnchorType::end(axis);
    let a = AnchorId::new;

    graph.force_connect(a(first, begin), a(flow_id, begin), flow.padding_begin(axis), None);
    for pair in line.windows(2) {
        graph.force_connect(a(pair[0], end), a(pair[1], begin), 0, None);
        graph.force_connect(a(pair[1], begin), a(pair[0], end), flow.gap(axis), None);
    }
    graph.force_connect(a(last, end), a(flow_id, end), flow.padding_end(axis), None);
    graph[first].set_chain_style(axis, style).set_bias(axis, bias);
}

/// Align `member` to `anchor` on `axis`
fn align(graph: &mut LayoutGraph, member: WidgetId, anchor: WidgetId, axis: Axis, mode: FlowAlign) {
    let begin = AnchorType::begin(axis);
    let end = AnchorType::end(axis);
    let a = AnchorId::new;
    let baseline =
        axis == Axis::Vertical && graph[member].has_baseline() && graph[anchor].has_baseline();
    match mode {
        FlowAlign::Start => {
            graph.force_connect(a(member, begin), a(anchor, begin), 0, None);
        }
        FlowAlign::End => {
            graph.force_connect(a(member, end), a(anchor, end), 0, None);
        }
        FlowAlign::Baseline if baseline => {
            graph.force_connect(
                a(member, AnchorType::Baseline),
                a(anchor, AnchorType::Baseline),
                0,
                None,
            );
        }
        FlowAlign::Center | FlowAlign::Baseline => {
            graph.force_connect(a(member, begin), a(anchor, begin), 0, None);
            graph.force_connect(a(member, end), a(anchor, end), 0, None);
        }
    }
}

/// A wrap-content flow takes the size of its content plus padding
fn size_wrapped_flow(
    graph: &mut LayoutGraph,
    id: WidgetId,
    flow: &Flow,
    main_extent: i32,
    cross_extent: i32,
) {
    let main = flow.orientation();
    let cross = main.opposite();
    for (axis, content) in [(main, main_extent), (cross, cross_extent)] {
        if graph[id].behavior(axis) == DimensionBehavior::WrapContent {
            let extent = content + flow.padding_begin(axis) + flow.padding_end(axis);
            graph[id].set_extent(axis, extent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow_graph(
        wrap: FlowWrap,
        count: usize) -> (LayoutGraph, WidgetId, WidgetId, Vec<WidgetId>,
    ) {
        let mut graph = LayoutGraph::new();
        let root = graph.add_root();
        graph[root].set_size(400, 400);
        let refs: Vec<WidgetId> = (0..count)
            .map(|_| {
                let w = graph.add_leaf(root).unwrap();
                graph[w].set_size(100, 40);
                w
            })
            .collect();
        let flow = graph
            .add_flow(
                root,
                Flow::new(Axis::Horizontal)
                    .with_wrap(wrap)
                    .with_references(refs.clone()),
            )
            .unwrap();
        graph[flow].set_size(250, 200);
        (graph, root, flow, refs)
    }

    #[test]
    fn test_chain_rows_break_on_overflow() {
        let (graph, _, flow, refs) = flow_graph(FlowWrap::Chain, 3);
        let settings = Flow::new(Axis::Horizontal).with_gap(10, 0);
        let rows = chain_rows(&graph, &refs, &settings, Axis::Horizontal, 250);
        assert_eq!(rows, vec![vec![refs[0], refs[1]], vec![refs[2]]]);

        let limited = Flow::new(Axis::Horizontal).with_max_elements(1);
        assert_eq!(chain_rows(&graph, &refs, &limited, Axis::Horizontal, 1000).len(), 3);
        assert!(graph.contains(flow));
    }

    #[test]
    fn test_aligned_columns_shrink_to_fit() {
        let (graph, _, _, refs) = flow_graph(FlowWrap::Aligned, 5);
        let settings = Flow::new(Axis::Horizontal).with_gap(20, 0);
        assert_eq!(aligned_columns(&graph, &refs, &settings, Axis::Horizontal, 340), 3);
        assert_eq!(aligned_columns(&graph, &refs, &settings, Axis::Horizontal, 50), 1);
    }

    #[test]
    fn test_prepare_wires_rows_into_chains() {
        let (mut graph, root, flow, refs) = flow_graph(FlowWrap::Chain, 3);
        assert_eq!(prepare_flows(&mut graph, root, [false, false]), 1);

        let left = |w| AnchorId::new(w, AnchorType::Left);
        let right = |w| AnchorId::new(w, AnchorType::Right);
        assert_eq!(graph[refs[0]].anchor(AnchorType::Left).target(), Some(left(flow)));
        assert_eq!(graph[refs[1]].anchor(AnchorType::Left).target(), Some(right(refs[0])));
        assert_eq!(graph[refs[1]].anchor(AnchorType::Right).target(), Some(right(flow)));
        assert!(graph.is_chain_head(refs[0], Axis::Horizontal));
        // second row anchor hangs below the first
        assert_eq!(
            graph[refs[2]].anchor(AnchorType::Top).target(),
            Some(AnchorId::new(refs[0], AnchorType::Bottom))
        );
        // row members align to the row anchor
        assert_eq!(
            graph[refs[1]].anchor(AnchorType::Top).target(),
            Some(AnchorId::new(refs[0], AnchorType::Top))
        );
    }

    #[test]
    fn test_wrap_flow_sizes_itself() {
        let (mut graph, root, flow, _) = flow_graph(FlowWrap::None, 2);
        graph[flow].set_behaviors(DimensionBehavior::WrapContent, DimensionBehavior::WrapContent);
        if let Some(settings) = graph.flow_mut(flow) {
            settings.gap = [10, 0];
            settings.padding = [5, 5, 5, 5];
        }
        prepare_flows(&mut graph, root, [false, false]);
        assert_eq!(graph[flow].width(), 220);
        assert_eq!(graph[flow].height(), 50);
    }
}
