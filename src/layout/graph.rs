//! Relationship graph between plot regions
//!
//! Two kinds of groups link axes together:
//!
//! - share groups, one disjoint-set forest per axis direction, whose members
//!   synchronize their limits and show tick labels on a single leader;
//! - span groups, explicit member lists with one owner that draws a single
//!   axis label centered over the combined extent.
//!
//! Groups only ever grow. Nodes never touch group state directly; every
//! mutation goes through the link operations here.

use tracing::debug;

use super::axes::{AxesNode, Capability};
use super::error::LayoutError;
use super::types::{AxesId, Axis, BoundingBox, Side};

/// Union-find over axes indices with a designated leader per root
#[derive(Debug, Clone, Default)]
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
    leader: Vec<usize>,
}

impl DisjointSet {
    fn push(&mut self) {
        let index = self.parent.len();
        self.parent.push(index);
        self.size.push(1);
        self.leader.push(index);
    }

    fn root(&self, mut index: usize) -> usize {
        while self.parent[index] != index {
            index = self.parent[index];
        }
        index
    }

    fn compress(&mut self, index: usize) -> usize {
        let root = self.root(index);
        let mut current = index;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`; the merged set keeps the leader of `b`.
    /// Returns false when both were already in one set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.compress(a);
        let rb = self.compress(b);
        if ra == rb {
            return false;
        }
        let leader = self.leader[rb];
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        self.leader[big] = leader;
        true
    }

    fn leader(&self, index: usize) -> usize {
        self.leader[self.root(index)]
    }

    fn len_of(&self, index: usize) -> usize {
        self.size[self.root(index)]
    }
}

/// Axes sharing a single axis label
#[derive(Debug, Clone, PartialEq)]
pub struct SpanGroup {
    pub axis: Axis,
    pub members: Vec<AxesId>,
    pub owner: AxesId,
    /// Combined (min, max) extent of the members, canvas fractions
    pub extent: Option<(f64, f64)>,
}

impl SpanGroup {
    /// Center of the combined extent
    pub fn midpoint(&self) -> Option<f64> {
        self.extent.map(|(lo, hi)| (lo + hi) / 2.0)
    }
}

/// All axes of a figure together with their share and span groups
#[derive(Debug, Clone, Default)]
pub struct AxesGraph {
    nodes: Vec<AxesNode>,
    share: [DisjointSet; 2],
    spans: Vec<SpanGroup>,
}

impl AxesGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next inserted node must carry
    pub fn next_id(&self) -> AxesId {
        AxesId(self.nodes.len())
    }

    pub fn insert(&mut self, node: AxesNode) -> AxesId {
        debug_assert_eq!(node.id, self.next_id());
        let id = node.id;
        self.nodes.push(node);
        for set in &mut self.share {
            set.push();
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: AxesId) -> Result<&AxesNode, LayoutError> {
        self.nodes.get(id.0).ok_or(LayoutError::UnknownAxes(id))
    }

    pub fn node_mut(&mut self, id: AxesId) -> Result<&mut AxesNode, LayoutError> {
        self.nodes.get_mut(id.0).ok_or(LayoutError::UnknownAxes(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxesNode> {
        self.nodes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AxesNode> {
        self.nodes.iter_mut()
    }

    pub fn spans(&self) -> &[SpanGroup] {
        &self.spans
    }

    pub fn span(&self, index: usize) -> Option<&SpanGroup> {
        self.spans.get(index)
    }

    /// Link two axes on one axis direction.
    ///
    /// Merges both share groups; the result keeps the leader of `b`'s group.
    /// Panels on the sides running across `axis` are linked pairwise, so that
    /// composites of axes and panels stay aligned.
    pub fn link_share(&mut self, axis: Axis, a: AxesId, b: AxesId) -> Result<(), LayoutError> {
        if a == b {
            return Err(LayoutError::link(
                axis,
                format!("{} cannot be linked to itself", a),
            ));
        }
        for id in [a, b] {
            let node = self.node(id)?;
            if !node.kind.supports(Capability::Share) {
                return Err(LayoutError::link(
                    axis,
                    format!("{} does not support sharing", node),
                ));
            }
        }
        self.merge(axis, a, b)
    }

    fn merge(&mut self, axis: Axis, a: AxesId, b: AxesId) -> Result<(), LayoutError> {
        if !self.share[axis.index()].union(a.0, b.0) {
            return Ok(());
        }
        debug!(
            "linked {} axis of {} and {}; leader {}",
            axis,
            a,
            b,
            self.share_leader(axis, b)
        );

        let parallel: Vec<(AxesId, AxesId)> = Side::ALL
            .iter()
            .filter(|side| side.axis_along() != axis)
            .filter_map(|side| {
                let pa = self.nodes[a.0].panel(*side)?;
                let pb = self.nodes[b.0].panel(*side)?;
                Some((pa, pb))
            })
            .collect();
        for (pa, pb) in parallel {
            self.merge(axis, pa, pb)?;
        }
        Ok(())
    }

    /// Register a freshly created panel with its parent.
    ///
    /// The panel joins the parent's share group along the axis it runs
    /// along, keeping the parent group's leader, and is linked with the
    /// same-side panels of everything the parent shares the other axis with.
    pub fn attach_panel(&mut self, parent: AxesId, panel: AxesId) -> Result<(), LayoutError> {
        let side = match self.node(panel)?.panel_of() {
            Some((Some(owner), side)) if owner == parent => side,
            _ => {
                return Err(LayoutError::configuration(format!(
                    "{} is not a panel of {}",
                    panel, parent
                )))
            }
        };
        self.node_mut(parent)?.panels.insert(side, panel);

        let along = side.axis_along();
        self.share[along.index()].union(panel.0, parent.0);

        let across = side.axis_across();
        let partners: Vec<AxesId> = self
            .members(across, parent)
            .into_iter()
            .filter(|id| *id != parent)
            .filter_map(|id| self.nodes[id.0].panel(side))
            .collect();
        for partner in partners {
            self.merge(across, panel, partner)?;
        }
        Ok(())
    }

    /// Members of the share group containing `id`, in id order
    pub fn members(&self, axis: Axis, id: AxesId) -> Vec<AxesId> {
        let set = &self.share[axis.index()];
        if id.0 >= set.parent.len() {
            return Vec::new();
        }
        let root = set.root(id.0);
        (0..set.parent.len())
            .filter(|i| set.root(*i) == root)
            .map(AxesId)
            .collect()
    }

    pub fn same_share_group(&self, axis: Axis, a: AxesId, b: AxesId) -> bool {
        let set = &self.share[axis.index()];
        a.0 < set.parent.len() && b.0 < set.parent.len() && set.root(a.0) == set.root(b.0)
    }

    /// Tick-label-bearing member of the share group containing `id`
    pub fn share_leader(&self, axis: Axis, id: AxesId) -> AxesId {
        AxesId(self.share[axis.index()].leader(id.0))
    }

    /// Number of axes in the share group containing `id`
    pub fn share_group_len(&self, axis: Axis, id: AxesId) -> usize {
        self.share[axis.index()].len_of(id.0)
    }

    /// Create a span group. Linking an identical group again is a no-op.
    pub fn link_span(
        &mut self,
        axis: Axis,
        members: &[AxesId],
        owner: AxesId,
    ) -> Result<usize, LayoutError> {
        let mut members = members.to_vec();
        members.sort();
        members.dedup();
        if !members.contains(&owner) {
            return Err(LayoutError::link(
                axis,
                format!("span owner {} is not a member of the group", owner),
            ));
        }
        for id in &members {
            self.node(*id)?;
        }

        for id in &members {
            if let Some(existing) = self.nodes[id.0].span[axis.index()] {
                let group = &self.spans[existing];
                if group.members == members && group.owner == owner {
                    return Ok(existing);
                }
                return Err(LayoutError::link(
                    axis,
                    format!("{} already belongs to another span group", id),
                ));
            }
        }

        let index = self.spans.len();
        for id in &members {
            self.nodes[id.0].span[axis.index()] = Some(index);
        }
        debug!(
            "span group {} on {} axis: {} members, owner {}",
            index,
            axis,
            members.len(),
            owner
        );
        self.spans.push(SpanGroup {
            axis,
            members,
            owner,
            extent: None,
        });
        Ok(index)
    }

    /// Recompute a span group's combined extent from the current member
    /// boxes and move the owner's label to its midpoint
    pub fn refresh_span<F>(&mut self, index: usize, locate: F) -> Result<f64, LayoutError>
    where
        F: Fn(AxesId) -> Result<BoundingBox, LayoutError>,
    {
        let group = self.spans.get(index).ok_or_else(|| {
            LayoutError::configuration(format!("unknown span group {}", index))
        })?;
        let axis = group.axis;
        let mut extent: Option<(f64, f64)> = None;
        for id in &group.members {
            let (lo, hi) = locate(*id)?.interval(axis);
            extent = Some(match extent {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
        let (lo, hi) = extent.ok_or_else(|| LayoutError::link(axis, "empty span group"))?;
        let midpoint = (lo + hi) / 2.0;
        let owner = group.owner;

        self.spans[index].extent = Some((lo, hi));
        self.nodes[owner.0].axes[axis.index()].span_label_at = Some(midpoint);
        debug!(
            "refreshed span group {} on {} axis: extent ({:.4}, {:.4}), label at {:.4}",
            index, axis, lo, hi, midpoint
        );
        Ok(midpoint)
    }

    /// Whether `id` draws numeric tick labels on an axis
    pub fn tick_labels_visible(&self, axis: Axis, id: AxesId) -> bool {
        match self.nodes.get(id.0) {
            Some(node) if node.kind.supports(Capability::TickLabels) => {
                self.share_leader(axis, id) == id
            }
            _ => false,
        }
    }

    /// Whether `id` draws its axis label. Span ownership overrides sharing.
    pub fn axis_label_visible(&self, axis: Axis, id: AxesId) -> bool {
        let Some(node) = self.nodes.get(id.0) else {
            return false;
        };
        if !node.is_drawn() {
            return false;
        }
        match node.span_group(axis) {
            Some(group) => self.spans[group].owner == id && self.axis_label_text(axis, id).is_some(),
            None => node.axis(axis).label.as_ref().is_some_and(|l| !l.is_empty()),
        }
    }

    /// Label text drawn by `id`: its own label, or for a span owner the
    /// first label set among the group members
    pub fn axis_label_text(&self, axis: Axis, id: AxesId) -> Option<&str> {
        let node = self.nodes.get(id.0)?;
        let own = node.axis(axis).label.as_deref().filter(|l| !l.is_empty());
        match node.span_group(axis) {
            Some(group) if self.spans[group].owner == id => own.or_else(|| {
                self.spans[group].members.iter().find_map(|member| {
                    self.nodes[member.0]
                        .axis(axis)
                        .label
                        .as_deref()
                        .filter(|l| !l.is_empty())
                })
            }),
            Some(_) => None,
            None => own,
        }
    }

    /// Give every data-bearing member of each share group the union of the
    /// group's data limits
    pub fn sync_limits(&mut self, axis: Axis) {
        let set = &self.share[axis.index()];
        let mut union: Vec<Option<(f64, f64)>> = vec![None; self.nodes.len()];
        for node in &self.nodes {
            let root = set.root(node.id.0);
            if let Some((lo, hi)) = node.axis(axis).data_limits {
                union[root] = Some(match union[root] {
                    Some((min, max)) => (min.min(lo), max.max(hi)),
                    None => (lo, hi),
                });
            }
        }
        for index in 0..self.nodes.len() {
            let root = self.share[axis.index()].root(index);
            let node = &mut self.nodes[index];
            if node.kind.supports(Capability::PlotData) {
                node.axes[axis.index()].view_limits = union[root];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::axes::AxesKind;
    use crate::layout::types::{CellRef, CellSpan, GridId};
    use pretty_assertions::assert_eq;

    fn graph_with(kinds: &[AxesKind]) -> AxesGraph {
        let mut graph = AxesGraph::new();
        for (i, kind) in kinds.iter().enumerate() {
            let cell = CellRef::new(GridId(0), CellSpan::at(0, i));
            graph.insert(AxesNode::new(AxesId(i), *kind, cell.clone(), cell));
        }
        graph
    }

    fn cartesian(n: usize) -> AxesGraph {
        graph_with(&vec![AxesKind::Cartesian; n])
    }

    #[test]
    fn test_share_is_transitive() {
        let mut graph = cartesian(3);
        graph.link_share(Axis::X, AxesId(0), AxesId(1)).unwrap();
        graph.link_share(Axis::X, AxesId(1), AxesId(2)).unwrap();
        assert!(graph.same_share_group(Axis::X, AxesId(0), AxesId(2)));
        assert!(!graph.same_share_group(Axis::Y, AxesId(0), AxesId(2)));
    }

    #[test]
    fn test_relink_is_noop() {
        let mut graph = cartesian(2);
        graph.link_share(Axis::Y, AxesId(0), AxesId(1)).unwrap();
        graph.link_share(Axis::Y, AxesId(1), AxesId(0)).unwrap();
        assert_eq!(graph.share_group_len(Axis::Y, AxesId(0)), 2);
        assert_eq!(graph.share_leader(Axis::Y, AxesId(0)), AxesId(1));
    }

    #[test]
    fn test_leader_comes_from_b_group() {
        let mut graph = cartesian(4);
        graph.link_share(Axis::X, AxesId(0), AxesId(1)).unwrap();
        graph.link_share(Axis::X, AxesId(2), AxesId(3)).unwrap();
        graph.link_share(Axis::X, AxesId(3), AxesId(0)).unwrap();
        assert_eq!(graph.share_leader(Axis::X, AxesId(2)), AxesId(1));
        assert!(graph.tick_labels_visible(Axis::X, AxesId(1)));
        assert!(!graph.tick_labels_visible(Axis::X, AxesId(3)));
    }

    #[test]
    fn test_self_link_is_rejected() {
        let mut graph = cartesian(1);
        let err = graph.link_share(Axis::X, AxesId(0), AxesId(0)).unwrap_err();
        assert!(matches!(err, LayoutError::Link { axis: Axis::X, .. }));
    }

    #[test]
    fn test_geographic_axes_cannot_share() {
        let mut graph = graph_with(&[AxesKind::Cartesian, AxesKind::GeoLatLon]);
        assert!(graph.link_share(Axis::X, AxesId(0), AxesId(1)).is_err());
    }

    #[test]
    fn test_span_conflict_and_noop() {
        let mut graph = cartesian(3);
        let ids = [AxesId(0), AxesId(1), AxesId(2)];
        let first = graph.link_span(Axis::X, &ids, AxesId(1)).unwrap();
        assert_eq!(graph.link_span(Axis::X, &ids, AxesId(1)).unwrap(), first);
        assert!(graph.link_span(Axis::X, &ids[..2], AxesId(0)).is_err());
        assert!(graph.link_span(Axis::Y, &ids[..2], AxesId(2)).is_err());
        assert!(graph.link_span(Axis::Y, &ids[..2], AxesId(0)).is_ok());
    }

    #[test]
    fn test_refresh_span_midpoint() {
        let mut graph = cartesian(3);
        for id in 0..3 {
            graph
                .node_mut(AxesId(id))
                .unwrap()
                .set_axis_label(Axis::X, "time");
        }
        let ids = [AxesId(0), AxesId(1), AxesId(2)];
        let group = graph.link_span(Axis::X, &ids, AxesId(1)).unwrap();
        let mid = graph
            .refresh_span(group, |id| {
                Ok(BoundingBox::new(0.1 + 0.3 * id.0 as f64, 0.2, 0.2, 0.5))
            })
            .unwrap();
        assert!((mid - 0.5).abs() < 1e-12);
        assert_eq!(graph.span(group).unwrap().extent, Some((0.1, 0.9)));
        assert!(graph.axis_label_visible(Axis::X, AxesId(1)));
        assert!(!graph.axis_label_visible(Axis::X, AxesId(0)));
        assert!(!graph.axis_label_visible(Axis::X, AxesId(2)));
    }

    #[test]
    fn test_sync_limits_unions_group() {
        let mut graph = cartesian(3);
        graph.node_mut(AxesId(0)).unwrap().axes[0].data_limits = Some((0.0, 1.0));
        graph.node_mut(AxesId(1)).unwrap().axes[0].data_limits = Some((-2.0, 0.5));
        graph.node_mut(AxesId(2)).unwrap().axes[0].data_limits = Some((5.0, 6.0));
        graph.link_share(Axis::X, AxesId(0), AxesId(1)).unwrap();
        graph.sync_limits(Axis::X);
        assert_eq!(graph.node(AxesId(0)).unwrap().limits(Axis::X), (-2.0, 1.0));
        assert_eq!(graph.node(AxesId(2)).unwrap().limits(Axis::X), (5.0, 6.0));
    }

    #[test]
    fn test_panel_joins_parent_and_parallel_panels_link() {
        let mut graph = cartesian(2);
        graph.link_share(Axis::X, AxesId(0), AxesId(1)).unwrap();
        for parent in [AxesId(0), AxesId(1)] {
            let id = graph.next_id();
            let cell = CellRef::new(GridId(1), CellSpan::at(0, 0));
            let kind = AxesKind::Panel {
                parent: Some(parent),
                side: Side::Left,
            };
            graph.insert(AxesNode::new(id, kind, cell.clone(), cell));
            graph.attach_panel(parent, id).unwrap();
        }
        assert!(graph.same_share_group(Axis::Y, AxesId(2), AxesId(0)));
        assert!(graph.same_share_group(Axis::X, AxesId(2), AxesId(3)));
        assert!(!graph.same_share_group(Axis::X, AxesId(2), AxesId(0)));
        assert_eq!(graph.share_leader(Axis::Y, AxesId(2)), AxesId(0));
    }
}
