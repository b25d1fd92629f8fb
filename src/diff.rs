// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! Delta computation between two snapshots of a dependency graph.
//!
//! The output contains only changed edges and the nodes affected by them,
//! plus enough context to understand where the changes sit: retained direct
//! edges, synthesized indirect edges summarizing multi-hop reachability and,
//! on request, the shortest transitive paths between changed nodes.

use crate::{graph::DiGraph, Error, NodeName};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

/// A function decomposing a node name into its ancestor path and leaf label.
pub type ParentSplitFn<'a> = &'a dyn Fn(&str) -> (Vec<String>, String);

/// Whether a node exists on only one side of the comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeChange {
	/// Present only in the newer graph.
	New,
	/// Present only in the older graph.
	Old,
}

/// Membership change of a parent-path prefix between the two snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupState {
	/// The group only exists in the newer graph.
	Newer,
	/// The group only exists in the older graph.
	Older,
}

/// How an edge of the delta relates to the two input graphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
	/// Present in both graphs; retained as context between visible nodes.
	Unchanged,
	/// Present only in the newer graph.
	New,
	/// Present only in the older graph.
	///
	/// `indirect` carries the shortest remaining distance in the newer graph
	/// when the endpoints are still transitively connected there.
	Old { indirect: Option<usize> },
	/// Synthesized summary of a multi-hop path in the newer graph. The
	/// distance is the shortest-path length, at least two.
	Indirect { distance: usize },
	/// Synthesized hop along a shortest transitive path.
	Transitive,
}

impl EdgeKind {
	/// The distance label of a synthesized or annotated indirect connection.
	pub fn indirect_distance(&self) -> Option<usize> {
		match self {
			Self::Indirect { distance } => Some(*distance),
			Self::Old { indirect } => *indirect,
			Self::Unchanged | Self::New | Self::Transitive => None,
		}
	}
}

/// Attributes of a single node in the delta.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeInfo {
	pub change: Option<NodeChange>,
	/// Introduced solely to complete a transitive-path visualization.
	pub transitive: bool,
	/// Leaf display label; set when a parent function is in use.
	pub label: Option<String>,
	/// The full original name; set when a parent function is in use.
	pub full_name: Option<String>,
	/// Ancestor groups from outermost to innermost with their change state.
	/// `None` states mean the group exists in both snapshots.
	pub parent: Option<Vec<(String, Option<GroupState>)>>,
}

/// The annotated delta graph produced by [`compare`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeltaGraph {
	nodes: BTreeMap<NodeName, NodeInfo>,
	edges: BTreeMap<(NodeName, NodeName), EdgeKind>,
}

impl DeltaGraph {
	/// All nodes with their attributes in sorted order.
	pub fn nodes(&self) -> impl Iterator<Item = (&NodeName, &NodeInfo)> {
		self.nodes.iter()
	}

	/// All edges with their kind in sorted `(from, to)` order.
	pub fn edges(&self) -> impl Iterator<Item = (&NodeName, &NodeName, &EdgeKind)> {
		self.edges.iter().map(|((u, v), kind)| (u, v, kind))
	}

	pub fn node(&self, name: &str) -> Option<&NodeInfo> {
		self.nodes.get(name)
	}

	pub fn edge(&self, from: &str, to: &str) -> Option<&EdgeKind> {
		self.edges.get(&(from.to_string(), to.to_string()))
	}

	pub fn num_nodes(&self) -> usize {
		self.nodes.len()
	}

	pub fn num_edges(&self) -> usize {
		self.edges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Errors with [`Error::EmptyDelta`] if there is nothing to render.
	///
	/// Callers conventionally treat this as a clean exit, not a failure.
	pub fn ensure_not_empty(&self) -> Result<(), Error> {
		if self.is_empty() {
			return Err(Error::EmptyDelta)
		}
		Ok(())
	}

	fn node_mut(&mut self, name: &NodeName) -> &mut NodeInfo {
		self.nodes.entry(name.clone()).or_default()
	}

	fn contains_edge(&self, from: &NodeName, to: &NodeName) -> bool {
		self.edges.contains_key(&(from.clone(), to.clone()))
	}

	/// Insert an edge and make sure both endpoints exist as nodes.
	fn insert_edge(&mut self, from: &NodeName, to: &NodeName, kind: EdgeKind) {
		self.node_mut(from);
		self.node_mut(to);
		self.edges.insert((from.clone(), to.clone()), kind);
	}

	fn insert_edge_if_absent(&mut self, from: &NodeName, to: &NodeName, kind: EdgeKind) {
		if !self.contains_edge(from, to) {
			self.insert_edge(from, to, kind);
		}
	}

	fn edge_mut(&mut self, from: &NodeName, to: &NodeName) -> Option<&mut EdgeKind> {
		self.edges.get_mut(&(from.clone(), to.clone()))
	}
}

/// Options of [`compare`].
pub struct CompareOptions<'a> {
	/// Decompose node names into parent groups and leaf labels.
	pub parent_split: Option<ParentSplitFn<'a>>,
	/// Surface the shortest transitive path between visible nodes.
	pub include_shortest_transitive_path: bool,
	/// Consider additions. Disable to render a single graph as "all old".
	pub include_new: bool,
	/// Consider removals. Disable to render a single graph as "all new".
	pub include_old: bool,
}

impl Default for CompareOptions<'_> {
	fn default() -> Self {
		Self {
			parent_split: None,
			include_shortest_transitive_path: false,
			include_new: true,
			include_old: true,
		}
	}
}

/// Compare two dependency graphs and return the annotated delta.
///
/// The pass order is fixed: direct changes, transitive context, retention of
/// direct edges between visible nodes, indirect synthesis by ascending
/// distance, group annotations. The inputs are never mutated.
pub fn compare(
	older: &DiGraph<NodeName>,
	newer: &DiGraph<NodeName>,
	opts: &CompareOptions,
) -> DeltaGraph {
	let mut delta = DeltaGraph::default();
	let mut visible: BTreeSet<NodeName> = BTreeSet::new();
	// The delta edges that exist in the newer graph. Reachability through this
	// side graph decides which indirect edges are redundant.
	let mut new_visible: DiGraph<NodeName> = DiGraph::default();

	// Direct changes: edges and nodes on only one side.
	if opts.include_new {
		for (u, v) in newer.edges() {
			if !older.connected(u, v) {
				delta.insert_edge(u, v, EdgeKind::New);
				new_visible.add_edge(u.clone(), v.clone());
				visible.insert(u.clone());
				visible.insert(v.clone());
			}
		}
	}
	if opts.include_old {
		for (u, v) in older.edges() {
			if !newer.connected(u, v) {
				delta.insert_edge(u, v, EdgeKind::Old { indirect: None });
				visible.insert(u.clone());
				visible.insert(v.clone());
			}
		}
	}
	if opts.include_new {
		for node in newer.nodes() {
			if !older.contains_node(node) {
				delta.node_mut(node).change = Some(NodeChange::New);
				visible.insert(node.clone());
			}
		}
	}
	if opts.include_old {
		for node in older.nodes() {
			if !newer.contains_node(node) {
				delta.node_mut(node).change = Some(NodeChange::Old);
				visible.insert(node.clone());
			}
		}
	}

	let lengths = newer.all_pairs_lengths();

	// Transitive context: walk the shortest path between every pair of visible
	// nodes and surface the hops that touch invisible intermediates. Only the
	// snapshot taken here seeds walks; promoted nodes do not.
	if opts.include_shortest_transitive_path {
		let snapshot = visible.clone();
		let paths = newer.all_pairs_paths();

		for u in &snapshot {
			for v in &snapshot {
				let Some(path) = paths.get(u).and_then(|reached| reached.get(v)) else {
					continue
				};
				if path.len() <= 2 {
					continue
				}
				for (a, b) in path.iter().tuple_windows() {
					if snapshot.contains(a) && snapshot.contains(b) {
						continue
					}
					if delta.contains_edge(a, b) {
						continue
					}
					delta.insert_edge(a, b, EdgeKind::Transitive);
					new_visible.add_edge(a.clone(), b.clone());
					visible.insert(a.clone());
					visible.insert(b.clone());
					for node in [a, b] {
						if !snapshot.contains(node) {
							delta.node_mut(node).transitive = true;
						}
					}
				}
			}
		}
	}

	// Retain existing edges between visible nodes.
	for u in &visible {
		for v in &visible {
			if u == v {
				continue
			}
			if lengths.get(u).and_then(|reached| reached.get(v)) == Some(&1) {
				delta.insert_edge_if_absent(u, v, EdgeKind::Unchanged);
				new_visible.add_edge(u.clone(), v.clone());
			}
		}
	}

	// Synthesize indirect edges for visible pairs that stay connected in the
	// newer graph but have no visible path yet. Ascending distance, so short
	// connections suppress redundant longer ones.
	let mut pairs_by_distance: BTreeMap<usize, Vec<(&NodeName, &NodeName)>> = BTreeMap::new();
	for (u, reached) in &lengths {
		for (v, distance) in reached {
			if *distance > 1 {
				pairs_by_distance.entry(*distance).or_default().push((u, v));
			}
		}
	}
	for (distance, pairs) in pairs_by_distance {
		for (u, v) in pairs {
			if !visible.contains(u) || !visible.contains(v) {
				continue
			}
			if new_visible.reaches(u, v) {
				continue
			}
			match delta.edge_mut(u, v) {
				// A removed direct edge whose endpoints remain connected.
				Some(EdgeKind::Old { indirect }) => *indirect = Some(distance),
				Some(_) => {},
				None => delta.insert_edge(u, v, EdgeKind::Indirect { distance }),
			}
			new_visible.add_edge(u.clone(), v.clone());
		}
	}

	// Group annotations from the expanded parent sets of both snapshots.
	if let Some(split) = opts.parent_split {
		let old_parents = expanded_parents(older, split);
		let new_parents = expanded_parents(newer, split);
		let older_only: BTreeSet<_> = old_parents.difference(&new_parents).cloned().collect();
		let newer_only: BTreeSet<_> = new_parents.difference(&old_parents).cloned().collect();

		for node in &visible {
			let (path, leaf) = split(node);
			let info = delta.node_mut(node);
			info.label = Some(leaf.clone());
			if path.is_empty() {
				info.full_name = Some(leaf);
				continue
			}
			info.full_name = Some(node.clone());
			let states = (0..path.len())
				.map(|i| {
					let prefix = path[..=i].to_vec();
					let state = if newer_only.contains(&prefix) {
						Some(GroupState::Newer)
					} else if older_only.contains(&prefix) {
						Some(GroupState::Older)
					} else {
						None
					};
					(path[i].clone(), state)
				})
				.collect();
			info.parent = Some(states);
		}
	}

	delta
}

/// Every non-empty prefix of every node's parent path.
fn expanded_parents(graph: &DiGraph<NodeName>, split: ParentSplitFn) -> BTreeSet<Vec<String>> {
	let mut result = BTreeSet::new();
	for node in graph.nodes() {
		let (path, _) = split(node);
		for i in 1..=path.len() {
			result.insert(path[..i].to_vec());
		}
	}
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{deps::parse_deps, gradle::gradle_split};

	fn graph(lines: &[&str]) -> DiGraph<NodeName> {
		parse_deps(lines.iter().copied()).unwrap()
	}

	fn compare_plain(older: &DiGraph<NodeName>, newer: &DiGraph<NodeName>) -> DeltaGraph {
		compare(older, newer, &CompareOptions::default())
	}

	#[test]
	fn equal_graphs_yield_empty_delta() {
		let g = graph(&["a -> b -> c", "x"]);
		let delta = compare_plain(&g, &g);

		assert!(delta.is_empty());
		assert_eq!(delta.num_edges(), 0);
		assert!(matches!(delta.ensure_not_empty(), Err(Error::EmptyDelta)));
	}

	#[test]
	fn pure_addition() {
		let older = graph(&["a -> b"]);
		let newer = graph(&["a -> b", "b -> c"]);
		let delta = compare_plain(&older, &newer);

		assert_eq!(delta.edge("b", "c"), Some(&EdgeKind::New));
		assert_eq!(delta.node("c").unwrap().change, Some(NodeChange::New));
		assert_eq!(delta.node("b").unwrap().change, None);
		// The unchanged edge (a, b) stays invisible: a is not affected.
		assert_eq!(delta.edge("a", "b"), None);
		assert!(delta.node("a").is_none());
	}

	#[test]
	fn pure_removal() {
		let older = graph(&["a -> b", "b -> c"]);
		let newer = graph(&["a -> b"]);
		let delta = compare_plain(&older, &newer);

		assert_eq!(delta.edge("b", "c"), Some(&EdgeKind::Old { indirect: None }));
		assert_eq!(delta.node("c").unwrap().change, Some(NodeChange::Old));
		assert_eq!(delta.node("b").unwrap().change, None);
		assert_eq!(delta.edge("a", "b"), None);
	}

	#[test]
	fn retained_edges_connect_visible_nodes() {
		// Both endpoints of the unchanged edge (a, b) are affected by changes.
		let older = graph(&["a -> b", "a -> x"]);
		let newer = graph(&["a -> b", "b -> y"]);
		let delta = compare_plain(&older, &newer);

		assert_eq!(delta.edge("a", "x"), Some(&EdgeKind::Old { indirect: None }));
		assert_eq!(delta.edge("b", "y"), Some(&EdgeKind::New));
		assert_eq!(delta.edge("a", "b"), Some(&EdgeKind::Unchanged));
	}

	#[test]
	fn removed_edge_with_remaining_path_becomes_indirect() {
		// The direct dependency is gone but a three-hop path remains.
		let older = graph(&["a -> b", "a -> x", "x -> y", "y -> b"]);
		let newer = graph(&["a -> x", "x -> y", "y -> b"]);
		let delta = compare_plain(&older, &newer);

		assert_eq!(delta.edge("a", "b"), Some(&EdgeKind::Old { indirect: Some(3) }));
		assert_eq!(delta.num_nodes(), 2, "Intermediates stay invisible");
	}

	#[test]
	fn indirect_edges_synthesized_between_visible_nodes() {
		// u and v become visible through removals; they stay connected in the
		// newer graph, but only through the invisible intermediate m.
		let older = graph(&["u -> p", "v -> q", "u -> m", "m -> v"]);
		let newer = graph(&["u -> m", "m -> v"]);
		let delta = compare_plain(&older, &newer);

		assert_eq!(delta.edge("u", "v"), Some(&EdgeKind::Indirect { distance: 2 }));
		assert!(delta.node("m").is_none());
	}

	#[test]
	fn shorter_indirect_edges_suppress_longer_ones() {
		// a reaches c at distance two; once that edge exists, the distance
		// three pair (a, d) is already covered through the retained (c, d).
		let older = graph(&["a -> m", "m -> c", "c -> d", "a -> p", "c -> q", "d -> r"]);
		let newer = graph(&["a -> m", "m -> c", "c -> d"]);
		let delta = compare_plain(&older, &newer);

		assert_eq!(delta.edge("a", "c"), Some(&EdgeKind::Indirect { distance: 2 }));
		assert_eq!(delta.edge("c", "d"), Some(&EdgeKind::Unchanged));
		assert_eq!(delta.edge("a", "d"), None);
	}

	#[test]
	fn transitive_path_is_surfaced_on_request() {
		let older = graph(&["a -> b", "a -> x", "x -> y", "y -> b"]);
		let newer = graph(&["a -> x", "x -> y", "y -> b"]);
		let opts =
			CompareOptions { include_shortest_transitive_path: true, ..Default::default() };
		let delta = compare(&older, &newer, &opts);

		assert_eq!(delta.edge("a", "x"), Some(&EdgeKind::Transitive));
		assert_eq!(delta.edge("x", "y"), Some(&EdgeKind::Transitive));
		assert_eq!(delta.edge("y", "b"), Some(&EdgeKind::Transitive));
		assert!(delta.node("x").unwrap().transitive);
		assert!(delta.node("y").unwrap().transitive);
		assert!(!delta.node("a").unwrap().transitive);
		// Reachability is established, so no indirect edge is added.
		assert_eq!(delta.edge("a", "b"), Some(&EdgeKind::Old { indirect: None }));
	}

	#[test]
	fn promoted_nodes_do_not_seed_transitive_walks() {
		// x is promoted on the a -> b walk. The multi-hop path from x to the
		// visible w would only surface m and n if promoted nodes seeded
		// further walks; the a -> w walk itself is direct and skipped.
		let unchanged = ["a -> x", "x -> b", "a -> w", "x -> m", "m -> n", "n -> w"];
		let mut older_lines = unchanged.to_vec();
		older_lines.extend(["a -> b", "c -> w"]);
		let older = graph(&older_lines);
		let newer = graph(&unchanged);
		let opts =
			CompareOptions { include_shortest_transitive_path: true, ..Default::default() };
		let delta = compare(&older, &newer, &opts);

		assert!(delta.node("x").unwrap().transitive);
		assert!(delta.node("m").is_none());
		assert!(delta.node("n").is_none());
		// The remaining connection is summarized instead.
		assert_eq!(delta.edge("x", "w"), Some(&EdgeKind::Indirect { distance: 3 }));
	}

	#[test]
	fn new_edge_tags_are_exact() {
		let older = graph(&["a -> b", "c -> d"]);
		let newer = graph(&["a -> b", "c -> e", "e -> f"]);
		let delta = compare_plain(&older, &newer);

		let new_edges: Vec<_> = delta
			.edges()
			.filter(|(_, _, kind)| matches!(kind, EdgeKind::New))
			.map(|(u, v, _)| (u.as_str(), v.as_str()))
			.collect();
		assert_eq!(new_edges, vec![("c", "e"), ("e", "f")]);

		let old_edges: Vec<_> = delta
			.edges()
			.filter(|(_, _, kind)| matches!(kind, EdgeKind::Old { .. }))
			.map(|(u, v, _)| (u.as_str(), v.as_str()))
			.collect();
		assert_eq!(old_edges, vec![("c", "d")]);
	}

	#[test]
	fn single_graph_renders_as_all_new() {
		let newer = graph(&["a -> b -> c"]);
		let delta = compare_plain(&DiGraph::default(), &newer);

		assert_eq!(delta.num_nodes(), 3);
		assert_eq!(delta.edge("a", "b"), Some(&EdgeKind::New));
		assert_eq!(delta.edge("b", "c"), Some(&EdgeKind::New));
		for (_, info) in delta.nodes() {
			assert_eq!(info.change, Some(NodeChange::New));
		}
	}

	#[test]
	fn include_new_false_hides_additions() {
		let older = graph(&["a -> b"]);
		let newer = graph(&["a -> b", "b -> c"]);
		let opts = CompareOptions { include_new: false, ..Default::default() };
		let delta = compare(&older, &newer, &opts);

		assert!(delta.is_empty());
	}

	#[test]
	fn include_old_false_hides_removals() {
		let older = graph(&["a -> b", "b -> c"]);
		let newer = graph(&["a -> b"]);
		let opts = CompareOptions { include_old: false, ..Default::default() };
		let delta = compare(&older, &newer, &opts);

		assert!(delta.is_empty());
	}

	#[test]
	fn isolated_nodes_are_tagged() {
		let older = graph(&["gone"]);
		let newer = graph(&["fresh"]);
		let delta = compare_plain(&older, &newer);

		assert_eq!(delta.node("fresh").unwrap().change, Some(NodeChange::New));
		assert_eq!(delta.node("gone").unwrap().change, Some(NodeChange::Old));
		assert_eq!(delta.num_edges(), 0);
	}

	#[test]
	fn nodes_carry_at_most_one_change_tag() {
		let older = graph(&["a -> b", "b -> c"]);
		let newer = graph(&["a -> d", "d -> c"]);
		let opts = CompareOptions {
			include_shortest_transitive_path: true,
			..Default::default()
		};
		let delta = compare(&older, &newer, &opts);

		for (_, info) in delta.nodes() {
			if info.transitive {
				assert_eq!(info.change, None);
			}
		}
	}

	#[test]
	fn indirect_distances_match_the_newer_graph() {
		let older = graph(&["u -> p", "v -> q", "u -> m", "m -> n", "n -> v"]);
		let newer = graph(&["u -> m", "m -> n", "n -> v"]);
		let delta = compare_plain(&older, &newer);
		let lengths = newer.all_pairs_lengths();

		let mut seen = 0;
		for (u, v, kind) in delta.edges() {
			if let EdgeKind::Indirect { distance } = kind {
				seen += 1;
				assert!(*distance >= 2);
				assert_eq!(lengths[u].get(v), Some(distance));
			}
		}
		assert_eq!(seen, 1, "Exactly the (u, v) summary is synthesized");
	}

	#[test]
	fn group_states_reflect_expanded_parents() {
		let older = graph(&[":app:feat:a -> :lib:x"]);
		let newer = graph(&[":app:feat:a -> :lib:y"]);
		let opts = CompareOptions { parent_split: Some(&gradle_split), ..Default::default() };
		let delta = compare(&older, &newer, &opts);

		let y = delta.node(":lib:y").unwrap();
		assert_eq!(y.change, Some(NodeChange::New));
		assert_eq!(y.label.as_deref(), Some(":y"));
		assert_eq!(y.full_name.as_deref(), Some(":lib:y"));
		assert_eq!(y.parent, Some(vec![(":lib".to_string(), None)]));

		let x = delta.node(":lib:x").unwrap();
		assert_eq!(x.change, Some(NodeChange::Old));

		let a = delta.node(":app:feat:a").unwrap();
		assert_eq!(a.change, None);
		assert_eq!(a.label.as_deref(), Some(":a"));
		assert_eq!(
			a.parent,
			Some(vec![(":app".to_string(), None), (":feat".to_string(), None)])
		);
	}

	#[test]
	fn group_states_track_added_and_removed_groups() {
		let older = graph(&[":app:a -> :legacy:x"]);
		let newer = graph(&[":app:a -> :shiny:y"]);
		let opts = CompareOptions { parent_split: Some(&gradle_split), ..Default::default() };
		let delta = compare(&older, &newer, &opts);

		let x = delta.node(":legacy:x").unwrap();
		assert_eq!(
			x.parent,
			Some(vec![(":legacy".to_string(), Some(GroupState::Older))])
		);

		let y = delta.node(":shiny:y").unwrap();
		assert_eq!(
			y.parent,
			Some(vec![(":shiny".to_string(), Some(GroupState::Newer))])
		);
	}

	#[test]
	fn ungrouped_names_get_their_own_label() {
		let older = graph(&["solo_old"]);
		let newer = graph(&["solo_new"]);
		let opts = CompareOptions { parent_split: Some(&gradle_split), ..Default::default() };
		let delta = compare(&older, &newer, &opts);

		let node = delta.node("solo_new").unwrap();
		assert_eq!(node.label.as_deref(), Some("solo_new"));
		assert_eq!(node.full_name.as_deref(), Some("solo_new"));
		assert_eq!(node.parent, None);
	}

	#[test]
	fn inputs_are_not_mutated() {
		let older = graph(&["a -> b"]);
		let newer = graph(&["a -> c"]);
		let older_before = older.clone();
		let newer_before = newer.clone();

		let _ = compare_plain(&older, &newer);

		assert_eq!(older, older_before);
		assert_eq!(newer, newer_before);
	}
}
