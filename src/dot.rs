// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! In-memory model of a DOT document.
//!
//! Nodes live in an arena and form a tree through parent/child indices; a
//! node with children serializes as a `subgraph cluster_*`. All property maps
//! are ordered, and serialization only ever iterates sorted collections, so
//! equal documents produce identical bytes.

use std::collections::BTreeMap;

/// Index of a node in the document arena.
pub type NodeId = usize;

/// Index of a link in the document.
pub type LinkId = usize;

/// An ordered `key="value"` property map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Props(BTreeMap<String, String>);

impl Props {
	pub fn set(&mut self, key: &str, value: &str) {
		self.0.insert(key.into(), value.into());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// A copy of `self` with all entries of `other` taking precedence.
	fn override_with(&self, other: &Props) -> Props {
		let mut merged = self.0.clone();
		merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
		Props(merged)
	}

	/// The inline attribute form: `key="value",` per entry, sorted by key.
	///
	/// Values wrapped in `<` and `>` are HTML-like labels and stay unquoted.
	fn inline(&self) -> String {
		let mut out = String::new();
		for (key, value) in &self.0 {
			out.push_str(&format_prop(key, value));
			out.push(',');
		}
		out
	}
}

fn format_prop(key: &str, value: &str) -> String {
	if value.starts_with('<') && value.ends_with('>') {
		format!("{key}={value}")
	} else {
		format!("{key}=\"{value}\"")
	}
}

/// Escape literal newlines for use in DOT string values.
pub fn escape_new_line(value: &str) -> String {
	value.replace('\n', "\\n")
}

#[derive(Clone, Debug)]
struct Node {
	/// The identifier used in the document, `node<N>` unless overridden.
	name: String,
	label: String,
	full_name: String,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	props: Props,
}

#[derive(Clone, Debug)]
struct Link {
	u: NodeId,
	v: NodeId,
	props: Props,
}

/// A DOT document under construction.
#[derive(Clone, Debug, Default)]
pub struct Dot {
	nodes: Vec<Node>,
	names: BTreeMap<String, NodeId>,
	links: Vec<Link>,
	root_props: Props,
	node_defaults: Props,
	subgraph_defaults: Props,
	edge_defaults: Props,
	/// Anchor nodes synthesized for edges between a cluster and its interior.
	anchors: BTreeMap<NodeId, NodeId>,
}

impl Dot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a document-level property, eg. the background color.
	pub fn root_default(&mut self, key: &str, value: &str) {
		self.root_props.set(key, value);
	}

	/// Append a property applied to every leaf node.
	pub fn node_default(&mut self, key: &str, value: &str) {
		self.node_defaults.set(key, value);
	}

	/// Append a property applied to every cluster.
	pub fn subgraph_default(&mut self, key: &str, value: &str) {
		self.subgraph_defaults.set(key, value);
	}

	/// Append a property applied to every link.
	pub fn edge_default(&mut self, key: &str, value: &str) {
		self.edge_defaults.set(key, value);
	}

	/// Create a node, or return the existing one of the same document name.
	///
	/// Without an explicit `node_name` a synthetic `node<N>` name is assigned
	/// in creation order.
	pub fn new_item(
		&mut self,
		label: &str,
		full_name: &str,
		parent: Option<NodeId>,
		node_name: Option<String>,
	) -> NodeId {
		let name = node_name.unwrap_or_else(|| format!("node{}", self.nodes.len() + 1));
		if let Some(&existing) = self.names.get(&name) {
			return existing
		}

		let id = self.nodes.len();
		self.nodes.push(Node {
			name: name.clone(),
			label: label.into(),
			full_name: full_name.into(),
			parent,
			children: Vec::new(),
			props: Props::default(),
		});
		self.names.insert(name, id);
		if let Some(parent) = parent {
			self.nodes[parent].children.push(id);
		}
		id
	}

	pub fn set_prop(&mut self, id: NodeId, key: &str, value: &str) {
		self.nodes[id].props.set(key, value);
	}

	pub fn full_name(&self, id: NodeId) -> &str {
		&self.nodes[id].full_name
	}

	pub fn new_link(&mut self, u: NodeId, v: NodeId) -> LinkId {
		self.links.push(Link { u, v, props: Props::default() });
		self.links.len() - 1
	}

	pub fn set_link_prop(&mut self, id: LinkId, key: &str, value: &str) {
		self.links[id].props.set(key, value);
	}

	/// Whether `ancestor` lies on the parent chain of `node`.
	fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut current = self.nodes[node].parent;
		while let Some(parent) = current {
			if parent == ancestor {
				return true
			}
			current = self.nodes[parent].parent;
		}
		false
	}

	/// The first leaf reached by descending into first children.
	fn first_leaf(&self, id: NodeId) -> NodeId {
		let mut current = id;
		while let Some(&child) = self.nodes[current].children.first() {
			current = child;
		}
		current
	}

	/// The invisible anchor point inside a cluster, created on first use.
	fn anchor_in(&mut self, cluster: NodeId) -> NodeId {
		if let Some(&anchor) = self.anchors.get(&cluster) {
			return anchor
		}
		let full_name = self.full_name(cluster).to_string();
		let anchor = self.new_item("", &full_name, Some(cluster), None);
		self.set_prop(anchor, "shape", "point");
		self.anchors.insert(cluster, anchor);
		anchor
	}

	/// Rewrite links whose endpoint is a cluster.
	///
	/// A cluster endpoint is replaced by its deepest first descendant and the
	/// link gains `ltail`/`lhead`. Links between a cluster and a node inside
	/// it instead attach to a synthetic `shape=point` anchor. Sets the
	/// `compound` root flag iff any link was rewritten.
	pub fn resolve_compound(&mut self) {
		let mut rewritten = false;

		for i in 0..self.links.len() {
			let (u, v) = (self.links[i].u, self.links[i].v);
			let u_cluster = !self.nodes[u].children.is_empty();
			let v_cluster = !self.nodes[v].children.is_empty();
			if !u_cluster && !v_cluster {
				continue
			}
			rewritten = true;

			if v_cluster && self.is_ancestor(v, u) {
				self.links[i].v = self.anchor_in(v);
				if u_cluster {
					let ltail = format!("cluster_{}", self.nodes[u].name);
					self.links[i].props.set("ltail", &ltail);
					self.links[i].u = self.first_leaf(u);
				}
			} else if u_cluster && self.is_ancestor(u, v) {
				self.links[i].u = self.anchor_in(u);
				if v_cluster {
					let lhead = format!("cluster_{}", self.nodes[v].name);
					self.links[i].props.set("lhead", &lhead);
					self.links[i].v = self.first_leaf(v);
				}
			} else {
				if u_cluster {
					let ltail = format!("cluster_{}", self.nodes[u].name);
					self.links[i].props.set("ltail", &ltail);
					self.links[i].u = self.first_leaf(u);
				}
				if v_cluster {
					let lhead = format!("cluster_{}", self.nodes[v].name);
					self.links[i].props.set("lhead", &lhead);
					self.links[i].v = self.first_leaf(v);
				}
			}
		}

		if rewritten {
			self.root_props.set("compound", "true");
		}
	}

	/// Serialize the document. The byte sequence is fixed for equal inputs.
	pub fn to_dot_string(&self) -> String {
		let mut out = String::new();
		let mut writer = IndentedWriter::new(&mut out);

		writer.line("digraph D {");
		writer.indent();
		if writer.props_block(&self.root_props) {
			writer.blank();
		}

		let mut roots: Vec<NodeId> =
			(0..self.nodes.len()).filter(|&id| self.nodes[id].parent.is_none()).collect();
		roots.sort_by(|&a, &b| self.nodes[a].name.cmp(&self.nodes[b].name));
		for id in roots {
			self.write_node(&mut writer, id);
			writer.blank();
		}

		let mut links: Vec<&Link> = self.links.iter().collect();
		links.sort_by(|a, b| {
			(&self.nodes[a.u].name, &self.nodes[a.v].name)
				.cmp(&(&self.nodes[b.u].name, &self.nodes[b.v].name))
		});
		for link in links {
			let props = self.edge_defaults.override_with(&link.props);
			writer.line(&format!(
				"{} -> {} [{}]",
				self.nodes[link.u].name,
				self.nodes[link.v].name,
				props.inline()
			));
		}

		writer.dedent();
		writer.line("}");
		out
	}

	fn write_node(&self, writer: &mut IndentedWriter, id: NodeId) {
		let node = &self.nodes[id];
		if node.children.is_empty() {
			writer.line(&format!(
				"{} [{}label=\"{}\"]",
				node.name,
				self.node_defaults.override_with(&node.props).inline(),
				node.label
			));
			return
		}

		writer.line(&format!("subgraph cluster_{} {{ /* {} */", node.name, node.label));
		writer.indent();
		writer.line(&format!("label=\"{}\";", node.label));
		writer.props_block(&self.subgraph_defaults.override_with(&node.props));
		writer.blank();
		for &child in &node.children {
			self.write_node(writer, child);
		}
		writer.dedent();
		writer.line("}");
	}
}

struct IndentedWriter<'a> {
	out: &'a mut String,
	depth: usize,
}

impl<'a> IndentedWriter<'a> {
	fn new(out: &'a mut String) -> Self {
		Self { out, depth: 0 }
	}

	fn line(&mut self, line: &str) {
		for _ in 0..self.depth {
			self.out.push_str("    ");
		}
		self.out.push_str(line);
		self.out.push('\n');
	}

	fn blank(&mut self) {
		self.out.push('\n');
	}

	fn indent(&mut self) {
		self.depth += 1;
	}

	fn dedent(&mut self) {
		self.depth -= 1;
	}

	/// Write one `key="value";` statement per property. Returns whether
	/// anything was written.
	fn props_block(&mut self, props: &Props) -> bool {
		for (key, value) in &props.0 {
			self.line(&format!("{};", format_prop(key, value)));
		}
		!props.is_empty()
	}
}
