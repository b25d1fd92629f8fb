// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! Render an annotated delta graph as a deterministic DOT document.

use crate::{
	diff::{DeltaGraph, EdgeKind, GroupState, NodeChange},
	dot::{escape_new_line, Dot, NodeId},
	style::DotStyle,
	Error,
};
use std::collections::BTreeMap;

/// Options of [`render_dot`].
pub struct RenderOptions<'a> {
	/// Explicit palette. Mutually exclusive with `dark_mode`.
	pub style: Option<DotStyle>,
	/// Caption underneath the diagram.
	pub caption: String,
	/// Use the dark palette preset.
	pub dark_mode: bool,
	/// Supply a clickable URL per node, keyed by its full name.
	pub node_url: Option<&'a dyn Fn(&str) -> String>,
	/// Override the synthetic `node<N>` names with stable caller-supplied ids.
	pub node_name_map: Option<&'a BTreeMap<String, String>>,
}

impl Default for RenderOptions<'_> {
	fn default() -> Self {
		Self {
			style: None,
			caption: String::new(),
			dark_mode: false,
			node_url: None,
			node_name_map: None,
		}
	}
}

/// Serialize the delta as a DOT document.
///
/// Repeated calls on equal inputs yield byte-identical output.
pub fn render_dot(delta: &DeltaGraph, opts: &RenderOptions) -> Result<String, Error> {
	let style = match (&opts.style, opts.dark_mode) {
		(Some(_), true) =>
			return Err(Error::IncompatibleOptions("Specify either style or dark_mode, not both")),
		(Some(style), false) => style.clone(),
		(None, true) => DotStyle::dark(),
		(None, false) => DotStyle::light(),
	};

	let mut renderer = Renderer {
		delta,
		style,
		caption: &opts.caption,
		node_url: opts.node_url,
		node_name_map: opts.node_name_map,
		nodes: BTreeMap::new(),
	};
	Ok(renderer.build().to_dot_string())
}

struct Renderer<'a> {
	delta: &'a DeltaGraph,
	style: DotStyle,
	caption: &'a str,
	node_url: Option<&'a dyn Fn(&str) -> String>,
	node_name_map: Option<&'a BTreeMap<String, String>>,
	/// Dot nodes by full name; shared between graph nodes and parent groups.
	nodes: BTreeMap<String, NodeId>,
}

impl Renderer<'_> {
	fn build(&mut self) -> Dot {
		let delta = self.delta;
		let mut dot = Dot::new();
		if !self.caption.is_empty() {
			dot.root_default("label", &escape_new_line(self.caption));
			dot.root_default("tooltip", &escape_new_line(self.caption));
		}
		dot.root_default("bgcolor", &self.style.bg_color);
		dot.root_default("fontcolor", &self.style.fg_color);
		dot.root_default("fontname", &self.style.font_name);
		dot.node_default("shape", "rectangle");
		dot.node_default("fontname", &self.style.font_name);
		dot.subgraph_default("style", "rounded");
		dot.subgraph_default("fontname", &self.style.font_name);
		dot.edge_default("arrowhead", "vee");

		for (name, info) in delta.nodes() {
			let parent = info.parent.clone().map(|chain| self.find_parent(&mut dot, &chain, None));
			let label = info.label.clone().unwrap_or_else(|| name.clone());
			let full_name = info.full_name.clone().unwrap_or_else(|| label.clone());
			let node_name = self.mapped_name(&full_name);
			let id = dot.new_item(&escape_new_line(&label), &full_name, parent, node_name);
			self.nodes.insert(name.clone(), id);

			let mut color = match info.change {
				Some(NodeChange::New) => self.style.new_color.clone(),
				Some(NodeChange::Old) => self.style.old_color.clone(),
				None => self.style.fg_color.clone(),
			};
			if info.transitive {
				color = self.style.transitive_color.clone().unwrap_or(color);
			}
			dot.set_prop(id, "color", &color);
			dot.set_prop(id, "fontcolor", &color);
			let tooltip = escape_new_line(dot.full_name(id));
			dot.set_prop(id, "tooltip", &tooltip);
			if let Some(url) = self.node_url {
				dot.set_prop(id, "URL", &url(name));
			}
		}

		for (u, v, kind) in delta.edges() {
			let (du, dv) = (self.nodes[u], self.nodes[v]);
			let link = dot.new_link(du, dv);

			let mut color = match kind {
				EdgeKind::New => self.style.new_color.clone(),
				EdgeKind::Old { .. } => self.style.old_color.clone(),
				EdgeKind::Unchanged | EdgeKind::Indirect { .. } | EdgeKind::Transitive =>
					self.style.fg_color.clone(),
			};
			if matches!(kind, EdgeKind::Transitive) {
				color = self.style.transitive_color.clone().unwrap_or(color);
			}
			dot.set_link_prop(link, "color", &color);
			let tooltip = format!("{}\n   ->\n{}", dot.full_name(du), dot.full_name(dv));
			dot.set_link_prop(link, "tooltip", &escape_new_line(&tooltip));

			if let Some(distance) = kind.indirect_distance() {
				dot.set_link_prop(link, "style", "dashed");
				// One hop is a direct connection and two is the implied
				// minimum of a dashed edge; longer distances get pointed out.
				if distance > 2 {
					dot.set_link_prop(link, "label", &format!("({distance})"));
					dot.set_link_prop(link, "fontcolor", &color);
					dot.set_link_prop(link, "fontname", &self.style.font_name);
				}
			}
		}

		dot.resolve_compound();
		dot
	}

	/// Find or create the cluster for a parent chain, outermost first.
	fn find_parent(
		&mut self,
		dot: &mut Dot,
		chain: &[(String, Option<GroupState>)],
		parent: Option<NodeId>,
	) -> NodeId {
		if chain.len() > 1 {
			let grand_parent = self.find_parent(dot, &chain[..chain.len() - 1], parent);
			return self.find_parent(dot, &chain[chain.len() - 1..], Some(grand_parent))
		}

		let (name, state) = &chain[0];
		let key = match parent {
			Some(parent) => format!("{}{}", dot.full_name(parent), name),
			None => name.clone(),
		};
		if let Some(&existing) = self.nodes.get(&key) {
			return existing
		}

		let node_name = self.mapped_name(&key);
		let id = dot.new_item(name, &key, parent, node_name);
		let (border, title) = match state {
			Some(GroupState::Newer) =>
				(self.style.new_color.clone(), self.style.new_color.clone()),
			Some(GroupState::Older) =>
				(self.style.old_color.clone(), self.style.old_color.clone()),
			None => (
				self.style.group_border_color.clone().unwrap_or_else(|| self.style.fg_color.clone()),
				self.style.group_title_color.clone().unwrap_or_else(|| self.style.fg_color.clone()),
			),
		};
		dot.set_prop(id, "color", &border);
		dot.set_prop(id, "fontcolor", &title);
		dot.set_prop(id, "tooltip", &escape_new_line(&key));
		if let Some(url) = self.node_url {
			dot.set_prop(id, "URL", &url(&key));
		}
		self.nodes.insert(key, id);
		id
	}

	fn mapped_name(&self, full_name: &str) -> Option<String> {
		self.node_name_map.and_then(|map| map.get(full_name)).cloned()
	}
}
