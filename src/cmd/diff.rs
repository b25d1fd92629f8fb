// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! Diff two dependency files and emit the delta as DOT.

use super::GlobalArgs;
use crate::{
	deps::parse_deps,
	diff::{compare, CompareOptions},
	gradle::{gradle_lines_to_deps, gradle_split},
	graph::DiGraph,
	log,
	render::{render_dot, RenderOptions},
	style::DotStyle,
	Error, NodeName,
};
use std::path::{Path, PathBuf};

/// Diff two `.deps` files or raw `gradle dependencies` listings.
///
/// Files without a `.deps` extension are treated as raw Gradle output and
/// converted on the fly. With a single file, that graph is rendered on its
/// own in the foreground color.
#[derive(Debug, clap::Parser)]
pub struct DiffCmd {
	/// The older dependency file.
	#[clap(index = 1)]
	before: PathBuf,

	/// The newer dependency file.
	#[clap(index = 2)]
	after: Option<PathBuf>,

	/// Caption underneath the diagram.
	#[clap(long, short = 't', default_value = "")]
	caption: String,

	/// Where to write the DOT document. Defaults to stdout.
	#[clap(long, short)]
	output: Option<PathBuf>,

	/// Group nested modules into clusters.
	#[clap(long, short)]
	group: bool,

	/// Include the shortest transitive path between changed nodes.
	#[clap(long = "shortest-transitive", short = 's')]
	include_shortest_transitive_path: bool,

	/// Render with the dark color preset.
	#[clap(long, short)]
	dark_mode: bool,

	/// Load the color palette from a YAML file.
	#[clap(long, conflicts_with = "dark_mode")]
	style: Option<PathBuf>,
}

impl DiffCmd {
	pub fn run(&self, global: &GlobalArgs) -> Result<(), String> {
		let style = self
			.style
			.as_deref()
			.map(DotStyle::from_path)
			.transpose()
			.map_err(|e| e.to_string())?;
		let split = &gradle_split as &dyn Fn(&str) -> (Vec<String>, String);
		let opts = CompareOptions {
			parent_split: self.group.then_some(split),
			include_shortest_transitive_path: self.include_shortest_transitive_path,
			..Default::default()
		};

		let dot = match &self.after {
			Some(after) => {
				let older = load_graph(&self.before)?;
				let newer = load_graph(after)?;
				let delta = compare(&older, &newer, &opts);

				if let Err(Error::EmptyDelta) = delta.ensure_not_empty() {
					println!("{}", global.yellow("No differences to render"));
					return Ok(())
				}
				log::info!(
					"Delta has {} nodes and {} edges",
					delta.num_nodes(),
					delta.num_edges()
				);

				let render_opts = RenderOptions {
					style,
					caption: self.caption.clone(),
					dark_mode: self.dark_mode,
					..Default::default()
				};
				render_dot(&delta, &render_opts).map_err(|e| e.to_string())?
			},
			None => {
				let newer = load_graph(&self.before)?;
				let delta = compare(&DiGraph::default(), &newer, &opts);

				let base = match (style, self.dark_mode) {
					(Some(style), _) => style,
					(None, true) => DotStyle::dark(),
					(None, false) => DotStyle::light(),
				};
				let render_opts = RenderOptions {
					style: Some(base.no_color()),
					caption: self.caption.clone(),
					..Default::default()
				};
				render_dot(&delta, &render_opts).map_err(|e| e.to_string())?
			},
		};

		match &self.output {
			Some(path) => {
				if let Some(dir) = path.parent() {
					std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
				}
				std::fs::write(path, &dot).map_err(|e| e.to_string())?;
				println!("Created {}", global.green(&path.display().to_string()));
			},
			None => print!("{dot}"),
		}

		Ok(())
	}
}

/// Load a graph from a `.deps` file or a raw Gradle listing.
pub(crate) fn load_graph(path: &Path) -> Result<DiGraph<NodeName>, String> {
	let raw = std::fs::read_to_string(path)
		.map_err(|e| format!("Failed to read {}: {e}", path.display()))?;

	if path.extension().is_some_and(|ext| ext == "deps") {
		parse_deps(raw.lines()).map_err(|e| e.to_string())
	} else {
		let lines = gradle_lines_to_deps(raw.lines(), false);
		log::info!("Converted {} into {} dependency lines", path.display(), lines.len());
		parse_deps(lines.iter().map(String::as_str)).map_err(|e| e.to_string())
	}
}
