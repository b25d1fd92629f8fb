// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! Adapter for the output of `gradle -q <project>:dependencies`.
//!
//! Gradle prints an indented dependency tree. The adapter tracks the tree
//! depth through the indentation glyphs and emits one `parent -> child` deps
//! line per project descendant.

use regex::Regex;
use std::sync::OnceLock;

fn tree_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| {
		Regex::new(
			r"(?P<Indent>(?:[\\| ] {4}|[\\+]--- )*)(?:project (?P<Project>[^ \n]*)|(?P<Coordinate>\S+:\S+):(?P<VersionRequested>\S*)(?: -> (?P<VersionGot>\S+))?(?P<Repeated> \(\*\))?)",
		)
		.expect("Static regex is valid")
	})
}

fn root_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"Project '([^']*)'").expect("Static regex is valid"))
}

/// One parsed entry of the Gradle dependency tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GradleItem {
	/// A local project, eg. `project :app:feature`.
	Project(String),
	/// An external coordinate without its version, eg. `androidx.core:core-ktx`.
	Coordinate(String),
}

impl GradleItem {
	pub fn name(&self) -> &str {
		match self {
			Self::Project(name) | Self::Coordinate(name) => name,
		}
	}
}

/// Parse one line of the tree into its depth and item.
///
/// Returns `None` for lines that are not part of the dependency tree, such as
/// separators and configuration headers. Version bumps (`1.0 -> 1.1`) and
/// repetition markers (`(*)`) are recognized and dropped.
pub fn gradle_line_parse(line: &str) -> Option<(usize, GradleItem)> {
	let caps = tree_re().captures(line)?;
	let depth = caps.name("Indent").map_or(0, |m| m.as_str().len()) / 5;

	match caps.name("Project") {
		Some(project) => Some((depth, GradleItem::Project(project.as_str().into()))),
		None => caps
			.name("Coordinate")
			.map(|coord| (depth, GradleItem::Coordinate(coord.as_str().into()))),
	}
}

/// Convert a raw Gradle dependency listing into `.deps` lines.
///
/// The walk starts at the `Project '<name>'` header and keeps a stack of the
/// ancestors at each depth. External coordinates are skipped unless
/// `include_external` is set.
pub fn gradle_lines_to_deps<'a, I: IntoIterator<Item = &'a str>>(
	lines: I,
	include_external: bool,
) -> Vec<String> {
	let mut stack: Vec<String> = Vec::new();
	let mut output = Vec::new();

	for line in lines {
		if stack.is_empty() {
			if let Some(caps) = root_re().captures(line) {
				stack.push(caps[1].to_string());
			}
			continue
		}
		let Some((depth, item)) = gradle_line_parse(line) else { continue };
		if !include_external && matches!(item, GradleItem::Coordinate(_)) {
			continue
		}

		let module = item.name().to_string();
		stack.truncate(depth.max(1));
		let top = stack.last().expect("The root stays on the stack").clone();
		stack.push(module.clone());
		output.push(format!("{top} -> {module}"));
	}

	output
}

/// A parent finding function that splits module names on `:` and `.`.
///
/// `:app:feature:login` becomes the path `[":app", ":feature"]` with leaf
/// `":login"`; a name without separators has an empty path.
pub fn gradle_split(name: &str) -> (Vec<String>, String) {
	fn split_re() -> &'static Regex {
		static RE: OnceLock<Regex> = OnceLock::new();
		RE.get_or_init(|| Regex::new(r":?[^:.]+").expect("Static regex is valid"))
	}

	let parts: Vec<String> =
		split_re().find_iter(name).map(|m| m.as_str().to_string()).collect();
	match parts.split_last() {
		None => (Vec::new(), name.to_string()),
		Some((leaf, path)) => (path.to_vec(), leaf.clone()),
	}
}
