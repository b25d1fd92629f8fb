// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! Parsing and serialization of the line-oriented `.deps` format.
//!
//! Each line is either a chain `a -> b -> c` introducing the edges `(a, b)`
//! and `(b, c)`, or a single name introducing an isolated node.

use crate::{graph::DiGraph, Error, NodeName};
use core::fmt::{Display, Formatter};
use regex::Regex;
use std::{collections::BTreeSet, sync::OnceLock};

fn line_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"^\S+(?: -> \S+)*$").expect("Static regex is valid"))
}

/// A single `from -> to` dependency.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dependency {
	pub from: NodeName,
	pub to: NodeName,
}

impl Dependency {
	pub fn new(from: &str, to: &str) -> Self {
		Self { from: from.into(), to: to.into() }
	}

	/// Whether this entry only carries its node, not an edge.
	pub fn is_self(&self) -> bool {
		self.from == self.to
	}
}

impl Display for Dependency {
	fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
		write!(f, "{} -> {}", self.from, self.to)
	}
}

/// A deduplicated set of dependencies as parsed from `.deps` lines.
///
/// Self-dependencies are the normalized representation of isolated nodes and
/// turn into plain nodes when converted to a graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dependencies {
	deps: BTreeSet<Dependency>,
}

impl Dependencies {
	pub fn add_dependency(&mut self, from: &str, to: &str) {
		self.deps.insert(Dependency::new(from, to));
	}

	/// Parse one `.deps` line and record its dependencies.
	///
	/// Blank lines are ignored. A chain `a -> b -> c` is chained, not fanned
	/// out. Anything else errors with [`Error::MalformedInput`].
	pub fn add_line(&mut self, line: &str) -> Result<(), Error> {
		let line = line.trim_end_matches(['\n', '\r']);
		if line.is_empty() {
			return Ok(())
		}
		if !line_re().is_match(line) {
			return Err(Error::MalformedInput(line.into()))
		}

		let mut names = line.split(" -> ");
		let mut from = names.next().expect("The regex guarantees a first name");
		let mut chained = false;
		for to in names {
			chained = true;
			self.add_dependency(from, to);
			from = to;
		}
		if !chained {
			self.add_dependency(from, from);
		}

		Ok(())
	}

	pub fn add_lines<'a, I: IntoIterator<Item = &'a str>>(&mut self, lines: I) -> Result<(), Error> {
		for line in lines {
			self.add_line(line)?;
		}
		Ok(())
	}

	/// All dependencies in sorted `(from, to)` order.
	pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
		self.deps.iter()
	}

	pub fn len(&self) -> usize {
		self.deps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.deps.is_empty()
	}

	/// Convert into a directed graph, normalizing self-dependencies away.
	pub fn to_graph(&self) -> DiGraph<NodeName> {
		let mut graph = DiGraph::default();
		for dep in self.iter() {
			if dep.is_self() {
				graph.add_node(dep.from.clone());
			} else {
				graph.add_edge(dep.from.clone(), dep.to.clone());
			}
		}
		graph
	}
}

/// Parse `.deps` lines into a directed graph.
pub fn parse_deps<'a, I: IntoIterator<Item = &'a str>>(lines: I) -> Result<DiGraph<NodeName>, Error> {
	let mut deps = Dependencies::default();
	deps.add_lines(lines)?;
	Ok(deps.to_graph())
}

/// Serialize a graph back into `.deps` lines.
///
/// Edges come first in sorted order, then isolated nodes. Parsing the result
/// yields a graph equal to the input.
pub fn serialize_graph(graph: &DiGraph<NodeName>) -> Vec<String> {
	let mut lines: Vec<String> = graph.edges().map(|(u, v)| format!("{u} -> {v}")).collect();
	lines.extend(graph.nodes().filter(|n| graph.is_isolated(n)).cloned());
	lines
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	#[rstest]
	#[case("a -> b", vec![("a", "b")])]
	#[case("d -> e\n", vec![("d", "e")])]
	#[case("a", vec![("a", "a")])]
	#[case("a -> b -> c", vec![("a", "b"), ("b", "c")])]
	#[case("a -> b -> a", vec![("a", "b"), ("b", "a")])]
	fn add_line_works(#[case] line: &str, #[case] expected: Vec<(&str, &str)>) {
		let mut deps = Dependencies::default();
		deps.add_line(line).unwrap();

		let expected: Vec<_> = expected.into_iter().map(|(u, v)| Dependency::new(u, v)).collect();
		assert_eq!(deps.iter().cloned().collect::<Vec<_>>(), expected);
	}

	#[rstest]
	#[case("a -> ")]
	#[case(" -> b")]
	#[case("a  ->  b")]
	#[case("a - b")]
	#[case("a b")]
	fn malformed_lines_error(#[case] line: &str) {
		let mut deps = Dependencies::default();
		let err = deps.add_line(line).unwrap_err();

		assert!(matches!(err, Error::MalformedInput(l) if l == line));
	}

	#[test]
	fn blank_lines_are_ignored() {
		let graph = parse_deps(["a -> b", "", "\n", "c"]).unwrap();

		assert_eq!(graph.num_nodes(), 3);
		assert_eq!(graph.num_edges(), 1);
	}

	#[test]
	fn chains_are_deduplicated() {
		let graph = parse_deps(["a -> b -> c", "a -> b"]).unwrap();

		assert_eq!(graph.num_edges(), 2);
	}

	#[test]
	fn self_dependencies_normalize_to_nodes() {
		let graph = parse_deps(["a"]).unwrap();

		assert_eq!(graph.num_nodes(), 1);
		assert_eq!(graph.num_edges(), 0);
	}

	#[test]
	fn serialize_round_trips() {
		let graph = parse_deps(["a -> b -> c", "x -> b", "solo"]).unwrap();
		let lines = serialize_graph(&graph);

		assert_eq!(lines, vec!["a -> b", "b -> c", "x -> b", "solo"]);
		let reparsed = parse_deps(lines.iter().map(String::as_str)).unwrap();
		assert_eq!(reparsed, graph);
	}
}
