// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! Compare two snapshots of a directed dependency graph and render the delta
//! as a deterministic GraphViz DOT document.
//!
//! The pipeline consists of three pure transformations:
//! - [`deps::parse_deps`] reads the line-oriented `.deps` format,
//! - [`diff::compare`] computes the annotated delta graph,
//! - [`render::render_dot`] serializes it as DOT.

pub mod cmd;
pub mod deps;
pub mod diff;
pub mod dot;
pub mod gradle;
pub mod graph;
pub mod render;
pub mod style;

/// Identifier of a node in a dependency graph.
///
/// An opaque non-empty string without whitespace, eg. `:app:feature:login`.
pub type NodeName = String;

/// Errors surfaced at the API boundary. The core never recovers internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A deps line matched neither grammar form.
	#[error("Malformed input: {0}")]
	MalformedInput(String),
	/// The comparison produced no visible nodes.
	#[error("The graph delta is empty")]
	EmptyDelta,
	/// Mutually exclusive renderer options were combined.
	#[error("Incompatible options: {0}")]
	IncompatibleOptions(&'static str),
	/// A style palette file could not be deserialized.
	#[error("Invalid style file: {0}")]
	InvalidStyle(#[from] serde_yaml_ng::Error),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub mod prelude {
	pub use crate::{
		deps::{parse_deps, serialize_graph, Dependencies, Dependency},
		diff::{compare, CompareOptions, DeltaGraph, EdgeKind, GroupState, NodeChange, NodeInfo},
		graph::DiGraph,
		render::{render_dot, RenderOptions},
		style::DotStyle,
		Error, NodeName,
	};
}

/// Logging facade of the crate.
///
/// Forwards to the `log` crate when the `logging` feature is active and
/// compiles to no-ops otherwise.
#[cfg(feature = "logging")]
pub mod log {
	pub use ::log::{debug, error, info, trace, warn};
}

#[cfg(not(feature = "logging"))]
pub mod log {
	#[macro_export]
	macro_rules! __log_noop {
		($($arg:tt)*) => {{}};
	}

	pub use crate::__log_noop as debug;
	pub use crate::__log_noop as error;
	pub use crate::__log_noop as info;
	pub use crate::__log_noop as trace;
	pub use crate::__log_noop as warn;
}
