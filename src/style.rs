// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! Color palettes for rendered DOT documents.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The palette applied by the renderer.
///
/// Defaults to the light theme. A palette can also be loaded from a YAML
/// file, where omitted keys keep their light-theme values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotStyle {
	pub new_color: String,
	pub old_color: String,
	pub bg_color: String,
	pub fg_color: String,
	pub font_name: String,
	/// Border color of unchanged groups; `fg_color` if unset.
	pub group_border_color: Option<String>,
	/// Title color of unchanged groups; `fg_color` if unset.
	pub group_title_color: Option<String>,
	/// Color of transitive nodes and edges; the regular color if unset.
	pub transitive_color: Option<String>,
}

impl Default for DotStyle {
	fn default() -> Self {
		Self {
			new_color: "#158510".into(),
			old_color: "#ff0000".into(),
			bg_color: "#ffffff".into(),
			fg_color: "#000000".into(),
			font_name: "Courier New".into(),
			group_border_color: None,
			group_title_color: None,
			transitive_color: None,
		}
	}
}

impl DotStyle {
	pub fn light() -> Self {
		Self::default()
	}

	pub fn dark() -> Self {
		Self {
			new_color: "#15ef10".into(),
			old_color: "#ef3f3f".into(),
			bg_color: "#222222".into(),
			fg_color: "#ffffff".into(),
			group_border_color: Some("#7f7f7f".into()),
			group_title_color: Some("#bfbfbf".into()),
			transitive_color: Some("#7f7f7f".into()),
			..Self::default()
		}
	}

	/// A copy that renders changes in the regular foreground color.
	///
	/// Used when rendering a single graph, where everything counts as new.
	pub fn no_color(&self) -> Self {
		Self {
			new_color: self.fg_color.clone(),
			old_color: self.fg_color.clone(),
			..self.clone()
		}
	}

	/// Load a palette from a YAML file.
	pub fn from_path(path: &Path) -> Result<Self, Error> {
		let raw = std::fs::read_to_string(path)?;
		Ok(serde_yaml_ng::from_str(&raw)?)
	}
}
