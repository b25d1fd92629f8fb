// SPDX-License-Identifier: GPL-3.0-only
// SPDX-FileCopyrightText: Oliver Tale-Yazdi <oliver@tasty.limo>

//! Convert a raw `gradle dependencies` listing into `.deps` lines.

use super::GlobalArgs;
use crate::{gradle::gradle_lines_to_deps, log};
use std::path::PathBuf;

/// Convert the output of `gradle -q <project>:dependencies` into a deps file.
#[derive(Debug, clap::Parser)]
pub struct ConvertCmd {
	/// The raw Gradle listing.
	#[clap(index = 1)]
	input: PathBuf,

	/// Where to write the `.deps` lines. Defaults to stdout.
	#[clap(long, short)]
	output: Option<PathBuf>,

	/// Also keep external coordinates, not only project dependencies.
	#[clap(long)]
	include_external: bool,
}

impl ConvertCmd {
	pub fn run(&self, global: &GlobalArgs) -> Result<(), String> {
		let raw = std::fs::read_to_string(&self.input)
			.map_err(|e| format!("Failed to read {}: {e}", self.input.display()))?;
		let lines = gradle_lines_to_deps(raw.lines(), self.include_external);
		log::info!("Converted {} dependency lines", lines.len());

		let mut out = lines.join("\n");
		if !out.is_empty() {
			out.push('\n');
		}
		match &self.output {
			Some(path) => {
				if let Some(dir) = path.parent() {
					std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
				}
				std::fs::write(path, &out).map_err(|e| e.to_string())?;
				println!("Created {}", global.green(&path.display().to_string()));
			},
			None => print!("{out}"),
		}

		Ok(())
	}
}
