/* Copyright [2025] [Cerda]
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *    http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::{ffi::OsString, path::PathBuf};

use clap::{ArgAction, Parser};
use tracing::Level;

#[derive(Parser)]
#[command(
	name = "dentls",
	version,
	about,
	long_about = "List the regular files of a directory in ascending name order, and optionally \
	              unlink them in that order so the directory B-tree is drained without constant \
	              rebalancing."
)]
pub struct Commands {
	/// Directory to list.
	pub path: PathBuf,
	/// Unlink every listed file. Default: print only
	#[arg(short, long)]
	pub delete: bool,
	/// File names to leave alone. Default: none
	#[arg(short, long)]
	pub ignored_files: Vec<OsString>,
	/// Size in bytes of each getdents buffer. Default: twice the directory size
	#[arg(short, long)]
	pub buffer_size: Option<usize>,
	/// Draw progress on stderr.
	#[arg(short, long)]
	pub progress: bool,
	/// Log more (repeat for debug and trace).
	#[arg(short, long, action = ArgAction::Count)]
	pub verbose: u8,
}

impl Commands {
	pub fn log_level(&self) -> Level {
		match self.verbose {
			0 => Level::WARN,
			1 => Level::INFO,
			2 => Level::DEBUG,
			_ => Level::TRACE,
		}
	}
}

/// Library-side settings for one run.
#[derive(Debug, Clone, Default)]
pub struct Config {
	pub delete: bool,
	pub ignored_files: Vec<OsString>,
	pub buffer_size: Option<usize>,
	pub progress: bool,
	/// `fchdir` into the target before scheduling, like the CLI does.
	pub change_dir: bool,
}

impl From<&Commands> for Config {
	fn from(opts: &Commands) -> Self {
		Config {
			delete: opts.delete,
			ignored_files: opts.ignored_files.clone(),
			buffer_size: opts.buffer_size,
			progress: opts.progress,
			change_dir: true,
		}
	}
}
