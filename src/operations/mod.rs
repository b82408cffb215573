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

//! Main functions doing actual work.
//!
//! Use `run()` to list (and with `Config::delete`, unlink) a directory.
//!
//! The pieces are usable on their own: open a `Directory`, collect its
//! regular files with `enumerate()`, then hand the `NameSet` to a
//! `Scheduler`.

mod directory;
mod enumerate;
mod record;
mod schedule;

use std::{
	io::{Write, stderr, stdout},
	path::Path,
	time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

pub use self::{
	directory::Directory,
	enumerate::{DirentSource, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE, MIN_RECORD_BUFFER, buffer_size_for, enumerate},
	record::{DirectoryEntry, RecordDecoder, RecordLayout},
	schedule::{Action, NameSet, Scheduler},
};
use crate::{Config, Error, Result};

static SPINNER_STRINGS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
	pub total_files: usize,
	pub removed: usize,
}

fn progress_bar(enabled: bool) -> ProgressBar {
	if !enabled {
		return ProgressBar::hidden();
	}
	let style = ProgressStyle::default_bar()
		.template("{prefix:.bold.dim} {spinner} {wide_bar} {pos:>7}/{len:7} ETA: {eta} - {msg}")
		.unwrap_or_else(|_| ProgressStyle::default_bar())
		.tick_strings(&SPINNER_STRINGS);
	let pb = ProgressBar::new_spinner();
	pb.set_style(style);
	pb
}

/// Enumerate `path` and emit its regular files in ascending order to stdout,
/// unlinking each one when `config.delete` is set.
pub fn run(path: &Path, config: &Config) -> Result<Report> {
	let mut directory = Directory::open(path)?;
	if config.change_dir {
		directory.change_dir()?;
	}

	let pb = progress_bar(config.progress);
	pb.enable_steady_tick(Duration::from_millis(80));
	pb.set_message("Reading directory entries...");

	let buffer_size = buffer_size_for(directory.size(), config.buffer_size);
	let names = enumerate(&mut directory, buffer_size, &config.ignored_files, &pb)?;
	let total_files = names.len();

	eprintln!("Total files: {}", total_files);
	let mut out = stdout().lock();
	writeln!(out, "Performing delete..").map_err(Error::Output)?;

	pb.reset();
	pb.set_length(total_files as u64);
	pb.set_message(if config.delete { "Removing files..." } else { "Listing files..." });

	let action = if config.delete { Action::Remove } else { Action::Print };
	let (_, removed) = Scheduler::new(&directory, action, &mut out)
		.with_progress(pb)
		.run(names)?;

	writeln!(out, "Done").map_err(Error::Output)?;
	out.flush().map_err(Error::Output)?;
	info!(path = %path.display(), total_files, removed, "Finished");
	Ok(Report { total_files, removed })
}

/// Print an error the way the binary reports it.
pub fn write_error(err: &Error) {
	let _ = writeln!(stderr(), "dentls: {}", err);
}
