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

use std::{
	collections::{BTreeSet, btree_set},
	ffi::{OsStr, OsString},
	io::Write,
	os::unix::ffi::{OsStrExt, OsStringExt},
};

use indicatif::ProgressBar;
use tracing::{debug, error};

use super::Directory;
use crate::{Error, Result};

/// Unique file names, ordered byte-wise (the same order as `strcmp`).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameSet {
	names: BTreeSet<Vec<u8>>,
}

impl NameSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Copy `name` into the set. Returns `false` if it was already present.
	pub fn insert(&mut self, name: &[u8]) -> bool {
		if self.names.contains(name) {
			return false;
		}
		self.names.insert(name.to_vec())
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}

impl IntoIterator for NameSet {
	type Item = OsString;
	type IntoIter = std::iter::Map<btree_set::IntoIter<Vec<u8>>, fn(Vec<u8>) -> OsString>;

	/// Ascending order, each name once.
	fn into_iter(self) -> Self::IntoIter {
		self.names.into_iter().map(OsString::from_vec as fn(Vec<u8>) -> OsString)
	}
}

impl<N: AsRef<OsStr>> FromIterator<N> for NameSet {
	fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
		let mut set = NameSet::new();
		for name in iter {
			set.insert(name.as_ref().as_bytes());
		}
		set
	}
}

/// What to do with each scheduled name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	Print,
	/// Print, then unlink relative to the directory handle.
	Remove,
}

/// Visits a `NameSet` in order and applies the `Action` to every name.
pub struct Scheduler<'d, W: Write> {
	directory: &'d Directory,
	action: Action,
	out: W,
	pb: ProgressBar,
}

impl<'d, W: Write> Scheduler<'d, W> {
	pub fn new(directory: &'d Directory, action: Action, out: W) -> Self {
		Scheduler { directory, action, out, pb: ProgressBar::hidden() }
	}

	pub fn with_progress(mut self, pb: ProgressBar) -> Self {
		self.pb = pb;
		self
	}

	/// Consume `names` in ascending order. Stops at the first failed removal;
	/// files removed before it stay removed.
	///
	/// Returns `(visited, removed)`.
	pub fn run(mut self, names: NameSet) -> Result<(usize, usize)> {
		let mut visited = 0;
		let mut removed = 0;

		for name in names {
			let Scheduler { out, pb, .. } = &mut self;
			pb.suspend(|| {
				out.write_all(name.as_bytes())?;
				out.write_all(b"\n")
			})
			.map_err(Error::Output)?;
			visited += 1;

			if self.action == Action::Remove {
				// Anything already written must be visible before we bail.
				if let Err(source) = self.directory.remove_file(&name) {
					error!(name = ?name, error = %source, "Failed to remove file");
					let _ = self.out.flush();
					return Err(Error::Removal { name, source });
				}
				removed += 1;
			}
			self.pb.inc(1);
		}

		self.out.flush().map_err(Error::Output)?;
		self.pb.finish_and_clear();
		debug!(visited, removed, "Traversal finished");
		Ok((visited, removed))
	}
}
