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

//! Emit the regular files of a directory in ascending name order, and
//! optionally unlink them in that order.
//!
//! Most filesystems keep directory entries in a B-tree keyed by name.
//! Unlinking in raw `getdents` order makes the tree rebalance constantly;
//! unlinking in key order drains it from one side.
//!
//! Use `operations::run()` for the whole pipeline, or
//! `operations::enumerate()` and `operations::Scheduler` separately.

#[cfg(not(any(target_os = "linux", target_os = "android")))]
compile_error!("dentls reads raw directory records with getdents64 and only builds on Linux");

mod entry_kind;
mod options;
pub mod operations;

use std::{collections::TryReserveError, ffi::OsString, io, path::PathBuf};

pub use self::{
	entry_kind::EntryKind,
	options::{Commands, Config},
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("could not access {}: {source}", .path.display())]
	Access { path: PathBuf, source: io::Error },
	#[error("the path {} is not a directory", .0.display())]
	NotADirectory(PathBuf),
	#[error("could not open {}: {source}", .path.display())]
	Open { path: PathBuf, source: io::Error },
	#[error("could not change directory to {}: {source}", .path.display())]
	ChangeDir { path: PathBuf, source: io::Error },
	#[error("could not allocate a {size} byte directory buffer: {source}")]
	Allocation { size: usize, source: TryReserveError },
	#[error("getdents failed: {0}")]
	Enumeration(io::Error),
	#[error("corrupt directory record at offset {offset}: {reason}")]
	CorruptRecord { offset: usize, reason: &'static str },
	#[error("could not stat {name:?}: {source}")]
	Stat { name: OsString, source: io::Error },
	#[error("could not remove {name:?}: {source}")]
	Removal { name: OsString, source: io::Error },
	#[error("could not write output: {0}")]
	Output(io::Error),
}

impl Error {
	/// Process exit status for this error.
	pub fn exit_value(&self) -> i32 {
		match self {
			Error::Access { .. }
			| Error::NotADirectory(_)
			| Error::Open { .. }
			| Error::ChangeDir { .. }
			| Error::Allocation { .. }
			| Error::Enumeration(_)
			| Error::CorruptRecord { .. }
			| Error::Stat { .. }
			| Error::Removal { .. }
			| Error::Output(_) => 1,
		}
	}
}
