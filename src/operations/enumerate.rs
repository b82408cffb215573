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
	ffi::{OsStr, OsString},
	io,
	os::unix::ffi::OsStrExt,
};

use indicatif::ProgressBar;
use tracing::{debug, info, trace};

use super::{
	record::{RecordDecoder, RecordLayout},
	schedule::NameSet,
};
use crate::{EntryKind, Error, Result};

/// Floor for the buffer estimate; many filesystems report a directory size of 0.
pub const MIN_BUFFER_SIZE: usize = 32 * 1024;
/// Ceiling for the buffer estimate.
pub const MAX_BUFFER_SIZE: usize = 1 << 30;
/// Room for one record with a 255 byte name.
pub const MIN_RECORD_BUFFER: usize = 512;

/// Something that hands out raw directory records in batches.
pub trait DirentSource {
	fn layout(&self) -> RecordLayout;

	/// Fill `buf` with whole records. `Ok(0)` means the directory is exhausted.
	fn read_batch(&mut self, buf: &mut [u8]) -> io::Result<usize>;

	/// Resolve the type of an entry whose record carried `DT_UNKNOWN`.
	fn stat_kind(&self, name: &OsStr) -> io::Result<EntryKind>;
}

/// Size of each getdents buffer.
///
/// `st_size` of a directory under-reports what getdents returns, so the
/// estimate is doubled. The read loop stays correct when it is still too small.
pub fn buffer_size_for(dir_size: u64, requested: Option<usize>) -> usize {
	match requested {
		Some(size) => size.clamp(MIN_RECORD_BUFFER, MAX_BUFFER_SIZE),
		None => usize::try_from(dir_size.saturating_mul(2))
			.unwrap_or(MAX_BUFFER_SIZE)
			.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE),
	}
}

fn allocate(size: usize) -> Result<Vec<u8>> {
	let mut buffer = Vec::new();
	buffer
		.try_reserve_exact(size)
		.map_err(|source| Error::Allocation { size, source })?;
	buffer.resize(size, 0);
	Ok(buffer)
}

/// Collect the names of the regular files in `source`, skipping `.`, `..`
/// and anything in `ignored_files`.
pub fn enumerate<S: DirentSource>(
	source: &mut S,
	buffer_size: usize,
	ignored_files: &[OsString],
	pb: &ProgressBar,
) -> Result<NameSet> {
	let layout = source.layout();
	let mut names = NameSet::new();
	let mut batches = 0usize;

	loop {
		// A fresh buffer per pass; names are copied out before it is dropped.
		let mut buffer = allocate(buffer_size)?;
		let read = source.read_batch(&mut buffer).map_err(Error::Enumeration)?;
		if read == 0 {
			break;
		}
		batches += 1;

		let mut seen = 0usize;
		for entry in RecordDecoder::new(&buffer[..read], layout) {
			let entry = entry?;
			seen += 1;
			if entry.is_dot() {
				continue;
			}
			let name = OsStr::from_bytes(entry.name);
			let kind = match entry.kind {
				EntryKind::Unknown => source
					.stat_kind(name)
					.map_err(|source| Error::Stat { name: name.to_owned(), source })?,
				kind => kind,
			};
			if !kind.is_regular_file() {
				trace!(name = ?name, ?kind, "Skipping entry");
				continue;
			}
			if ignored_files.iter().any(|f| f.as_os_str() == name) {
				debug!(name = ?name, "Ignoring file");
				continue;
			}
			if names.insert(entry.name) {
				pb.inc(1);
			}
		}
		debug!(batch = batches, bytes = read, entries = seen, "Read directory batch");
	}

	info!(files = names.len(), batches, buffer_size, "Enumeration finished");
	Ok(names)
}
