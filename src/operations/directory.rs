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

//! The open directory handle and the raw syscalls made against it.

use std::{
	ffi::{CString, OsStr},
	fs::{File, OpenOptions},
	io,
	mem::MaybeUninit,
	os::{
		fd::AsRawFd,
		unix::{ffi::OsStrExt, fs::OpenOptionsExt},
	},
	path::{Path, PathBuf},
};

use tracing::debug;

use super::{enumerate::DirentSource, record::RecordLayout};
use crate::{EntryKind, Error, Result};

/// An open directory. Closed when dropped.
#[derive(Debug)]
pub struct Directory {
	file: File,
	path: PathBuf,
	size: u64,
}

impl Directory {
	/// Check that `path` is readable and is itself a directory (symlinks are
	/// not followed), then open it.
	pub fn open(path: &Path) -> Result<Self> {
		let access_err = |source| Error::Access { path: path.to_owned(), source };

		let c_path = to_cstring(path.as_os_str()).map_err(access_err)?;
		// SAFETY: `c_path` is a valid NUL terminated string.
		if unsafe { libc::access(c_path.as_ptr(), libc::R_OK) } < 0 {
			return Err(access_err(io::Error::last_os_error()));
		}

		let metadata = std::fs::symlink_metadata(path).map_err(access_err)?;
		if !metadata.is_dir() {
			return Err(Error::NotADirectory(path.to_owned()));
		}

		let file = OpenOptions::new()
			.read(true)
			.custom_flags(libc::O_DIRECTORY | libc::O_CLOEXEC)
			.open(path)
			.map_err(|source| Error::Open { path: path.to_owned(), source })?;

		debug!(path = %path.display(), size = metadata.len(), "Opened directory");
		Ok(Directory { file, path: path.to_owned(), size: metadata.len() })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// `st_size` of the directory as reported by lstat.
	pub fn size(&self) -> u64 {
		self.size
	}

	/// Make this directory the process working directory.
	pub fn change_dir(&self) -> Result<()> {
		// SAFETY: the descriptor is owned by `self.file` and open.
		if unsafe { libc::fchdir(self.file.as_raw_fd()) } < 0 {
			return Err(Error::ChangeDir {
				path: self.path.clone(),
				source: io::Error::last_os_error(),
			});
		}
		debug!(path = %self.path.display(), "Changed working directory");
		Ok(())
	}

	/// Unlink the file `name` directly inside this directory.
	pub fn remove_file(&self, name: &OsStr) -> io::Result<()> {
		let c_name = to_cstring(name)?;
		// SAFETY: valid descriptor and NUL terminated name.
		if unsafe { libc::unlinkat(self.file.as_raw_fd(), c_name.as_ptr(), 0) } < 0 {
			return Err(io::Error::last_os_error());
		}
		Ok(())
	}
}

impl DirentSource for Directory {
	fn layout(&self) -> RecordLayout {
		RecordLayout::Dirent64
	}

	fn read_batch(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		// The kernel takes an unsigned int count.
		let len = buf.len().min(libc::c_uint::MAX as usize);
		// SAFETY: `buf` is valid for writes of `len` bytes for the whole call.
		let read = unsafe {
			libc::syscall(
				libc::SYS_getdents64,
				self.file.as_raw_fd(),
				buf.as_mut_ptr(),
				len as libc::c_uint,
			)
		};
		if read < 0 {
			return Err(io::Error::last_os_error());
		}
		Ok(read as usize)
	}

	fn stat_kind(&self, name: &OsStr) -> io::Result<EntryKind> {
		let c_name = to_cstring(name)?;
		let mut stat = MaybeUninit::<libc::stat>::uninit();
		// SAFETY: valid descriptor, NUL terminated name, and `stat` is
		// writable for a whole `struct stat`.
		let rc = unsafe {
			libc::fstatat(
				self.file.as_raw_fd(),
				c_name.as_ptr(),
				stat.as_mut_ptr(),
				libc::AT_SYMLINK_NOFOLLOW,
			)
		};
		if rc < 0 {
			return Err(io::Error::last_os_error());
		}
		// SAFETY: fstatat succeeded, so it filled in `stat`.
		let stat = unsafe { stat.assume_init() };
		Ok(EntryKind::from_mode(stat.st_mode))
	}
}

fn to_cstring(s: &OsStr) -> io::Result<CString> {
	CString::new(s.as_bytes()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

#[cfg(test)]
mod tests {
	use std::{fs, os::unix::fs::symlink};

	use super::*;

	#[test]
	fn test_open_rejects_regular_file() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("plain");
		fs::write(&file, b"data").unwrap();
		assert!(matches!(Directory::open(&file), Err(Error::NotADirectory(_))));
	}

	#[test]
	fn test_open_rejects_symlink_to_directory() {
		let dir = tempfile::tempdir().unwrap();
		fs::create_dir(dir.path().join("real")).unwrap();
		symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
		assert!(matches!(
			Directory::open(&dir.path().join("alias")),
			Err(Error::NotADirectory(_))
		));
	}

	#[test]
	fn test_open_missing_path() {
		let dir = tempfile::tempdir().unwrap();
		let err = Directory::open(&dir.path().join("nope")).unwrap_err();
		assert!(matches!(err, Error::Access { .. }));
		assert_eq!(err.exit_value(), 1);
	}

	#[test]
	fn test_stat_kind_does_not_follow_symlinks() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("file"), b"x").unwrap();
		fs::create_dir(dir.path().join("sub")).unwrap();
		symlink("file", dir.path().join("link")).unwrap();

		let handle = Directory::open(dir.path()).unwrap();
		assert_eq!(handle.stat_kind(OsStr::new("file")).unwrap(), EntryKind::RegularFile);
		assert_eq!(handle.stat_kind(OsStr::new("sub")).unwrap(), EntryKind::Directory);
		assert_eq!(handle.stat_kind(OsStr::new("link")).unwrap(), EntryKind::Symlink);
		assert!(handle.stat_kind(OsStr::new("missing")).is_err());
	}

	#[test]
	fn test_remove_file_is_relative_to_handle() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("victim"), b"x").unwrap();
		let handle = Directory::open(dir.path()).unwrap();
		handle.remove_file(OsStr::new("victim")).unwrap();
		assert!(!dir.path().join("victim").exists());
		assert_eq!(
			handle.remove_file(OsStr::new("victim")).unwrap_err().kind(),
			io::ErrorKind::NotFound
		);
	}
}
