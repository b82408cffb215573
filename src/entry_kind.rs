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

/// The type of a directory entry, as reported by the kernel.
///
/// # Examples
///
/// ```
/// assert_eq!(
/// 	dentls::EntryKind::from_dtype(libc::DT_REG),
/// 	dentls::EntryKind::RegularFile
/// );
/// assert_eq!(
/// 	dentls::EntryKind::from_dtype(libc::DT_UNKNOWN),
/// 	dentls::EntryKind::Unknown
/// );
/// assert!(dentls::EntryKind::from_mode(libc::S_IFREG | 0o644).is_regular_file());
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum EntryKind {
	RegularFile,
	Directory,
	Symlink,
	Other,
	/// The filesystem did not fill in `d_type`; needs a stat to resolve.
	Unknown,
}

impl EntryKind {
	/// Map the `d_type` byte of a raw directory record.
	pub fn from_dtype(d_type: u8) -> Self {
		match d_type {
			libc::DT_REG => EntryKind::RegularFile,
			libc::DT_DIR => EntryKind::Directory,
			libc::DT_LNK => EntryKind::Symlink,
			libc::DT_UNKNOWN => EntryKind::Unknown,
			_ => EntryKind::Other,
		}
	}

	/// Map the `st_mode` of a (non-following) stat.
	pub fn from_mode(mode: libc::mode_t) -> Self {
		match mode & libc::S_IFMT {
			libc::S_IFREG => EntryKind::RegularFile,
			libc::S_IFDIR => EntryKind::Directory,
			libc::S_IFLNK => EntryKind::Symlink,
			_ => EntryKind::Other,
		}
	}

	pub fn is_regular_file(&self) -> bool {
		*self == EntryKind::RegularFile
	}
}
