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

//! Decoding of the variable-length records returned by `getdents`.

use crate::{EntryKind, Error, Result};

const RECLEN_OFFSET: usize = 16;

/// Shape of the records in a raw directory buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
	/// `struct linux_dirent64`: `d_type` sits right before `d_name`.
	Dirent64,
	/// `struct linux_dirent` (64-bit): `d_type` is the last byte of the record.
	Legacy,
}

impl RecordLayout {
	fn name_offset(self) -> usize {
		match self {
			RecordLayout::Dirent64 => 19,
			RecordLayout::Legacy => 18,
		}
	}

	/// Smallest record that can hold a one byte name and its NUL.
	fn min_reclen(self) -> usize {
		match self {
			RecordLayout::Dirent64 => self.name_offset() + 2,
			RecordLayout::Legacy => self.name_offset() + 3,
		}
	}

	fn d_type(self, record: &[u8]) -> u8 {
		match self {
			RecordLayout::Dirent64 => record[18],
			RecordLayout::Legacy => record[record.len() - 1],
		}
	}
}

/// One entry borrowed from a raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry<'a> {
	pub name: &'a [u8],
	pub kind: EntryKind,
}

impl DirectoryEntry<'_> {
	pub fn is_dot(&self) -> bool {
		self.name == b"." || self.name == b".."
	}
}

/// Iterates the records in `bytes`, stopping for good at the first corrupt one.
pub struct RecordDecoder<'a> {
	bytes: &'a [u8],
	layout: RecordLayout,
	offset: usize,
	failed: bool,
}

impl<'a> RecordDecoder<'a> {
	pub fn new(bytes: &'a [u8], layout: RecordLayout) -> Self {
		RecordDecoder { bytes, layout, offset: 0, failed: false }
	}

	fn decode_at(&self, offset: usize) -> Result<(DirectoryEntry<'a>, usize)> {
		let corrupt = |reason| Error::CorruptRecord { offset, reason };

		let header = self
			.bytes
			.get(offset..offset + RECLEN_OFFSET + 2)
			.ok_or_else(|| corrupt("record header runs past the end of the buffer"))?;
		let reclen = u16::from_ne_bytes([header[RECLEN_OFFSET], header[RECLEN_OFFSET + 1]]) as usize;
		if reclen == 0 {
			return Err(corrupt("record length is zero"));
		}
		if reclen < self.layout.min_reclen() {
			return Err(corrupt("record length is shorter than its header"));
		}
		let record = self
			.bytes
			.get(offset..offset + reclen)
			.ok_or_else(|| corrupt("record runs past the end of the buffer"))?;

		let name_area = &record[self.layout.name_offset()..];
		let name_len = name_area
			.iter()
			.position(|&b| b == 0)
			.ok_or_else(|| corrupt("name is not NUL terminated"))?;
		if name_len == 0 {
			return Err(corrupt("name is empty"));
		}

		let entry = DirectoryEntry {
			name: &name_area[..name_len],
			kind: EntryKind::from_dtype(self.layout.d_type(record)),
		};
		Ok((entry, reclen))
	}
}

impl<'a> Iterator for RecordDecoder<'a> {
	type Item = Result<DirectoryEntry<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed || self.offset >= self.bytes.len() {
			return None;
		}
		match self.decode_at(self.offset) {
			Ok((entry, reclen)) => {
				self.offset += reclen;
				Some(Ok(entry))
			}
			Err(err) => {
				self.failed = true;
				Some(Err(err))
			}
		}
	}
}


#[cfg(test)]
mod tests {
	use super::{testing::push_record, *};

	fn decode_all(bytes: &[u8], layout: RecordLayout) -> Result<Vec<(Vec<u8>, EntryKind)>> {
		RecordDecoder::new(bytes, layout)
			.map(|entry| entry.map(|e| (e.name.to_vec(), e.kind)))
			.collect()
	}

	#[test]
	fn test_decodes_dirent64_records() {
		let mut buf = Vec::new();
		push_record(&mut buf, RecordLayout::Dirent64, b".", libc::DT_DIR);
		push_record(&mut buf, RecordLayout::Dirent64, b"..", libc::DT_DIR);
		push_record(&mut buf, RecordLayout::Dirent64, b"a-rather-long-file-name.txt", libc::DT_REG);
		push_record(&mut buf, RecordLayout::Dirent64, b"link", libc::DT_LNK);

		let entries = decode_all(&buf, RecordLayout::Dirent64).unwrap();
		assert_eq!(
			entries,
			vec![
				(b".".to_vec(), EntryKind::Directory),
				(b"..".to_vec(), EntryKind::Directory),
				(b"a-rather-long-file-name.txt".to_vec(), EntryKind::RegularFile),
				(b"link".to_vec(), EntryKind::Symlink),
			]
		);
	}

	#[test]
	fn test_decodes_trailing_type_byte() {
		let mut buf = Vec::new();
		push_record(&mut buf, RecordLayout::Legacy, b"file", libc::DT_REG);
		push_record(&mut buf, RecordLayout::Legacy, b"dir", libc::DT_DIR);
		push_record(&mut buf, RecordLayout::Legacy, b"x", libc::DT_UNKNOWN);

		let entries = decode_all(&buf, RecordLayout::Legacy).unwrap();
		assert_eq!(
			entries,
			vec![
				(b"file".to_vec(), EntryKind::RegularFile),
				(b"dir".to_vec(), EntryKind::Directory),
				(b"x".to_vec(), EntryKind::Unknown),
			]
		);
	}

	#[test]
	fn test_dot_entries() {
		let dot = DirectoryEntry { name: b".", kind: EntryKind::Directory };
		let dotdot = DirectoryEntry { name: b"..", kind: EntryKind::Directory };
		let hidden = DirectoryEntry { name: b"...", kind: EntryKind::RegularFile };
		assert!(dot.is_dot());
		assert!(dotdot.is_dot());
		assert!(!hidden.is_dot());
	}

	#[test]
	fn test_zero_reclen_is_corrupt() {
		let mut buf = Vec::new();
		push_record(&mut buf, RecordLayout::Dirent64, b"ok", libc::DT_REG);
		let second = buf.len();
		push_record(&mut buf, RecordLayout::Dirent64, b"bad", libc::DT_REG);
		buf[second + 16] = 0;
		buf[second + 17] = 0;

		let mut decoder = RecordDecoder::new(&buf, RecordLayout::Dirent64);
		assert_eq!(decoder.next().unwrap().unwrap().name, b"ok");
		match decoder.next() {
			Some(Err(Error::CorruptRecord { offset, reason })) => {
				assert_eq!(offset, second);
				assert!(reason.contains("zero"));
			}
			other => panic!("expected a corrupt record, got {:?}", other),
		}
		assert!(decoder.next().is_none());
	}

	#[test]
	fn test_truncated_record_is_corrupt() {
		let mut buf = Vec::new();
		push_record(&mut buf, RecordLayout::Dirent64, b"truncated", libc::DT_REG);
		buf.truncate(buf.len() - 4);
		assert!(matches!(
			decode_all(&buf, RecordLayout::Dirent64),
			Err(Error::CorruptRecord { offset: 0, .. })
		));

		let short_header = [0u8; 10];
		assert!(decode_all(&short_header, RecordLayout::Dirent64).is_err());
	}

	#[test]
	fn test_short_reclen_is_corrupt() {
		let mut buf = Vec::new();
		push_record(&mut buf, RecordLayout::Dirent64, b"name", libc::DT_REG);
		buf[16..18].copy_from_slice(&8u16.to_ne_bytes());
		assert!(matches!(
			decode_all(&buf, RecordLayout::Dirent64),
			Err(Error::CorruptRecord { reason, .. }) if reason.contains("shorter")
		));
	}

	#[test]
	fn test_unterminated_name_is_corrupt() {
		let mut buf = Vec::new();
		push_record(&mut buf, RecordLayout::Dirent64, b"abcd", libc::DT_REG);
		let reclen = buf.len();
		for b in &mut buf[19..reclen] {
			*b = b'z';
		}
		assert!(matches!(
			decode_all(&buf, RecordLayout::Dirent64),
			Err(Error::CorruptRecord { reason, .. }) if reason.contains("NUL")
		));
	}

	#[test]
	fn test_empty_buffer_yields_nothing() {
		assert!(decode_all(&[], RecordLayout::Dirent64).unwrap().is_empty());
	}
}
