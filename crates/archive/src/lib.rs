//! Reading photo archives.
//!
//! Opens a ZIP container, lists the entries that look like images (by
//! extension only, nothing is decoded) and extracts them one at a time with
//! a hard ceiling on the decompressed size.
//!
//! ```
//! use std::io::{Cursor, Write};
//! use shoebox_archive::{ArchiveReader, MAX_ENTRY_BYTES};
//! use zip::write::{SimpleFileOptions, ZipWriter};
//!
//! let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
//! writer.start_file("ceremony/IMG_0001.JPG", SimpleFileOptions::default()).unwrap();
//! writer.write_all(b"not really a jpeg").unwrap();
//! writer.start_file("notes.txt", SimpleFileOptions::default()).unwrap();
//! let bytes = writer.finish().unwrap().into_inner();
//!
//! let mut archive = ArchiveReader::open(Cursor::new(bytes)).unwrap();
//! let images = archive.image_entries().unwrap();
//! assert_eq!(images.len(), 1);
//! assert_eq!(images[0].extension(), ".JPG");
//! let data = archive.extract(&images[0], MAX_ENTRY_BYTES).unwrap();
//! assert_eq!(data, b"not really a jpeg");
//! ```

pub mod error;
mod format;
mod reader;

pub use crate::format::ImageFormat;
pub use crate::reader::{ArchiveReader, Entry};

/// Per-image ceiling on the decompressed size of an entry (100 MiB).
pub const MAX_ENTRY_BYTES: u64 = 100 * 1024 * 1024;
