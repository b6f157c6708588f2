use crate::ImageFormat;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{self, Read, Seek};
use std::path::Path;
use tracing::instrument;
use zip::ZipArchive;

/// One image entry inside an archive.
///
/// Only lives for as long as the archive is being processed. The `name` is
/// whatever the archive says it is and must never be used as a filesystem
/// path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    index: usize,
    /// Name (relative path) of the entry inside the archive.
    pub name: String,
    /// Uncompressed size as declared by the archive. Informational only: it
    /// is not trusted for size validation.
    pub declared_size: u64,
    pub format: ImageFormat,
}

impl Entry {
    /// Original extension including the leading dot, with its case preserved
    /// (`"IMG_0001.JPG"` gives `".JPG"`).
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }
}

/// A ZIP archive opened for reading.
pub struct ArchiveReader<R> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Open an archive by reading its central directory.
    ///
    /// Fails with [`ErrorKind::Unreadable`] when the container is corrupt or
    /// not a ZIP archive.
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).or_raise(|| ErrorKind::Unreadable)?;
        Ok(Self { archive })
    }

    /// List the entries that are images, in archive order.
    ///
    /// Directory markers and files with unrecognised extensions are skipped.
    /// Fails with [`ErrorKind::NoImagesFound`] when nothing is left.
    #[instrument(level = "debug", skip(self), fields(entries = self.archive.len()))]
    pub fn image_entries(&mut self) -> Result<Vec<Entry>> {
        let mut images = Vec::new();
        for index in 0..self.archive.len() {
            // Raw access: no decompression or decryption, only the headers.
            let file = self.archive.by_index_raw(index).or_raise(|| ErrorKind::Unreadable)?;
            if file.is_dir() {
                continue;
            }
            let Some(format) = ImageFormat::from_name(file.name()) else {
                continue;
            };
            images.push(Entry {
                index,
                name: file.name().to_string(),
                declared_size: file.size(),
                format,
            });
        }
        if images.is_empty() {
            exn::bail!(ErrorKind::NoImagesFound);
        }
        tracing::debug!(images = images.len(), "Filtered image entries");
        Ok(images)
    }

    /// Extract the bytes of one entry.
    ///
    /// The size check happens on the decompressed stream, not the declared
    /// size: at most `limit + 1` bytes are buffered, and anything beyond that
    /// is decompressed into a sink only to report the real size in
    /// [`ErrorKind::TooLarge`].
    pub fn extract(&mut self, entry: &Entry, limit: u64) -> Result<Vec<u8>> {
        let extraction = |e: &dyn std::fmt::Display| ErrorKind::Extraction(e.to_string());
        let mut file = self.archive.by_index(entry.index).map_err(|e| extraction(&e))?;
        let mut data = Vec::with_capacity(usize::try_from(entry.declared_size.min(limit)).unwrap_or(0));
        (&mut file).take(limit.saturating_add(1)).read_to_end(&mut data).map_err(|e| extraction(&e))?;
        let buffered = data.len() as u64;
        if buffered > limit {
            let rest = io::copy(&mut file, &mut io::sink()).map_err(|e| extraction(&e))?;
            exn::bail!(ErrorKind::TooLarge { size: buffered + rest, limit });
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::CompressionMethod;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn build(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        Cursor::new(writer.finish().unwrap().into_inner())
    }

    #[test]
    fn test_open_rejects_garbage() {
        let err = ArchiveReader::open(Cursor::new(b"definitely not a zip".to_vec())).err().unwrap();
        assert_eq!(*err, ErrorKind::Unreadable);
    }

    #[test]
    fn test_open_rejects_empty_file() {
        let err = ArchiveReader::open(Cursor::new(Vec::new())).err().unwrap();
        assert_eq!(*err, ErrorKind::Unreadable);
    }

    #[test]
    fn test_image_entries_filters_and_keeps_order() {
        let mut archive = ArchiveReader::open(build(&[
            ("ceremony/", b""),
            ("ceremony/002.jpg", b"two"),
            ("ceremony/001.PNG", b"one"),
            ("readme.txt", b"hello"),
            ("__MACOSX/._002.jpg", b"resource fork"),
            ("reception/cake.webp", b"cake"),
        ]))
        .unwrap();
        let names: Vec<_> = archive.image_entries().unwrap().into_iter().map(|e| e.name).collect();
        // Extension-only filtering lets resource forks through, as they are
        // indistinguishable from images without decoding.
        assert_eq!(names, vec!["ceremony/002.jpg", "ceremony/001.PNG", "__MACOSX/._002.jpg", "reception/cake.webp"]);
    }

    #[test]
    fn test_image_entries_none_found() {
        let mut archive = ArchiveReader::open(build(&[("a/", b""), ("notes.txt", b"x"), ("video.mov", b"y")])).unwrap();
        let err = archive.image_entries().unwrap_err();
        assert_eq!(*err, ErrorKind::NoImagesFound);
    }

    #[test]
    fn test_extract() {
        let mut archive = ArchiveReader::open(build(&[("a.jpg", b"first"), ("b.gif", b"second")])).unwrap();
        let entries = archive.image_entries().unwrap();
        assert_eq!(archive.extract(&entries[1], 1024).unwrap(), b"second");
        assert_eq!(archive.extract(&entries[0], 1024).unwrap(), b"first");
    }

    #[test]
    fn test_extract_exactly_at_limit() {
        let mut archive = ArchiveReader::open(build(&[("a.jpg", &[7u8; 64])])).unwrap();
        let entries = archive.image_entries().unwrap();
        assert_eq!(archive.extract(&entries[0], 64).unwrap().len(), 64);
    }

    #[test]
    fn test_extract_too_large_reports_real_size() {
        let mut archive = ArchiveReader::open(build(&[("huge.jpg", &[0u8; 4096])])).unwrap();
        let entries = archive.image_entries().unwrap();
        let err = archive.extract(&entries[0], 100).unwrap_err();
        assert_eq!(*err, ErrorKind::TooLarge { size: 4096, limit: 100 });
    }

    #[test]
    fn test_extension_preserves_case() {
        let mut archive = ArchiveReader::open(build(&[("x/IMG_1.JPEG", b"1"), ("y.png", b"2")])).unwrap();
        let entries = archive.image_entries().unwrap();
        assert_eq!(entries[0].extension(), ".JPEG");
        assert_eq!(entries[0].format, ImageFormat::Jpeg);
        assert_eq!(entries[1].extension(), ".png");
    }
}
