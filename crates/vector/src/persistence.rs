//! On-disk index image
//!
//! # File Structure
//!
//! ```text
//! Offset   Size          Type        Description
//! ──────────────────────────────────────────────────────────
//! 0x00     8             [u8; 8]     Magic: "RAGVECIX"
//! 0x08     4             u32 LE      Format version (1)
//! 0x0C     4             u32 LE      D: Dimension
//! 0x10     8             u64 LE      N: Record count
//! 0x18     N*D*4         [f32 LE]    Vectors, row-major, in id order
//! ...      per record    u32 LE len  Text length in bytes
//!                        [u8]        UTF-8 text
//! ```
//!
//! Nothing may follow the last text. Saves go through a temporary file in
//! the same directory followed by a rename, so readers only ever see a
//! complete old image or a complete new one.

use ragvec_common::{RagVecError, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::store::VectorStore;

/// Magic bytes identifying an index image
pub const MAGIC: [u8; 8] = *b"RAGVECIX";

/// Current format version
pub const FORMAT_VERSION: u32 = 1;

/// Header size in bytes: 8 (magic) + 4 (version) + 4 (dimension) + 8 (count)
pub const HEADER_SIZE: usize = 24;

const TEMP_SUFFIX: &str = ".tmp";

/// Parsed image header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub version: u32,
    pub dimension: u32,
    pub count: u64,
}

impl ImageHeader {
    /// Parse and validate the header at the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(RagVecError::corrupt_image(format!(
                "file is {} bytes, shorter than the {}-byte header",
                bytes.len(),
                HEADER_SIZE
            )));
        }

        if bytes[0..8] != MAGIC {
            return Err(RagVecError::corrupt_image("bad magic bytes"));
        }

        let version = u32::from_le_bytes(le_array(&bytes[8..12]));
        if version != FORMAT_VERSION {
            return Err(RagVecError::corrupt_image(format!(
                "unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let dimension = u32::from_le_bytes(le_array(&bytes[12..16]));
        if dimension == 0 {
            return Err(RagVecError::corrupt_image("header declares dimension 0"));
        }

        let count = u64::from_le_bytes(le_array(&bytes[16..24]));

        Ok(Self {
            version,
            dimension,
            count,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(&MAGIC);
        buf[8..12].copy_from_slice(&self.version.to_le_bytes());
        buf[12..16].copy_from_slice(&self.dimension.to_le_bytes());
        buf[16..24].copy_from_slice(&self.count.to_le_bytes());
        buf
    }

    /// Size of the vector block, or `None` if it cannot be addressed
    fn vector_block_len(&self) -> Option<usize> {
        let count = usize::try_from(self.count).ok()?;
        count
            .checked_mul(self.dimension as usize)?
            .checked_mul(std::mem::size_of::<f32>())
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

/// Encode a store into image bytes
pub fn encode(store: &VectorStore) -> Result<Vec<u8>> {
    let dimension = u32::try_from(store.dimension()).map_err(|_| {
        RagVecError::invalid_argument(format!(
            "dimension {} does not fit the image format",
            store.dimension()
        ))
    })?;

    let header = ImageHeader {
        version: FORMAT_VERSION,
        dimension,
        count: store.len() as u64,
    };

    let text_bytes: usize = store.texts().iter().map(|t| 4 + t.len()).sum();
    let mut out = Vec::with_capacity(HEADER_SIZE + store.vector_data().len() * 4 + text_bytes);
    out.extend_from_slice(&header.to_bytes());
    for value in store.vector_data() {
        out.extend_from_slice(&value.to_le_bytes());
    }
    for text in store.texts() {
        let len = u32::try_from(text.len()).map_err(|_| {
            RagVecError::invalid_argument(format!("text of {} bytes is too long", text.len()))
        })?;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(text.as_bytes());
    }
    Ok(out)
}

/// Decode image bytes into a store
pub fn decode(bytes: &[u8]) -> Result<VectorStore> {
    let header = ImageHeader::from_bytes(bytes)?;

    let vector_len = header
        .vector_block_len()
        .ok_or_else(|| RagVecError::corrupt_image("declared record count is too large"))?;
    let vector_end = HEADER_SIZE
        .checked_add(vector_len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| {
            RagVecError::corrupt_image(format!(
                "declared {} records of dimension {} but file holds only {} bytes",
                header.count,
                header.dimension,
                bytes.len()
            ))
        })?;

    let data: Vec<f32> = bytes[HEADER_SIZE..vector_end]
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(le_array(chunk)))
        .collect();

    // count is bounded by the vector block length check above
    let count = header.count as usize;
    let mut texts = Vec::with_capacity(count);
    let mut pos = vector_end;
    for id in 0..count {
        let len_end = pos + 4;
        if len_end > bytes.len() {
            return Err(RagVecError::corrupt_image(format!(
                "text block truncated at record {}",
                id
            )));
        }
        let len = u32::from_le_bytes(le_array(&bytes[pos..len_end])) as usize;
        let text_end = len_end
            .checked_add(len)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| {
                RagVecError::corrupt_image(format!("text of record {} runs past end of file", id))
            })?;
        let text = std::str::from_utf8(&bytes[len_end..text_end]).map_err(|e| {
            RagVecError::corrupt_image(format!("text of record {} is not UTF-8: {}", id, e))
        })?;
        texts.push(text.to_string());
        pos = text_end;
    }

    if pos != bytes.len() {
        return Err(RagVecError::corrupt_image(format!(
            "{} trailing bytes after the last record",
            bytes.len() - pos
        )));
    }

    VectorStore::from_parts(header.dimension as usize, data, texts)
}

/// Load the image at `path`. `Ok(None)` when no file exists.
pub fn load(path: &Path) -> Result<Option<VectorStore>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let store = decode(&bytes)?;
    info!(
        "Loaded index image {} - {} records, dimension {}",
        path.display(),
        store.len(),
        store.dimension()
    );
    Ok(Some(store))
}

/// Read only the header of the image at `path`
pub fn read_header(path: &Path) -> Result<ImageHeader> {
    use std::io::Read;

    let mut buf = [0u8; HEADER_SIZE];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < HEADER_SIZE {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    ImageHeader::from_bytes(&buf[..filled])
}

/// Atomically replace the image at `path` with the contents of `store`
pub fn save(store: &VectorStore, path: &Path) -> Result<()> {
    let bytes = encode(store)?;
    save_bytes(&bytes, path)
}

/// Atomically replace the image at `path` with already encoded bytes
pub fn save_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    let temp = write_temp(bytes, path)?;
    commit(&temp, path)?;
    debug!("Saved index image {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// First save phase: write and fsync a temporary sibling of `path`.
///
/// The temporary file is removed again if anything fails.
pub fn write_temp(bytes: &[u8], path: &Path) -> Result<PathBuf> {
    let temp = temp_path(path)?;

    let result = (|| -> io::Result<()> {
        let file = File::create(&temp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(temp)
}

/// Second save phase: rename the temporary file over `path`
pub fn commit(temp: &Path, path: &Path) -> Result<()> {
    if let Err(e) = fs::rename(temp, path) {
        let _ = fs::remove_file(temp);
        return Err(e.into());
    }
    sync_parent_dir(path);
    Ok(())
}

/// Remove temporary files left behind by an interrupted save.
///
/// Returns the number of files removed.
pub fn remove_stale_temps(path: &Path) -> Result<usize> {
    let (dir, prefix) = temp_location(path)?;
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && name.ends_with(TEMP_SUFFIX) {
            warn!("Removing stale temporary image {}", entry.path().display());
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// `<dir>/.<file name>.<uuid>.tmp`
fn temp_path(path: &Path) -> Result<PathBuf> {
    let (dir, prefix) = temp_location(path)?;
    Ok(dir.join(format!("{}{}{}", prefix, uuid::Uuid::new_v4().simple(), TEMP_SUFFIX)))
}

fn temp_location(path: &Path) -> Result<(PathBuf, String)> {
    let file_name = path.file_name().ok_or_else(|| {
        RagVecError::invalid_argument(format!("index path {} has no file name", path.display()))
    })?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, format!(".{}.", file_name.to_string_lossy())))
}

/// Make the rename itself durable. Best effort: not every platform can
/// open a directory for syncing.
fn sync_parent_dir(path: &Path) {
    #[cfg(unix)]
    {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_store() -> VectorStore {
        let mut store = VectorStore::new(3).unwrap();
        store.append(&[1.0, 0.0, 0.0], "a").unwrap();
        store.append(&[0.0, 1.0, 0.0], "b").unwrap();
        store
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&sample_store()).unwrap();

        assert_eq!(&bytes[0..8], b"RAGVECIX");
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 3);
        assert_eq!(u64::from_le_bytes(bytes[16..24].try_into().unwrap()), 2);
        // second record's first float
        assert_eq!(f32::from_le_bytes(bytes[36..40].try_into().unwrap()), 0.0);
        assert_eq!(f32::from_le_bytes(bytes[40..44].try_into().unwrap()), 1.0);
        // text block: [1]"a" [1]"b"
        assert_eq!(&bytes[48..], &[1, 0, 0, 0, b'a', 1, 0, 0, 0, b'b']);
        assert_eq!(bytes.len(), HEADER_SIZE + 2 * 3 * 4 + 10);
    }

    #[test]
    fn test_save_load_preserves_bits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.rvx");

        let mut store = VectorStore::new(2).unwrap();
        store.append(&[f32::MIN_POSITIVE, -0.0], "tiny").unwrap();
        store.append(&[1.0e-30, 1.0e18], "").unwrap();
        store.append(&[0.1, -7.25], "유니코드 text").unwrap();
        save(&store, &path).unwrap();

        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded.dimension(), 2);
        assert_eq!(loaded.len(), 3);
        for (a, b) in store.iter().zip(loaded.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.text, b.text);
            let a_bits: Vec<u32> = a.vector.iter().map(|v| v.to_bits()).collect();
            let b_bits: Vec<u32> = b.vector.iter().map(|v| v.to_bits()).collect();
            assert_eq!(a_bits, b_bits);
        }
    }

    #[test]
    fn test_empty_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.rvx");
        save(&VectorStore::new(384).unwrap(), &path).unwrap();

        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded.dimension(), 384);
        assert!(loaded.is_empty());
        assert_eq!(fs::metadata(&path).unwrap().len(), HEADER_SIZE as u64);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(load(&dir.path().join("absent.rvx")).unwrap().is_none());
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let mut bytes = encode(&sample_store()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(RagVecError::CorruptImage(_))));
    }

    #[test]
    fn test_bad_version_is_corrupt() {
        let mut bytes = encode(&sample_store()).unwrap();
        bytes[8..12].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(RagVecError::CorruptImage(_))));
    }

    #[test]
    fn test_count_mismatch_is_corrupt() {
        let mut bytes = encode(&sample_store()).unwrap();
        bytes[16..24].copy_from_slice(&3u64.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(RagVecError::CorruptImage(_))));

        let mut bytes = encode(&sample_store()).unwrap();
        bytes[16..24].copy_from_slice(&1u64.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(RagVecError::CorruptImage(_))));
    }

    #[test]
    fn test_huge_count_is_corrupt() {
        let mut bytes = encode(&sample_store()).unwrap();
        bytes[16..24].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(RagVecError::CorruptImage(_))));
    }

    #[test]
    fn test_trailing_bytes_are_corrupt() {
        let mut bytes = encode(&sample_store()).unwrap();
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(RagVecError::CorruptImage(_))));
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let bytes = encode(&sample_store()).unwrap();
        for cut in [0, 10, HEADER_SIZE, HEADER_SIZE + 5, bytes.len() - 1] {
            assert!(
                matches!(decode(&bytes[..cut]), Err(RagVecError::CorruptImage(_))),
                "cut at {}",
                cut
            );
        }
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let mut bytes = encode(&sample_store()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 0xFF;
        assert!(matches!(decode(&bytes), Err(RagVecError::CorruptImage(_))));
    }

    #[test]
    fn test_interrupted_save_keeps_previous_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.rvx");
        let original = sample_store();
        save(&original, &path).unwrap();
        let before = fs::read(&path).unwrap();

        let mut updated = original.clone();
        updated.append(&[0.0, 0.0, 1.0], "c").unwrap();
        // crash after the temp write, before the rename
        let temp = write_temp(&encode(&updated).unwrap(), &path).unwrap();
        assert!(temp.exists());

        assert_eq!(fs::read(&path).unwrap(), before);
        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded, original);

        assert_eq!(remove_stale_temps(&path).unwrap(), 1);
        assert!(!temp.exists());
        assert!(path.exists());
    }

    #[test]
    fn test_successful_save_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.rvx");
        save(&sample_store(), &path).unwrap();
        save(&sample_store(), &path).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["index.rvx".to_string()]);
    }

    #[test]
    fn test_save_into_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("index.rvx");
        assert!(matches!(save(&sample_store(), &path), Err(RagVecError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.rvx");
        save(&sample_store(), &path).unwrap();

        let header = read_header(&path).unwrap();
        assert_eq!(
            header,
            ImageHeader {
                version: FORMAT_VERSION,
                dimension: 3,
                count: 2
            }
        );
    }
}
