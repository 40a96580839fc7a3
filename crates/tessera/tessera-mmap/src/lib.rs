use memmap2::MmapMut;
use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

/// A read-write mapping shared with other processes through a named file,
/// or a private anonymous mapping used in tests.
pub struct SharedMapping {
    _file: Option<File>,
    path: Option<PathBuf>,
    mmap: MmapMut,
}

impl SharedMapping {
    /// Open the file at `path`, creating it if missing, grow it to at least
    /// `min_len` bytes and map the whole file read-write.
    ///
    /// An existing file is never truncated: another process may still have it
    /// mapped, and shrinking it under that mapping faults the other side.
    /// Bytes added by growing the file read as zero.
    pub fn open_or_create<P: AsRef<Path>>(path: P, min_len: u64) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        if file.metadata()?.len() < min_len {
            file.set_len(min_len)?;
        }

        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self {
            _file: Some(file),
            path: Some(path.to_path_buf()),
            mmap,
        })
    }

    /// Map `len` zeroed bytes that belong to this process only
    pub fn anonymous(len: usize) -> io::Result<Self> {
        let mmap = MmapMut::map_anon(len)?;
        Ok(Self {
            _file: None,
            path: None,
            mmap,
        })
    }

    /// Return raw pointer to start of memory mapped data
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.mmap.as_mut_ptr()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Backing file, `None` for anonymous mappings
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Directory that holds named regions when the caller does not pick one.
///
/// `/dev/shm` keeps the pages in memory on Linux; elsewhere the system temp
/// directory is used.
pub fn default_shm_dir() -> PathBuf {
    let dev_shm = Path::new("/dev/shm");
    if cfg!(target_os = "linux") && dev_shm.is_dir() {
        dev_shm.to_path_buf()
    } else {
        std::env::temp_dir()
    }
}

/// Resolve a region name to its backing file inside `dir`.
///
/// Names are flat: empty names and names containing a path separator or a
/// parent component are rejected with `InvalidInput`.
pub fn region_path(dir: &Path, name: &str) -> io::Result<PathBuf> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('\0')
        || name.chars().any(std::path::is_separator);
    if bad {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid region name '{name}'"),
        ));
    }
    Ok(dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_zeroed_file_of_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh");

        let mut m = SharedMapping::open_or_create(&path, 4096).unwrap();
        assert_eq!(m.len(), 4096);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 4096);

        let bytes = unsafe { std::slice::from_raw_parts(m.as_mut_ptr(), m.len()) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn reopen_keeps_contents_and_never_shrinks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept");

        {
            let mut m = SharedMapping::open_or_create(&path, 128).unwrap();
            unsafe { m.as_mut_ptr().add(7).write(0xAB) };
        }

        let mut m = SharedMapping::open_or_create(&path, 64).unwrap();
        assert_eq!(m.len(), 128);
        assert_eq!(unsafe { m.as_mut_ptr().add(7).read() }, 0xAB);
    }

    #[test]
    fn reopen_grows_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grown");

        drop(SharedMapping::open_or_create(&path, 32).unwrap());
        let m = SharedMapping::open_or_create(&path, 256).unwrap();
        assert_eq!(m.len(), 256);
        assert_eq!(m.path(), Some(path.as_path()));
    }

    #[test]
    fn anonymous_mapping_is_zeroed_and_unnamed() {
        let mut m = SharedMapping::anonymous(512).unwrap();
        assert_eq!(m.len(), 512);
        assert!(m.path().is_none());
        let bytes = unsafe { std::slice::from_raw_parts(m.as_mut_ptr(), m.len()) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn region_names_must_be_flat() {
        let dir = Path::new("/tmp");
        assert_eq!(region_path(dir, "TESSERA").unwrap(), dir.join("TESSERA"));
        assert!(region_path(dir, "").is_err());
        assert!(region_path(dir, "..").is_err());
        assert!(region_path(dir, "a/b").is_err());
    }
}
