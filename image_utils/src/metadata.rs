//! File timestamp preservation for converted outputs.

use std::io;
use std::path::Path;

/// Copy access and modification times from `src` onto `dst`.
pub fn copy_file_timestamps(src: &Path, dst: &Path) -> io::Result<()> {
    let m = std::fs::metadata(src)?;
    let atime = filetime::FileTime::from_last_access_time(&m);
    let mtime = filetime::FileTime::from_last_modification_time(&m);
    filetime::set_file_times(dst, atime, mtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_timestamps() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.heic");
        let dst = dir.path().join("src.heic.jpg");
        std::fs::write(&src, b"src").unwrap();
        std::fs::write(&dst, b"dst").unwrap();

        let old = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_times(&src, old, old).unwrap();

        copy_file_timestamps(&src, &dst).unwrap();

        let m = std::fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&m), old);
    }

    #[test]
    fn test_missing_source_is_error() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("out.jpg");
        std::fs::write(&dst, b"dst").unwrap();
        assert!(copy_file_timestamps(&dir.path().join("gone"), &dst).is_err());
    }
}
