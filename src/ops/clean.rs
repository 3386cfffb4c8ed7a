//! Implementation of `pcapy clean`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs::remove_dir_all_if_exists;

/// Remove build outputs.
///
/// Without `all` only the intermediate objects under `<build_dir>/temp` go;
/// the built module stays. Returns the directory that was removed, if any.
pub fn clean(build_dir: &Path, all: bool) -> Result<Option<PathBuf>> {
    let target = if all {
        build_dir.to_path_buf()
    } else {
        build_dir.join("temp")
    };

    if remove_dir_all_if_exists(&target)? {
        tracing::debug!("Removed {}", target.display());
        Ok(Some(target))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_keeps_module() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build");
        fs::create_dir_all(build.join("temp")).unwrap();
        fs::write(build.join("temp/pcapy.o"), "").unwrap();
        fs::write(build.join("pcapy.so"), "").unwrap();

        assert_eq!(clean(&build, false).unwrap(), Some(build.join("temp")));
        assert!(build.join("pcapy.so").exists());
        assert_eq!(clean(&build, false).unwrap(), None);

        assert_eq!(clean(&build, true).unwrap(), Some(build.clone()));
        assert!(!build.exists());
    }
}
