//! Showing a saved figure to the user.

use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Open a saved figure in the system's default image viewer.
///
/// The viewer runs as a separate process; this returns once it has been
/// launched.
///
/// # Errors
///
/// Returns an error if `path` is not an existing file or no viewer can be launched.
pub fn present_figure<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("figure {} does not exist", path.display()),
        )));
    }

    opener::open(path).map_err(|source| Error::Present {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Opened {} in the default viewer", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_figure() {
        let tmp = tempfile::tempdir().unwrap();
        let result = present_figure(tmp.path().join("orig_adv_diff_7.png"));

        assert!(matches!(
            result,
            Err(Error::Io(err)) if err.kind() == io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_directory_is_not_a_figure() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(present_figure(tmp.path()).is_err());
    }
}
