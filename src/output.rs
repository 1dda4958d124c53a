//! Output directory bookkeeping and file naming.

use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default base folder for everything the demo writes.
pub const DEFAULT_OUTPUT_ROOT: &str = "./output";

/// Permission bits for created directories.
pub const DIR_MODE: u32 = 0o755;

/// Where result images are written.
///
/// Files for a dataset live in `root/<category>/`; comparison figures live
/// directly in `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Base output folder.
    pub root: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_ROOT)
    }
}

impl OutputLayout {
    /// Create a layout rooted at `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Ensure the base folder exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn check_root(&self) -> Result<&Path> {
        create_dir(&self.root)?;
        Ok(&self.root)
    }

    /// Ensure the base folder and its `category` subfolder exist.
    ///
    /// Safe to call repeatedly. Returns the category folder.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be created.
    pub fn check_output_directory(&self, category: &str) -> Result<PathBuf> {
        create_dir(&self.root)?;
        let dir = self.category_dir(category);
        create_dir(&dir)?;
        Ok(dir)
    }

    /// Folder holding files for `category`.
    #[must_use]
    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.root.join(category)
    }

    /// Path of the denormalized original image.
    #[must_use]
    pub fn original_path(&self, category: &str, id: i64, label: i64, method: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{id}_original-{label}-by-{method}.png"))
    }

    /// Path of the denormalized adversarial image.
    #[must_use]
    pub fn adversary_path(&self, category: &str, id: i64, label: i64, method: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{id}_adversary-{label}-by-{method}.png"))
    }

    /// Path of the absolute difference image.
    #[must_use]
    pub fn diff_path(&self, category: &str, id: i64, method: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{id}_diff-x-by-{method}.png"))
    }

    /// Path of a comparison figure; `timestamp` is `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn figure_path(&self, label: i64, timestamp: &str) -> PathBuf {
        self.root
            .join(format!("orig_adv_diff_{label}_{timestamp}.png"))
    }
}

fn create_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    builder.create(path).map_err(|source| Error::OutputDir {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Created output directory {}", path.display());
    Ok(())
}
