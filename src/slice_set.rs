use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::enums::SortBy;

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum SliceSetError {
    #[error("No DICOM slices found in {0}")]
    NoSlices(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered locators, one per slice, in anatomical order.
///
/// Every call to [`SliceSet::new`] creates a new identity, even for equal
/// contents. Clones share the identity.
#[derive(Debug, Clone)]
pub struct SliceSet {
    identity: u64,
    locators: Arc<[String]>,
}

impl SliceSet {
    pub fn new<I, S>(locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identity: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
            locators: locators.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty::<String>())
    }

    /// Collect slices from a directory: `.dcm` files and files without an
    /// extension.
    pub fn from_directory(path: impl AsRef<Path>, sort_by: SortBy) -> Result<Self, SliceSetError> {
        let path = path.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| match path.extension().and_then(|s| s.to_str()) {
                Some(ext) => ext.eq_ignore_ascii_case("dcm"),
                None => true,
            })
            .collect();

        if paths.is_empty() {
            return Err(SliceSetError::NoSlices(path.to_path_buf()));
        }

        sort_paths(&mut paths, sort_by);
        log::info!("Found {} slices in {}", paths.len(), path.display());

        Ok(Self::new(
            paths
                .into_iter()
                .map(|path| path.to_string_lossy().into_owned()),
        ))
    }

    pub fn identity(&self) -> u64 {
        self.identity
    }

    pub fn same_identity(&self, other: &SliceSet) -> bool {
        self.identity == other.identity
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.locators.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locators.iter().map(String::as_str)
    }
}

fn sort_paths(paths: &mut [PathBuf], sort_by: SortBy) {
    match sort_by {
        SortBy::NumericName => paths.sort_by_key(|path| {
            let name = file_name(path);
            (leading_number(&name), name)
        }),
        SortBy::Name => paths.sort_by_key(|path| file_name(path)),
        SortBy::None => {}
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// First run of ASCII digits in `name`, 0 when there is none.
fn leading_number(name: &str) -> u64 {
    name.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .fold(0u64, |acc, c| {
            acc.saturating_mul(10)
                .saturating_add(u64::from(c as u8 - b'0'))
        })
}
