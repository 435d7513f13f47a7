//! # Product Inventory
//!
//! The set of regular files under a product root, keyed by path relative to
//! the root. During reconciliation each MPH entry claims (removes) the file
//! it names; whatever is left at the end is not referenced by the MPH.
//!
//! Working on an owned set rather than asking the filesystem again per entry
//! means a file can be claimed once at most.
//!
//! Listing never fails as a whole. A directory or entry that cannot be read
//! is skipped and remembered as [`Unlisted`], so the caller can report it and
//! carry on with the rest of the product.

use std::collections::BTreeSet;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Files of one product not yet claimed by an MPH entry.
#[derive(Debug, Clone)]
pub struct Inventory {
    root: PathBuf,
    files: BTreeSet<PathBuf>,
    unlisted: Vec<Unlisted>,
}

/// A directory or directory entry the scan could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlisted {
    /// Path relative to the product root; empty for the root itself.
    pub path: PathBuf,
    pub reason: String,
}

impl Inventory {
    /// List every regular file below `root`.
    ///
    /// Symbolic links to files are included; symbolic links to directories
    /// are not descended into. Unreadable directories are skipped and listed
    /// in [`Inventory::unlisted`].
    pub fn scan(root: &Path) -> Self {
        let mut inventory = Self {
            root: root.to_path_buf(),
            files: BTreeSet::new(),
            unlisted: Vec::new(),
        };
        inventory.walk(root);
        inventory
    }

    fn walk(&mut self, dir: &Path) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => return self.skip(dir, &e),
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.skip(dir, &e);
                    continue;
                }
            };
            let path = entry.path();
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => self.walk(&path),
                Ok(_) if path.is_file() => {
                    if let Ok(relative) = path.strip_prefix(&self.root) {
                        self.files.insert(relative.to_path_buf());
                    }
                }
                Ok(_) => {}
                Err(e) => self.skip(&path, &e),
            }
        }
    }

    fn skip(&mut self, path: &Path, error: &io::Error) {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.unlisted.push(Unlisted {
            path: relative.to_path_buf(),
            reason: error.to_string(),
        });
    }

    /// Turn an MPH reference into an inventory key.
    ///
    /// `.` components are dropped. References containing `..` or starting at
    /// a filesystem root can never name a file of the product and yield
    /// `None`.
    pub fn resolve(reference: &str) -> Option<PathBuf> {
        let mut key = PathBuf::new();
        for component in Path::new(reference).components() {
            match component {
                Component::Normal(part) => key.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        (!key.as_os_str().is_empty()).then_some(key)
    }

    /// Take `relative` out of the inventory without counting it as claimed.
    pub fn exclude(&mut self, relative: &Path) -> bool {
        self.files.remove(relative)
    }

    /// Claim `relative`. Returns `false` if it is not (or no longer) present.
    pub fn claim(&mut self, relative: &Path) -> bool {
        self.files.remove(relative)
    }

    pub fn contains(&self, relative: &Path) -> bool {
        self.files.contains(relative)
    }

    /// Absolute location of an inventory key.
    pub fn path_of(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Remaining keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Directories and entries the scan had to skip.
    pub fn unlisted(&self) -> &[Unlisted] {
        &self.unlisted
    }

    /// Consume the inventory, returning the unclaimed keys in sorted order.
    pub fn into_remaining(self) -> Vec<PathBuf> {
        self.files.into_iter().collect()
    }
}
