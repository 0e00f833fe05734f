//! Bundle directories handed to the runtime.

use crate::error::{RuntimeError, RuntimeResult};
use crate::spec::{SpecGenerator, CONFIG_FILE_NAME};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

const BUNDLE_PREFIX: &str = "orv-bundle-";

/// Where the container root filesystem comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum RootfsSource {
    /// A `.tar` or `.tar.gz` archive unpacked into the bundle.
    Tarball(PathBuf),
    /// A directory copied into the bundle.
    Directory(PathBuf),
    /// An empty root filesystem directory.
    Empty,
}

impl RootfsSource {
    /// The conventional `rootfs-<arch>.tar.gz` archive in the working directory.
    pub fn default_tarball() -> Self {
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "powerpc64" => "ppc64le",
            other => other,
        };
        Self::Tarball(PathBuf::from(format!("rootfs-{arch}.tar.gz")))
    }

    /// Infer the source kind from a path: directories are copied, files unpacked.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Tarball(path)
        }
    }
}

impl Default for RootfsSource {
    fn default() -> Self {
        Self::default_tarball()
    }
}

/// A bundle on disk: a fresh temporary directory holding the root filesystem
/// and, once written, `config.json`.
///
/// The directory is removed when the bundle is dropped; [`Bundle::close`]
/// removes it eagerly and reports failures.
#[derive(Debug)]
pub struct Bundle {
    dir: TempDir,
    root_path: String,
}

impl Bundle {
    /// Prepare a bundle under the system temporary directory.
    pub fn prepare(source: &RootfsSource, root_path: &str) -> RuntimeResult<Self> {
        Self::prepare_in(&std::env::temp_dir(), source, root_path)
    }

    /// Prepare a bundle under `parent`.
    pub fn prepare_in(parent: &Path, source: &RootfsSource, root_path: &str) -> RuntimeResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(BUNDLE_PREFIX)
            .tempdir_in(parent)
            .map_err(|source| RuntimeError::Bundle {
                path: parent.to_path_buf(),
                source,
            })?;

        let rootfs = dir.path().join(root_path);
        fs::create_dir_all(&rootfs).map_err(|source| RuntimeError::Bundle {
            path: rootfs.clone(),
            source,
        })?;

        let populated = match source {
            RootfsSource::Tarball(archive) => unpack_tarball(archive, &rootfs),
            RootfsSource::Directory(src) => copy_tree(src, &rootfs),
            RootfsSource::Empty => Ok(()),
        };
        populated.map_err(|source| RuntimeError::Bundle {
            path: rootfs.clone(),
            source,
        })?;

        tracing::debug!(bundle = %dir.path().display(), ?source, "prepared bundle");

        Ok(Self {
            dir,
            root_path: root_path.to_string(),
        })
    }

    /// Bundle directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root filesystem directory inside the bundle.
    pub fn rootfs_path(&self) -> PathBuf {
        self.dir.path().join(&self.root_path)
    }

    /// Path of `config.json`.
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(CONFIG_FILE_NAME)
    }

    /// Write the generator's document as the bundle's `config.json`.
    pub fn write_config(&self, generator: &SpecGenerator) -> RuntimeResult<PathBuf> {
        generator.write_to(self.path())
    }

    /// Remove the bundle directory.
    pub fn close(self) -> RuntimeResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| RuntimeError::Bundle { path, source })
    }
}

fn unpack_tarball(archive: &Path, dest: &Path) -> io::Result<()> {
    let file = File::open(archive)?;
    let is_plain_tar = archive.extension().is_some_and(|ext| ext == "tar");
    if is_plain_tar {
        tar::Archive::new(file).unpack(dest)
    } else {
        tar::Archive::new(GzDecoder::new(file)).unpack(dest)
    }
}

fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, target)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, target: &Path) -> io::Result<()> {
    fs::copy(src, target).map(|_| ())
}
