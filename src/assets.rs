use hyper::body::Bytes;
use rust_embed::Embed;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// The document served for `/` and for client-side routes.
pub const INDEX: &str = "index.html";

#[derive(Embed)]
#[folder = "static/"]
struct StaticDir;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("{0}: not found")]
    NotFound(String),
    #[error("{0}: is a directory")]
    IsDirectory(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Entry<'a> {
    File(&'a Bytes),
    Dir,
}

/// One child of a directory, as shown in a listing.
#[derive(Debug, PartialEq, Eq)]
pub enum Child<'a> {
    File { name: &'a str, len: usize },
    Dir { name: &'a str },
}

/// Read-only snapshot of the bundled web client.
///
/// Paths are relative and `/`-separated (`assets/app.js`); the root directory is the empty path.
/// Directories are not stored, they exist because some file lives beneath them.
#[derive(Debug)]
pub struct AssetStore {
    files: BTreeMap<String, Bytes>,
    dirs: BTreeSet<String>,
}

impl AssetStore {
    /// Snapshot of the `static/` directory compiled into the binary.
    pub fn embedded() -> Self {
        Self::from_files(StaticDir::iter().filter_map(|path| {
            let file = StaticDir::get(&path)?;
            let bytes = match file.data {
                Cow::Borrowed(data) => Bytes::from_static(data),
                Cow::Owned(data) => Bytes::from(data),
            };
            Some((path.into_owned(), bytes))
        }))
    }

    pub fn from_files<P, B>(files: impl IntoIterator<Item = (P, B)>) -> Self
    where
        P: Into<String>,
        B: Into<Bytes>,
    {
        let mut store = Self {
            files: BTreeMap::new(),
            dirs: BTreeSet::from([String::new()]),
        };
        for (path, bytes) in files {
            let path = path.into();
            let mut rest = path.as_str();
            while let Some((parent, _)) = rest.rsplit_once('/') {
                store.dirs.insert(parent.to_string());
                rest = parent;
            }
            store.files.insert(path, bytes.into());
        }
        store
    }

    pub fn open(&self, path: &str) -> Result<Entry<'_>, AssetError> {
        if let Some(bytes) = self.files.get(path) {
            Ok(Entry::File(bytes))
        } else if self.dirs.contains(path) {
            Ok(Entry::Dir)
        } else {
            Err(AssetError::NotFound(path.to_string()))
        }
    }

    pub fn read(&self, path: &str) -> Result<&Bytes, AssetError> {
        match self.open(path)? {
            Entry::File(bytes) => Ok(bytes),
            Entry::Dir => Err(AssetError::IsDirectory(path.to_string())),
        }
    }

    pub fn index(&self) -> Result<&Bytes, AssetError> {
        self.read(INDEX)
    }

    /// Immediate children of `dir`, directories first, each group sorted by name.
    pub fn children(&self, dir: &str) -> Vec<Child<'_>> {
        let prefix = match dir {
            "" => String::new(),
            dir => format!("{}/", dir),
        };
        let subdirs = self
            .dirs
            .iter()
            .filter_map(|d| d.strip_prefix(prefix.as_str()))
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .map(|name| Child::Dir { name });
        let files = self
            .files
            .iter()
            .filter_map(|(path, bytes)| Some((path.strip_prefix(prefix.as_str())?, bytes)))
            .filter(|(name, _)| !name.contains('/'))
            .map(|(name, bytes)| Child::File {
                name,
                len: bytes.len(),
            });
        subdirs.chain(files).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}
