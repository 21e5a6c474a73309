use std::{
    io,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid site name {0:?}: expected a single path component")]
    InvalidSiteName(String),
    #[error("output directory {} already exists", .0.display())]
    OutputExists(PathBuf),
    #[error("entry page {} is not valid UTF-8", .0.display())]
    EntryNotUtf8(PathBuf),
    #[error("found more than one entry page: {} and {}", first.display(), second.display())]
    MultipleEntryPages { first: PathBuf, second: PathBuf },
    #[error("unexpected entry {} in download tree", .0.display())]
    UnexpectedEntry(PathBuf),
    #[error("{} and {} both map to {}", first.display(), second.display(), output.display())]
    Collision {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },
    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

/// Attaches the offending path to an i/o error.
pub trait PathContext<T> {
    fn at(self, path: &Path) -> Result<T, BuildError>;
}

impl<T> PathContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, BuildError> {
        self.map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
