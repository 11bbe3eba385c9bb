use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use riffsplit_core::error::{Result, RiffError};

/// Where split segments are written: `directory/<prefix><name><suffix>.wav`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    pub directory: PathBuf,
    pub prefix: String,
    pub suffix: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl OutputLayout {
    /// Layout whose directory is the file name of `input` up to its first '.',
    /// relative to the working directory.
    pub fn for_input(input: &Path) -> Self {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = name.split('.').next().unwrap_or_default();
        let directory = if stem.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(stem)
        };
        Self {
            directory,
            ..Self::default()
        }
    }

    /// Output path of one segment. Names come from label text inside the input file, so a
    /// name that would leave `directory` or span several path components is rejected.
    pub fn path_for(&self, segment_name: &str) -> Result<PathBuf> {
        let file_name = format!("{}{segment_name}{}.wav", self.prefix, self.suffix);
        let mut components = Path::new(&file_name).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single || file_name.contains(['/', '\\']) {
            return Err(RiffError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsafe segment file name: {file_name:?}"),
            )));
        }
        Ok(self.directory.join(file_name))
    }

    /// Output paths for every segment, in order. Fails before anything is written when
    /// two segments would land on the same file.
    pub fn paths_for<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for name in names {
            let path = self.path_for(name)?;
            if !seen.insert(path.clone()) {
                return Err(RiffError::Io(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("two segments map to {}", path.display()),
                )));
            }
            paths.push(path);
        }
        Ok(paths)
    }

    pub fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.directory).map_err(|source| RiffError::FileIo {
            path: self.directory.clone(),
            source,
        })
    }
}
