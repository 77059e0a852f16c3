use std::{
    cell::RefCell,
    env, fmt, io,
    path::{Path, PathBuf},
};

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

/// A path written in the configuration file, resolved against the directory the
/// configuration file lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePath {
    pub relative: String,
    pub absolute: PathBuf,
}

impl Serialize for FilePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.relative)
    }
}

// Deserialization has no other way to learn where the configuration file lives.
thread_local!(static CONTEXT_START_PATH: RefCell<Option<PathBuf>> = const { RefCell::new(None) });

pub fn with_start_path<F, T>(start_path: &Path, f: F) -> T
where
    F: FnOnce() -> T,
{
    CONTEXT_START_PATH.with(|ctx| {
        *ctx.borrow_mut() = Some(start_path.to_path_buf());
    });

    let result = f();

    CONTEXT_START_PATH.with(|ctx| {
        *ctx.borrow_mut() = None;
    });

    result
}

struct FilePathVisitor;

impl<'de> Visitor<'de> for FilePathVisitor {
    type Value = FilePath;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string representing a file path")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        CONTEXT_START_PATH.with(|ctx| match ctx.borrow().as_ref() {
            Some(start_path) => Ok(FilePath::resolve_relative(start_path, v)),
            None => Err(E::custom(
                "FilePath deserialization context (start_path) is not set",
            )),
        })
    }
}

impl<'de> Deserialize<'de> for FilePath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(FilePathVisitor)
    }
}

impl FilePath {
    pub fn new_from_relative(relative_path: &str) -> io::Result<FilePath> {
        Ok(Self::resolve_relative(&env::current_dir()?, relative_path))
    }

    fn resolve_relative<RootPath: AsRef<Path>>(base_path: &RootPath, relative_path: &str) -> FilePath {
        FilePath {
            relative: relative_path.to_string(),
            absolute: base_path.as_ref().join(relative_path),
        }
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.absolute.display())
    }
}
