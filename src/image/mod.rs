use crate::mem::Memory;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },
}

/// Reads a flat binary image into RAM at address 0. At most one RAM's worth of
/// bytes is read; the rest of the file is ignored. Returns the bytes loaded.
pub fn load_image_file(path: impl AsRef<Path>, mem: &mut Memory) -> Result<usize, LoadError> {
    let path = path.as_ref();
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut bytes = Vec::with_capacity(mem.size_bytes());
    file.take(mem.size_bytes() as u64)
        .read_to_end(&mut bytes)
        .map_err(io_err)?;

    if bytes.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let loaded = load_image_bytes(&bytes, mem);
    tracing::debug!(path = %path.display(), bytes = loaded, "image loaded");
    Ok(loaded)
}

/// Copies an in-memory image into RAM at address 0.
pub fn load_image_bytes(bytes: &[u8], mem: &mut Memory) -> usize {
    let loaded = mem.load_bytes(bytes);
    if loaded < bytes.len() {
        tracing::warn!(
            dropped = bytes.len() - loaded,
            "image larger than RAM, tail ignored"
        );
    }
    loaded
}
