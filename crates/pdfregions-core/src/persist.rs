//! All-or-nothing file replacement.

use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with the bytes produced by `write`.
///
/// The content goes to a temporary file in the destination directory which is
/// then renamed over `path`, so a failure part-way leaves any previous file
/// untouched. Missing parent directories are created.
pub fn write_atomic<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut buffered = io::BufWriter::new(tmp.as_file_mut());
        write(&mut buffered)?;
        buffered.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
