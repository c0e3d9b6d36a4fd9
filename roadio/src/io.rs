use std::path::Path;

use roadutil::{Error, Result};

pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

pub fn slurp_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    Ok(fs_err::read(path.as_ref())?)
}

/// Read a whole file as UTF-8.
pub fn slurp_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = slurp_file(path)?;
    String::from_utf8(bytes).map_err(|err| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} isn't UTF-8: {}", path.display(), err),
        ))
    })
}

/// Write bytes to a file, creating the parent directories if needed.
pub fn write_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    fs_err::write(path, bytes)?;
    Ok(())
}
