use eyre::{Result, WrapErr};
use std::path::Path;

/// Writes `value` as pretty JSON, replacing any previous file content
pub fn write_pretty<T, P>(path: P, value: &T) -> Result<()>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        // Without truncate a shorter document leaves trailing garbage
        .truncate(true)
        .open(path)
        .wrap_err_with(|| format!("unable to open {:?} for writing", path))?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).wrap_err_with(|| format!("unable to read {:?}", path))
}
