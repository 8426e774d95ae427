use std::{env, fs, path::Path};

use eyre::{eyre, Result};

/// Replaces the current working directory prefix of `path` with `.`.
///
/// ```no_run
/// use txlens_common::utils::io::short_path;
///
/// let path = "/some/long/path/that/is/cwd/something.json";
/// let short_path = short_path(path);
/// assert_eq!(short_path, "./something.json");
/// ```
pub fn short_path(path: &str) -> String {
    match env::current_dir() {
        Ok(dir) => path.replace(&dir.to_string_lossy().into_owned(), "."),
        Err(_) => path.to_owned(),
    }
}

/// Writes `contents` to `path`, creating parent directories as needed.
///
/// ```no_run
/// use txlens_common::utils::io::write_file;
///
/// write_file("/tmp/txlens/test.txt", "Hello, World!").expect("failed to write");
/// ```
pub fn write_file(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();

    let parent = path.parent().ok_or_else(|| eyre!("'{}' has no parent directory", path.display()))?;
    fs::create_dir_all(parent)?;
    fs::write(path, contents)?;

    Ok(())
}

/// Reads the file at `path` into a string.
pub fn read_file(path: impl AsRef<Path>) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Deletes the file at `path`. Returns whether a file was removed.
pub fn delete_path(path: impl AsRef<Path>) -> bool {
    fs::remove_file(path).is_ok()
}
