use std::{
    fmt::Write as FmtWrite,
    fs::File,
    io::{Read, Write},
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::error::Error;

/// Decode a hex string into a bytearray
pub(crate) fn decode_hex(s: &str) -> Result<Vec<u8>, Error> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return Err(Error::Generic("invalid hex string".to_string()));
    }

    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|e| Error::Generic(format!("invalid hex string: {e}")))
        })
        .collect()
}

/// Encode a bytearray into a hex string
pub(crate) fn encode_hex(s: &[u8]) -> String {
    s.iter().fold(String::with_capacity(s.len() * 2), |mut acc: String, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Prettify bytes into a human-readable format
pub(crate) fn prettify_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        let kb = bytes / 1024;
        format!("{kb} KB")
    } else if bytes < 1024 * 1024 * 1024 {
        let mb = bytes / (1024 * 1024);
        format!("{mb} MB")
    } else {
        let gb = bytes / (1024 * 1024 * 1024);
        format!("{gb} GB")
    }
}

/// Seconds since the unix epoch.
pub(crate) fn now_secs() -> Result<u64, Error> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::Generic(format!("failed to get current time: {e:?}")))?
        .as_secs())
}

/// Write contents to a file on the disc
/// If the parent directory does not exist, it will be created
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    if let Some(prefix) = path.parent() {
        std::fs::create_dir_all(prefix)?;
    } else {
        return Err(Error::IOError(std::io::Error::other("Unable to create directory")));
    }

    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;

    Ok(())
}

/// Read contents from a file on the disc
/// Returns `None` if the file does not exist
pub(crate) fn read_file(path: &Path) -> Result<Option<String>, Error> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(Some(contents))
}

#[cfg(test)]
mod tests {
    use crate::util::*;

    #[test]
    fn test_decode_hex_valid_hex() {
        let hex = "48656c6c6f20576f726c64"; // "Hello World" in hex
        let result = decode_hex(hex).expect("valid hex");
        assert_eq!(result, vec![72, 101, 108, 108, 111, 32, 87, 111, 114, 108, 100]);
    }

    #[test]
    fn test_decode_hex_invalid_hex() {
        let hex = "48656c6c6f20576f726c4G"; // Invalid hex character 'G'
        let result = decode_hex(hex);
        assert!(result.is_err());

        // odd length and non-ascii input are rejected rather than sliced
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("é1").is_err());
    }

    #[test]
    fn test_encode_hex() {
        let bytes = vec![72, 101, 108, 108, 111, 32, 87, 111, 114, 108, 100];
        let result = encode_hex(&bytes);
        assert_eq!(result, "48656c6c6f20576f726c64");
    }

    #[test]
    fn test_prettify_bytes() {
        assert_eq!(prettify_bytes(500), "500 B");
        assert_eq!(prettify_bytes(500_000), "488 KB");
        assert_eq!(prettify_bytes(500_000_000), "476 MB");
        assert_eq!(prettify_bytes(5_000_000_000), "4 GB");
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let path = std::env::temp_dir().join("txlens-util-missing").join("nothing.bin");
        assert!(read_file(&path).expect("read should not fail").is_none());
    }

    #[test]
    fn test_write_then_read_file() {
        let path = std::env::temp_dir().join("txlens-util-write").join("contents.txt");
        write_file(&path, "Hello, World!").expect("unable to write file");

        assert_eq!(read_file(&path).expect("unable to read file").as_deref(), Some("Hello, World!"));
    }
}
