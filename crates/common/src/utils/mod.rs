/// Environment variable utilities.
pub mod env;

/// Hexadecimal encoding and validation utilities.
pub mod hex;

/// Integer manipulation and formatting utilities.
pub mod integers;

/// File system helpers.
pub mod io;
