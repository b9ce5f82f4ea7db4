//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments; clap also exits with 2)  |
//! | 3    | Input file could not be read or decoded              |
//! | 4    | Config file failed to parse or validate              |
//! | 5    | Output file could not be written                     |
//!
//! A run that leaves target rows unmatched still succeeds: unmatched rows
//! are a normal business outcome, not a failure.

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing, unreadable, or in a format that cannot be decoded.
pub const EXIT_READ: u8 = 3;

/// Config TOML is malformed or fails validation.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Output directory or file could not be created.
pub const EXIT_WRITE: u8 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_READ, EXIT_INVALID_CONFIG, EXIT_WRITE];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
