//! CLI Exit Code Registry
//!
//! Single source of truth for `jdfmerge` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | CLI usage error (bad args)                       |
//! | 3    | Invalid settings (file or flag overrides)        |
//! | 4    | Source archive unreadable                        |
//! | 5    | Reference stop list unreadable or empty          |
//! | 6    | Output could not be written                      |
//! | 7    | Merge finished with issues and `--strict` is set |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. clap uses the same code for its own errors.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Merge (3-7)
// =============================================================================

/// Settings file unreadable, unparseable or rejected by validation.
pub const EXIT_INVALID_SETTINGS: u8 = 3;

/// The container archive cannot be opened or listed.
pub const EXIT_ARCHIVE_UNREADABLE: u8 = 4;

/// The reference stop list cannot be read, decoded, or has no stops.
pub const EXIT_REFERENCE_UNREADABLE: u8 = 5;

/// An output table or the report file could not be written.
pub const EXIT_WRITE_FAILED: u8 = 6;

/// Output was written but issues were reported and `--strict` was given.
pub const EXIT_STRICT_ISSUES: u8 = 7;
