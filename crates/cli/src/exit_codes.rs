//! CLI Exit Code Registry
//!
//! Single source of truth for `enro` exit codes. Exit codes are part of
//! the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                    |
//! |------|--------------------------------------------|
//! | 0    | Success                                    |
//! | 1    | Command failed (bad data, missing record)  |
//! | 2    | Usage error (bad args, unreadable file)    |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Command failed - ingest rejected the file, a lookup found nothing,
/// or the store could not be read or written.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed pincode, unreadable config.
pub const EXIT_USAGE: u8 = 2;
