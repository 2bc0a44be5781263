//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on them, so codes are never reused for a different meaning.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad input)    |
//! | 3-9     | board            | Cell ids, validation and the store       |
//! | 10-19   | assist           | Assist provider, keychain and service    |
//! | 20-29   | export           | Document export service                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use harada_client::ClientError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable input.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Board (3-9)
// =============================================================================

/// Cell id is not on the board.
pub const EXIT_UNKNOWN_CELL: u8 = 3;

/// Help request rejected before sending (no selection, empty question).
pub const EXIT_INVALID_REQUEST: u8 = 4;

/// The store rejected the write, or could not be opened for a change.
pub const EXIT_STORE_WRITE: u8 = 5;

/// The store could not be read.
pub const EXIT_STORE_READ: u8 = 6;

/// Onboarding was not completed (input ended early).
pub const EXIT_ONBOARD_INCOMPLETE: u8 = 7;

// =============================================================================
// Assist (10-19)
// =============================================================================

/// Assist disabled (provider=none).
pub const EXIT_ASSIST_DISABLED: u8 = 10;

/// Assist provider configured but API key missing.
pub const EXIT_ASSIST_MISSING_KEY: u8 = 11;

/// Keychain error (cannot read/write credentials).
pub const EXIT_ASSIST_KEYCHAIN_ERR: u8 = 12;

/// Assist provider configured but no endpoint / service URL.
pub const EXIT_ASSIST_NOT_CONFIGURED: u8 = 13;

/// Assist service failed (network, HTTP error, unusable response).
pub const EXIT_ASSIST_SERVICE: u8 = 14;

/// Suggestion arrived after the selection moved; nothing was written.
pub const EXIT_ASSIST_DISCARDED: u8 = 15;

/// Another request of the same kind is still running.
pub const EXIT_BUSY: u8 = 16;

// =============================================================================
// Export (20-29)
// =============================================================================

/// No service URL configured for export.
pub const EXIT_EXPORT_NOT_CONFIGURED: u8 = 20;

/// Export service failed (network, HTTP error, empty document).
pub const EXIT_EXPORT_SERVICE: u8 = 21;

/// Rendered document could not be written to disk.
pub const EXIT_EXPORT_WRITE: u8 = 22;

// =============================================================================
// Client error mapping
// =============================================================================

/// Map an assist client error to its exit code.
pub fn assist_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::NotConfigured(_) => EXIT_ASSIST_NOT_CONFIGURED,
        ClientError::MissingKey => EXIT_ASSIST_MISSING_KEY,
        ClientError::Network(_)
        | ClientError::Http { .. }
        | ClientError::Parse(_)
        | ClientError::InvalidResponse(_) => EXIT_ASSIST_SERVICE,
    }
}

/// Map an export client error to its exit code.
pub fn export_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::NotConfigured(_) | ClientError::MissingKey => EXIT_EXPORT_NOT_CONFIGURED,
        _ => EXIT_EXPORT_SERVICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_codes() {
        assert_eq!(assist_exit_code(&ClientError::MissingKey), EXIT_ASSIST_MISSING_KEY);
        assert_eq!(
            assist_exit_code(&ClientError::Http { status: 500, message: String::new() }),
            EXIT_ASSIST_SERVICE
        );
        assert_eq!(
            export_exit_code(&ClientError::Network("refused".into())),
            EXIT_EXPORT_SERVICE
        );
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_UNKNOWN_CELL,
            EXIT_INVALID_REQUEST,
            EXIT_STORE_WRITE,
            EXIT_STORE_READ,
            EXIT_ONBOARD_INCOMPLETE,
            EXIT_ASSIST_DISABLED,
            EXIT_ASSIST_MISSING_KEY,
            EXIT_ASSIST_KEYCHAIN_ERR,
            EXIT_ASSIST_NOT_CONFIGURED,
            EXIT_ASSIST_SERVICE,
            EXIT_ASSIST_DISCARDED,
            EXIT_BUSY,
            EXIT_EXPORT_NOT_CONFIGURED,
            EXIT_EXPORT_SERVICE,
            EXIT_EXPORT_WRITE,
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
