//! Exit codes of the `onceonly` binary.
//!
//! API failures use `ClientError::exit_code`:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 1 | Invalid input or configuration |
//! | 2 | Not logged in, or the key was rejected |
//! | 3 | Payment required |
//! | 4 | Rate limited |
//! | 5 | Other HTTP failure or network error |
//! | 6 | Unexpected response or local failure |

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 6; // Failures outside the API client (prompt, output)

#[cfg(test)]
mod tests {
    use onceonly_client::{ApiError, ClientError};

    #[test]
    fn client_error_codes_match_table() {
        let code = |status| {
            ClientError::from(ApiError::from_response(status, "/v1/me", None)).exit_code()
        };
        assert_eq!(code(401), 2);
        assert_eq!(code(402), 3);
        assert_eq!(code(429), 4);
        assert_eq!(code(500), 5);
        assert_eq!(ClientError::from(ApiError::missing_credential()).exit_code(), 2);
        assert_eq!(
            ClientError::InvalidInput { message: "x".into() }.exit_code(),
            1
        );
        assert_eq!(
            ClientError::InvalidResponse { message: "x".into() }.exit_code(),
            super::INTERNAL_ERROR
        );
    }
}
