//! `Authorization` header parsing.

/// The only accepted scheme prefix: case-sensitive, exactly one space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Error returned when a header does not carry a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    /// The header does not start with `Bearer `.
    #[error("authorization header must use the Bearer scheme")]
    MissingScheme,
    /// Nothing follows the scheme prefix.
    #[error("bearer credential is empty")]
    EmptyCredential,
}

/// Extract the credential from a `Bearer <token>` header value.
///
/// # Errors
/// Returns `BearerError` if the prefix is absent or the remainder is empty.
pub fn parse_bearer(header: &str) -> Result<&str, BearerError> {
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(BearerError::MissingScheme)?;
    if token.is_empty() {
        return Err(BearerError::EmptyCredential);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_token() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_scheme_is_case_sensitive() {
        assert_eq!(parse_bearer("bearer abc"), Err(BearerError::MissingScheme));
        assert_eq!(parse_bearer("BEARER abc"), Err(BearerError::MissingScheme));
    }

    #[test]
    fn test_requires_single_space() {
        assert_eq!(parse_bearer("Bearerabc"), Err(BearerError::MissingScheme));
        assert_eq!(parse_bearer("Bearer  abc"), Ok(" abc"));
    }

    #[test]
    fn test_empty_remainder() {
        assert_eq!(parse_bearer("Bearer "), Err(BearerError::EmptyCredential));
        assert_eq!(parse_bearer(""), Err(BearerError::MissingScheme));
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert_eq!(
            parse_bearer("Basic dXNlcjpwYXNz"),
            Err(BearerError::MissingScheme)
        );
    }
}
