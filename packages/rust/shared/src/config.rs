//! Allow-list configuration read from the process environment.
//!
//! Each handler is authorized for a fixed set of caller identities, supplied
//! as `<HANDLER_NAME>_USER_IDS` (comma-separated numeric ids). Configuration
//! is read once at startup; a missing key, an empty list, or an unparseable
//! id is fatal before the process starts serving.

use crate::error::{Result, TexsetError};
use crate::types::CallerId;

/// Environment key suffix for per-handler allow-lists.
pub const ENV_SUFFIX: &str = "_USER_IDS";

/// Environment key for a handler name (e.g. `ADMIN` → `ADMIN_USER_IDS`).
pub fn env_key(handler: &str) -> String {
    format!("{handler}{ENV_SUFFIX}")
}

/// Read and parse a handler's allow-list from the environment.
pub fn allow_list_from_env(handler: &str) -> Result<Vec<CallerId>> {
    let key = env_key(handler);
    let raw = std::env::var(&key)
        .map_err(|_| TexsetError::config(format!("{key} is not set")))?;
    parse_allow_list(&key, &raw)
}

/// Parse a comma-separated allow-list. Blank segments are tolerated
/// (trailing commas, stray whitespace); an effectively empty list is not —
/// a handler nobody may invoke is a configuration mistake.
pub fn parse_allow_list(key: &str, raw: &str) -> Result<Vec<CallerId>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment.parse::<CallerId>().map_err(|_| {
                TexsetError::config(format!("invalid caller id {segment:?} in {key}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(TexsetError::config(format!("{key} lists no caller ids")));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_ids() {
        let ids = parse_allow_list("TEST_USER_IDS", "1,23, 456 ,7890,").expect("parse");
        assert_eq!(
            ids,
            vec![CallerId(1), CallerId(23), CallerId(456), CallerId(7890)]
        );
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = parse_allow_list("TEST_USER_IDS", "1,abc,3").unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn rejects_empty_list() {
        assert!(parse_allow_list("TEST_USER_IDS", "").is_err());
        assert!(parse_allow_list("TEST_USER_IDS", " , ,").is_err());
    }

    #[test]
    fn missing_env_key_is_fatal() {
        // Use a unique env var name to avoid interfering with other tests
        let err = allow_list_from_env("TEXSET_TEST_NONEXISTENT_HANDLER_12345").unwrap_err();
        assert!(err.to_string().contains("is not set"));
    }

    #[test]
    fn env_key_format() {
        assert_eq!(env_key("ADMIN"), "ADMIN_USER_IDS");
    }
}
