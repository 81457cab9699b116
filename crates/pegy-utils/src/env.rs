//! Environment variable helpers

use std::str::FromStr;

/// Value of `name`, trimmed; unset and blank both yield `None`
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `name` into `T`; unset, blank or unparseable yield `None`
pub fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env_var(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable value for {}: {:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var() {
        unsafe {
            std::env::set_var("PEGY_UTILS_TEST_SET", "  value ");
            std::env::set_var("PEGY_UTILS_TEST_BLANK", "   ");
        }
        assert_eq!(env_var("PEGY_UTILS_TEST_SET").as_deref(), Some("value"));
        assert_eq!(env_var("PEGY_UTILS_TEST_BLANK"), None);
        assert_eq!(env_var("PEGY_UTILS_TEST_UNSET"), None);
    }

    #[test]
    fn test_env_parse() {
        unsafe {
            std::env::set_var("PEGY_UTILS_TEST_NUM", "42");
            std::env::set_var("PEGY_UTILS_TEST_BAD", "forty-two");
        }
        assert_eq!(env_parse::<u32>("PEGY_UTILS_TEST_NUM"), Some(42));
        assert_eq!(env_parse::<u32>("PEGY_UTILS_TEST_BAD"), None);
    }
}
