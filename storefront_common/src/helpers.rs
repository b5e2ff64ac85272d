use std::{fmt::Display, str::FromStr};

/// Parse an optional configuration value, falling back to `default` when the value is absent.
///
/// If the value is present but cannot be parsed, the parse error is returned alongside the default so that callers
/// can log it in their own register.
pub fn parse_or_default<T>(value: Option<String>, default: T) -> Result<T, (String, T)>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse::<T>().map_err(|e| (format!("'{v}' is not a valid value. {e}"), default)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_value_uses_default() {
        assert_eq!(parse_or_default::<u32>(None, 5), Ok(5));
    }

    #[test]
    fn valid_value_is_parsed() {
        assert_eq!(parse_or_default::<u32>(Some(" 12 ".into()), 5), Ok(12));
    }

    #[test]
    fn invalid_value_returns_default_with_reason() {
        let (reason, default) = parse_or_default::<u32>(Some("twelve".into()), 5).unwrap_err();
        assert_eq!(default, 5);
        assert!(reason.contains("twelve"));
    }
}
