/// Interprets an optional string (typically an environment variable) as a boolean flag.
///
/// Accepts the usual spellings in either case: `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`.
/// Anything else, including an unset value, yields `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod test {
    use super::parse_boolean_flag;

    #[test]
    fn common_spellings_parse_regardless_of_case_and_whitespace() {
        for truthy in ["1", "true", "YES", " on "] {
            assert!(parse_boolean_flag(Some(truthy.into()), false), "'{truthy}' should be true");
        }
        for falsy in ["0", "false", "No", " OFF"] {
            assert!(!parse_boolean_flag(Some(falsy.into()), true), "'{falsy}' should be false");
        }
    }

    #[test]
    fn missing_or_garbage_values_fall_back_to_the_default() {
        assert!(parse_boolean_flag(None, true));
        assert!(!parse_boolean_flag(None, false));
        assert!(parse_boolean_flag(Some("maybe".into()), true));
        assert!(!parse_boolean_flag(Some("maybe".into()), false));
    }
}
