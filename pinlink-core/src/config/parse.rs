//! Minimal TOML parser for the device configuration
//!
//! Handles only the subset the device configuration uses, without
//! allocating:
//! - `[link]` and `[signal]` section headers
//! - `key = value` pairs with integer or boolean values
//! - Comments (# ...) on their own line or after a value
//!
//! Keys missing from the input keep their defaults.

use super::types::{DeviceConfig, LinkConfig, SignalConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not recognized in the current section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Line is neither a header nor a key/value pair
    InvalidLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Link,
    Signal,
}

/// Parse TOML configuration into a DeviceConfig
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection)?
                .trim();
            section = match name {
                "link" => Section::Link,
                "signal" => Section::Signal,
                _ => return Err(ParseError::InvalidSection),
            };
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidLine)?;
        let (key, value) = (key.trim(), value.trim());

        match section {
            Section::Link => apply_link(&mut config.link, key, value)?,
            Section::Signal => apply_signal(&mut config.signal, key, value)?,
            Section::Root => return Err(ParseError::UnknownKey),
        }
    }

    Ok(config)
}

fn apply_link(link: &mut LinkConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "baudrate" => link.baudrate = parse_u32(value)?,
        "idle_timeout_ms" => link.idle_timeout_ms = parse_u32(value)?,
        "report_decode_errors" => link.report_decode_errors = parse_bool(value)?,
        "line_terminator" => link.line_terminator = parse_bool(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    if link.baudrate == 0 {
        return Err(ParseError::InvalidValue);
    }
    Ok(())
}

fn apply_signal(signal: &mut SignalConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "error_blinks" => {
            signal.error_blinks = u8::try_from(parse_u32(value)?).map_err(|_| ParseError::InvalidValue)?
        }
        "blink_ms" => signal.blink_ms = parse_u32(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_u32(value: &str) -> Result<u32, ParseError> {
    // TOML allows `_` only between two digits
    if value.starts_with('_') || value.ends_with('_') || value.contains("__") {
        return Err(ParseError::InvalidValue);
    }
    let mut result: u32 = 0;
    let mut digits = 0;
    for ch in value.chars() {
        if ch == '_' {
            continue;
        }
        let digit = ch.to_digit(10).ok_or(ParseError::InvalidValue)?;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(ParseError::InvalidValue)?;
        digits += 1;
    }
    if digits == 0 {
        return Err(ParseError::InvalidValue);
    }
    Ok(result)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config(""), Ok(DeviceConfig::default()));
    }

    #[test]
    fn test_full_config() {
        let input = r#"
# pinlink device configuration
[link]
baudrate = 115_200
idle_timeout_ms = 250   # drop stalled frames quickly
report_decode_errors = false
line_terminator = true

[signal]
error_blinks = 3
blink_ms = 100
"#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.link.baudrate, 115_200);
        assert_eq!(config.link.idle_timeout_ms, 250);
        assert!(!config.link.report_decode_errors);
        assert!(config.link.line_terminator);
        assert_eq!(config.signal.error_blinks, 3);
        assert_eq!(config.signal.blink_ms, 100);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config("[link]\nidle_timeout_ms = 0\n").unwrap();
        assert_eq!(config.link.idle_timeout_ms, 0);
        assert_eq!(config.link.baudrate, 9600);
        assert_eq!(config.signal, SignalConfig::default());
    }

    #[test]
    fn test_digit_separator_placement() {
        assert_eq!(parse_u32("9_600"), Ok(9600));
        assert_eq!(parse_u32("1_000_000"), Ok(1_000_000));
        assert_eq!(parse_u32("_9600"), Err(ParseError::InvalidValue));
        assert_eq!(parse_u32("9600_"), Err(ParseError::InvalidValue));
        assert_eq!(parse_u32("9__6"), Err(ParseError::InvalidValue));
        assert_eq!(parse_u32("_"), Err(ParseError::InvalidValue));
        assert_eq!(
            parse_config("[link]\nbaudrate = 96__00\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(parse_config("[motor]\n"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[link\n"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(parse_config("[link]\nparity = 1\n"), Err(ParseError::UnknownKey));
        assert_eq!(parse_config("baudrate = 9600\n"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[link]\nbaudrate = fast\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[link]\nbaudrate = 0\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[link]\nline_terminator = yes\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[signal]\nerror_blinks = 300\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[link]\nbaudrate = 99999999999\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_invalid_line() {
        assert_eq!(parse_config("[link]\nbaudrate\n"), Err(ParseError::InvalidLine));
    }
}
