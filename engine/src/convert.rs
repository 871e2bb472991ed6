//! String to scalar conversions.

use argbind_core::{TypeTag, Value};

const TRUE_WORDS: [&str; 6] = ["true", "yes", "on", "y", "t", "1"];
const FALSE_WORDS: [&str; 6] = ["false", "no", "off", "n", "f", "0"];

/// Parses a boolean word, ignoring case.
///
/// # Examples
///
/// ```
/// use argbind_engine::parse_bool;
///
/// assert_eq!(parse_bool("Yes"), Some(true));
/// assert_eq!(parse_bool("off"), Some(false));
/// assert_eq!(parse_bool("maybe"), None);
/// ```
pub fn parse_bool(text: &str) -> Option<bool> {
    let lower = text.to_ascii_lowercase();
    if TRUE_WORDS.contains(&lower.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Parses an integer with an optional sign and a `0x` (hex) or leading `0`
/// (octal) prefix.
///
/// # Examples
///
/// ```
/// use argbind_engine::parse_integer;
///
/// assert_eq!(parse_integer("-42"), Some(-42));
/// assert_eq!(parse_integer("0x1F"), Some(31));
/// assert_eq!(parse_integer("010"), Some(8));
/// assert_eq!(parse_integer("12abc"), None);
/// ```
pub fn parse_integer(text: &str) -> Option<i128> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        if hex.is_empty() || hex.starts_with(['+', '-']) {
            return None;
        }
        i128::from_str_radix(hex, 16).ok()?
    } else if body.len() > 1 && body.starts_with('0') {
        i128::from_str_radix(&body[1..], 8).ok()?
    } else {
        body.parse::<i128>().ok()?
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn integer<T: TryFrom<i128>>(text: &str) -> Option<T> {
    parse_integer(text).and_then(|n| T::try_from(n).ok())
}

/// Converts one token to a scalar [`Value`] of type `tag`.
///
/// Returns `None` when the token does not parse, or when `tag` is not a
/// scalar type.
pub fn convert_scalar(tag: TypeTag, text: &str) -> Option<Value> {
    Some(match tag {
        TypeTag::Bool => Value::Bool(parse_bool(text)?),
        TypeTag::Short => Value::Short(integer(text)?),
        TypeTag::UShort => Value::UShort(integer(text)?),
        TypeTag::Int => Value::Int(integer(text)?),
        TypeTag::UInt => Value::UInt(integer(text)?),
        TypeTag::Long => Value::Long(integer(text)?),
        TypeTag::ULong => Value::ULong(integer(text)?),
        TypeTag::Size => Value::Size(integer(text)?),
        TypeTag::Float => Value::Float(text.parse().ok()?),
        TypeTag::Double => Value::Double(text.parse().ok()?),
        TypeTag::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return None,
            }
        }
        TypeTag::String | TypeTag::Enum | TypeTag::Other => return None,
    })
}

/// Logical negation of a scalar: booleans flip, numbers and chars swap
/// zero and nonzero. Other values come back unchanged.
pub fn invert(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::Bool(!b),
        Value::Short(n) => Value::Short((n == 0).into()),
        Value::UShort(n) => Value::UShort((n == 0).into()),
        Value::Int(n) => Value::Int((n == 0).into()),
        Value::UInt(n) => Value::UInt((n == 0).into()),
        Value::Long(n) => Value::Long((n == 0).into()),
        Value::ULong(n) => Value::ULong((n == 0).into()),
        Value::Size(n) => Value::Size((n == 0).into()),
        Value::Float(x) => Value::Float(if x == 0.0 { 1.0 } else { 0.0 }),
        Value::Double(x) => Value::Double(if x == 0.0 { 1.0 } else { 0.0 }),
        Value::Char(c) => Value::Char(if c == '\0' { '\u{1}' } else { '\0' }),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_words() {
        for word in ["true", "YES", "On", "y", "T", "1"] {
            assert_eq!(parse_bool(word), Some(true), "{word}");
        }
        for word in ["false", "No", "OFF", "n", "f", "0"] {
            assert_eq!(parse_bool(word), Some(false), "{word}");
        }
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn test_integer_forms() {
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("+7"), Some(7));
        assert_eq!(parse_integer("-0x10"), Some(-16));
        assert_eq!(parse_integer("0777"), Some(511));
        assert_eq!(parse_integer("08"), None);
        assert_eq!(parse_integer("0x"), None);
        assert_eq!(parse_integer("--3"), None);
        assert_eq!(parse_integer("0x-3"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn test_integer_ranges() {
        assert!(matches!(convert_scalar(TypeTag::Short, "32767"), Some(Value::Short(32767))));
        assert!(convert_scalar(TypeTag::Short, "32768").is_none());
        assert!(convert_scalar(TypeTag::UInt, "-1").is_none());
        assert!(matches!(convert_scalar(TypeTag::ULong, "18446744073709551615"), Some(Value::ULong(u64::MAX))));
        assert!(matches!(convert_scalar(TypeTag::Size, "0x10"), Some(Value::Size(16))));
    }

    #[test]
    fn test_floats() {
        assert!(matches!(convert_scalar(TypeTag::Double, "2.5e3"), Some(Value::Double(x)) if x == 2500.0));
        assert!(matches!(convert_scalar(TypeTag::Float, "-0.5"), Some(Value::Float(x)) if x == -0.5));
        assert!(convert_scalar(TypeTag::Double, "1.2.3").is_none());
    }

    #[test]
    fn test_char_needs_exactly_one() {
        assert!(matches!(convert_scalar(TypeTag::Char, "x"), Some(Value::Char('x'))));
        assert!(convert_scalar(TypeTag::Char, "xy").is_none());
        assert!(convert_scalar(TypeTag::Char, "").is_none());
    }

    #[test]
    fn test_non_scalar_tags_refused() {
        assert!(convert_scalar(TypeTag::String, "x").is_none());
        assert!(convert_scalar(TypeTag::Enum, "x").is_none());
    }

    #[test]
    fn test_invert() {
        assert!(matches!(invert(Value::Bool(false)), Value::Bool(true)));
        assert!(matches!(invert(Value::Int(0)), Value::Int(1)));
        assert!(matches!(invert(Value::Int(-9)), Value::Int(0)));
        assert!(matches!(invert(Value::Double(0.0)), Value::Double(x) if x == 1.0));
        assert!(matches!(invert(Value::Char('a')), Value::Char('\0')));
        assert!(matches!(invert(Value::Enum(2)), Value::Enum(2)));
    }
}
