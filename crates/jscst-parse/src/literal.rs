//! Semantic values of literal tokens.

use jscst_ast::Scalar;
use jscst_syntax::SyntaxKind::{self, *};

pub(crate) fn value(kind: SyntaxKind, raw: &str) -> Result<Scalar, String> {
    match kind {
        TRUE_KW => Ok(Scalar::Bool(true)),
        FALSE_KW => Ok(Scalar::Bool(false)),
        NULL_KW => Ok(Scalar::Null),
        NUMBER => number(raw).map(Scalar::Number),
        STRING => string(raw).map(Scalar::String),
        _ => Err(format!("`{raw}` is not a literal")),
    }
}

/// ESTree JSON has no representation for infinite numbers, so literals
/// that overflow `f64` are rejected.
fn number(raw: &str) -> Result<f64, String> {
    let value = number_value(raw)?;
    if !value.is_finite() {
        return Err(format!("numeric literal `{raw}` is out of range"));
    }
    Ok(value)
}

fn number_value(raw: &str) -> Result<f64, String> {
    let invalid = || format!("invalid numeric literal `{raw}`");

    if let Some(digits) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        if digits.is_empty() {
            return Err(invalid());
        }
        return Ok(digits
            .chars()
            .filter_map(|c| c.to_digit(16))
            .fold(0.0, |value, digit| value * 16.0 + f64::from(digit)));
    }

    let mut chars = raw.chars();
    if chars.next() == Some('0') && chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(format!("legacy octal literal `{raw}` is not supported"));
    }

    raw.parse().ok().ok_or_else(invalid)
}

fn string(raw: &str) -> Result<String, String> {
    let inner = &raw[1..raw.len() - 1];
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }

        let Some(escaped) = chars.next() else { break };
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' if !chars.peek().is_some_and(char::is_ascii_digit) => value.push('\0'),
            'x' => value.push(hex_escape(&mut chars, 2, raw)?),
            'u' => {
                let unit = hex_code(&mut chars, 4, raw)?;
                let code = match unit {
                    0xD800..=0xDBFF => {
                        let low = (chars.next() == Some('\\') && chars.next() == Some('u'))
                            .then(|| hex_code(&mut chars, 4, raw))
                            .transpose()?
                            .filter(|low| (0xDC00..=0xDFFF).contains(low))
                            .ok_or_else(|| format!("unpaired surrogate in `{raw}`"))?;
                        0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => return Err(format!("unpaired surrogate in `{raw}`")),
                    _ => unit,
                };
                let c = char::from_u32(code).ok_or_else(|| format!("invalid escape in `{raw}`"))?;
                value.push(c);
            }
            '1'..='9' | '0' => return Err(format!("octal escape in `{raw}` is not supported")),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => value.push(other),
        }
    }

    Ok(value)
}

fn hex_code(chars: &mut impl Iterator<Item = char>, len: usize, raw: &str) -> Result<u32, String> {
    let mut code = 0;
    for _ in 0..len {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| format!("malformed hexadecimal escape in `{raw}`"))?;
        code = code * 16 + digit;
    }
    Ok(code)
}

fn hex_escape(
    chars: &mut impl Iterator<Item = char>,
    len: usize,
    raw: &str,
) -> Result<char, String> {
    let code = hex_code(chars, len, raw)?;
    char::from_u32(code).ok_or_else(|| format!("invalid escape in `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(number("42"), Ok(42.0));
        assert_eq!(number("0x1F"), Ok(31.0));
        assert_eq!(number("1.5e3"), Ok(1500.0));
        assert_eq!(number(".25"), Ok(0.25));
        assert_eq!(number("0"), Ok(0.0));
        assert!(number("0x").is_err());
        assert!(number("1e").is_err());
        assert!(number("017").is_err());
    }

    #[test]
    fn numbers_beyond_f64_are_rejected() {
        assert_eq!(number("1e308"), Ok(1e308));
        assert_eq!(number("1e400"), Err("numeric literal `1e400` is out of range".to_owned()));
        assert!(number(&format!("0x{}", "F".repeat(300))).is_err());
    }

    #[test]
    fn strings() {
        assert_eq!(string(r#""plain""#), Ok("plain".to_owned()));
        assert_eq!(string(r"'it\'s'"), Ok("it's".to_owned()));
        assert_eq!(string(r#""a\tb\n""#), Ok("a\tb\n".to_owned()));
        assert_eq!(string(r#""\x41B""#), Ok("AB".to_owned()));
        assert_eq!(string(r#""\ud83d\ude00""#), Ok("\u{1F600}".to_owned()));
        assert_eq!(string("'line\\\ncontinued'"), Ok("linecontinued".to_owned()));
        assert_eq!(string(r#""\0""#), Ok("\0".to_owned()));
        assert!(string(r#""\ud83d""#).is_err());
        assert!(string(r#""\xZZ""#).is_err());
    }

    #[test]
    fn keywords() {
        assert_eq!(value(TRUE_KW, "true"), Ok(Scalar::Bool(true)));
        assert_eq!(value(NULL_KW, "null"), Ok(Scalar::Null));
    }
}
