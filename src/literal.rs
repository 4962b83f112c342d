//! Literal text helpers shared by the tokenizer and the parser: numeric classification
//! (integer, then float, then complex) and double-quoted string unescaping.

/// Numeric literal after classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
    Complex(f64, f64),
}

enum IntError {
    NotInt,
    OutOfRange,
}

/// Classify numeric text. Tries integer, then float, then complex.
///
/// A complex literal with a zero imaginary part classifies as a float holding the real part.
pub fn classify_number(text: &str) -> Result<Number, String> {
    let int_err = match parse_int(text) {
        Ok(i) => return Ok(Number::Int(i)),
        Err(e) => e,
    };
    if let Some(x) = parse_float(text) {
        return Ok(Number::Float(x));
    }
    if let IntError::OutOfRange = int_err {
        return Err(format!("integer literal '{}' out of range", text));
    }
    let (re, im) = parse_complex(text)?;
    if im == 0.0 {
        Ok(Number::Float(re))
    } else {
        Ok(Number::Complex(re, im))
    }
}

/// Integer literal: optional sign, then decimal, `0x`, `0o`, `0b` or legacy leading-zero octal.
fn parse_int(text: &str) -> Result<i64, IntError> {
    let (negative, body) = split_sign(text);
    let (radix, digits) = if let Some(rest) = strip_prefix_ci(body, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0o") {
        (8, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0b") {
        (2, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };
    let prefixed = digits.len() != body.len();
    let cleaned = strip_underscores(digits, prefixed).ok_or(IntError::NotInt)?;
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_digit(radix)) {
        return Err(IntError::NotInt);
    }
    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|_| IntError::OutOfRange)?;
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(IntError::OutOfRange);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).map_err(|_| IntError::OutOfRange)
    }
}

/// Remove `_` digit separators. An underscore must sit between two digits, or directly
/// after a base prefix.
fn strip_underscores(digits: &str, prefixed: bool) -> Option<String> {
    let mut out = String::with_capacity(digits.len());
    let mut prev_underscore = false;
    for (i, c) in digits.chars().enumerate() {
        if c == '_' {
            if prev_underscore || (i == 0 && !prefixed) {
                return None;
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    if prev_underscore {
        return None;
    }
    Some(out)
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    }
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

/// Decimal float: digits with `.` and/or an exponent. Non-finite results are rejected.
fn parse_float(text: &str) -> Option<f64> {
    let (_, body) = split_sign(text);
    let first = body.chars().next()?;
    if !(first.is_ascii_digit() || first == '.') {
        return None;
    }
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    let x: f64 = text.parse().ok()?;
    x.is_finite().then_some(x)
}

/// Real component of a complex literal: integer or float.
fn parse_real(text: &str) -> Option<f64> {
    match parse_int(text) {
        Ok(i) => Some(i as f64),
        Err(_) => parse_float(text),
    }
}

/// `<real><sign><imag>i`, real part first.
fn parse_complex(text: &str) -> Result<(f64, f64), String> {
    let body = match text.strip_suffix('i') {
        Some(b) => b,
        None if text.contains('i') => {
            return Err(format!(
                "invalid complex literal '{}': the imaginary part must follow the real part",
                text
            ))
        }
        None => return Err(format!("invalid numeric literal '{}'", text)),
    };
    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .rev()
        .find(|&i| matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'e' | b'E'));
    let split = match split {
        Some(s) => s,
        None => {
            return Err(format!(
                "invalid complex literal '{}': a real part is required before the imaginary part",
                text
            ))
        }
    };
    let (re_text, im_text) = body.split_at(split);
    let re = parse_real(re_text)
        .ok_or_else(|| format!("invalid real part '{}' in complex literal '{}'", re_text, text))?;
    let im = match im_text {
        "+" => 1.0,
        "-" => -1.0,
        _ => parse_real(im_text).ok_or_else(|| {
            format!("invalid imaginary part '{}' in complex literal '{}'", im_text, text)
        })?,
    };
    Ok((re, im))
}

/// Decode a double-quoted literal (quotes included) with backslash escapes.
pub fn unquote(raw: &str) -> Result<String, String> {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("string literal {} is not double-quoted", raw))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Err("unescaped '\"' inside string literal".to_string()),
            '\n' => return Err("newline inside string literal".to_string()),
            '\\' => {
                let esc = chars
                    .next()
                    .ok_or_else(|| "string literal ends with a lone backslash".to_string())?;
                match esc {
                    'a' => out.push('\u{07}'),
                    'b' => out.push('\u{08}'),
                    'f' => out.push('\u{0C}'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'v' => out.push('\u{0B}'),
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'x' => out.push(char::from(hex_escape(&mut chars, 2)? as u8)),
                    'u' => out.push(unicode_escape(&mut chars, 4)?),
                    'U' => out.push(unicode_escape(&mut chars, 8)?),
                    '0'..='7' => {
                        let mut code = esc.to_digit(8).unwrap_or(0);
                        for _ in 0..2 {
                            let d = chars
                                .next()
                                .and_then(|c| c.to_digit(8))
                                .ok_or_else(|| "octal escape needs three digits".to_string())?;
                            code = code * 8 + d;
                        }
                        if code > 255 {
                            return Err(format!("octal escape value {} exceeds 255", code));
                        }
                        out.push(char::from(code as u8));
                    }
                    other => return Err(format!("invalid escape sequence '\\{}'", other)),
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, n: usize) -> Result<u32, String> {
    let mut code = 0u32;
    for _ in 0..n {
        let d = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| format!("escape needs {} hex digits", n))?;
        code = code * 16 + d;
    }
    Ok(code)
}

fn unicode_escape(chars: &mut std::str::Chars<'_>, n: usize) -> Result<char, String> {
    let code = hex_escape(chars, n)?;
    char::from_u32(code).ok_or_else(|| format!("escape \\u{{{:x}}} is not a valid code point", code))
}
