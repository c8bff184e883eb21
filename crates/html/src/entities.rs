/// Decode the small entity subset that shows up in server-rendered form markup.
///
/// Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
/// Numeric (`&#39;`, `&#x27;`) decode only when semicolon-terminated and a valid scalar.
/// Anything else passes through unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    const NAMED: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
        ("&nbsp;", '\u{00A0}'),
    ];
    const MAX_DIGITS: usize = 7;

    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        if let Some((entity, ch)) = NAMED.iter().find(|(entity, _)| rest.starts_with(entity)) {
            out.push(*ch);
            rest = &rest[entity.len()..];
            continue;
        }

        if let Some((ch, consumed)) = decode_numeric(rest, MAX_DIGITS) {
            out.push(ch);
            rest = &rest[consumed..];
            continue;
        }

        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

/// `rest` starts with `&`. Returns the decoded char and the consumed byte length.
fn decode_numeric(rest: &str, max_digits: usize) -> Option<(char, usize)> {
    let body = rest.strip_prefix("&#")?;
    let (digits_at, radix) = match body.as_bytes().first() {
        Some(b'x' | b'X') => (1, 16),
        _ => (0, 10),
    };
    let body = &body[digits_at..];
    let end = body.find(';')?;
    let digits = &body[..end];
    if digits.is_empty() || digits.len() > max_digits {
        return None;
    }
    let ch = u32::from_str_radix(digits, radix).ok().and_then(char::from_u32)?;
    Some((ch, 2 + digits_at + end + 1))
}
