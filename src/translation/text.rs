//! Post-processing of backend output.
//!
//! Model output is unescaped, stripped of emoji and `:shortcode:` markers,
//! and whitespace-normalized before it is returned to the caller.

/// Full cleanup chain applied to every backend translation.
pub fn clean_translation(raw: &str) -> String {
    let unescaped = unescape(raw);
    let stripped = strip_emoji_and_shortcodes(&unescaped);
    collapse_whitespace(&stripped)
}

/// Turn literal `\n`, `\t`, `\r`, `\\`, `\"` and `\'` sequences into the
/// characters they name. Unknown escapes keep their backslash.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let replacement = match chars.peek() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            _ => {
                out.push('\\');
                continue;
            }
        };
        chars.next();
        out.push(replacement);
    }

    out
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0xFE0F | 0x200D
    )
}

fn is_shortcode_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '&')
}

/// Remove emoji code points and terminated `:name:` shortcodes.
///
/// A colon that does not open a complete shortcode is kept, so times like
/// `10:30` and prose like `Note: x` survive.
pub fn strip_emoji_and_shortcodes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c == ':' {
            let after = &rest[1..];
            let name_len = after
                .char_indices()
                .find(|(_, ch)| !is_shortcode_char(*ch))
                .map(|(i, _)| i)
                .unwrap_or(after.len());
            if name_len > 0 && after[name_len..].starts_with(':') {
                rest = &after[name_len + 1..];
                continue;
            }
        }

        if !is_emoji(c) {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Collapse runs of non-newline whitespace to one space and trim the ends.
/// Newlines are kept as-is.
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for c in input.chars() {
        if c == '\n' {
            while out.ends_with(' ') {
                out.pop();
            }
            out.push('\n');
            pending_space = false;
        } else if c.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() && !out.ends_with('\n') {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }

    out.trim().to_string()
}

/// Shorten text for log lines, on a character boundary.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
