use std::borrow::Cow;

const MAX_ERROR_BODY_CHARS: usize = 200;

const REDACTED: &str = "[REDACTED]";

/// Markers after which the service (or a proxy in front of it) may echo a
/// credential back in an error page.
const SECRET_MARKERS: [&str; 9] = [
    "Bearer ",
    "bearer ",
    "sk-",
    "api_key=",
    "access_token=",
    "id_token=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"id_token\":\"",
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn redact_after(scrubbed: &mut String, marker: &str) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let value_start = start + marker.len();
        let value_len: usize = scrubbed[value_start..]
            .chars()
            .take_while(|c| is_token_char(*c))
            .map(char::len_utf8)
            .sum();

        if value_len == 0 {
            search_from = value_start;
            continue;
        }

        scrubbed.replace_range(start..value_start + value_len, REDACTED);
        search_from = start + REDACTED.len();
    }
}

/// Redact credential-looking tokens from an error body.
pub fn scrub_secrets(input: &str) -> Cow<'_, str> {
    if !SECRET_MARKERS.iter().any(|m| input.contains(m)) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in SECRET_MARKERS {
        redact_after(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Scrub and truncate an error body before it reaches a log line.
pub fn sanitize_error_body(input: &str) -> String {
    let scrubbed = scrub_secrets(input.trim());

    match scrubbed.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &scrubbed[..idx]),
        None => scrubbed.into_owned(),
    }
}
