/// Renders an HTML fragment as a single line of plain text.
///
/// Tags are dropped (a tag boundary counts as whitespace), the common named
/// entities plus numeric character references are decoded, control
/// characters are removed, and runs of whitespace collapse to one space.
/// Malformed markup never fails: an unterminated tag swallows the rest of
/// the input, an unknown entity is kept literally.
///
/// # Examples
///
/// ```
/// use articlesync::util::html_to_snippet;
///
/// assert_eq!(html_to_snippet("<p>One</p><p>Two</p>"), "One Two");
/// assert_eq!(html_to_snippet("caf&#233; &lt;3"), "café <3");
/// assert_eq!(html_to_snippet("plain text"), "plain text");
/// ```
pub fn html_to_snippet(html: &str) -> String {
    let mut decoded = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => {
                decoded.push(' ');
                rest = match rest.find('>') {
                    Some(end) => &rest[end + 1..],
                    None => "",
                };
            }
            '&' => {
                let (text, consumed) = decode_entity(rest);
                decoded.push_str(text.as_deref().unwrap_or("&"));
                rest = &rest[consumed..];
            }
            _ => {
                decoded.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    collapse_whitespace(&decoded)
}

/// Decodes the entity at the start of `s` (which begins with `&`).
///
/// Returns the decoded text (`None` if unrecognised) and how many bytes of
/// `s` were consumed.
fn decode_entity(s: &str) -> (Option<String>, usize) {
    // Longest entity we handle is "&#x10FFFF;"
    let Some(end) = s.char_indices().take(12).find(|&(_, c)| c == ';').map(|(i, _)| i) else {
        return (None, 1);
    };
    let name = &s[1..end];

    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };

    match decoded {
        Some(c) => (Some(c.to_string()), end + 1),
        None => (None, 1),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
