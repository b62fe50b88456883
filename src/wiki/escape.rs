//! Escaping of page content for the single-line flat table

/// Escape content so it fits one CSV cell on one line
///
/// Backslashes are doubled, newline/CR/tab use their usual escapes, and any
/// other control or non-ASCII character becomes `\uXXXX` (or `\UXXXXXXXX`
/// outside the Basic Multilingual Plane).
pub fn escape_content(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if (c as u32) > 0xffff => out.push_str(&format!("\\U{:08x}", c as u32)),
            c => out.push_str(&format!("\\u{:04x}", c as u32)),
        }
    }
    out
}

fn take_hex(chars: &[char], start: usize, len: usize) -> Option<char> {
    if start + len > chars.len() {
        return None;
    }
    let digits: String = chars[start..start + len].iter().collect();
    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
}

/// Inverse of [`escape_content`]
///
/// Unknown or malformed escape sequences are kept as written, so content
/// that was never escaped passes through unchanged apart from the known
/// sequences.
pub fn unescape_content(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' || i + 1 >= chars.len() {
            out.push(c);
            i += 1;
            continue;
        }

        match chars[i + 1] {
            '\\' => {
                out.push('\\');
                i += 2;
            }
            'n' => {
                out.push('\n');
                i += 2;
            }
            'r' => {
                out.push('\r');
                i += 2;
            }
            't' => {
                out.push('\t');
                i += 2;
            }
            'u' => match take_hex(&chars, i + 2, 4) {
                Some(decoded) => {
                    out.push(decoded);
                    i += 6;
                }
                None => {
                    out.push(c);
                    i += 1;
                }
            },
            'U' => match take_hex(&chars, i + 2, 8) {
                Some(decoded) => {
                    out.push(decoded);
                    i += 10;
                }
                None => {
                    out.push(c);
                    i += 1;
                }
            },
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Remove the `\""` artifact the CSV writer leaves after escaped content
///
/// Applied to a Content cell before it is quoted: a `\"` in the cell would
/// be written as `\""`, which is turned into a plain doubled quote.
pub fn strip_writer_artifact(cell: &str) -> String {
    cell.replace("\\\"", "\"")
}

/// Turn literal `\n` sequences into real newlines
pub fn unescape_newlines(s: &str) -> String {
    s.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_control_and_unicode() {
        assert_eq!(escape_content("a\nb"), "a\\nb");
        assert_eq!(escape_content("tab\there"), "tab\\there");
        assert_eq!(escape_content("back\\slash"), "back\\\\slash");
        assert_eq!(escape_content("caf\u{e9}"), "caf\\u00e9");
        assert_eq!(escape_content("\u{1F600}"), "\\U0001f600");
        assert_eq!(escape_content("\u{7}"), "\\u0007");
    }

    #[test]
    fn test_escape_is_single_line() {
        let escaped = escape_content("line one\r\nline two\n\nend");
        assert!(!escaped.contains('\n'));
        assert!(!escaped.contains('\r'));
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            "",
            "plain",
            "multi\nline\r\ntext",
            "back\\slash \\n not a newline",
            "[[Spoiler:Redacted]]hidden[[/Spoiler]]",
            "quote \"here\" and \\\" there",
            "\u{e9}\u{2014}\u{1F916}\u{0}",
            "trailing backslash\\",
        ];
        for sample in samples {
            assert_eq!(unescape_content(&escape_content(sample)), sample, "sample: {:?}", sample);
        }
    }

    #[test]
    fn test_unknown_escapes_kept() {
        assert_eq!(unescape_content("a\\qb"), "a\\qb");
        assert_eq!(unescape_content("\\u12"), "\\u12");
        assert_eq!(unescape_content("\\uzzzz"), "\\uzzzz");
        assert_eq!(unescape_content("end\\"), "end\\");
    }

    #[test]
    fn test_strip_writer_artifact() {
        assert_eq!(strip_writer_artifact("say \\\"hi\\\""), "say \"hi\"");
        assert_eq!(strip_writer_artifact("no quotes"), "no quotes");
    }

    #[test]
    fn test_unescape_newlines() {
        assert_eq!(unescape_newlines("a\\nb\\nc"), "a\nb\nc");
    }
}
