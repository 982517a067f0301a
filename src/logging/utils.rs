//! Helpers for the file layer: ANSI stripping and timestamps.

/// Remove ANSI escape sequences so the log file stays plain text.
///
/// CSI sequences (`ESC [` ... final byte in `@`..=`~`) are dropped whole;
/// for any other escape only the byte following `ESC` is dropped.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            chars
                .by_ref()
                .find(|inner| ('@'..='~').contains(inner));
        }
    }
    out
}

/// Current UTC time as `YYYY-MM-DD HH:MM:SS`, used in the run header.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current UTC time as `HH:MM:SS`, prefixed to every log line.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
