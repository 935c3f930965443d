//! Log sanitization for clinical values and credentials.
//!
//! Formatted log lines pass through [`SanitizingMakeWriter`] before they
//! reach the sink. Two classes of text are redacted:
//! - clinical feature values inside JSON payloads (`"chol":260`) and
//!   key/value pairs (`age=58`), unless payload logging was explicitly enabled
//! - credentials and contact details: bearer tokens, API keys, emails
//!
//! Input is capped at [`MAX_SANITIZE_BYTES`] per line.

use std::sync::OnceLock;

use regex::Regex;
use tracing_subscriber::fmt::MakeWriter;

use crate::domain::{FormField, FEATURE_KEYS};

/// Maximum number of bytes sanitized per line; the rest is cut.
pub const MAX_SANITIZE_BYTES: usize = 16 * 1024;

struct Patterns {
    clinical_json: Regex,
    clinical_kv: Regex,
    secrets: Vec<(Regex, &'static str)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let keys = FEATURE_KEYS
            .iter()
            .copied()
            .chain(FormField::ALL.iter().map(FormField::name))
            .collect::<Vec<_>>()
            .join("|");
        Patterns {
            clinical_json: Regex::new(&format!(
                r#""({keys})"\s*:\s*(?:-?\d+(?:\.\d+)?|"[^"]*")"#
            ))
            .expect("Valid regex"),
            clinical_kv: Regex::new(&format!(r"\b({keys})=(?:-?\d+(?:\.\d+)?|[\w-]+)"))
                .expect("Valid regex"),
            secrets: vec![
                (
                    Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9._~+/-]{8,}=*").expect("Valid regex"),
                    "Bearer [REDACTED-TOKEN]",
                ),
                (
                    Regex::new(
                        r"(?i)\b(api[_-]?key|access[_-]?token|token|secret|password)=[^\s&]+",
                    )
                    .expect("Valid regex"),
                    "$1=[REDACTED-SECRET]",
                ),
                (
                    Regex::new(r"(?i)\b[a-z0-9._%+-]{1,64}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b")
                        .expect("Valid regex"),
                    "[REDACTED-EMAIL]",
                ),
            ],
        }
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// What the sanitizer removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redaction {
    /// Redact clinical feature values
    pub clinical: bool,
}

impl Default for Redaction {
    fn default() -> Self {
        Self { clinical: true }
    }
}

/// Sanitize one chunk of log text.
#[must_use]
pub fn sanitize(input: &str, redaction: Redaction) -> String {
    sanitize_with_limit(input, redaction, MAX_SANITIZE_BYTES)
}

fn sanitize_with_limit(input: &str, redaction: Redaction, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    if redaction.clinical {
        result = patterns
            .clinical_json
            .replace_all(&result, r#""$1":"[REDACTED]""#)
            .into_owned();
        result = patterns
            .clinical_kv
            .replace_all(&result, "$1=[REDACTED]")
            .into_owned();
    }
    for (regex, replacement) in &patterns.secrets {
        result = regex.replace_all(&result, *replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log output
/// line by line before it is written to the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    redaction: Redaction,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M, redaction: Redaction) -> Self {
        Self { inner, redaction }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    redaction: Redaction,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner
            .write_all(sanitize(&text, self.redaction).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter that never emits a newline must not grow the buffer without bound.
        if self.buffer.len() > MAX_SANITIZE_BYTES * 2 {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            redaction: self.redaction,
            buffer: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CLINICAL: Redaction = Redaction { clinical: true };
    const PASSTHROUGH: Redaction = Redaction { clinical: false };

    #[test]
    fn test_redacts_json_feature_values() {
        let input = r#"payload={"features":{"age":58,"chol":260,"oldpeak":1.8,"thal":2}}"#;
        let sanitized = sanitize(input, CLINICAL);
        assert!(!sanitized.contains("260"));
        assert!(!sanitized.contains("1.8"));
        assert!(sanitized.contains(r#""chol":"[REDACTED]""#));
        assert!(sanitized.contains("features"));
    }

    #[test]
    fn test_redacts_form_values() {
        let sanitized = sanitize(r#"{"sex":"male","restingECG":"abnormal"}"#, CLINICAL);
        assert!(!sanitized.contains("male\""));
        assert!(!sanitized.contains("abnormal"));

        let sanitized = sanitize("field age=58 thalassemia=carrier", CLINICAL);
        assert_eq!(sanitized, "field age=[REDACTED] thalassemia=[REDACTED]");
    }

    #[test]
    fn test_payload_logging_keeps_values() {
        let input = r#"{"age":58}"#;
        assert_eq!(sanitize(input, PASSTHROUGH), input);
    }

    #[test]
    fn test_secrets_always_redacted() {
        let sanitized = sanitize(
            "auth Bearer abcdefgh12345678 url=https://x.test/?api_key=s3cr3t&x=1",
            PASSTHROUGH,
        );
        assert!(sanitized.contains("[REDACTED-TOKEN]"));
        assert!(sanitized.contains("api_key=[REDACTED-SECRET]"));
        assert!(!sanitized.contains("s3cr3t"));

        let sanitized = sanitize("Contact: patient@hospital.com", PASSTHROUGH);
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
    }

    #[test]
    fn test_unrelated_text_untouched() {
        let input = "Making prediction request url=http://localhost:8000/predict";
        assert_eq!(sanitize(input, CLINICAL), input);
    }

    #[test]
    fn test_truncates_large_inputs() {
        let input = "é".repeat(20);
        let sanitized = sanitize_with_limit(&input, CLINICAL, 5);
        assert!(sanitized.ends_with(" [TRUNCATED]"));
        assert!(sanitized.starts_with("éé"));
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut writer = SanitizingWriter {
            inner: Vec::new(),
            redaction: CLINICAL,
            buffer: Vec::new(),
        };
        writer.write_all(b"first \"chol\":2").expect("write");
        writer.write_all(b"60 end\nsecond line\n").expect("write");
        writer.flush().expect("flush");

        let out = String::from_utf8(writer.inner.clone()).expect("utf8");
        assert_eq!(out, "first \"chol\":\"[REDACTED]\" end\nsecond line\n");
    }
}
