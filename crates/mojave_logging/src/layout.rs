//! Translation of log4j layouts into `tracing-subscriber` fmt options.
//!
//! A `fmt` layer has a fixed field order (time, thread, level, target,
//! location, message), so a conversion pattern decides which fields are
//! shown and how the timestamp is formatted, not where they appear.

use anyhow::{bail, Result};
use chrono::format::{Item, StrftimeItems};

const PATTERN_LAYOUT: &str = "PatternLayout";
const SIMPLE_LAYOUT: &str = "SimpleLayout";
const TTCC_LAYOUT: &str = "TTCCLayout";

/// log4j's `ISO8601` date format.
const ISO8601_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";
const ABSOLUTE_FORMAT: &str = "%H:%M:%S,%3f";
const DATE_FORMAT: &str = "%d %b %Y %H:%M:%S,%3f";

/// Pattern used when a `PatternLayout` has no `ConversionPattern`.
pub const DEFAULT_CONVERSION_PATTERN: &str = "%m%n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    None,
    /// Local time in a chrono `strftime` format.
    Local(String),
    /// Time since the process started (log4j `%r`).
    Uptime,
}

/// Which event fields a layer prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSpec {
    pub timestamp: Timestamp,
    pub thread_names: bool,
    pub level: bool,
    pub target: bool,
    pub file: bool,
    pub line_number: bool,
    /// Conversions that were recognized but have no fmt equivalent (`%M`, `%x`, ...).
    pub unsupported: Vec<String>,
}

impl LayoutSpec {
    fn bare() -> Self {
        Self {
            timestamp: Timestamp::None,
            thread_names: false,
            level: false,
            target: false,
            file: false,
            line_number: false,
            unsupported: Vec::new(),
        }
    }

    /// `SimpleLayout`: `LEVEL - message`.
    pub fn simple() -> Self {
        Self {
            level: true,
            ..Self::bare()
        }
    }

    /// `TTCCLayout`: uptime, thread, level, logger and message.
    pub fn ttcc() -> Self {
        Self {
            timestamp: Timestamp::Uptime,
            thread_names: true,
            level: true,
            target: true,
            ..Self::bare()
        }
    }

    /// Resolve a layout class and its optional conversion pattern.
    pub fn from_class(class_name: &str, pattern: Option<&str>) -> Result<Self> {
        match short_class_name(class_name) {
            PATTERN_LAYOUT => parse_conversion_pattern(pattern.unwrap_or(DEFAULT_CONVERSION_PATTERN)),
            SIMPLE_LAYOUT => Ok(Self::simple()),
            TTCC_LAYOUT => Ok(Self::ttcc()),
            _ => bail!(
                "unsupported layout '{}' (expected PatternLayout, SimpleLayout or TTCCLayout)",
                class_name
            ),
        }
    }
}

/// `org.apache.log4j.PatternLayout` and `PatternLayout` name the same class.
pub(crate) fn short_class_name(class_name: &str) -> &str {
    class_name
        .trim()
        .strip_prefix("org.apache.log4j.")
        .unwrap_or_else(|| class_name.trim())
}

/// Parse a log4j conversion pattern such as `%d (%t) [%p - %l] %m%n`.
pub fn parse_conversion_pattern(pattern: &str) -> Result<LayoutSpec> {
    let mut spec = LayoutSpec::bare();
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }

        // Format modifiers (`%-5p`, `%.30c`, `%20.30t`) only affect padding.
        while matches!(chars.peek(), Some(c) if *c == '-' || *c == '.' || c.is_ascii_digit()) {
            chars.next();
        }

        let Some(conversion) = chars.next() else {
            bail!("conversion pattern '{}' ends with a dangling '%'", pattern);
        };

        let option = if chars.peek() == Some(&'{') {
            chars.next();
            let mut option = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => option.push(c),
                    None => bail!("unclosed '{{' in conversion pattern '{}'", pattern),
                }
            }
            Some(option)
        } else {
            None
        };

        match conversion {
            'd' => spec.timestamp = Timestamp::Local(date_format(option.as_deref())?),
            'r' => spec.timestamp = Timestamp::Uptime,
            't' => spec.thread_names = true,
            'p' => spec.level = true,
            'c' | 'C' => spec.target = true,
            'l' => {
                spec.file = true;
                spec.line_number = true;
            }
            'F' => spec.file = true,
            'L' => spec.line_number = true,
            'm' | 'n' | '%' => {}
            'M' | 'x' | 'X' => spec.unsupported.push(format!("%{}", conversion)),
            other => bail!(
                "unknown conversion '%{}' in pattern '{}'",
                other,
                pattern
            ),
        }
    }

    Ok(spec)
}

/// Resolve the `%d{...}` option to a chrono format string.
fn date_format(option: Option<&str>) -> Result<String> {
    let format = match option.map(str::trim) {
        None | Some("") | Some("ISO8601") => ISO8601_FORMAT.to_string(),
        Some("ABSOLUTE") => ABSOLUTE_FORMAT.to_string(),
        Some("DATE") => DATE_FORMAT.to_string(),
        Some(java) => translate_date_pattern(java),
    };

    if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
        bail!("invalid date format '{}'", option.unwrap_or_default());
    }
    Ok(format)
}

/// Translate a `SimpleDateFormat` pattern (`yyyy-MM-dd HH:mm:ss,SSS`) to strftime.
pub fn translate_date_pattern(java: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = java.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' {
            // Quoted literal text; `''` is a single quote inside or outside quotes.
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !ch.is_ascii_alphabetic() {
            push_literal(&mut out, ch);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|c| **c == ch).count();
        let converted = match (ch, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('a', _) => "%p",
            ('z', _) => "%Z",
            ('Z', _) => "%z",
            _ => "",
        };
        if converted.is_empty() {
            // Unknown letters are kept as literal text.
            for _ in 0..run {
                push_literal(&mut out, ch);
            }
        } else {
            out.push_str(converted);
        }
        i += run;
    }

    out
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}
