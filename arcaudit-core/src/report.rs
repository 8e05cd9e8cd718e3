//! Report presentation: adaptive sizes, aligned tree lines, output sinks.
//!
//! Rendering is bit-for-bit stable so the report can be snapshot-tested.

/// Display column at which the annotation starts.
const ANNOTATION_COLUMN: usize = 68;
/// Indentation per nesting level.
const INDENT: &str = "    ";
/// Tree connector in front of every label.
const CONNECTOR: &str = "\\-- ";
/// Width of the pages column in annotations.
const PAGES_COLUMN: usize = 10;

/// Format a byte count with the largest unit keeping the value below 1024.
///
/// One decimal place, 1024 ratio between adjacent units, capped at TB.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Display width of a string where characters below U+0100 take one column
/// and everything else takes two.
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| if (c as u32) < 0x100 { 1 } else { 2 })
        .sum()
}

/// Left-justify to a display column; strings already wider pass through.
fn pad_to_column(mut s: String, column: usize) -> String {
    let width = display_width(&s);
    for _ in width..column {
        s.push(' ');
    }
    s
}

/// Render one tree line: indent, connector, label padded to the annotation
/// column, annotation.
pub fn format_line(depth: usize, label: &str, annotation: &str) -> String {
    let mut line = String::new();
    for _ in 0..depth {
        line.push_str(INDENT);
    }
    line.push_str(CONNECTOR);
    line.push_str(label);
    let mut line = pad_to_column(line, ANNOTATION_COLUMN);
    line.push_str(annotation);
    line
}

/// Build a member annotation: pages column, right-justified size, digest
/// fingerprint. `pages` is `None` for entries that show no page figure
/// (nested archives).
pub fn annotate(pages: Option<u64>, size: &str, fingerprint: &str) -> String {
    let pages_col = match pages {
        Some(n) => format!("{:>4} pages", n),
        None => " ".repeat(PAGES_COLUMN),
    };
    format!("{}  {:>9}  {}", pages_col, size, fingerprint)
}

/// Receives the report as it is produced.
///
/// The walker and aggregator emit (depth, label, annotation) triples for
/// tree lines plus raw lines for summaries and separators; sinks decide
/// where the rendered text goes.
pub trait ReportSink {
    /// One indented tree line.
    fn emit(&mut self, depth: usize, label: &str, annotation: &str);

    /// One raw, unindented line (entity summaries, driver banners,
    /// blank separators).
    fn line(&mut self, text: &str);
}

/// Writes the rendered report to stdout.
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn emit(&mut self, depth: usize, label: &str, annotation: &str) {
        println!("{}", format_line(depth, label, annotation));
    }

    fn line(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Collects rendered lines in memory instead of printing them.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub lines: Vec<String>,
}

impl ReportSink for BufferSink {
    fn emit(&mut self, depth: usize, label: &str, annotation: &str) {
        self.lines.push(format_line(depth, label, annotation));
    }

    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}
