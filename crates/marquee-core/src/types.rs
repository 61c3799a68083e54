//! Domain types shared by the intake, the arbiter, and the render backends

use std::fmt;
use std::path::PathBuf;

/// Longest message, in characters, accepted for display
pub const MAX_MESSAGE_CHARS: usize = 250;

// ─────────────────────────────────────────────────────────────────────────────
// Display requests
// ─────────────────────────────────────────────────────────────────────────────

/// A user-submitted message plus its renderer flags, waiting in the queue.
///
/// Built by the intake side after validation; the arbiter consumes each one
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRequest {
    extra_args: Vec<String>,
    text: String,
}

impl DisplayRequest {
    pub fn new(extra_args: Vec<String>, text: impl Into<String>) -> Self {
        Self {
            extra_args,
            text: text.into(),
        }
    }

    /// Renderer flag tokens, e.g. `["-s", "5", "-C", "255,0,0"]`
    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    /// The raw (unescaped) message
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Truncate `text` to at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Escape a message for embedding as a single renderer argument.
///
/// Backslashes are doubled first, then double quotes are escaped. Reversing
/// the order would double the backslashes introduced for the quotes.
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

// ─────────────────────────────────────────────────────────────────────────────
// Render jobs
// ─────────────────────────────────────────────────────────────────────────────

/// A text render job: the request's flags plus the escaped message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextJob {
    pub extra_args: Vec<String>,
    pub escaped_text: String,
}

impl From<&DisplayRequest> for TextJob {
    fn from(request: &DisplayRequest) -> Self {
        Self {
            extra_args: request.extra_args.clone(),
            escaped_text: escape_text(&request.text),
        }
    }
}

impl From<DisplayRequest> for TextJob {
    fn from(request: DisplayRequest) -> Self {
        Self {
            escaped_text: escape_text(&request.text),
            extra_args: request.extra_args,
        }
    }
}

/// Sorting algorithms understood by the sort visualizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortAlgorithm {
    Insertion,
    Cocktail,
}

impl SortAlgorithm {
    pub const ALL: [SortAlgorithm; 2] = [SortAlgorithm::Insertion, SortAlgorithm::Cocktail];

    /// Value of the visualizer's `-s` flag
    pub fn as_arg(&self) -> &'static str {
        match self {
            SortAlgorithm::Insertion => "insertion",
            SortAlgorithm::Cocktail => "cocktail",
        }
    }

    /// Animation delay passed with `-d`; each algorithm has its own pace.
    pub fn delay(&self) -> u32 {
        match self {
            SortAlgorithm::Insertion => 10,
            SortAlgorithm::Cocktail => 100,
        }
    }
}

/// The five kinds of ambient demo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoCategory {
    Sort,
    Fractal,
    Video,
    Train,
    Numbered,
}

impl DemoCategory {
    pub const ALL: [DemoCategory; 5] = [
        DemoCategory::Sort,
        DemoCategory::Fractal,
        DemoCategory::Video,
        DemoCategory::Train,
        DemoCategory::Numbered,
    ];

    /// Selection weight out of [`DemoCategory::TOTAL_WEIGHT`]
    pub fn weight(&self) -> u32 {
        match self {
            DemoCategory::Sort => 3,
            DemoCategory::Fractal => 4,
            DemoCategory::Video => 4,
            DemoCategory::Train => 3,
            DemoCategory::Numbered => 2,
        }
    }

    pub const TOTAL_WEIGHT: u32 = 16;
}

impl fmt::Display for DemoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoCategory::Sort => write!(f, "sort"),
            DemoCategory::Fractal => write!(f, "fractal"),
            DemoCategory::Video => write!(f, "video"),
            DemoCategory::Train => write!(f, "train"),
            DemoCategory::Numbered => write!(f, "numbered"),
        }
    }
}

/// A fully selected ambient demo, ready to be turned into a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoJob {
    Sort { algorithm: SortAlgorithm },
    Fractal,
    Video { file: PathBuf },
    Train,
    Numbered { index: u8 },
}

impl DemoJob {
    pub fn category(&self) -> DemoCategory {
        match self {
            DemoJob::Sort { .. } => DemoCategory::Sort,
            DemoJob::Fractal => DemoCategory::Fractal,
            DemoJob::Video { .. } => DemoCategory::Video,
            DemoJob::Train => DemoCategory::Train,
            DemoJob::Numbered { .. } => DemoCategory::Numbered,
        }
    }
}

impl fmt::Display for DemoJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoJob::Sort { algorithm } => write!(f, "sort ({})", algorithm.as_arg()),
            DemoJob::Fractal => write!(f, "fractal"),
            DemoJob::Video { file } => write!(f, "video ({})", file.display()),
            DemoJob::Train => write!(f, "train"),
            DemoJob::Numbered { index } => write!(f, "demo #{}", index),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Process and arbiter state
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a non-blocking check on a render process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    /// Exit code, `None` when the process was ended by a signal
    Exited(Option<i32>),
}

impl ProcessStatus {
    pub fn has_exited(&self) -> bool {
        matches!(self, ProcessStatus::Exited(_))
    }
}

/// What the display is currently given over to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    DemoRunning,
    TextDraining,
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayState::DemoRunning => write!(f, "DEMO_RUNNING"),
            DisplayState::TextDraining => write!(f, "TEXT_DRAINING"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape_text(r#"He said "hi""#), r#"He said \"hi\""#);
    }

    #[test]
    fn test_escape_backslash() {
        assert_eq!(escape_text(r"C:\path"), r"C:\\path");
    }

    #[test]
    fn test_escape_backslash_before_quote() {
        // A quote escaped first would have its new backslash doubled.
        assert_eq!(escape_text(r#"a\"b"#), r#"a\\\"b"#);
    }

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape_text("HELLO"), "HELLO");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        let text = "é".repeat(300);
        let truncated = truncate_chars(&text, MAX_MESSAGE_CHARS);
        assert_eq!(truncated.chars().count(), 250);
    }

    #[test]
    fn test_truncate_chars_short_text() {
        assert_eq!(truncate_chars("hi", 250), "hi");
        assert_eq!(truncate_chars("", 250), "");
    }

    #[test]
    fn test_text_job_from_request() {
        let req = DisplayRequest::new(vec!["-s".into(), "5".into()], r#"say "x""#);
        let job = TextJob::from(&req);
        assert_eq!(job.extra_args, vec!["-s", "5"]);
        assert_eq!(job.escaped_text, r#"say \"x\""#);
        // the request keeps its raw text
        assert_eq!(req.text(), r#"say "x""#);
    }

    #[test]
    fn test_demo_weights_sum_to_total() {
        let sum: u32 = DemoCategory::ALL.iter().map(|c| c.weight()).sum();
        assert_eq!(sum, DemoCategory::TOTAL_WEIGHT);
    }

    #[test]
    fn test_sort_algorithm_delays() {
        assert_eq!(SortAlgorithm::Insertion.delay(), 10);
        assert_eq!(SortAlgorithm::Cocktail.delay(), 100);
    }

    #[test]
    fn test_demo_job_category() {
        assert_eq!(
            DemoJob::Video {
                file: PathBuf::from("/v/a.mp4")
            }
            .category(),
            DemoCategory::Video
        );
        assert_eq!(DemoJob::Numbered { index: 7 }.category(), DemoCategory::Numbered);
    }

    #[test]
    fn test_display_state_default_is_demo() {
        assert_eq!(DisplayState::default(), DisplayState::DemoRunning);
        assert_eq!(DisplayState::TextDraining.to_string(), "TEXT_DRAINING");
    }
}
