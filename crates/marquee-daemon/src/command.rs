//! Command-line construction for the renderer executables

use std::fmt;
use std::path::PathBuf;

use marquee_core::{DemoJob, TextJob};

use crate::config::RenderConfig;

/// Fixed single-pass loop count for text messages
const TEXT_LOOPS: &str = "1";

/// Highlight colour used by the sort visualizer
const SORT_COLOR: &str = "252,128,161";

/// A program plus its argv, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl RenderCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for RenderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Build the command line for an ambient demo
pub fn demo_command(job: &DemoJob, config: &RenderConfig) -> RenderCommand {
    let examples = &config.paths.examples_dir;
    let hardware = config.hardware.to_args();

    match job {
        DemoJob::Sort { algorithm } => RenderCommand::new(examples.join("sort"))
            .args(["-s", algorithm.as_arg()])
            .args(hardware)
            .args(["-C", SORT_COLOR])
            .arg("-d")
            .arg(algorithm.delay().to_string()),
        DemoJob::Fractal => RenderCommand::new(examples.join("mandelbrot"))
            .args(["-d", "160", "-z", "1.11", "-i", "250", "-t", "160"])
            .args(hardware),
        DemoJob::Video { file } => RenderCommand::new(&config.paths.video_viewer)
            .args(hardware)
            .arg("-F")
            .arg(file.to_string_lossy()),
        DemoJob::Train => RenderCommand::new(examples.join("choochoo")).args(hardware),
        DemoJob::Numbered { index } => RenderCommand::new(examples.join("demo"))
            .arg("-D")
            .arg(index.to_string())
            .args(hardware),
    }
}

/// Build the command line for a text message
///
/// The escaped text is always the last token.
pub fn text_command(job: &TextJob, config: &RenderConfig) -> RenderCommand {
    RenderCommand::new(config.paths.examples_dir.join("scrolling-text-example"))
        .args(config.hardware.to_args())
        .args(["-l", TEXT_LOOPS])
        .arg("-f")
        .arg(config.paths.font.to_string_lossy())
        .args(job.extra_args.iter().cloned())
        .arg(job.escaped_text.clone())
}
