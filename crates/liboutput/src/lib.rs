#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Terminal output abstractions and implementations for user-facing messages and prompts.
//!
//! This crate provides an [`Output`] trait that abstracts over how user messages
//! and interactive prompts are rendered. Implementations include:
//!
//! - [`Terminal`]: A color-capable terminal renderer for production use
//! - [`Quiet`]: A silent implementation that suppresses output and only
//!   answers prompts that carry a default
//! - [`Capture`]: An in-memory recorder with scripted prompt answers (useful for tests)

use std::{
    collections::VecDeque,
    io::{self, Write},
    result::Result as StdResult,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use crossterm::terminal;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

/// Indentation level (in spaces) used for nested output sections.
const INDENT: usize = 4;

/// Width used for wrapping when the terminal size cannot be determined.
const FALLBACK_WIDTH: usize = 100;

/// Spinner frame interval.
const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Errors produced by [`Output`] implementations when interacting with the user
/// or the terminal.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The requested operation is not supported by this output backend.
    #[error("{0}")]
    Unsupported(&'static str),

    /// A terminal/TTY related failure occurred.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// The prompt was given input it cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Underlying I/O error while writing/reading to the terminal.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The user cancelled an interactive prompt.
    #[error("Prompt cancelled")]
    Cancelled,
}

/// Convenience alias for output-related fallible operations.
pub type Result<T> = StdResult<T, OutputError>;

/// Abstraction over how user-facing messages and prompts are produced.
pub trait Output: Send + Sync {
    /// Print an informational message.
    fn message(&self, msg: &str) -> Result<()>;
    /// Print a success message.
    fn success(&self, msg: &str) -> Result<()>;
    /// Print a warning message.
    fn warn(&self, msg: &str) -> Result<()>;
    /// Print an error/failure message.
    fn fail(&self, msg: &str) -> Result<()>;
    /// Ask a yes/no question; `default` is used when the user just hits enter.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
    /// Ask for a line of text, offering `default` when present.
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String>;
    /// Pick one of `options`, returning its index. `default` is preselected.
    fn select(&self, prompt: &str, options: &[String], default: usize) -> Result<usize>;
    /// Start a spinner for a long-running step.
    fn spinner(&self, msg: &str) -> Spinner;
    /// Flush any buffered output.
    fn finish(&self) -> Result<()>;
    /// Create a nested output section that indents subsequent messages.
    fn section(&self, header: &str) -> Box<dyn Output>;
}

/// Handle to an in-progress spinner. Hidden spinners are no-ops.
pub struct Spinner {
    /// Underlying progress bar, absent for hidden spinners.
    bar: Option<ProgressBar>,
}

impl Spinner {
    /// A spinner that draws nothing.
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    /// Start a ticking spinner on stderr showing `msg`.
    fn ticking(msg: &str, indent: usize) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner());
        bar.set_message(format!("{}{msg}", " ".repeat(indent)));
        bar.enable_steady_tick(SPINNER_TICK);
        Self { bar: Some(bar) }
    }

    /// Whether this spinner draws anything.
    pub fn is_hidden(&self) -> bool {
        self.bar.is_none()
    }

    /// Stop the spinner and erase it.
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Output implementation that suppresses all messages. Prompts resolve to
/// their default when one exists and fail otherwise.
pub struct Quiet;

impl Output for Quiet {
    fn message(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn success(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn warn(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn fail(&self, _msg: &str) -> Result<()> {
        Ok(())
    }

    fn confirm(&self, _prompt: &str, default: bool) -> Result<bool> {
        Ok(default)
    }

    fn input(&self, _prompt: &str, default: Option<&str>) -> Result<String> {
        default
            .map(str::to_string)
            .ok_or(OutputError::Unsupported("Cannot prompt for input in quiet mode"))
    }

    fn select(&self, _prompt: &str, options: &[String], default: usize) -> Result<usize> {
        check_options(options, default)?;
        Ok(default)
    }

    fn spinner(&self, _msg: &str) -> Spinner {
        Spinner::hidden()
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }

    fn section(&self, _header: &str) -> Box<dyn Output> {
        Box::new(Self)
    }
}

/// Color-capable terminal renderer for user messages and prompts.
pub struct Terminal {
    /// Whether to emit ANSI color sequences when writing to stdout.
    color_choice: ColorChoice,
    /// Current indentation depth in spaces.
    indent: usize,
    /// Whether spinners should be drawn.
    animate: bool,
}

impl Terminal {
    /// Create a new terminal output.
    ///
    /// - `color`: when `true`, always render colored output; when `false`,
    ///   disable ANSI colors. Spinners are only drawn when color is enabled,
    ///   since that is the signal for an interactive terminal.
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        Self {
            color_choice,
            indent: 0,
            animate: color,
        }
    }

    /// Wrap `msg` to the terminal width minus the current indent.
    fn wrap(&self, msg: &str) -> Vec<String> {
        let width = terminal::size()
            .map(|(cols, _)| usize::from(cols))
            .unwrap_or(FALLBACK_WIDTH)
            .saturating_sub(self.indent)
            .max(20);
        let indent = " ".repeat(self.indent);
        msg.lines()
            .flat_map(|line| {
                if line.is_empty() {
                    return vec![String::new()];
                }
                textwrap::wrap(line, width)
                    .into_iter()
                    .map(|part| part.into_owned())
                    .collect()
            })
            .map(|line| format!("{indent}{line}"))
            .collect()
    }

    /// Write `msg` using `color` while honoring the current indentation level.
    fn write_colored(&self, msg: &str, color: Color) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        stdout.set_color(ColorSpec::new().set_fg(Some(color)))?;
        for line in self.wrap(msg) {
            writeln!(stdout, "{line}")?;
        }
        stdout.reset()?;
        stdout.flush()?;
        Ok(())
    }

    /// Prompt text with the current indentation applied.
    fn indented(&self, prompt: &str) -> String {
        format!("{}{prompt}", " ".repeat(self.indent))
    }
}

impl Output for Terminal {
    fn message(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Cyan)
    }

    fn success(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Green)
    }

    fn warn(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Rgb(255, 165, 0)) // Orange
    }

    fn fail(&self, msg: &str) -> Result<()> {
        self.write_colored(msg, Color::Red)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(self.indented(prompt))
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(self.indented(prompt));
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn select(&self, prompt: &str, options: &[String], default: usize) -> Result<usize> {
        check_options(options, default)?;
        Select::new()
            .with_prompt(self.indented(prompt))
            .items(options)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn spinner(&self, msg: &str) -> Spinner {
        if self.animate {
            Spinner::ticking(msg, self.indent)
        } else {
            Spinner::hidden()
        }
    }

    fn finish(&self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn section(&self, header: &str) -> Box<dyn Output> {
        self.message(header)
            .expect("section header message should succeed");

        Box::new(Self {
            color_choice: self.color_choice,
            indent: self.indent + INDENT,
            animate: self.animate,
        })
    }
}

/// Reject an empty option list or an out-of-range default.
fn check_options(options: &[String], default: usize) -> Result<()> {
    if options.is_empty() {
        return Err(OutputError::InvalidInput("No options provided for selection"));
    }
    if default >= options.len() {
        return Err(OutputError::InvalidInput("Default selection is out of range"));
    }
    Ok(())
}

/// Map prompt failures, treating an interrupted read as a cancellation.
fn prompt_error(err: dialoguer::Error) -> OutputError {
    let dialoguer::Error::IO(io_err) = err;
    if io_err.kind() == io::ErrorKind::Interrupted {
        OutputError::Cancelled
    } else {
        OutputError::Terminal(io_err.to_string())
    }
}

/// Severity of a recorded [`Capture`] line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Informational message or section header.
    Message,
    /// Success message.
    Success,
    /// Warning message.
    Warn,
    /// Failure message.
    Fail,
    /// A prompt that was answered.
    Prompt,
}

/// A single line recorded by [`Capture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Severity of the line.
    pub level: Level,
    /// Text of the line, prefixed by section indentation.
    pub text: String,
}

/// Shared state behind [`Capture`] and its sections.
#[derive(Default)]
struct CaptureState {
    /// Lines recorded so far.
    lines: Vec<Line>,
    /// Scripted answers handed out to prompts in order.
    answers: VecDeque<String>,
}

/// Output implementation that records every line in memory and answers
/// prompts from a scripted queue.
#[derive(Clone, Default)]
pub struct Capture {
    /// State shared between this capture and its sections.
    state: Arc<Mutex<CaptureState>>,
    /// Current indentation depth in spaces.
    indent: usize,
}

impl Capture {
    /// Create an empty capture with no scripted answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a capture that answers prompts with `answers`, in order. An
    /// empty answer selects the prompt's default.
    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let capture = Self::new();
        capture.state().answers = answers.into_iter().map(Into::into).collect();
        capture
    }

    /// All lines recorded so far.
    pub fn lines(&self) -> Vec<Line> {
        self.state().lines.clone()
    }

    /// Whether any recorded line at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.state()
            .lines
            .iter()
            .any(|line| line.level == level && line.text.contains(needle))
    }

    /// Lock the shared state, recovering from a poisoned lock.
    fn state(&self) -> MutexGuard<'_, CaptureState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `msg` at `level`.
    fn record(&self, level: Level, msg: &str) -> Result<()> {
        self.push(level, msg);
        Ok(())
    }

    /// Append an indented line to the shared log.
    fn push(&self, level: Level, msg: &str) {
        let text = format!("{}{msg}", " ".repeat(self.indent));
        self.state().lines.push(Line { level, text });
    }

    /// Pop the next scripted answer, recording the prompt.
    fn answer(&self, prompt: &str) -> Result<String> {
        let answer = self
            .state()
            .answers
            .pop_front()
            .ok_or(OutputError::Unsupported("No scripted answer left for prompt"))?;
        self.push(Level::Prompt, &format!("{prompt} {answer}"));
        Ok(answer)
    }
}

impl Output for Capture {
    fn message(&self, msg: &str) -> Result<()> {
        self.record(Level::Message, msg)
    }

    fn success(&self, msg: &str) -> Result<()> {
        self.record(Level::Success, msg)
    }

    fn warn(&self, msg: &str) -> Result<()> {
        self.record(Level::Warn, msg)
    }

    fn fail(&self, msg: &str) -> Result<()> {
        self.record(Level::Fail, msg)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let answer = self.answer(prompt)?;
        Ok(match answer.trim().to_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let answer = self.answer(prompt)?;
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn select(&self, prompt: &str, options: &[String], default: usize) -> Result<usize> {
        check_options(options, default)?;
        let answer = self.answer(prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        if let Ok(index) = answer.parse::<usize>()
            && index < options.len()
        {
            return Ok(index);
        }
        options
            .iter()
            .position(|option| option.eq_ignore_ascii_case(answer))
            .ok_or(OutputError::InvalidInput("Scripted answer matches no option"))
    }

    fn spinner(&self, _msg: &str) -> Spinner {
        Spinner::hidden()
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }

    fn section(&self, header: &str) -> Box<dyn Output> {
        self.push(Level::Message, header);
        Box::new(Self {
            state: Arc::clone(&self.state),
            indent: self.indent + INDENT,
        })
    }
}
