use std::{
    collections::HashSet,
    io::{self, IsTerminal, Write},
    result::Result as StdResult,
    time::Duration,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

/// Indentation level (in spaces) used for nested output sections.
const INDENT: usize = 4;

/// Width assumed when the terminal size cannot be queried.
const FALLBACK_WIDTH: usize = 80;

/// Spinner redraw interval.
const SPINNER_TICK: Duration = Duration::from_millis(100);

/// ASCII control representation of `Ctrl+C`.
const CTRL_C: char = '\u{3}';
/// ASCII control representation of `Ctrl+D`.
const CTRL_D: char = '\u{4}';

/// Whether `code` with `modifiers` cancels a prompt (`Ctrl+C`, `Ctrl+D`, `Esc`).
fn is_cancel_key(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char(ch) => {
            if modifiers.contains(KeyModifiers::CONTROL) && matches!(lower(ch), 'c' | 'd') {
                return true;
            }
            matches!(ch, CTRL_C | CTRL_D)
        }
        KeyCode::Esc => true,
        _ => false,
    }
}

/// First codepoint of the lowercase form of `ch`.
fn lower(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Errors produced by [`Output`] implementations.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The requested operation is not supported by this output backend.
    #[error("{0}")]
    Unsupported(&'static str),

    /// The caller supplied invalid input (e.g. empty options for a selector).
    #[error("{0}")]
    InvalidInput(&'static str),

    /// A terminal/TTY related failure occurred.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Underlying I/O error while writing/reading to the terminal.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The user cancelled an interactive prompt.
    #[error("Selection cancelled")]
    Cancelled,
}

/// Convenience alias for output-related fallible operations.
pub type Result<T> = StdResult<T, OutputError>;

/// Progress indicator for a long-running step.
pub trait Spinner: Send + Sync {
    /// Replace the text shown next to the spinner.
    fn set_message(&self, msg: &str);
    /// Stop and erase the spinner.
    fn finish(&self);
}

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
    /// Print a `label: value` detail line.
    fn item(&self, label: &str, value: &str) -> Result<()>;
    /// Ask the user to confirm an action; returns `true` if confirmed.
    fn confirm(&self, prompt: &str) -> Result<bool>;
    /// Present a list of `options` and return the chosen index.
    fn select(&self, prompt: &str, options: Vec<String>) -> Result<usize>;
    /// Start a spinner showing `msg` until it is finished.
    fn spinner(&self, msg: &str) -> Box<dyn Spinner>;
    /// Flush any buffered output.
    fn finish(&self) -> Result<()>;
    /// Print `header` and return an output that indents beneath it.
    fn section(&self, header: &str) -> Result<Box<dyn Output>>;
}

/// Spinner that draws nothing.
struct Silent;

impl Spinner for Silent {
    fn set_message(&self, _msg: &str) {}

    fn finish(&self) {}
}

/// Output implementation that suppresses all messages and rejects interactive
/// prompts.
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

    fn item(&self, _label: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Err(OutputError::Unsupported(
            "Cannot prompt for confirmation in quiet mode",
        ))
    }

    fn select(&self, _prompt: &str, _options: Vec<String>) -> Result<usize> {
        Err(OutputError::Unsupported(
            "Cannot prompt for selection in quiet mode",
        ))
    }

    fn spinner(&self, _msg: &str) -> Box<dyn Spinner> {
        Box::new(Silent)
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }

    fn section(&self, _header: &str) -> Result<Box<dyn Output>> {
        Ok(Box::new(Self))
    }
}

/// Spinner drawn by indicatif on stderr.
struct ProgressSpinner {
    /// Underlying progress bar in spinner mode.
    bar: ProgressBar,
}

impl Spinner for ProgressSpinner {
    fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Color-capable terminal renderer for user messages and prompts.
pub struct Terminal {
    /// Whether to emit ANSI color sequences when writing to stdout.
    color_choice: ColorChoice,
    /// Current indentation depth in spaces.
    indent: usize,
}

impl Terminal {
    /// Create a terminal output; `color` forces colors on or off.
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        Self {
            color_choice,
            indent: 0,
        }
    }

    /// Lay out `msg` at the current indentation.
    ///
    /// Every line of a multi-line message is indented. Long lines are wrapped
    /// to the terminal width only when stdout is a terminal.
    fn layout(&self, msg: &str) -> String {
        let prefix = " ".repeat(self.indent);
        if !io::stdout().is_terminal() {
            return msg
                .lines()
                .map(|line| format!("{prefix}{line}"))
                .collect::<Vec<_>>()
                .join("\n");
        }

        let width = terminal::size()
            .map(|(columns, _)| usize::from(columns))
            .unwrap_or(FALLBACK_WIDTH)
            .max(self.indent + 20);
        let options = textwrap::Options::new(width)
            .initial_indent(&prefix)
            .subsequent_indent(&prefix)
            .break_words(false);
        textwrap::fill(msg, options)
    }

    /// Write `msg` using `color` while honoring the current indentation level.
    fn write_colored(&self, msg: &str, color: Color) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        stdout.set_color(ColorSpec::new().set_fg(Some(color)))?;
        writeln!(stdout, "{}", self.layout(msg))?;
        stdout.reset()?;
        stdout.flush()?;
        Ok(())
    }

    /// Pick a distinct single-key shortcut for each option.
    ///
    /// Preference: the first unused letter of the option, then an unused
    /// digit, then any unused letter, then `?`.
    fn generate_shortcuts(&self, options: &[String]) -> Vec<char> {
        let mut used = HashSet::new();
        options
            .iter()
            .map(|option| {
                let shortcut = option
                    .chars()
                    .filter(|ch| ch.is_alphabetic())
                    .map(lower)
                    .find(|ch| !used.contains(ch))
                    .or_else(|| {
                        (1..=9)
                            .filter_map(|digit| char::from_digit(digit, 10))
                            .find(|ch| !used.contains(ch))
                    })
                    .or_else(|| ('a'..='z').find(|ch| !used.contains(ch)))
                    .unwrap_or('?');
                used.insert(shortcut);
                shortcut
            })
            .collect()
    }

    /// Render `option` with `shortcut` highlighted, or prefixed in brackets
    /// when the label does not contain it.
    fn print_option_with_shortcut(&self, option: &str, shortcut: char) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);

        match option.char_indices().find(|(_, ch)| lower(*ch) == shortcut) {
            Some((idx, ch)) => {
                write!(stdout, "{}", &option[..idx])?;
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                write!(stdout, "{ch}")?;
                stdout.reset()?;
                write!(stdout, "{}", &option[idx + ch.len_utf8()..])?;
            }
            None => write!(stdout, "[{shortcut}] {option}")?,
        }

        writeln!(stdout)?;
        stdout.flush()?;
        Ok(())
    }

    /// Block until a shortcut or cancel key is pressed. Raw mode must be on.
    fn read_choice(shortcuts: &[char]) -> Result<(usize, char)> {
        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read().map_err(|e| OutputError::Terminal(e.to_string()))?
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            if is_cancel_key(code, modifiers) {
                return Err(OutputError::Cancelled);
            }
            if let KeyCode::Char(ch) = code {
                let ch = lower(ch);
                if let Some(index) = shortcuts.iter().position(|&s| s == ch) {
                    return Ok((index, ch));
                }
            }
        }
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

    fn item(&self, label: &str, value: &str) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        write!(stdout, "{}", " ".repeat(self.indent))?;
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "{label}:")?;
        stdout.reset()?;
        writeln!(stdout, " {value}")?;
        stdout.flush()?;
        Ok(())
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        let options = vec!["Yes".to_string(), "No".to_string()];
        let selection = self.select(prompt, options)?;
        Ok(selection == 0)
    }

    fn select(&self, prompt: &str, options: Vec<String>) -> Result<usize> {
        if options.is_empty() {
            return Err(OutputError::InvalidInput(
                "No options provided for selection",
            ));
        }

        let shortcuts = self.generate_shortcuts(&options);
        let pad = " ".repeat(self.indent);

        println!("{pad}{prompt}");
        for (option, shortcut) in options.iter().zip(shortcuts.iter()) {
            print!("{pad}  ");
            self.print_option_with_shortcut(option, *shortcut)?;
        }
        print!("{pad} > ");
        io::stdout().flush()?;

        terminal::enable_raw_mode().map_err(|e| OutputError::Terminal(e.to_string()))?;
        let result = Self::read_choice(&shortcuts);
        terminal::disable_raw_mode().map_err(|e| OutputError::Terminal(e.to_string()))?;

        match result {
            Ok((index, ch)) => {
                println!("{ch}");
                Ok(index)
            }
            Err(e) => {
                println!();
                Err(e)
            }
        }
    }

    fn spinner(&self, msg: &str) -> Box<dyn Spinner> {
        let bar = ProgressBar::new_spinner();
        let template = format!("{}{{spinner}} {{msg}}", " ".repeat(self.indent));
        bar.set_style(
            ProgressStyle::with_template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(SPINNER_TICK);
        Box::new(ProgressSpinner { bar })
    }

    fn finish(&self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn section(&self, header: &str) -> Result<Box<dyn Output>> {
        self.message(header)?;
        Ok(Box::new(Self {
            color_choice: self.color_choice,
            indent: self.indent + INDENT,
        }))
    }
}
