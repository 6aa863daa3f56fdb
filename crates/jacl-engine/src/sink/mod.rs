//! The presentation boundary.
//!
//! Everything the interpreter shows or asks goes through a
//! [`PresentationSink`]. Operations a backend cannot perform default to
//! no-ops, so a sink only implements what it supports and advertises that
//! through [`Capabilities`].

mod headless;
pub mod markup;

pub use headless::HeadlessSink;

use thiserror::Error;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Failures of the presentation layer.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Reading input or writing output failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Text styles a script can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// Plain body text.
    #[default]
    Normal,
    /// Emphasis.
    Bold,
    /// Asides such as score notifications.
    Note,
    /// Echo of player input.
    Input,
    /// Major heading.
    Header,
    /// Minor heading.
    Subheader,
    /// Inverse video.
    Reverse,
    /// Fixed-width text.
    Pre,
}

impl Style {
    /// Parse a style name as written after the `style` operator.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "normal" => Self::Normal,
            "bold" | "emphasised" | "emphasized" => Self::Bold,
            "note" => Self::Note,
            "input" => Self::Input,
            "header" => Self::Header,
            "subheader" => Self::Subheader,
            "reverse" | "inverse" => Self::Reverse,
            "pre" | "preformatted" => Self::Pre,
            _ => return None,
        })
    }
}

/// Something that interrupted a wait for input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The player entered a line.
    Line(String),
    /// The periodic timer fired.
    Timer,
    /// A sound finished playing.
    SoundFinished {
        /// The resource number that was playing.
        resource: i32,
        /// The channel it played on.
        channel: i32,
    },
    /// No more input will arrive.
    Eof,
}

/// Optional features a sink provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Can draw images.
    pub graphics: bool,
    /// Can play sounds.
    pub sound: bool,
    /// Delivers [`InputEvent::Timer`].
    pub timer: bool,
}

/// The interpreter's only view of the outside world.
pub trait PresentationSink {
    /// Features this sink supports.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Print text. Implementations apply [`markup::render`].
    fn write_text(&mut self, text: &str) -> SinkResult<()>;

    fn set_style(&mut self, _style: Style) -> SinkResult<()> {
        Ok(())
    }

    fn clear_window(&mut self) -> SinkResult<()> {
        Ok(())
    }

    /// Replace the status bar. `height` comes from the `status_window`
    /// integer; 0 hides the bar.
    fn status_line(&mut self, _left: &str, _score: i32, _moves: i32, _height: i32) -> SinkResult<()> {
        Ok(())
    }

    /// Move the cursor in the status window.
    fn set_cursor(&mut self, _x: i32, _y: i32) -> SinkResult<()> {
        Ok(())
    }

    /// Block until the player enters a line or an event arrives.
    fn request_line(&mut self) -> SinkResult<InputEvent>;

    /// Block for a single keypress.
    fn request_char(&mut self) -> SinkResult<char> {
        Ok(match self.request_line()? {
            InputEvent::Line(line) => line.chars().next().unwrap_or('\n'),
            _ => '\n',
        })
    }

    /// Ask until the first letter of the answer matches `yes` or `no`,
    /// writing `retry` after each unusable answer. Ending input counts as
    /// no.
    fn request_yes_no(&mut self, yes: &str, no: &str, retry: &str) -> SinkResult<bool> {
        let first = |s: &str| s.chars().find(|c| c.is_alphabetic()).map(|c| c.to_ascii_lowercase());
        loop {
            match self.request_line()? {
                InputEvent::Line(line) => {
                    let answer = first(&line);
                    if answer.is_some() && answer == first(yes) {
                        return Ok(true);
                    }
                    if answer.is_some() && answer == first(no) {
                        return Ok(false);
                    }
                    self.write_text(retry)?;
                }
                InputEvent::Eof => return Ok(false),
                _ => {}
            }
        }
    }

    /// Read a number in `low..=high`. With `insist`, keep asking until one
    /// is given; otherwise an unusable answer yields `None`.
    fn request_number(&mut self, low: i32, high: i32, insist: bool) -> SinkResult<Option<i32>> {
        loop {
            match self.request_line()? {
                InputEvent::Line(line) => match line.trim().parse::<i32>() {
                    Ok(n) if (low..=high).contains(&n) => return Ok(Some(n)),
                    _ if !insist => return Ok(None),
                    _ => {}
                },
                InputEvent::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Show `prompt` and wait for a key.
    fn more(&mut self, prompt: &str) -> SinkResult<()> {
        self.write_text(prompt)?;
        self.request_char().map(|_| ())
    }

    /// Print `text` as a link that enters `command` when chosen.
    fn hyperlink(&mut self, text: &str, _command: &str) -> SinkResult<()> {
        self.write_text(text)
    }

    /// Start a sound. Returns whether it played.
    fn play_sound(&mut self, _resource: i32, _channel: usize, _repeats: i32) -> SinkResult<bool> {
        Ok(false)
    }

    fn stop_sound(&mut self, _channel: usize) -> SinkResult<()> {
        Ok(())
    }

    /// Set a channel's volume, 0 to 100.
    fn set_volume(&mut self, _channel: usize, _volume: i32) -> SinkResult<()> {
        Ok(())
    }

    /// Show an image. Returns whether it was drawn.
    fn draw_image(&mut self, _resource: i32) -> SinkResult<bool> {
        Ok(false)
    }

    /// Deliver [`InputEvent::Timer`] every `millis` milliseconds; 0 stops.
    fn set_timer(&mut self, _millis: i32) -> SinkResult<()> {
        Ok(())
    }

    /// Pause output for `millis` milliseconds.
    fn sleep(&mut self, _millis: i32) -> SinkResult<()> {
        Ok(())
    }

    /// Start recording a transcript. Returns whether it opened.
    fn open_transcript(&mut self) -> SinkResult<bool> {
        Ok(false)
    }

    fn close_transcript(&mut self) -> SinkResult<()> {
        Ok(())
    }

    /// Append to the transcript, if one is open.
    fn write_transcript(&mut self, _text: &str) -> SinkResult<()> {
        Ok(())
    }

    /// Persist a saved-game image. `name` is the script's chosen name, if
    /// any. Returns whether it was stored.
    fn save_snapshot(&mut self, name: Option<&str>, bytes: &[u8]) -> SinkResult<bool>;

    /// Fetch a saved-game image written by [`save_snapshot`](Self::save_snapshot).
    fn load_snapshot(&mut self, name: Option<&str>) -> SinkResult<Option<Vec<u8>>>;

    /// Commands of a walkthrough to replay, if one is available.
    fn walkthrough(&mut self) -> SinkResult<Option<Vec<String>>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_names() {
        assert_eq!(Style::parse("emphasised"), Some(Style::Bold));
        assert_eq!(Style::parse("inverse"), Some(Style::Reverse));
        assert_eq!(Style::parse("preformatted"), Some(Style::Pre));
        assert_eq!(Style::parse("blink"), None);
    }

    #[test]
    fn yes_no_retries_until_answered() {
        let mut sink = HeadlessSink::with_input(["maybe", "Yes please"]);
        assert!(sink.request_yes_no("yes", "no", "Please answer.").unwrap());
        assert_eq!(sink.output(), "maybe\nPlease answer.Yes please\n");
    }

    #[test]
    fn numbers_in_range() {
        let mut sink = HeadlessSink::with_input(["12", "3"]);
        assert_eq!(sink.request_number(1, 5, true).unwrap(), Some(3));
        let mut sink = HeadlessSink::with_input(["x"]);
        assert_eq!(sink.request_number(1, 5, false).unwrap(), None);
    }
}
