//! A presentation sink on stdin and stdout.
//!
//! Styling, screen clearing and the status line are only emitted when
//! stdout is a terminal; piped output stays plain text. Saved games,
//! transcripts and walkthroughs are files next to the game file.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::cursor::{MoveTo, RestorePosition, SavePosition};
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::tty::IsTty;
use jacl_engine::sink::{SinkResult, markup};
use jacl_engine::{InputEvent, PresentationSink, Style};
use log::{debug, warn};

const SAVE_EXTENSION: &str = "sav";
const TRANSCRIPT_EXTENSION: &str = "log";
const WALKTHROUGH_EXTENSION: &str = "walkthru";

pub struct TerminalSink {
    stdout: Stdout,
    styled: bool,
    /// The game file; saved files are named after it.
    game: PathBuf,
    transcript: Option<BufWriter<File>>,
}

impl TerminalSink {
    pub fn new(game: &Path) -> Self {
        let stdout = io::stdout();
        let styled = stdout.is_tty();
        Self {
            stdout,
            styled,
            game: game.to_path_buf(),
            transcript: None,
        }
    }

    /// A file beside the game: `name` if given, else the game's own name
    /// with `extension`. Names that would leave the game's directory give
    /// `None`.
    fn beside_game(&self, name: Option<&str>, extension: &str) -> Option<PathBuf> {
        match name {
            Some(name) if !is_plain_file_name(name) => {
                warn!("refusing file name {name:?} outside the game directory");
                None
            }
            Some(name) => Some(self.game.with_file_name(name)),
            None => Some(self.game.with_extension(extension)),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', ':'])
}

impl PresentationSink for TerminalSink {
    fn write_text(&mut self, text: &str) -> SinkResult<()> {
        let rendered = markup::render(text);
        if let Some(transcript) = &mut self.transcript {
            transcript.write_all(rendered.as_bytes())?;
        }
        self.stdout.write_all(rendered.as_bytes())?;
        Ok(())
    }

    fn set_style(&mut self, style: Style) -> SinkResult<()> {
        if !self.styled {
            return Ok(());
        }
        queue!(self.stdout, SetAttribute(Attribute::Reset))?;
        let attributes: &[Attribute] = match style {
            Style::Normal | Style::Pre => &[],
            Style::Bold | Style::Input => &[Attribute::Bold],
            Style::Note => &[Attribute::Italic],
            Style::Header => &[Attribute::Bold, Attribute::Underlined],
            Style::Subheader => &[Attribute::Underlined],
            Style::Reverse => &[Attribute::Reverse],
        };
        for attribute in attributes {
            queue!(self.stdout, SetAttribute(*attribute))?;
        }
        Ok(())
    }

    fn clear_window(&mut self) -> SinkResult<()> {
        if self.styled {
            queue!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    fn status_line(&mut self, left: &str, score: i32, moves: i32, height: i32) -> SinkResult<()> {
        if !self.styled || height == 0 {
            return Ok(());
        }
        let width = terminal::size().map(|(w, _)| usize::from(w)).unwrap_or(80);
        let right = format!("Score: {score}  Moves: {moves} ");
        let left = format!(" {}", markup::render(left));
        let gap = width.saturating_sub(left.chars().count() + right.len());
        queue!(
            self.stdout,
            SavePosition,
            MoveTo(0, 0),
            SetAttribute(Attribute::Reverse),
            Print(format!("{left}{}{right}", " ".repeat(gap))),
            SetAttribute(Attribute::Reset),
            RestorePosition
        )?;
        Ok(())
    }

    fn request_line(&mut self) -> SinkResult<InputEvent> {
        self.stdout.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(InputEvent::Eof);
        }
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if let Some(transcript) = &mut self.transcript {
            writeln!(transcript, "{line}")?;
        }
        Ok(InputEvent::Line(line))
    }

    fn sleep(&mut self, millis: i32) -> SinkResult<()> {
        self.stdout.flush()?;
        std::thread::sleep(Duration::from_millis(u64::try_from(millis).unwrap_or(0)));
        Ok(())
    }

    fn open_transcript(&mut self) -> SinkResult<bool> {
        let Some(path) = self.beside_game(None, TRANSCRIPT_EXTENSION) else {
            return Ok(false);
        };
        match File::create(&path) {
            Ok(file) => {
                debug!("transcript opened at {}", path.display());
                self.transcript = Some(BufWriter::new(file));
                Ok(true)
            }
            Err(e) => {
                warn!("cannot open transcript {}: {e}", path.display());
                Ok(false)
            }
        }
    }

    fn close_transcript(&mut self) -> SinkResult<()> {
        if let Some(mut transcript) = self.transcript.take() {
            transcript.flush()?;
        }
        Ok(())
    }

    fn write_transcript(&mut self, text: &str) -> SinkResult<()> {
        if let Some(transcript) = &mut self.transcript {
            transcript.write_all(markup::render(text).as_bytes())?;
        }
        Ok(())
    }

    fn save_snapshot(&mut self, name: Option<&str>, bytes: &[u8]) -> SinkResult<bool> {
        let Some(path) = self.beside_game(name, SAVE_EXTENSION) else {
            return Ok(false);
        };
        match std::fs::write(&path, bytes) {
            Ok(()) => {
                debug!("saved {} bytes to {}", bytes.len(), path.display());
                Ok(true)
            }
            Err(e) => {
                warn!("cannot save to {}: {e}", path.display());
                Ok(false)
            }
        }
    }

    fn load_snapshot(&mut self, name: Option<&str>) -> SinkResult<Option<Vec<u8>>> {
        let Some(path) = self.beside_game(name, SAVE_EXTENSION) else {
            return Ok(None);
        };
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) => {
                warn!("cannot restore from {}: {e}", path.display());
                Ok(None)
            }
        }
    }

    fn walkthrough(&mut self) -> SinkResult<Option<Vec<String>>> {
        let Some(path) = self.beside_game(None, WALKTHROUGH_EXTENSION) else {
            return Ok(None);
        };
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Ok(None);
        };
        Ok(Some(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        if self.styled {
            let _ = queue!(self.stdout, SetAttribute(Attribute::Reset));
        }
        let _ = self.stdout.flush();
        if let Some(transcript) = &mut self.transcript {
            let _ = transcript.flush();
        }
    }
}
