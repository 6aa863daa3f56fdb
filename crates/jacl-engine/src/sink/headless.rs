//! A sink with no terminal: scripted input, captured output.

use std::collections::{HashMap, VecDeque};

use super::{Capabilities, InputEvent, PresentationSink, SinkResult, Style, markup};

const DEFAULT_SLOT: &str = "default";

/// Sink for tests and batch runs.
///
/// Input comes from a queue filled up front; output accumulates in a
/// string. Saved games are kept in memory, keyed by name.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    output: String,
    input: VecDeque<InputEvent>,
    snapshots: HashMap<String, Vec<u8>>,
    transcript: Option<String>,
    walkthrough: Option<Vec<String>>,
    capabilities: Capabilities,
    /// Every style selected, in order.
    pub styles: Vec<Style>,
    /// The most recent status line.
    pub status: Option<(String, i32, i32)>,
    /// Sounds started, as `(resource, channel, repeats)`.
    pub sounds: Vec<(i32, usize, i32)>,
    /// Current timer interval.
    pub timer: i32,
    /// Number of times the window was cleared.
    pub clears: usize,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that will answer input requests with `lines`, in order.
    pub fn with_input<I, T>(lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut sink = Self::new();
        for line in lines {
            sink.push_line(line);
        }
        sink
    }

    /// Advertise optional features.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Provide a walkthrough for the `walkthru` command.
    pub fn with_walkthrough<I, T>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.walkthrough = Some(commands.into_iter().map(Into::into).collect());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.input.push_back(InputEvent::Line(line.into()));
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.input.push_back(event);
    }

    /// Everything written so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Return the output written so far and start afresh.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// The transcript, while scripting is on.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// A stored saved game.
    pub fn snapshot(&self, name: &str) -> Option<&[u8]> {
        self.snapshots.get(name).map(Vec::as_slice)
    }
}

impl PresentationSink for HeadlessSink {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn write_text(&mut self, text: &str) -> SinkResult<()> {
        let rendered = markup::render(text);
        if let Some(transcript) = &mut self.transcript {
            transcript.push_str(&rendered);
        }
        self.output.push_str(&rendered);
        Ok(())
    }

    fn set_style(&mut self, style: Style) -> SinkResult<()> {
        self.styles.push(style);
        Ok(())
    }

    fn clear_window(&mut self) -> SinkResult<()> {
        self.clears += 1;
        Ok(())
    }

    fn status_line(&mut self, left: &str, score: i32, moves: i32, _height: i32) -> SinkResult<()> {
        self.status = Some((left.to_string(), score, moves));
        Ok(())
    }

    fn request_line(&mut self) -> SinkResult<InputEvent> {
        let event = self.input.pop_front().unwrap_or(InputEvent::Eof);
        if let InputEvent::Line(line) = &event {
            self.output.push_str(line);
            self.output.push('\n');
        }
        Ok(event)
    }

    fn play_sound(&mut self, resource: i32, channel: usize, repeats: i32) -> SinkResult<bool> {
        self.sounds.push((resource, channel, repeats));
        Ok(self.capabilities.sound)
    }

    fn set_timer(&mut self, millis: i32) -> SinkResult<()> {
        self.timer = millis;
        Ok(())
    }

    fn open_transcript(&mut self) -> SinkResult<bool> {
        self.transcript.get_or_insert_with(String::new);
        Ok(true)
    }

    fn close_transcript(&mut self) -> SinkResult<()> {
        self.transcript = None;
        Ok(())
    }

    fn write_transcript(&mut self, text: &str) -> SinkResult<()> {
        if let Some(transcript) = &mut self.transcript {
            transcript.push_str(&markup::render(text));
        }
        Ok(())
    }

    fn save_snapshot(&mut self, name: Option<&str>, bytes: &[u8]) -> SinkResult<bool> {
        let key = name.unwrap_or(DEFAULT_SLOT).to_string();
        self.snapshots.insert(key, bytes.to_vec());
        Ok(true)
    }

    fn load_snapshot(&mut self, name: Option<&str>) -> SinkResult<Option<Vec<u8>>> {
        Ok(self.snapshots.get(name.unwrap_or(DEFAULT_SLOT)).cloned())
    }

    fn walkthrough(&mut self) -> SinkResult<Option<Vec<String>>> {
        Ok(self.walkthrough.clone())
    }
}
