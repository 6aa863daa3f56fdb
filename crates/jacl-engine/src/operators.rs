//! The statement operators other than block control.

use jacl_core::attribute::{VISITED, system_attribute_names};
use jacl_core::object::{DIRECTION_COUNT, DIRECTIONS, SLOT_NAMES, slot};
use jacl_core::relations::{self, Walk, advance, find_route, grand_of, parent_of};
use jacl_core::snapshot::{CHANNELS, restore_from_bytes, save_to_bytes};
use jacl_core::symbols::{STRING_CAPACITY, split_index};
use jacl_core::{CoreError, ObjectId, Statement, Word};
use log::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::interpreter::Interpreter;
use crate::sink::{InputEvent, PresentationSink, Style};
use crate::value::{Modifier, Target};

impl<S: PresentationSink> Interpreter<S> {
    /// Execute a statement. Returns `Some` when the function should return
    /// with that value.
    pub(crate) fn operate(&mut self, statement: &Statement) -> EngineResult<Option<i32>> {
        let words = statement.words.as_slice();
        let operator = words[0].text.as_str();
        match operator {
            "return" => {
                let value = match words.get(1) {
                    Some(word) => self.value_of(&word.text)?,
                    None => 1,
                };
                return Ok(Some(value));
            }
            "override" => {
                for name in [
                    self.command.override_function.clone(),
                    self.command.default_function.clone(),
                ] {
                    if !name.is_empty() && self.execute_function(&name)?.is_some_and(|v| v != 0) {
                        return Ok(Some(1));
                    }
                }
            }
            "terminate" | "endgame" => {
                info!("{operator} in {}", self.function);
                return Err(EngineError::Quit);
            }

            // -- World --
            "look" => self.look_around()?,
            "travel" => {
                if self.require(words, 1)? {
                    self.travel(&words[1])?;
                }
            }
            "inspect" => {
                if self.require(words, 1)? {
                    self.inspect(&words[1].text)?;
                }
            }
            "move" => {
                if self.require(words, 3)? {
                    self.move_object(&words[1].text, &words[3].text)?;
                }
            }
            "set" => {
                if self.require(words, 3)? {
                    self.assign(words)?;
                }
            }
            "ensure" => {
                if self.require(words, 3)? {
                    self.ensure(words)?;
                }
            }
            "points" => {
                if self.require(words, 1)? {
                    let points = self.value_of(&words[1].text)?;
                    self.award(points)?;
                }
            }
            "position" => {
                if self.require(words, 1)?
                    && let Some(object) = self.object_of(&words[1].text)?
                {
                    advance(&mut self.world, object)?;
                }
            }
            "bearing" | "distance" | "dir_to" | "npc_to" => {
                if self.require(words, 3)? {
                    self.geometry(words)?;
                }
            }

            // -- Text --
            "print" => self.print_block(statement.print.as_deref().unwrap_or_default())?,
            "write" => {
                let text = self.join_text(&words[1..])?;
                self.write(&text)?;
            }
            "error" => {
                let text = self.join_text(&words[1..])?;
                self.report(text)?;
            }
            "debug" => {
                if self.integer("debug") != 0 && !self.config.release {
                    let text = self.join_text(&words[1..])?;
                    self.sink.set_style(Style::Note)?;
                    self.write(&format!("DEBUG: {text}^"))?;
                    self.sink.set_style(Style::Normal)?;
                }
            }
            "setstring" | "addstring" => {
                if self.require(words, 2)? {
                    let text = self.join_text(&words[2..])?;
                    self.store_string(&words[1].text, &text, operator == "addstring")?;
                }
            }
            "padstring" => {
                if self.require(words, 3)? {
                    let piece = self.text_of(&words[2])?;
                    let count = usize::try_from(self.value_of(&words[3].text)?).unwrap_or(0);
                    let count = count.min(STRING_CAPACITY / piece.len().max(1));
                    let mut padded = String::new();
                    padded.try_reserve(piece.len() * count)?;
                    for _ in 0..count {
                        padded.push_str(&piece);
                    }
                    self.store_string(&words[1].text, &padded, false)?;
                }
            }
            "length" => {
                if self.require(words, 2)? {
                    let text = self.text_of(&words[2])?;
                    if let Some(target) = self.variable(&words[1].text)? {
                        let length = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
                        self.set_target(&target, length);
                    }
                }
            }

            // -- Calls --
            "execute" | "call" => {
                if self.require(words, 1)? {
                    let call = words[1].text.as_str();
                    if self.execute_function(call)?.is_none() && operator == "execute" {
                        self.report_missing_function(call)?;
                    }
                }
            }
            "proxy" => {
                let text = self.proxy_text(&words[1..])?;
                debug!("proxy \"{text}\" from {}", self.function);
                self.proxy(&text)?;
            }

            // -- Presentation --
            "style" => {
                if self.require(words, 1)? {
                    match crate::sink::Style::parse(&words[1].text) {
                        Some(style) => self.sink.set_style(style)?,
                        None => self.report(format_args!("unknown style \"{}\"", words[1].text))?,
                    }
                }
            }
            "clear" => self.sink.clear_window()?,
            "more" => {
                let prompt = match words.get(1) {
                    Some(word) => self.text_of(word)?,
                    None => "[MORE]".to_string(),
                };
                self.sink.more(&prompt)?;
            }
            "cursor" => {
                if self.require(words, 2)? {
                    let x = self.value_of(&words[1].text)?;
                    let y = self.value_of(&words[2].text)?;
                    self.sink.set_cursor(x, y)?;
                }
            }
            "hyperlink" => {
                if self.require(words, 2)? {
                    let text = self.text_of(&words[1])?;
                    let command = self.text_of(&words[2])?;
                    self.sink.hyperlink(&text, &command)?;
                }
            }
            "sleep" => {
                if self.require(words, 1)? {
                    let millis = self.value_of(&words[1].text)?;
                    self.sink.sleep(millis.max(0))?;
                }
            }
            "sound" | "volume" | "stop" => {
                if self.supported("sound_supported") {
                    self.audio(operator, words)?;
                }
            }
            "timer" => {
                if self.supported("timer_supported") && self.require(words, 1)? {
                    let millis = self.value_of(&words[1].text)?.max(0);
                    self.world.symbols.set_cinteger("timer", 0, millis);
                    self.sink.set_timer(millis)?;
                }
            }
            "image" => {
                if self.supported("graphics_supported") && self.require(words, 1)? {
                    let resource = self.value_of(&words[1].text)?;
                    if !self.sink.draw_image(resource)? {
                        log::warn!("unable to draw image {resource}");
                    }
                }
            }
            "askstring" => {
                if self.require(words, 1)? {
                    let answer = match self.sink.request_line()? {
                        InputEvent::Line(line) => line,
                        _ => String::new(),
                    };
                    self.store_string(&words[1].text, &answer, false)?;
                }
            }
            "asknumber" | "getnumber" => {
                if self.require(words, 3)? {
                    self.ask_number(words, operator == "getnumber")?;
                }
            }
            "getyesorno" => {
                if self.require(words, 1)?
                    && let Some(target) = self.variable(&words[1].text)?
                {
                    let yes = self.message("YES_WORD");
                    let no = self.message("NO_WORD");
                    let retry = self.message("YES_OR_NO");
                    let answer = self.sink.request_yes_no(&yes, &no, &retry)?;
                    self.set_target(&target, i32::from(answer));
                }
            }
            "savegame" | "restoregame" => {
                if self.require(words, 1)? {
                    self.snapshot_operator(words, operator == "savegame")?;
                }
            }
            "restartgame" => {
                self.restart_requested = true;
                self.set_integer("interrupted", 1);
            }
            "undomove" => self.undo_move()?,
            "updatestatus" => self.update_status()?,
            _ => self.report(format_args!("unknown command \"{operator}\""))?,
        }
        Ok(None)
    }

    fn supported(&self, capability: &str) -> bool {
        self.world.symbols.cinteger_resolve(capability, 0).is_some_and(|v| v != 0)
    }

    /// Resolve a word that must name a writable integer place.
    fn variable(&mut self, token: &str) -> EngineResult<Option<Target>> {
        let target = self.container_resolve(token)?;
        if target.is_none() {
            self.report(format_args!("undefined variable \"{token}\""))?;
        }
        Ok(target)
    }

    fn join_text(&mut self, words: &[Word]) -> EngineResult<String> {
        let mut text = String::new();
        for word in words {
            text.push_str(&self.text_of(word)?);
        }
        Ok(text)
    }

    // -----------------------------------------------------------------------
    // World
    // -----------------------------------------------------------------------

    /// Describe the player's location afresh.
    pub(crate) fn look_around(&mut self) -> EngineResult<()> {
        let here = self.here()?;
        self.world.object_mut(here)?.attributes &= !VISITED;
        let local = format!("look_{}", self.world.label_of(here));
        if self.call(&local)?.is_none() {
            let described = self.world.object(here)?.described.clone();
            self.write(&format!("{described}^"))?;
        }
        let here = self.here()?;
        self.world.object_mut(here)?.attributes |= VISITED;
        Ok(())
    }

    /// Move the player along an exit. The direction is a direction name,
    /// or a variable such as `$word` holding one.
    fn travel(&mut self, word: &Word) -> EngineResult<()> {
        let direction = if self.world.symbols.has_cinteger(&word.text) {
            word.text.clone()
        } else {
            self.text_of(word)?
        };
        let index = self
            .world
            .symbols
            .cinteger_resolve(&direction, 0)
            .or_else(|| direction.parse().ok())
            .and_then(|v| usize::try_from(v).ok())
            .filter(|i| *i < DIRECTION_COUNT);
        let Some(index) = index else {
            self.report(format_args!("unknown direction \"{direction}\""))?;
            return Ok(());
        };
        let here = self.here()?;
        let destination = self.world.object(here)?.slots[index];
        self.set_integer("destination", destination);
        self.set_integer("compass", index as i32);
        self.move_player(destination)
    }

    /// Put the player in `destination` and describe it, or explain that
    /// there is no way there.
    pub(crate) fn move_player(&mut self, destination: ObjectId) -> EngineResult<()> {
        if !self.world.is_valid(destination) {
            self.set_integer("time", 0);
            return self.say("NO_EXIT");
        }
        let player = self.world.player;
        self.world.object_mut(player)?.slots[slot::PARENT] = destination;
        debug!("player moves to {}", self.world.label_of(destination));
        self.look_around()
    }

    /// Dump an object's state for debugging.
    fn inspect(&mut self, token: &str) -> EngineResult<()> {
        let Some(id) = self.object_of(token)? else {
            return Ok(());
        };
        let object = self.world.object(id)?;
        let is_location = object.is_location();
        let mut text = format!("label: {}^", object.label);
        let kind = if is_location { "location" } else { "object" };
        let system = system_attribute_names(object.attributes, is_location).join(" ");
        text.push_str(&format!("has {kind} attributes: {system}^"));
        let user = self.world.symbols.user_attribute_names(object.user_attributes).join(" ");
        text.push_str(&format!("has user attributes: {user}^"));
        for (index, value) in object.slots.iter().enumerate() {
            let name = match index {
                i if is_location && i < DIRECTION_COUNT => DIRECTIONS[i],
                i => SLOT_NAMES.iter().find(|(_, s)| *s == i).map_or("", |(n, _)| n),
            };
            let refers = (is_location && index < DIRECTION_COUNT) || index == slot::PARENT;
            if refers {
                text.push_str(&format!("{name}: {} ({value})^", self.world.label_of(*value)));
            } else {
                text.push_str(&format!("{name}: {value}^"));
            }
        }
        self.write(&text)
    }

    /// Reparent an object, keeping the containers' `quantity` in step with
    /// the mass moved.
    fn move_object(&mut self, what: &str, to: &str) -> EngineResult<()> {
        let Some(object) = self.object_of(what)? else {
            return Ok(());
        };
        let Some(destination) = self.object_of(to)? else {
            return Ok(());
        };
        if parent_of(&self.world, object, destination, Walk::Unrestricted) {
            return self.report(format_args!("can't move \"{what}\" inside itself"));
        }
        let (from, mass) = {
            let o = self.world.object(object)?;
            (o.parent(), o.slots[slot::MASS])
        };
        if let Some(old) = self.world.get_mut(from).filter(|o| !o.is_location()) {
            old.slots[slot::QUANTITY] += mass;
        }
        let new = self.world.object_mut(destination)?;
        if !new.is_location() {
            new.slots[slot::QUANTITY] -= mass;
        }
        self.world.object_mut(object)?.slots[slot::PARENT] = destination;
        Ok(())
    }

    /// `set VAR OP VALUE [OP VALUE ...]`, applied left to right.
    fn assign(&mut self, words: &[Word]) -> EngineResult<()> {
        let Some(target) = self.variable(&words[1].text)? else {
            return Ok(());
        };
        let mut value = self.get_target(&target);
        for pair in words[2..].chunks_exact(2) {
            let (operator, operand) = (pair[0].text.as_str(), pair[1].text.as_str());
            match operator {
                "locationof" | "grandof" => {
                    let Some(object) = self.object_of(operand)? else {
                        continue;
                    };
                    value = grand_of(&self.world, object, operator == "grandof")?;
                }
                "random" => {
                    let high = self.value_of(operand)?;
                    value = self.random.next_in(1, high);
                }
                _ => {
                    let rhs = self.value_of(operand)?;
                    value = match operator.chars().next() {
                        Some('=') => rhs,
                        Some('+') => value.wrapping_add(rhs),
                        Some('-') => value.wrapping_sub(rhs),
                        Some('*') => value.wrapping_mul(rhs),
                        Some('/' | '%') if rhs == 0 => {
                            self.report("division by zero")?;
                            value
                        }
                        Some('/') => value.wrapping_div(rhs),
                        Some('%') => value.wrapping_rem(rhs),
                        _ => {
                            self.report(format_args!("illegal operator \"{operator}\""))?;
                            value
                        }
                    };
                }
            }
        }
        self.set_target(&target, value);
        Ok(())
    }

    /// `ensure OBJ has|hasnt ATTR ...`
    fn ensure(&mut self, words: &[Word]) -> EngineResult<()> {
        let on = match words[2].text.as_str() {
            "has" => true,
            "hasnt" => false,
            other => {
                return self.report(format_args!("illegal operator \"{other}\""));
            }
        };
        let Some(object) = self.object_of(&words[1].text)? else {
            return Ok(());
        };
        for word in &words[3..] {
            match self.world.symbols.attribute_resolve(&word.text) {
                Some((namespace, mask)) => {
                    self.world.object_mut(object)?.set_attribute(namespace, mask, on);
                }
                None => self.report(format_args!("undefined attribute \"{}\"", word.text))?,
            }
        }
        Ok(())
    }

    /// Add to the score and tell the player when `notify` is on.
    fn award(&mut self, points: i32) -> EngineResult<()> {
        let score = self.integer("score");
        self.set_integer("score", score.wrapping_add(points));
        if self.integer("notify") == 0 {
            return Ok(());
        }
        let unit = if points == 1 { "POINT" } else { "POINTS" };
        let text = format!("{}{points}{}", self.message("SCORE_UP"), self.message(unit));
        self.sink.set_style(Style::Note)?;
        self.write(&text)?;
        self.sink.set_style(Style::Normal)?;
        Ok(())
    }

    fn geometry(&mut self, words: &[Word]) -> EngineResult<()> {
        let Some(target) = self.variable(&words[1].text)? else {
            return Ok(());
        };
        let Some(from) = self.object_of(&words[2].text)? else {
            return Ok(());
        };
        let Some(to) = self.object_of(&words[3].text)? else {
            return Ok(());
        };
        let position = |id: ObjectId| {
            self.world
                .get(id)
                .map_or((0, 0), |o| (o.slots[slot::X], o.slots[slot::Y]))
        };
        let ((x1, y1), (x2, y2)) = (position(from), position(to));
        let value = match words[0].text.as_str() {
            "bearing" => relations::bearing(x1, y1, x2, y2),
            "distance" => relations::distance(x1, y1, x2, y2),
            "dir_to" => find_route(&self.world, from, to, true),
            _ => find_route(&self.world, from, to, false),
        };
        self.set_target(&target, value);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    /// Write the lines of a `print` block. `|` prints as a space; each line
    /// gets a trailing space unless it ends in `^` or in `\`, which is
    /// dropped.
    fn print_block(&mut self, lines: &[String]) -> EngineResult<()> {
        for line in lines {
            let mut text = line.trim_start().replace('|', " ");
            if text.is_empty() {
                continue;
            }
            if text.ends_with('\\') {
                text.pop();
            } else if !text.ends_with('^') {
                text.push(' ');
            }
            self.write(&text)?;
        }
        Ok(())
    }

    /// Set or append to a string variable.
    fn store_string(&mut self, token: &str, text: &str, append: bool) -> EngineResult<()> {
        let (name, index) = split_index(token);
        let index = match index {
            Some(expr) => usize::try_from(self.value_of(expr)?).unwrap_or(usize::MAX),
            None => 0,
        };
        match self.world.symbols.string_resolve_mut(name, index) {
            Some(cell) if append => cell.push(text),
            Some(cell) => cell.set(text),
            None => self.report(format_args!("undefined string \"{token}\""))?,
        }
        Ok(())
    }

    pub(crate) fn report_missing_function(&mut self, call: &str) -> EngineResult<()> {
        let name = jacl_core::function::function_name(call);
        let suggestion = self
            .world
            .functions
            .names()
            .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
            .filter(|(score, _)| *score > 0.85)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate.to_string());
        match suggestion {
            Some(candidate) => self.report(format_args!(
                "undefined function \"{name}\" (did you mean \"{candidate}\")"
            )),
            None => self.report(format_args!("undefined function \"{name}\"")),
        }
    }

    /// The command line a `proxy` statement issues: words separated by
    /// spaces, objects by the names the parser knows them by, `~` as `"`.
    fn proxy_text(&mut self, words: &[Word]) -> EngineResult<String> {
        let mut parts = Vec::with_capacity(words.len());
        for word in words {
            let part = match self.object_ref(&word.text)? {
                Some(id) if !word.quoted && self.world.is_valid(id) => {
                    self.describe(id, Modifier::Names)
                }
                _ => self.text_of(word)?,
            };
            parts.push(part);
        }
        Ok(parts.join(" ").replace('~', "\""))
    }

    // -----------------------------------------------------------------------
    // Presentation
    // -----------------------------------------------------------------------

    fn channel(&mut self, word: Option<&Word>) -> EngineResult<usize> {
        let Some(word) = word else {
            return Ok(0);
        };
        let channel = self.value_of(&word.text)?;
        Ok(usize::try_from(channel).ok().filter(|c| *c < CHANNELS).unwrap_or(0))
    }

    fn audio(&mut self, operator: &str, words: &[Word]) -> EngineResult<()> {
        match operator {
            "sound" => {
                if !self.require(words, 1)? {
                    return Ok(());
                }
                let resource = self.value_of(&words[1].text)?;
                let channel = self.channel(words.get(2))?;
                let repeats = match words.get(3) {
                    Some(word) => self.value_of(&word.text)?,
                    None => 1,
                };
                if !self.sink.play_sound(resource, channel, repeats)? {
                    log::warn!("unable to play sound {resource}");
                }
            }
            "volume" => {
                if !self.require(words, 1)? {
                    return Ok(());
                }
                let volume = self.value_of(&words[1].text)?.clamp(0, 100);
                let channel = self.channel(words.get(2))?;
                self.world.symbols.set_cinteger("volume", channel, volume);
                self.sink.set_volume(channel, volume)?;
            }
            _ => {
                let channel = self.channel(words.get(1))?;
                self.sink.stop_sound(channel)?;
            }
        }
        Ok(())
    }

    fn ask_number(&mut self, words: &[Word], insist: bool) -> EngineResult<()> {
        let Some(target) = self.variable(&words[1].text)? else {
            return Ok(());
        };
        let low = self.value_of(&words[2].text)?;
        let high = self.value_of(&words[3].text)?;
        let answer = self.sink.request_number(low, high, insist)?;
        self.set_target(&target, answer.unwrap_or(-1));
        Ok(())
    }

    /// `savegame VAR [NAME]` and `restoregame VAR [NAME]`; VAR receives 1 on
    /// success and 0 on failure.
    fn snapshot_operator(&mut self, words: &[Word], save: bool) -> EngineResult<()> {
        let Some(target) = self.variable(&words[1].text)? else {
            return Ok(());
        };
        let name = match words.get(2) {
            Some(word) => Some(self.text_of(word)?),
            None => None,
        };
        let ok = if save {
            self.save_game(name.as_deref())?
        } else {
            self.restore_game(name.as_deref())?
        };
        self.set_target(&target, i32::from(ok));
        self.set_integer("time", 0);
        Ok(())
    }

    pub(crate) fn save_game(&mut self, name: Option<&str>) -> EngineResult<bool> {
        let bytes = save_to_bytes(&self.world, self.command.nouns[3]);
        let saved = self.sink.save_snapshot(name, &bytes)?;
        if saved {
            info!("saved {} bytes", bytes.len());
        } else {
            self.say("CANT_SAVE")?;
        }
        Ok(saved)
    }

    pub(crate) fn restore_game(&mut self, name: Option<&str>) -> EngineResult<bool> {
        let Some(bytes) = self.sink.load_snapshot(name)? else {
            self.say("CANT_RESTORE")?;
            return Ok(false);
        };
        match restore_from_bytes(&mut self.world, &bytes) {
            Ok(noun4) => {
                self.command.nouns[3] = noun4;
                self.undo_available = false;
                for channel in 0..CHANNELS {
                    let volume = self.world.symbols.cinteger_resolve("volume", channel).unwrap_or(100);
                    self.sink.set_volume(channel, volume)?;
                }
                if self.supported("timer_supported") {
                    let timer = self.world.symbols.cinteger_resolve("timer", 0).unwrap_or(0);
                    self.sink.set_timer(timer)?;
                }
                info!("restored {} bytes", bytes.len());
                Ok(true)
            }
            Err(CoreError::SnapshotMismatch { .. } | CoreError::SnapshotTruncated(_)) => {
                self.say("BAD_SAVED_GAME")?;
                Ok(false)
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use jacl_core::attribute;
    use jacl_core::object::slot;
    use jacl_core::symbols::STRING_CAPACITY;

    use crate::config::EngineConfig;
    use crate::interpreter::Interpreter;
    use crate::random::RandomSource;
    use crate::sink::{Capabilities, HeadlessSink};

    const GAME: &str = "\
location cave : cave
  long \"A damp cave.\"
  east hall
location hall : hall
  west cave
object me : me
  player
object chest : chest
  has CONTAINER
  quantity 10
  mass heavy
object key : small key
  short a \"small key\"
  mass 3
integer n 0
integer saved 0
string name \"\"
attribute shiny
{*look_hall
write \"The hall.^\"
}
";

    struct Fixed(i32);

    impl RandomSource for Fixed {
        fn next_in(&mut self, _low: i32, _high: i32) -> i32 {
            self.0
        }
    }

    fn game_with(functions: &str) -> Interpreter<HeadlessSink> {
        let source = format!("{GAME}{functions}");
        Interpreter::from_source(&source, HeadlessSink::new(), EngineConfig::new()).unwrap()
    }

    fn run(body: &str) -> Interpreter<HeadlessSink> {
        let mut game = game_with(&format!("{{+test\n{body}\n}}\n"));
        game.execute_function("+test").unwrap();
        game
    }

    #[test]
    fn set_chains_left_to_right() {
        let game = run("set n = 2 + 3 * 4 - 1");
        assert_eq!(game.world().symbols.integer("n"), 19);
        let game = run("set n = 7 % 4");
        assert_eq!(game.world().symbols.integer("n"), 3);
        let game = run("set n += 5\nset n -= 2");
        assert_eq!(game.world().symbols.integer("n"), 3);
    }

    #[test]
    fn division_by_zero_leaves_value() {
        let mut game = run("set n = 8 / 0");
        assert_eq!(game.world().symbols.integer("n"), 8);
        assert!(game.sink_mut().take_output().contains("division by zero"));
    }

    #[test]
    fn set_locationof_and_random() {
        let game = run("set n locationof key");
        assert_eq!(game.world().symbols.integer("n"), 1);

        let mut game = game_with("{+test\nset n random 6\n}\n").with_random(Fixed(4));
        game.execute_function("+test").unwrap();
        assert_eq!(game.world().symbols.integer("n"), 4);
    }

    #[test]
    fn move_updates_quantities() {
        let game = run("move key to chest");
        let world = game.world();
        let key = world.find_label("key").unwrap();
        let chest = world.find_label("chest").unwrap();
        assert_eq!(world.get(key).unwrap().parent(), chest);
        assert_eq!(world.get(chest).unwrap().slots[slot::QUANTITY], 7);

        let game = run("move key to chest\nmove key to me");
        let world = game.world();
        let me = world.find_label("me").unwrap();
        assert_eq!(world.get(chest).unwrap().slots[slot::QUANTITY], 10);
        assert_eq!(world.get(me).unwrap().slots[slot::QUANTITY], -3);
    }

    #[test]
    fn move_refuses_cycles() {
        let mut game = run("move chest to key\nmove key to chest");
        let key = game.world().find_label("key").unwrap();
        let hall = game.world().find_label("hall").unwrap();
        assert_eq!(game.world().get(key).unwrap().parent(), hall);
        assert_eq!(
            game.sink_mut().take_output(),
            "ERROR: In function \"+test\", can't move \"key\" inside itself.\n"
        );
    }

    #[test]
    fn ensure_touches_only_named_bits() {
        let game = run("ensure key has CLOSED shiny\nensure chest hasnt CONTAINER");
        let world = game.world();
        let key = world.get(world.find_label("key").unwrap()).unwrap();
        assert_eq!(key.attributes, attribute::CLOSED);
        assert_eq!(key.user_attributes, 1);
        let chest = world.get(world.find_label("chest").unwrap()).unwrap();
        assert_eq!(chest.attributes, 0);
    }

    #[test]
    fn points_notify() {
        let mut game = run("points 5\npoints 1");
        assert_eq!(game.world().symbols.integer("score"), 6);
        assert_eq!(
            game.sink_mut().take_output(),
            "[Your score has gone up by 5 points.]\n[Your score has gone up by 1 point.]\n"
        );
        let mut game = run("set notify = 0\npoints 2");
        assert_eq!(game.sink_mut().take_output(), "");
    }

    #[test]
    fn points_wrap_at_the_integer_limit() {
        let mut game = run("set notify = 0\npoints 2147483647\npoints 1");
        assert_eq!(game.world().symbols.integer("score"), i32::MIN);
        assert_eq!(game.sink_mut().take_output(), "");
    }

    #[test]
    fn print_blocks() {
        let mut game = run("print\n|Indented\nline one\\\n\nends here^\n.\nwrite \"!\"");
        assert_eq!(game.sink_mut().take_output(), " Indented line oneends here\n!");
    }

    #[test]
    fn write_resolves_words() {
        let mut game = run("set n = 3\nwrite \"n is \" n \" and \" key{the} \".^\"");
        assert_eq!(game.sink_mut().take_output(), "n is 3 and the small key.\n");
    }

    #[test]
    fn strings() {
        let game = run("setstring name \"ab\" n\naddstring name \"c\"");
        assert_eq!(game.world().symbols.string_resolve("name", 0).unwrap().value, "ab0c");
        let game = run("padstring name \"-\" 3\nlength n name");
        assert_eq!(game.world().symbols.string_resolve("name", 0).unwrap().value, "---");
        assert_eq!(game.world().symbols.integer("n"), 3);
    }

    #[test]
    fn padstring_stops_at_string_capacity() {
        let game = run("padstring name \"ab\" 2000000000\nlength n name");
        let padded = &game.world().symbols.string_resolve("name", 0).unwrap().value;
        assert_eq!(padded.len(), STRING_CAPACITY - 1);
        assert!(padded.starts_with("abab"));
        assert_eq!(game.world().symbols.integer("n"), 1023);
        let game = run("setstring name \"x\"\npadstring name \"-\" n");
        assert_eq!(game.world().symbols.string_resolve("name", 0).unwrap().value, "");
    }

    #[test]
    fn travel_and_look() {
        let mut game = run("travel east");
        let me = game.world().player;
        let hall = game.world().find_label("hall").unwrap();
        assert_eq!(game.world().get(me).unwrap().parent(), hall);
        assert_eq!(game.world().symbols.integer("compass"), 2);
        assert!(game.world().get(hall).unwrap().has(attribute::VISITED));
        assert_eq!(game.sink_mut().take_output(), "The hall.\n");

        let mut game = run("travel north");
        assert_eq!(game.sink_mut().take_output(), "You can't go that way.\n");
        assert_eq!(game.world().symbols.integer("time"), 0);

        let mut game = run("look");
        assert_eq!(game.sink_mut().take_output(), "A damp cave.\n");
    }

    #[test]
    fn geometry_and_routes() {
        let game = run("set hall.x = 3\nset hall.y = 4\ndistance n cave hall");
        assert_eq!(game.world().symbols.integer("n"), 5);
        let game = run("npc_to n cave hall");
        assert_eq!(game.world().symbols.integer("n"), 2);
        let game = run("dir_to n cave hall");
        assert_eq!(game.world().symbols.integer("n"), -1);
    }

    #[test]
    fn execute_reports_missing_functions_but_call_is_silent() {
        let mut game = run("call +nothing\nexecute +nothing_here");
        assert_eq!(
            game.sink_mut().take_output(),
            "ERROR: In function \"+test\", undefined function \"+nothing_here\".\n"
        );

        let mut game = run("execute look_hal<3");
        assert_eq!(
            game.sink_mut().take_output(),
            "ERROR: In function \"+test\", undefined function \"look_hal\" (did you mean \"look_hall\").\n"
        );
    }

    #[test]
    fn unknown_operator_continues() {
        let mut game = run("frobnicate\nwrite \"after\"");
        assert_eq!(
            game.sink_mut().take_output(),
            "ERROR: In function \"+test\", unknown command \"frobnicate\".\nafter"
        );
    }

    #[test]
    fn presentation_is_gated_by_capabilities() {
        let source = format!("{GAME}{{+test\nsound 4 2\ntimer 500\nvolume 40 1\nvolume 150\n}}\n");
        let mut game = Interpreter::from_source(&source, HeadlessSink::new(), EngineConfig::new()).unwrap();
        game.execute_function("+test").unwrap();
        assert!(game.sink().sounds.is_empty());
        assert_eq!(game.sink().timer, 0);

        let sink = HeadlessSink::new().with_capabilities(Capabilities {
            graphics: false,
            sound: true,
            timer: true,
        });
        let mut game = Interpreter::from_source(&source, sink, EngineConfig::new()).unwrap();
        game.execute_function("+test").unwrap();
        assert_eq!(game.sink().sounds, vec![(4, 2, 1)]);
        assert_eq!(game.sink().timer, 500);
        assert_eq!(game.world().symbols.cinteger_resolve("volume", 1), Some(40));
        assert_eq!(game.world().symbols.cinteger_resolve("volume", 0), Some(100));
    }

    #[test]
    fn ask_operators_read_input() {
        let source = format!("{GAME}{{+test\naskstring name\ngetnumber n 1 9\ngetyesorno saved\n}}\n");
        let sink = HeadlessSink::with_input(["Zed", "12", "4", "yes"]);
        let mut game = Interpreter::from_source(&source, sink, EngineConfig::new()).unwrap();
        game.execute_function("+test").unwrap();
        assert_eq!(game.world().symbols.string_resolve("name", 0).unwrap().value, "Zed");
        assert_eq!(game.world().symbols.integer("n"), 4);
        assert_eq!(game.world().symbols.integer("saved"), 1);
    }

    #[test]
    fn save_and_restore_operators() {
        let source = format!(
            "{GAME}{{+save\nsavegame saved \"slot\"\n}}\n{{+restore\nrestoregame saved \"slot\"\n}}\n{{+missing\nrestoregame saved \"other\"\n}}\n"
        );
        let mut game = Interpreter::from_source(&source, HeadlessSink::new(), EngineConfig::new()).unwrap();
        game.world_mut().symbols.set_integer("n", 11);
        game.execute_function("+save").unwrap();
        assert_eq!(game.world().symbols.integer("saved"), 1);
        assert!(game.sink().snapshot("slot").is_some());

        game.world_mut().symbols.set_integer("n", 99);
        game.execute_function("+restore").unwrap();
        assert_eq!(game.world().symbols.integer("n"), 11);
        assert_eq!(game.world().symbols.integer("saved"), 1);

        game.execute_function("+missing").unwrap();
        assert_eq!(game.world().symbols.integer("saved"), 0);
        assert!(game.sink().output().ends_with("Unable to restore the game.\n"));
    }

    #[test]
    fn terminate_quits() {
        let mut game = game_with("{+test\nterminate\n}\n");
        assert!(matches!(
            game.execute_function("+test"),
            Err(crate::error::EngineError::Quit)
        ));
        assert!(game.stack.is_empty());
    }

    #[test]
    fn inspect_lists_state() {
        let mut game = run("inspect key");
        let output = game.sink_mut().take_output();
        assert!(output.starts_with("label: key\nhas object attributes: \nhas user attributes: \nparent: cave (1)\n"));
        assert!(output.contains("mass: 3\n"));
    }
}
