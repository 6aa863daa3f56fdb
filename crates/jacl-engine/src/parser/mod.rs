//! From a line of player input to actions.
//!
//! A line is lexed, rewritten through the game's synonyms and filters, and
//! split into commands at `then` and at sentence punctuation. A command
//! that starts with a system word acts on the session; any other command
//! is matched against the grammar and dispatched to its action function.

mod matcher;
mod nouns;

pub use matcher::{Failure, Match, Matcher};
pub use nouns::{NounResolver, ParseFailure, Referent, Vocabulary, referent_for};

use jacl_core::attribute::VISITED;
use jacl_core::{NOWHERE, ObjectId, Word};
use jacl_dsl::lexer::lex_command;
use log::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::frame::{INTEGER, STRING, WORD};
use crate::interpreter::Interpreter;
use crate::sink::{PresentationSink, Style};
use crate::value::Modifier;

/// What an empty line is parsed as, so games can give it a grammar line.
pub const BLANK_COMMAND: &str = "blankjacl";

/// Commands handled by the interpreter instead of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SystemCommand {
    Quit,
    Restart,
    Undo,
    Oops,
    Again,
    Script,
    Unscript,
    Walkthrough,
    Info,
}

impl<S: PresentationSink> Interpreter<S> {
    /// Process one line of player input.
    pub fn process_line(&mut self, line: &str) -> EngineResult<()> {
        let mut words = self.normalise(lex_command(line));
        if words.is_empty() {
            words.push(Word::bare(BLANK_COMMAND));
        }
        debug!("command: {}", jacl_core::word::join_words(&words));

        if words[0].text.starts_with('*') {
            self.set_integer("time", 0);
            return if self.scripting {
                self.say("COMMENT_RECORDED")
            } else {
                self.say("COMMENT_IGNORED")
            };
        }

        if words[0].text != self.message("UNDO_WORD") {
            self.world.save_state();
            self.undo_noun = self.command.nouns[3];
            self.undo_available = true;
        }

        self.set_integer("interrupted", 0);
        for segment in self.split_commands(words) {
            if self.integer("interrupted") != 0 {
                break;
            }
            self.run_segment(segment)?;
            if self.restart_requested {
                self.restart()?;
                break;
            }
        }
        Ok(())
    }

    /// Run a command issued by a script. No turn passes and `time` keeps
    /// the value the enclosing turn gave it; the caller's command state is
    /// restored after.
    pub(crate) fn proxy(&mut self, text: &str) -> EngineResult<()> {
        self.push_frame()?;
        let words = self.normalise(lex_command(text));
        let mut result = Ok(());
        for segment in self.split_commands(words) {
            result = match self.system_command(&segment[0]) {
                Some(command) => self.system(command, &segment),
                None => self.run_command(segment, true),
            };
            if result.is_err() || self.integer("interrupted") != 0 {
                break;
            }
        }
        self.pop_frame();
        result
    }

    /// Apply synonyms and drop filter words.
    fn normalise(&self, words: Vec<Word>) -> Vec<Word> {
        let symbols = &self.world.symbols;
        let mut kept: Vec<Word> = Vec::with_capacity(words.len());
        for mut word in words {
            if !word.quoted && symbols.is_filter(&word.text) {
                if word.punctuated
                    && let Some(last) = kept.last_mut()
                {
                    last.punctuated = true;
                }
                continue;
            }
            if !word.quoted
                && let Some(standard) = symbols.synonym(&word.text)
            {
                word.text = standard.to_string();
            }
            kept.push(word);
        }
        kept
    }

    /// Split at the `then` word and after sentence punctuation.
    fn split_commands(&self, words: Vec<Word>) -> Vec<Vec<Word>> {
        let then = self.message("THEN_WORD");
        let mut commands = Vec::new();
        let mut current = Vec::new();
        for word in words {
            if !word.quoted && word.text == then {
                if !current.is_empty() {
                    commands.push(std::mem::take(&mut current));
                }
                continue;
            }
            let ends = word.punctuated;
            current.push(word);
            if ends {
                commands.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            commands.push(current);
        }
        commands
    }

    fn run_segment(&mut self, words: Vec<Word>) -> EngineResult<()> {
        match self.system_command(&words[0]) {
            Some(command) => {
                self.set_integer("time", 0);
                self.system(command, &words)
            }
            None => self.run_command(words, false),
        }
    }

    fn system_command(&self, word: &Word) -> Option<SystemCommand> {
        if word.quoted {
            return None;
        }
        let text = word.text.as_str();
        let is = |name: &str| self.world.symbols.cstring(name) == text;
        Some(if is("QUIT_WORD") || text == "q" {
            SystemCommand::Quit
        } else if is("RESTART_WORD") {
            SystemCommand::Restart
        } else if is("UNDO_WORD") {
            SystemCommand::Undo
        } else if is("OOPS_WORD") || text == "o" {
            SystemCommand::Oops
        } else if is("AGAIN_WORD") || text == "g" {
            SystemCommand::Again
        } else if is("SCRIPT_WORD") || text == "transcript" {
            SystemCommand::Script
        } else if is("UNSCRIPT_WORD") {
            SystemCommand::Unscript
        } else if is("WALKTHRU_WORD") {
            SystemCommand::Walkthrough
        } else if is("INFO_WORD") || text == "version" {
            SystemCommand::Info
        } else {
            return None;
        })
    }

    // -----------------------------------------------------------------------
    // System commands
    // -----------------------------------------------------------------------

    fn system(&mut self, command: SystemCommand, words: &[Word]) -> EngineResult<()> {
        debug!("system command {command:?}");
        match command {
            SystemCommand::Quit => {
                if self.call("+quit_game")?.is_some() {
                    return Ok(());
                }
                self.say("SURE_QUIT")?;
                if self.confirm()? {
                    self.call("+score")?;
                    info!("player quit");
                    return Err(EngineError::Quit);
                }
                self.say("RETURN_GAME")
            }
            SystemCommand::Restart => {
                if self.call("+restart_game")?.is_some() {
                    return Ok(());
                }
                self.say("SURE_RESTART")?;
                if self.confirm()? {
                    self.say("RESTARTING")?;
                    self.sink.clear_window()?;
                    self.restart_requested = true;
                    self.set_integer("interrupted", 1);
                    return Ok(());
                }
                self.say("RETURN_GAME")
            }
            SystemCommand::Undo => {
                if self.call("+undo_move")?.is_some() {
                    return Ok(());
                }
                self.undo_move()
            }
            SystemCommand::Oops => self.oops(words),
            SystemCommand::Again => {
                if self.integer("total_moves") == 0 {
                    return self.say("NO_MOVES");
                }
                match self.last_segment.clone() {
                    Some(last) => self.run_command(last, false),
                    None => self.say("NOT_CLEVER"),
                }
            }
            SystemCommand::Script => self.script(),
            SystemCommand::Unscript => {
                if !self.scripting {
                    return self.say("SCRIPTING_ALREADY_OFF");
                }
                self.say("SCRIPTING_OFF")?;
                self.sink.close_transcript()?;
                self.scripting = false;
                Ok(())
            }
            SystemCommand::Walkthrough => self.walkthrough(),
            SystemCommand::Info => {
                let symbols = &self.world.symbols;
                let part = |name: &str| symbols.cinteger_resolve(name, 0).unwrap_or_default();
                let text = format!(
                    "{}^JACL Interpreter v{}.{}.{}^OBJECTS DEFINED: {}^",
                    symbols.cstring("game_title"),
                    part("jacl_version"),
                    part("jacl_release"),
                    part("jacl_build"),
                    self.world.object_count()
                );
                self.write(&text)
            }
        }
    }

    fn confirm(&mut self) -> EngineResult<bool> {
        let yes = self.message("YES_WORD");
        let no = self.message("NO_WORD");
        let retry = self.message("YES_OR_NO");
        Ok(self.sink.request_yes_no(&yes, &no, &retry)?)
    }

    /// Replace the unknown word of the last command and run it again.
    fn oops(&mut self, words: &[Word]) -> EngineResult<()> {
        let [_, replacement] = words else {
            return self.say("BAD_OOPS");
        };
        match (self.oops_index, self.last_segment.clone()) {
            (Some(index), Some(mut last)) if index < last.len() => {
                last[index] = replacement.clone();
                self.run_command(last, false)
            }
            _ if self.integer("total_moves") == 0 => self.say("NO_MOVES"),
            _ => self.say("CANT_CORRECT"),
        }
    }

    fn script(&mut self) -> EngineResult<()> {
        if self.scripting {
            return self.say("SCRIPTING_ALREADY_ON");
        }
        if !self.sink.open_transcript()? {
            return self.say("CANT_WRITE_SCRIPT");
        }
        self.scripting = true;
        let title = self.message("game_title");
        self.sink.write_transcript(&format!("TRANSCRIPT OF: {title}^^"))?;
        self.say("SCRIPTING_ON")
    }

    /// Replay the game's walkthrough as if typed.
    fn walkthrough(&mut self) -> EngineResult<()> {
        if self.walking {
            return Ok(());
        }
        let Some(commands) = self.sink.walkthrough()? else {
            return self.say("ERROR_READING_WALKTHRU");
        };
        info!("replaying {} walkthrough commands", commands.len());
        self.walking = true;
        let result = self.replay(&commands);
        self.walking = false;
        result
    }

    fn replay(&mut self, commands: &[String]) -> EngineResult<()> {
        for command in commands {
            self.call("+bottom")?;
            let prompt = self.string_value("command_prompt");
            self.write(&prompt)?;
            self.sink.set_style(Style::Input)?;
            self.write(&format!("{command}^"))?;
            self.sink.set_style(Style::Normal)?;
            self.call("+top")?;
            self.process_line(command)?;
        }
        Ok(())
    }

    /// Return to the state before the last command.
    pub(crate) fn undo_move(&mut self) -> EngineResult<()> {
        self.set_integer("time", 0);
        if self.integer("total_moves") <= 0 || !self.undo_available {
            return self.say("NO_UNDO");
        }
        self.world.restore_state();
        self.command.nouns[3] = self.undo_noun;
        self.undo_available = false;
        self.say("MOVE_UNDONE")?;
        let here = self.here()?;
        self.world.object_mut(here)?.attributes &= !VISITED;
        self.call("+top")?;
        if self.call("+look_around")?.is_none() {
            self.look_around()?;
        }
        self.call("+bottom")?;
        self.set_integer("time", 0);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Grammar commands
    // -----------------------------------------------------------------------

    /// Match one command and act on it. `proxied` commands are not
    /// remembered for `again`, leave `time` alone and do not end the turn.
    fn run_command(&mut self, words: Vec<Word>, proxied: bool) -> EngineResult<()> {
        if !proxied {
            self.last_segment = Some(words.clone());
            self.oops_index = None;
            self.set_integer("time", 1);
        }
        self.command.text = jacl_core::word::join_words(&words);
        self.command.words = words.clone();

        let blank = words.len() == 1 && words[0].text == BLANK_COMMAND;
        if blank && !self.world.grammar.knows_verb(BLANK_COMMAND) {
            if !proxied {
                self.set_integer("time", 0);
            }
            return Ok(());
        }

        let found = {
            let vocabulary = Vocabulary::of(&self.world);
            Matcher::new(&self.world, &self.pronouns, &vocabulary, &words).run(self.world.grammar.roots())
        };
        match found {
            Ok(found) => self.dispatch(found)?,
            Err(failure) => self.parse_failed(&words, failure, proxied)?,
        }

        if !proxied && !self.restart_requested && self.integer("time") != 0 {
            self.eachturn()?;
        }
        Ok(())
    }

    fn dispatch(&mut self, found: Match) -> EngineResult<()> {
        debug!("matched >{} with {:?}", found.action, found.lists);
        self.command.clear_nouns();
        for (slot, list) in found.lists.iter().enumerate() {
            self.command.nouns[slot] = list.first().copied().unwrap_or(NOWHERE);
            self.command.lists[slot] = list.clone();
        }
        let symbols = &mut self.world.symbols;
        symbols.clear_cstring(STRING);
        for text in &found.strings {
            symbols.add_cstring(STRING, text);
        }
        symbols.clear_cstring(WORD);
        for text in &found.words {
            symbols.add_cstring(WORD, text);
        }
        symbols.clear_cinteger(INTEGER);
        for number in &found.integers {
            symbols.add_cinteger(INTEGER, *number);
        }
        self.update_pronouns(&found.lists);

        let action = found.action;
        let first = self.command.nouns[0];
        self.command.override_function = if self.world.is_valid(first) {
            format!("{action}_override_{}", self.world.label_of(first))
        } else {
            format!("{action}_override")
        };
        self.command.default_function = format!("+default_{action}");

        let call = format!("+{action}");
        let multi = found.multi.filter(|slot| found.lists[*slot].len() > 1);
        let Some(slot) = multi else {
            return self.perform(&call);
        };

        self.set_integer("multi_prefix", 1);
        for id in found.lists[slot].clone() {
            if self.integer("interrupted") != 0 {
                break;
            }
            self.command.nouns[slot] = id;
            let name = self.world.object(id)?.inventory.clone();
            self.write(&format!("{name}: "))?;
            self.perform(&call)?;
        }
        self.set_integer("multi_prefix", 0);
        Ok(())
    }

    fn perform(&mut self, call: &str) -> EngineResult<()> {
        if self.execute_function(call)?.is_none() {
            self.report_missing_function(call)?;
        }
        Ok(())
    }

    fn update_pronouns(&mut self, lists: &[Vec<ObjectId>]) {
        for list in lists {
            match referent_for(&self.world, list) {
                Some(Referent::It) => self.pronouns.it = list[0],
                Some(Referent::Him) => self.pronouns.him = list[0],
                Some(Referent::Her) => self.pronouns.her = list[0],
                Some(Referent::Them) => self.pronouns.them = list.clone(),
                None => {}
            }
        }
    }

    /// Explain why a command did not match.
    fn parse_failed(&mut self, words: &[Word], failure: Failure, proxied: bool) -> EngineResult<()> {
        debug!("no match: {failure:?}");
        if !proxied {
            self.set_integer("time", 0);
        }
        let verb = words[0].text.as_str();
        if failure.index == 0 && !self.world.grammar.knows_verb(verb) {
            if self.call("+unknown_command")?.is_some() {
                return Ok(());
            }
            let text = format!("{}{verb}{}", self.message("CANT_USE_WORD"), self.message("IN_CONTEXT"));
            return self.write(&text);
        }

        let text = match failure.reason {
            ParseFailure::Incomplete => self.message("INCOMPLETE_SENTENCE"),
            ParseFailure::CantUseWord(word) => {
                format!("{}{word}{}", self.message("CANT_USE_WORD"), self.message("IN_CONTEXT"))
            }
            ParseFailure::UnknownObject { word, index } => {
                if !proxied {
                    self.oops_index = Some(index);
                }
                format!("{}{word}{}", self.message("UNKNOWN_OBJECT"), self.message("UNKNOWN_OBJECT_END"))
            }
            ParseFailure::NotHere(what) => {
                format!("{}{what}{}", self.message("DONT_SEE"), self.message("HERE_WORD"))
            }
            ParseFailure::Ambiguous { phrase, options } => {
                let names: Vec<String> = options.iter().map(|id| self.describe(*id, Modifier::The)).collect();
                format!(
                    "{}{phrase}: {}{}",
                    self.message("MUST_SPECIFY"),
                    names.join(&self.message("OR_WORD")),
                    self.message("QUESTION_MARK")
                )
            }
            ParseFailure::NoReferent(word) => {
                format!("{}{word}{}", self.message("NO_IT"), self.message("NO_IT_END"))
            }
            ParseFailure::NoneHeld => self.message("NONE_HELD"),
            ParseFailure::NoObjects => self.message("NO_OBJECTS"),
            ParseFailure::NoMulti(verb) => {
                format!("{}{verb}{}", self.message("NO_MULTI_VERB"), self.message("NO_MULTI_VERB_END"))
            }
            ParseFailure::FromNonContainer(id) => {
                format!("{}{}.^", self.message("FROM_NON_CONTAINER"), self.describe(id, Modifier::The))
            }
            ParseFailure::ContainerClosed => self.message("CONTAINER_CLOSED"),
            ParseFailure::DoubleExcept => self.message("DOUBLE_EXCEPT"),
            ParseFailure::NotANumber => self.message("NOT_A_NUMBER"),
            ParseFailure::NoSuchNumber => self.message("NO_SUCH_NUMBER"),
        };
        self.write(&text)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::config::EngineConfig;
    use crate::interpreter::Interpreter;
    use crate::sink::HeadlessSink;

    const GAME: &str = "\
location hall : hall
  has VISITED
object me : me
  player
object lamp : brass lamp
  short a \"brass lamp\"
  mass 2
object ball : red ball
  short a \"red ball\"
  mass 1
object sue : sue
  short the Sue
  has ANIMATE FEMALE
synonym grab take
filter the
grammar look >look
grammar take **present >take
grammar greet *present >greet
grammar drop **held >drop
integer turns 0
{+take
write \"Taken \" noun1{the} \".^\"
}
{+greet
write \"Hello.^\"
}
{+drop
write \"Dropped.^\"
}
{+look
write \"A hall.^\"
}
{+eachturn
set turns + 1
}
";

    fn game(input: &[&str]) -> Interpreter<HeadlessSink> {
        let sink = HeadlessSink::with_input(input.iter().copied());
        let mut game = Interpreter::from_source(GAME, sink, EngineConfig::new()).unwrap();
        game.boot().unwrap();
        game.sink_mut().take_output();
        game
    }

    fn turn(game: &mut Interpreter<HeadlessSink>, line: &str) -> String {
        game.process_line(line).unwrap();
        game.sink_mut().take_output()
    }

    #[test]
    fn synonyms_filters_and_then() {
        let mut game = game(&[]);
        let output = turn(&mut game, "grab the lamp then look");
        assert_eq!(output, "Taken the brass lamp.\nA hall.\n");
        assert_eq!(game.world().symbols.integer("turns"), 3);
    }

    #[test]
    fn multiple_objects_are_prefixed() {
        let mut game = game(&[]);
        let output = turn(&mut game, "take lamp and ball");
        assert_eq!(output, "brass lamp: Taken the brass lamp.\nred ball: Taken the red ball.\n");
        assert_eq!(game.pronouns().them.len(), 2);
    }

    #[test]
    fn pronouns_follow_the_last_command() {
        let mut game = game(&[]);
        turn(&mut game, "greet sue");
        let sue = game.world().find_label("sue").unwrap();
        assert_eq!(game.pronouns().her, sue);
        assert_eq!(turn(&mut game, "greet her"), "Hello.\n");
    }

    #[test]
    fn parser_errors_take_no_time() {
        let mut game = game(&[]);
        assert_eq!(
            turn(&mut game, "dance"),
            "You can't use the word \"dance\" in that context.\n"
        );
        assert_eq!(turn(&mut game, "take widget"), "I don't know what \"widget\" refers to.\n");
        assert_eq!(turn(&mut game, "greet lamp and ball"), "You can't refer to more than one object with \"greet\".\n");
        assert_eq!(turn(&mut game, "drop all"), "You aren't holding anything.\n");
        assert_eq!(game.world().symbols.integer("turns"), 1);
    }

    #[test]
    fn oops_replaces_the_unknown_word() {
        let mut game = game(&[]);
        turn(&mut game, "take lmap");
        assert_eq!(turn(&mut game, "oops lamp"), "Taken the brass lamp.\n");
        assert_eq!(turn(&mut game, "oops"), "You must follow \"oops\" with a single word to replace.\n");
        assert_eq!(turn(&mut game, "oops ball"), "There is nothing to correct.\n");
    }

    #[test]
    fn again_repeats_the_last_command() {
        let mut game = game(&[]);
        assert_eq!(turn(&mut game, "g"), "You haven't done anything yet.\n");
        turn(&mut game, "look");
        assert_eq!(turn(&mut game, "again"), "A hall.\n");
        assert_eq!(game.world().symbols.integer("turns"), 3);
    }

    #[test]
    fn undo_restores_the_previous_turn() {
        let mut game = game(&[]);
        assert_eq!(turn(&mut game, "undo"), "You cannot undo any further.\n");
        turn(&mut game, "look");
        assert_eq!(game.world().symbols.integer("turns"), 2);
        let output = turn(&mut game, "undo");
        assert!(output.starts_with("Previous move undone.\n"), "{output}");
        assert_eq!(game.world().symbols.integer("turns"), 1);
        assert_eq!(turn(&mut game, "undo"), "You cannot undo any further.\n");
    }

    #[test]
    fn comments_and_blank_lines() {
        let mut game = game(&[]);
        assert_eq!(turn(&mut game, "* a note"), "Comment ignored.\n");
        assert_eq!(turn(&mut game, ""), "");
        assert_eq!(game.world().symbols.integer("turns"), 1);
    }

    #[test]
    fn quit_asks_first() {
        let mut game = game(&["no", "yes"]);
        assert_eq!(
            turn(&mut game, "quit"),
            "Are you sure you want to quit? no\nReturning to the game.\n"
        );
        assert!(matches!(game.process_line("q"), Err(crate::EngineError::Quit)));
    }

    #[test]
    fn restart_returns_to_the_loaded_world() {
        let mut game = game(&["y"]);
        turn(&mut game, "look");
        let output = turn(&mut game, "restart");
        assert!(output.starts_with("Are you sure you want to restart? y\n\nRestarting...\n\n"), "{output}");
        assert_eq!(game.world().symbols.integer("turns"), 1);
        assert_eq!(game.world().symbols.integer("total_moves"), 0);
    }

    #[test]
    fn scripting_and_info() {
        let mut game = game(&[]);
        assert_eq!(turn(&mut game, "unscript"), "Scripting is already off.\n");
        assert_eq!(turn(&mut game, "script"), "Scripting on.\n");
        assert!(game.sink().transcript().unwrap().starts_with("TRANSCRIPT OF: JACL Adventure\n\n"));
        assert_eq!(turn(&mut game, "* noted"), "Comment recorded.\n");
        assert_eq!(turn(&mut game, "unscript"), "Scripting off.\n");
        assert!(game.sink().transcript().is_none());
        assert!(turn(&mut game, "version").ends_with("OBJECTS DEFINED: 5\n"));
    }

    #[test]
    fn walkthrough_replays_commands() {
        let sink = HeadlessSink::new().with_walkthrough(["look", "take lamp"]);
        let mut game = Interpreter::from_source(GAME, sink, EngineConfig::new()).unwrap();
        game.boot().unwrap();
        game.sink_mut().take_output();
        let output = turn(&mut game, "walkthru");
        assert_eq!(output, "\n> look\nA hall.\n\n> take lamp\nTaken the brass lamp.\n");
        assert_eq!(game.world().symbols.integer("turns"), 3);

        let mut game = self::game(&[]);
        assert_eq!(turn(&mut game, "walkthru"), "Unable to read the walkthrough.\n");
    }

    #[test]
    fn proxy_runs_without_ending_the_turn() {
        let source = format!("{GAME}grammar fetch >fetch\n{{+fetch\nproxy take lamp\n}}\n");
        let mut game = Interpreter::from_source(&source, HeadlessSink::new(), EngineConfig::new()).unwrap();
        game.boot().unwrap();
        game.sink_mut().take_output();
        assert_eq!(turn(&mut game, "fetch"), "Taken the brass lamp.\n");
        assert_eq!(game.world().symbols.integer("turns"), 2);
        assert_eq!(game.command().text, "fetch");
    }

    fn game_with(extra: &str) -> Interpreter<HeadlessSink> {
        let source = format!("{GAME}{extra}");
        let mut game = Interpreter::from_source(&source, HeadlessSink::new(), EngineConfig::new()).unwrap();
        game.boot().unwrap();
        game.sink_mut().take_output();
        game
    }

    #[test]
    fn proxied_commands_share_the_turn_time() {
        let mut game = game_with(
            "grammar wait >wait\ngrammar peek >peek\ngrammar nudge >nudge\n\
             {+wait\nset time = 0\nproxy \"look\"\n}\n\
             {+peek\nset time = 0\n}\n\
             {+nudge\nproxy \"dance\"\n}\n",
        );
        assert_eq!(turn(&mut game, "wait"), "A hall.\n");
        assert_eq!(turn(&mut game, "peek"), "");
        assert_eq!(game.world().symbols.integer("total_moves"), 0);
        assert_eq!(game.world().symbols.integer("turns"), 1);

        assert_eq!(
            turn(&mut game, "nudge"),
            "You can't use the word \"dance\" in that context.\n"
        );
        assert_eq!(game.world().symbols.integer("total_moves"), 1);
        assert_eq!(game.world().symbols.integer("turns"), 2);
    }

    #[test]
    fn proxied_system_words_act_on_the_session() {
        let mut game = game_with("grammar about >about\n{+about\nproxy \"version\"\n}\n");
        assert!(turn(&mut game, "about").ends_with("OBJECTS DEFINED: 5\n"));
        assert_eq!(game.command().text, "about");
    }

    #[test]
    fn proxy_recursion_overflows_the_stack() {
        let mut game = game_with("grammar loop >loop\n{+loop\nproxy \"loop\"\n}\n");
        let error = game.process_line("loop").unwrap_err();
        assert!(matches!(error, crate::EngineError::StackOverflow(64)));
        assert_eq!(error.exit_code(), 45);
    }
}
