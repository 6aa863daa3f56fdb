//! Default English vocabulary and messages.
//!
//! Each entry becomes a constant string unless the game declares a constant
//! of the same name first, which is how games localise the parser.

/// `(name, text)` pairs created when absent after the first pass.
pub const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    // Vocabulary
    ("THEN_WORD", "then"),
    ("AND_WORD", "and"),
    ("EXCEPT_WORD", "except"),
    ("BUT_WORD", "but"),
    ("FROM_WORD", "from"),
    ("ALL_WORD", "all"),
    ("IT_WORD", "it"),
    ("HIM_WORD", "him"),
    ("HER_WORD", "her"),
    ("THEM_WORD", "them"),
    ("THAT_WORD", "that"),
    ("THOSE_WORD", "those"),
    ("YES_WORD", "yes"),
    ("NO_WORD", "no"),
    ("QUIT_WORD", "quit"),
    ("RESTART_WORD", "restart"),
    ("UNDO_WORD", "undo"),
    ("OOPS_WORD", "oops"),
    ("AGAIN_WORD", "again"),
    ("SCRIPT_WORD", "script"),
    ("UNSCRIPT_WORD", "unscript"),
    ("WALKTHRU_WORD", "walkthru"),
    ("INFO_WORD", "info"),
    // System commands
    ("COMMENT_IGNORED", "Comment ignored.^"),
    ("COMMENT_RECORDED", "Comment recorded.^"),
    ("YES_OR_NO", "Please answer yes or no: "),
    ("SURE_QUIT", "Are you sure you want to quit? "),
    ("SURE_RESTART", "Are you sure you want to restart? "),
    ("RESTARTING", "^Restarting...^^"),
    ("RETURN_GAME", "Returning to the game.^"),
    ("NO_UNDO", "You cannot undo any further.^"),
    ("MOVE_UNDONE", "Previous move undone.^"),
    ("BAD_OOPS", "You must follow \"oops\" with a single word to replace.^"),
    ("NO_MOVES", "You haven't done anything yet.^"),
    ("CANT_CORRECT", "There is nothing to correct.^"),
    ("NOT_CLEVER", "It wasn't so clever as to be worth repeating.^"),
    ("SCRIPTING_ON", "Scripting on.^"),
    ("SCRIPTING_OFF", "Scripting off.^"),
    ("SCRIPTING_ALREADY_ON", "Scripting is already on.^"),
    ("SCRIPTING_ALREADY_OFF", "Scripting is already off.^"),
    ("CANT_WRITE_SCRIPT", "Unable to open the transcript.^"),
    ("ERROR_READING_WALKTHRU", "Unable to read the walkthrough.^"),
    ("GAME_SAVED", "Game saved.^"),
    ("GAME_RESTORED", "Game restored.^"),
    ("CANT_SAVE", "Unable to save the game.^"),
    ("CANT_RESTORE", "Unable to restore the game.^"),
    ("BAD_SAVED_GAME", "That saved game does not belong to this story.^"),
    ("TYPE_NUMBER", "Please type a number between "),
    ("TO_WORD", " and "),
    // Parser
    ("INCOMPLETE_SENTENCE", "That sentence seems to be incomplete.^"),
    ("UNKNOWN_OBJECT", "I don't know what \""),
    ("UNKNOWN_OBJECT_END", "\" refers to.^"),
    ("DONT_SEE", "You don't see "),
    ("HERE_WORD", " here.^"),
    ("MUST_SPECIFY", "You must specify which "),
    ("OR_WORD", " or "),
    ("QUESTION_MARK", "?^"),
    ("NO_MULTI_VERB", "You can't refer to more than one object with \""),
    ("NO_MULTI_VERB_END", "\".^"),
    ("NO_MULTI_START", "You can't start a sentence with more than one object.^"),
    ("NONE_HELD", "You aren't holding anything.^"),
    ("NO_OBJECTS", "There is nothing here to refer to.^"),
    ("FROM_NON_CONTAINER", "You can't take things from "),
    ("CONTAINER_CLOSED", "It is closed.^"),
    ("DOUBLE_EXCEPT", "You can only use \"except\" once in a command.^"),
    ("NO_IT", "I'm not sure what \""),
    ("NO_IT_END", "\" refers to.^"),
    ("CANT_USE_WORD", "You can't use the word \""),
    ("IN_CONTEXT", "\" in that context.^"),
    ("NOT_UNDERSTOOD", "I don't understand that sentence.^"),
    ("NOT_A_NUMBER", "That isn't a number.^"),
    ("NO_SUCH_NUMBER", "There aren't that many of them.^"),
    ("NO_EXIT", "You can't go that way.^"),
    // Score
    ("SCORE_UP", "[Your score has gone up by "),
    ("POINT", " point.]^"),
    ("POINTS", " points.]^"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for (name, _) in DEFAULT_MESSAGES {
            assert!(seen.insert(*name), "duplicate message {name}");
        }
    }
}
