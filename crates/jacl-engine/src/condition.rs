//! Integer, object and string conditions of `if`, `while` and friends.
//!
//! A condition line is a sequence of `left operator right` triples after
//! the keyword. The `…all` forms need every triple to hold; the plain forms
//! need any one.

use jacl_core::Word;
use jacl_core::attribute::Namespace;
use jacl_core::relations::{Walk, parent_of, scope};

use crate::error::EngineResult;
use crate::interpreter::Interpreter;
use crate::sink::PresentationSink;

impl<S: PresentationSink> Interpreter<S> {
    /// Evaluate the integer and object triples of `words`.
    pub(crate) fn condition(&mut self, words: &[Word], all: bool) -> EngineResult<bool> {
        for triple in words.get(1..).unwrap_or_default().chunks_exact(3) {
            let holds = self.logic_test(&triple[0].text, &triple[1].text, &triple[2].text)?;
            if holds != all {
                return Ok(holds);
            }
        }
        Ok(all)
    }

    /// Evaluate the string triples of `words`.
    pub(crate) fn string_condition(&mut self, words: &[Word], all: bool) -> EngineResult<bool> {
        for triple in words.get(1..).unwrap_or_default().chunks_exact(3) {
            let holds = self.str_test(&triple[0], &triple[1].text, &triple[2])?;
            if holds != all {
                return Ok(holds);
            }
        }
        Ok(all)
    }

    fn logic_test(&mut self, left: &str, operator: &str, right: &str) -> EngineResult<bool> {
        let index = self.value_of(left)?;
        let needs_object = matches!(operator, "is" | "isnt" | "has" | "hasnt" | "grandof" | "!grandof");
        if needs_object && !self.world.is_valid(index) {
            self.report_bad_pointer(left, index)?;
            return Ok(false);
        }

        match operator {
            "is" | "isnt" => match scope(&self.world, index, right)? {
                Some(inside) => Ok(inside == (operator == "is")),
                None => {
                    self.report(format_args!("unknown scope criterion \"{right}\""))?;
                    Ok(false)
                }
            },
            "has" | "hasnt" => {
                let Some((namespace, mask)) = self.world.symbols.attribute_resolve(right) else {
                    self.report(format_args!("undefined attribute \"{right}\""))?;
                    return Ok(false);
                };
                let object = self.world.object(index)?;
                let set = match namespace {
                    Namespace::System => object.attributes & mask != 0,
                    Namespace::User => object.user_attributes & mask != 0,
                };
                Ok(set == (operator == "has"))
            }
            "grandof" | "!grandof" => {
                let compare = self.value_of(right)?;
                if !self.world.is_valid(compare) {
                    self.report_bad_pointer(right, compare)?;
                    return Ok(false);
                }
                let related = parent_of(&self.world, index, compare, Walk::Unrestricted);
                Ok(related == (operator == "grandof"))
            }
            _ => {
                let compare = self.value_of(right)?;
                Ok(match operator {
                    "=" | "==" => index == compare,
                    "!=" | "<>" => index != compare,
                    ">" => index > compare,
                    "<" => index < compare,
                    ">=" | "=>" => index >= compare,
                    "<=" | "=<" => index <= compare,
                    _ => {
                        self.report(format_args!("illegal operator \"{operator}\""))?;
                        false
                    }
                })
            }
        }
    }

    fn str_test(&mut self, left: &Word, operator: &str, right: &Word) -> EngineResult<bool> {
        let index = self.text_of(left)?;
        let compare = self.text_of(right)?;
        Ok(match operator {
            "=" | "==" => index == compare,
            "!=" | "<>" => index != compare,
            "contains" => index.contains(&compare),
            "!contains" => !index.contains(&compare),
            _ => {
                self.report(format_args!("illegal operator \"{operator}\""))?;
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use jacl_dsl::lexer::lex_line;

    use crate::config::EngineConfig;
    use crate::interpreter::Interpreter;
    use crate::sink::HeadlessSink;

    const GAME: &str = "\
location cave : cave
  has DARK
object me : me
  player
object chest : chest
  has CONTAINER CLOSED
object key : key
  mass 1
attribute shiny
string name \"Alice\"
integer count 5
";

    fn check(line: &str) -> bool {
        let mut game =
            Interpreter::from_source(GAME, HeadlessSink::new(), EngineConfig::new()).unwrap();
        let key = game.world.find_label("key").unwrap();
        let chest = game.world.find_label("chest").unwrap();
        game.world.object_mut(key).unwrap().slots[0] = chest;
        let words = lex_line(line);
        match words[0].text.as_str() {
            "ifall" => game.condition(&words, true).unwrap(),
            "ifstring" => game.string_condition(&words, false).unwrap(),
            "ifstringall" => game.string_condition(&words, true).unwrap(),
            _ => game.condition(&words, false).unwrap(),
        }
    }

    #[test]
    fn comparisons() {
        assert!(check("if count = 5"));
        assert!(check("if count >= 5"));
        assert!(check("if count => 5"));
        assert!(!check("if count < 5"));
        assert!(check("if count <> 4"));
        assert!(check("if count = 4 count = 5"));
        assert!(!check("ifall count = 4 count = 5"));
        assert!(check("ifall count = 5 key.mass = 1"));
    }

    #[test]
    fn object_tests() {
        assert!(check("if chest has CLOSED"));
        assert!(check("if chest hasnt shiny"));
        assert!(check("if here has DARK"));
        assert!(check("if chest grandof key"));
        assert!(check("if here grandof key"));
        assert!(check("if key !grandof chest"));
        assert!(check("if key is anywhere"));
        assert!(check("if me isnt held"));
        assert!(!check("if key is present"));
    }

    #[test]
    fn invalid_objects_fail() {
        assert!(!check("if noun1 has CLOSED"));
        assert!(!check("if noun1 hasnt CLOSED"));
    }

    #[test]
    fn strings() {
        assert!(check("ifstring name == \"Alice\""));
        assert!(check("ifstring name contains \"lic\""));
        assert!(check("ifstring name !contains \"Bob\""));
        assert!(!check("ifstringall name != \"Alice\" name contains \"A\""));
    }

    #[test]
    fn illegal_operator_is_reported() {
        let mut game =
            Interpreter::from_source(GAME, HeadlessSink::new(), EngineConfig::new()).unwrap();
        let words = lex_line("if count ~ 5");
        assert!(!game.condition(&words, false).unwrap());
        assert!(game.sink().output().contains("illegal operator \"~\""));
    }
}
