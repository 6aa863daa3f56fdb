//! Line-by-line execution of function bodies.
//!
//! Block structure is tracked with two counters rather than a syntax tree:
//! `current` counts the blocks opened so far and `execution` the innermost
//! one whose body is running. A line runs only when the two are equal;
//! skipped lines still count their openers and closers so that nesting stays
//! balanced. Loops remember where they started in a stack of marks.

use jacl_core::{Statement, Word};
use log::trace;

use crate::error::EngineResult;
use crate::interpreter::Interpreter;
use crate::sink::{PresentationSink, Style};
use crate::value::Target;

/// Operators that open a block closed by `endif` or `endwhile`.
const OPENERS: &[&str] = &[
    "if",
    "ifall",
    "ifstring",
    "ifstringall",
    "ifexecute",
    "while",
    "whileall",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum MarkKind {
    While,
    Repeat,
    Loop(Target),
}

impl MarkKind {
    fn opens(&self, operator: &str) -> bool {
        match self {
            Self::While => matches!(operator, "while" | "whileall"),
            Self::Repeat => operator == "repeat",
            Self::Loop(_) => operator == "loop",
        }
    }

    fn closes(&self, operator: &str) -> bool {
        match self {
            Self::While => operator == "endwhile",
            Self::Repeat => matches!(operator, "until" | "untilall"),
            Self::Loop(_) => operator == "endloop",
        }
    }
}

/// Where a running loop started.
#[derive(Debug, Clone)]
struct Mark {
    kind: MarkKind,
    /// Statement to resume at when the loop goes round again.
    start: usize,
    /// Value of `current` inside the loop body.
    level: i32,
}

#[derive(Debug, Default)]
struct Blocks {
    current: i32,
    execution: i32,
    marks: Vec<Mark>,
}

impl Blocks {
    fn running(&self) -> bool {
        self.current == self.execution
    }

    /// Remove and return the innermost mark matching `wanted`, discarding
    /// any left open above it.
    fn take(&mut self, wanted: fn(&MarkKind) -> bool) -> Option<Mark> {
        let index = self.marks.iter().rposition(|m| wanted(&m.kind))?;
        self.marks.truncate(index + 1);
        self.marks.pop()
    }
}

/// What happens after a statement.
enum Flow {
    Next,
    Jump(usize),
    Return(i32),
}

impl<S: PresentationSink> Interpreter<S> {
    /// Run a function body. Returns the value of `return`, or 1 when the
    /// end of the body is reached.
    pub(crate) fn run_body(&mut self, body: &[Statement]) -> EngineResult<i32> {
        let mut blocks = Blocks::default();
        let mut pc = 0;
        while pc < body.len() {
            let statement = &body[pc];
            let mut next = pc + 1;
            match statement.operator().unwrap_or_default() {
                "" => {}
                "endwhile" => {
                    blocks.current -= 1;
                    if blocks.current < blocks.execution {
                        blocks.execution = blocks.current;
                        match blocks.take(|k| *k == MarkKind::While) {
                            Some(mark) => next = mark.start,
                            None => self.report("endwhile without a matching while")?,
                        }
                    }
                }
                "endif" => {
                    blocks.current -= 1;
                    blocks.execution = blocks.execution.min(blocks.current);
                }
                "endall" => {
                    blocks.current = 0;
                    blocks.execution = 0;
                }
                "else" => {
                    if blocks.current == blocks.execution {
                        blocks.execution -= 1;
                    } else if blocks.current == blocks.execution + 1 {
                        blocks.execution += 1;
                    }
                }
                _ if blocks.running() => {
                    self.trace_statement(statement)?;
                    match self.control(body, pc, statement, &mut blocks)? {
                        Flow::Next => {}
                        Flow::Jump(to) => next = to,
                        Flow::Return(value) => return Ok(value),
                    }
                }
                operator if OPENERS.contains(&operator) => blocks.current += 1,
                _ => {}
            }
            pc = next;
        }
        Ok(1)
    }

    fn trace_statement(&mut self, statement: &Statement) -> EngineResult<()> {
        trace!("{}:{} {}", self.function, statement.line, statement.raw);
        if self.integer("debug") != 0 && !self.config.release {
            self.sink.set_style(Style::Note)?;
            self.write(&format!("{}^", statement.raw))?;
            self.sink.set_style(Style::Normal)?;
        }
        Ok(())
    }

    /// Execute one running statement, handling the block operators here and
    /// everything else in [`Interpreter::operate`].
    fn control(
        &mut self,
        body: &[Statement],
        pc: usize,
        statement: &Statement,
        blocks: &mut Blocks,
    ) -> EngineResult<Flow> {
        let words = &statement.words;
        let operator = words[0].text.as_str();
        match operator {
            "if" | "ifall" | "ifstring" | "ifstringall" | "while" | "whileall" => {
                blocks.current += 1;
                if !self.require(words, 3)? {
                    return Ok(Flow::Next);
                }
                let holds = match operator {
                    "if" | "while" => self.condition(words, false)?,
                    "ifall" | "whileall" => self.condition(words, true)?,
                    "ifstring" => self.string_condition(words, false)?,
                    _ => self.string_condition(words, true)?,
                };
                if holds {
                    blocks.execution += 1;
                    if operator.starts_with("while") {
                        blocks.marks.push(Mark {
                            kind: MarkKind::While,
                            start: pc,
                            level: blocks.current,
                        });
                    }
                }
            }
            "ifexecute" => {
                blocks.current += 1;
                if !self.require(words, 1)? {
                    return Ok(Flow::Next);
                }
                if self.execute_function(&words[1].text)?.is_some_and(|v| v != 0) {
                    blocks.execution += 1;
                }
            }
            "repeat" => blocks.marks.push(Mark {
                kind: MarkKind::Repeat,
                start: pc + 1,
                level: blocks.current,
            }),
            "until" | "untilall" => {
                if !self.require(words, 3)? {
                    return Ok(Flow::Next);
                }
                let Some(mark) = blocks.take(|k| *k == MarkKind::Repeat) else {
                    self.report(format_args!("{operator} without a matching repeat"))?;
                    return Ok(Flow::Next);
                };
                if !self.condition(words, operator == "untilall")? {
                    let start = mark.start;
                    blocks.marks.push(mark);
                    return Ok(Flow::Jump(start));
                }
            }
            "loop" => {
                let target = match words.get(1) {
                    Some(word) => self.container_resolve(&word.text)?,
                    None => None,
                };
                let target = target.unwrap_or(Target::Noun(2));
                self.set_target(&target, 1);
                blocks.marks.push(Mark {
                    kind: MarkKind::Loop(target),
                    start: pc + 1,
                    level: blocks.current,
                });
            }
            "endloop" => {
                let Some(mark) = blocks.take(|k| matches!(k, MarkKind::Loop(_))) else {
                    self.report("endloop without a matching loop")?;
                    return Ok(Flow::Next);
                };
                let MarkKind::Loop(target) = &mark.kind else {
                    return Ok(Flow::Next);
                };
                let value = self.get_target(target) + 1;
                if value > self.world.object_count() {
                    self.set_target(target, 0);
                } else {
                    self.set_target(target, value);
                    let start = mark.start;
                    blocks.marks.push(mark);
                    return Ok(Flow::Jump(start));
                }
            }
            "break" => {
                let Some(mark) = blocks.marks.pop() else {
                    self.report("break outside of a loop")?;
                    return Ok(Flow::Next);
                };
                blocks.current = match mark.kind {
                    MarkKind::While => mark.level - 1,
                    _ => mark.level,
                };
                blocks.execution = blocks.current;
                let end = find_end(body, pc + 1, &mark.kind).map_or(body.len(), |end| end + 1);
                return Ok(Flow::Jump(end));
            }
            _ => {
                if let Some(value) = self.operate(statement)? {
                    return Ok(Flow::Return(value));
                }
            }
        }
        Ok(Flow::Next)
    }

    /// Check that `words` has at least `count` operands, reporting if not.
    pub(crate) fn require(&mut self, words: &[Word], count: usize) -> EngineResult<bool> {
        if words.len() > count {
            return Ok(true);
        }
        let operator = words.first().map_or("", |w| w.text.as_str());
        self.report(format_args!("insufficient parameters for \"{operator}\""))?;
        Ok(false)
    }
}

/// Index of the statement closing the loop of `kind` that encloses
/// `start`.
fn find_end(body: &[Statement], start: usize, kind: &MarkKind) -> Option<usize> {
    let mut depth = 0usize;
    for (index, statement) in body.iter().enumerate().skip(start) {
        let operator = statement.operator().unwrap_or_default();
        if kind.opens(operator) {
            depth += 1;
        } else if kind.closes(operator) {
            if depth == 0 {
                return Some(index);
            }
            depth -= 1;
        }
    }
    None
}
