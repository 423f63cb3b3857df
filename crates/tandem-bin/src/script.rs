//! Session scripts: a line-oriented record of view gestures replayed against
//! one shared document.
//!
//! ```text
//! # two views typing into the same buffer
//! 0 type hello
//! attach
//! 1 click 0
//! 1 type >\s
//! 0 undo
//! ```
//!
//! `<view>` is the 0-based attach index (views attached from the command line
//! come first). Text arguments run to the end of the line; surrounding
//! whitespace is trimmed, so use `\s` for a significant space. `\n`, `\t` and
//! `\\` are also understood.

use anyhow::{Context, Result, anyhow, bail};
use core_model::Motion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Detach,
    Insert { offset: usize, text: String },
    Delete { start: usize, end: usize },
    Type(String),
    Backspace,
    DeleteForward,
    Move(Motion),
    Click(usize),
    Extend(usize),
    Select { anchor: usize, head: usize },
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Attach a new view; it takes the next index.
    Attach,
    /// Run `op` on behalf of the view with this attach index.
    View { index: usize, op: Op },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 1-based line in the script source.
    pub line: usize,
    pub action: Action,
}

pub fn parse(source: &str) -> Result<Vec<Step>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            Some(parse_line(line).with_context(|| format!("script line {}: `{line}`", idx + 1)).map(
                |action| Step {
                    line: idx + 1,
                    action,
                },
            ))
        })
        .collect()
}

fn parse_line(line: &str) -> Result<Action> {
    if line == "attach" {
        return Ok(Action::Attach);
    }
    let (view, rest) = split_word(line);
    let index: usize = view
        .parse()
        .map_err(|_| anyhow!("expected a view index, found `{view}`"))?;
    let (verb, args) = split_word(rest);
    let op = match verb {
        "detach" => no_args(args, Op::Detach)?,
        "insert" => {
            let (offset, text) = split_word(args);
            Op::Insert {
                offset: number(offset)?,
                text: unescape(text)?,
            }
        }
        "delete" => {
            let [start, end] = numbers(args)?;
            Op::Delete { start, end }
        }
        "type" => Op::Type(unescape(args)?),
        "backspace" => no_args(args, Op::Backspace)?,
        "del" => no_args(args, Op::DeleteForward)?,
        "move" => Op::Move(motion(args)?),
        "click" => Op::Click(number(args)?),
        "extend" => Op::Extend(number(args)?),
        "select" => {
            let [anchor, head] = numbers(args)?;
            Op::Select { anchor, head }
        }
        "undo" => no_args(args, Op::Undo)?,
        "redo" => no_args(args, Op::Redo)?,
        "" => bail!("missing command after view index"),
        other => bail!("unknown command `{other}`"),
    };
    Ok(Action::View { index, op })
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

fn no_args(args: &str, op: Op) -> Result<Op> {
    if !args.is_empty() {
        bail!("unexpected argument `{args}`");
    }
    Ok(op)
}

fn number(s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| anyhow!("expected a character offset, found `{s}`"))
}

fn numbers(args: &str) -> Result<[usize; 2]> {
    let mut words = args.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(a), Some(b), None) => Ok([number(a)?, number(b)?]),
        _ => bail!("expected two offsets, found `{args}`"),
    }
}

fn motion(word: &str) -> Result<Motion> {
    Ok(match word {
        "left" => Motion::Left,
        "right" => Motion::Right,
        "up" => Motion::Up,
        "down" => Motion::Down,
        "home" => Motion::LineStart,
        "end" => Motion::LineEnd,
        other => bail!("unknown motion `{other}`"),
    })
}

fn unescape(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some(other) => bail!("unknown escape `\\{other}`"),
            None => bail!("dangling `\\` at end of text"),
        }
    }
    Ok(out)
}
