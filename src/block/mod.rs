//! Attack blocks read from a `key:value` file.
//!
//! ```text
//! attacks:2
//! modifier:7
//! damage:1d8 + 4 slashing
//! damage:1d6 fire
//! ac:15
//!
//! attacks:1
//! attack type:a
//! crit range:19
//! damage:2d6 piercing
//! ```
//!
//! Blocks are separated by a blank line. `attacks` and `damage` are required,
//! `ac` and `attack type` are asked for through a [`Prompt`] when left out.

mod batch;
mod prompt;

pub use batch::*;
pub use prompt::*;

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines, Write};
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::evaluate::{dice::DieRoller, totals::DamageTotals};
use crate::parse::{AdvantageMode, AttackConfig, DamageSyntax, Field};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One attack block as read from the file, before missing fields are asked for.
pub struct Block {
    index: usize,
    config: AttackConfig,
}

enum State {
    AwaitingFirstLine,
    Accumulating(AttackConfig),
    Failed,
    Finished,
}

/// Iterator over the attack blocks of a reader.
///
/// A block ends on a blank line or at the end of the input. After the first
/// error the iterator is exhausted.
pub struct Blocks<B> {
    lines: Lines<B>,
    syntax: DamageSyntax,
    line_number: usize,
    index: usize,
    state: State,
}

impl<B: BufRead> Blocks<B> {
    pub fn new(reader: B) -> Self {
        Self {
            lines: reader.lines(),
            syntax: DamageSyntax::Lenient,
            line_number: 0,
            index: 0,
            state: State::AwaitingFirstLine,
        }
    }

    pub fn with_syntax(mut self, syntax: DamageSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Number of blocks whose first line has been read, including a block
    /// that failed before it was complete.
    pub fn started(&self) -> usize {
        self.index
    }

    fn consume_line(&mut self, line: &str) -> Result<()> {
        let mut config = match std::mem::replace(&mut self.state, State::Failed) {
            State::Accumulating(config) => config,
            _ => {
                self.index += 1;
                debug!(block = self.index, "started attack block");
                AttackConfig::new()
            }
        };

        let Some((field, value)) = Field::split_line(line) else {
            return Err(Error::UnrecognizedConfigurationLine {
                line_number: self.line_number,
                line: line.to_string(),
            });
        };

        trace!(line_number = self.line_number, line, "read configuration line");
        config.apply(field, value, self.syntax)?;
        self.state = State::Accumulating(config);
        Ok(())
    }

    fn close(&self, config: AttackConfig) -> Result<Block> {
        let missing = if config.attack_count.is_none() {
            Some(Field::AttackCount)
        } else if config.damage_terms.is_empty() {
            Some(Field::Damage)
        } else {
            None
        };

        if let Some(field) = missing {
            return Err(Error::IncompleteConfiguration {
                field,
                block: Some(self.index),
            });
        }

        debug!(block = self.index, "finished attack block");
        Ok(Block {
            index: self.index,
            config,
        })
    }
}

impl<B: BufRead> Iterator for Blocks<B> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if matches!(self.state, State::Failed | State::Finished) {
                return None;
            }

            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    self.state = State::Failed;
                    return Some(Err(err.into()));
                }
                None => {
                    // A block without a trailing blank line is still rolled.
                    return match std::mem::replace(&mut self.state, State::Finished) {
                        State::Accumulating(config) => Some(self.close(config)),
                        _ => None,
                    };
                }
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                match std::mem::replace(&mut self.state, State::AwaitingFirstLine) {
                    State::Accumulating(config) => {
                        let block = self.close(config);
                        if block.is_err() {
                            self.state = State::Failed;
                        }
                        return Some(block);
                    }
                    _ => continue,
                }
            }

            if let Err(err) = self.consume_line(&line) {
                self.state = State::Failed;
                return Some(Err(err));
            }
        }
    }
}

impl Block {
    /// 1-based position of the block in its file.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    /// Asks `prompt` for the advantage mode and the defense value if the
    /// block did not set them, returning a config ready to be resolved.
    pub fn complete(mut self, prompt: &mut impl Prompt) -> Result<AttackConfig> {
        if self.config.advantage_mode == AdvantageMode::Unset {
            self.config.advantage_mode = prompt.advantage_mode()?;
        }
        if self.config.defense_value.is_none() {
            self.config.defense_value = Some(prompt.defense_value()?);
        }

        self.config.ensure_complete(Some(self.index))?;
        Ok(self.config)
    }
}

/// Rolls every block of `source` in order, writing each result to `out`.
///
/// A block is announced as soon as its first line is read. Stops at the
/// first invalid block, the blocks rolled before it stay written.
pub fn roll_blocks<B: BufRead>(
    source: B,
    name: &str,
    syntax: DamageSyntax,
    prompt: &mut impl Prompt,
    roller: &mut impl DieRoller,
    out: &mut impl Write,
) -> Result<Vec<DamageTotals>> {
    let mut blocks = Blocks::new(source).with_syntax(syntax);
    let mut announced = 0;
    let mut totals = Vec::new();

    loop {
        let next = blocks.next();
        if blocks.started() > announced {
            announced = blocks.started();
            writeln!(out, "Rolling attack set: {announced} from file: {name}")?;
            out.flush()?;
        }

        let Some(block) = next else {
            break;
        };
        let config = block?.complete(prompt)?;
        totals.push(config.roll_into(roller, out)?);
    }

    Ok(totals)
}

/// Same as [`roll_blocks`] but reads the blocks from the file at `path`.
pub fn roll_file(
    path: &Path,
    syntax: DamageSyntax,
    prompt: &mut impl Prompt,
    roller: &mut impl DieRoller,
    out: &mut impl Write,
) -> Result<Vec<DamageTotals>> {
    let file = File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(err),
    })?;

    let name = path.display().to_string();
    roll_blocks(BufReader::new(file), &name, syntax, prompt, roller, out)
}
