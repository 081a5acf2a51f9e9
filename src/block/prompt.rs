use std::io::{BufRead, StdinLock, Stdout, Write};

use crate::error::{Error, Result};
use crate::parse::{AdvantageMode, AttackConfig, DamageSyntax, Field};

/// Supplies the fields an attack block may leave out.
pub trait Prompt {
    fn advantage_mode(&mut self) -> Result<AdvantageMode>;
    fn defense_value(&mut self) -> Result<u32>;
}

struct Question {
    field: Field,
    text: &'static str,
    retry: &'static str,
    /// An empty answer keeps the current value.
    optional: bool,
}

const ATTACK_COUNT: Question = Question {
    field: Field::AttackCount,
    text: "How many attacks will be made: ",
    retry: "Invalid input. Please enter a valid number: ",
    optional: false,
};
const ATTACK_MODIFIER: Question = Question {
    field: Field::AttackModifier,
    text: "What is the attack modifier: ",
    retry: "Invalid input. Please enter a valid number: ",
    optional: false,
};
const ATTACK_TYPE: Question = Question {
    field: Field::AdvantageMode,
    text: "Do the attack(s) have (A)dvantage or (D)isadvantage, leave empty for standard: ",
    retry: "Invalid input. Please enter A, D, or leave empty for normal: ",
    optional: false,
};
const CRIT_RANGE: Question = Question {
    field: Field::CriticalThreshold,
    text: "What is the critical range (leave empty for standard): ",
    retry: "Invalid input. Please enter a number between 1 and 20: ",
    optional: true,
};
const DAMAGE: Question = Question {
    field: Field::Damage,
    text: "Enter damage (format: 1d6 + 7 piercing + 1d6 poison): ",
    retry: "Please enter a valid damage format: ",
    optional: false,
};
const ARMOR_CLASS: Question = Question {
    field: Field::DefenseValue,
    text: "What is the AC of the target: ",
    retry: "Invalid input. Please enter a AC: ",
    optional: false,
};

/// Asks questions on `output` and reads the answers line by line from `input`.
/// Invalid answers are asked again until they validate.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    syntax: DamageSyntax,
}

impl TerminalPrompt<StdinLock<'static>, Stdout> {
    /// Prompt on the process standard input and output.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            syntax: DamageSyntax::Lenient,
        }
    }

    pub fn with_syntax(mut self, syntax: DamageSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Asks for every field of an attack, in the order a player would state them.
    pub fn ask_config(&mut self) -> Result<AttackConfig> {
        let mut config = AttackConfig::manual();
        for question in [
            &ATTACK_COUNT,
            &ATTACK_MODIFIER,
            &ATTACK_TYPE,
            &CRIT_RANGE,
            &DAMAGE,
            &ARMOR_CLASS,
        ] {
            self.ask(&mut config, question)?;
        }
        Ok(config)
    }

    fn ask(&mut self, config: &mut AttackConfig, question: &Question) -> Result<()> {
        write!(self.output, "{}", question.text)?;
        self.output.flush()?;

        loop {
            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                return Err(Error::PromptClosed {
                    question: question.text.trim_end(),
                });
            }

            let answer = answer.trim();
            if question.optional && answer.is_empty() {
                return Ok(());
            }

            match config.apply(question.field, answer, self.syntax) {
                Ok(()) => return Ok(()),
                Err(Error::InvalidFieldValue { .. } | Error::MalformedDamageExpression { .. }) => {
                    write!(self.output, "{}", question.retry)?;
                    self.output.flush()?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn advantage_mode(&mut self) -> Result<AdvantageMode> {
        let mut config = AttackConfig::new();
        self.ask(&mut config, &ATTACK_TYPE)?;
        Ok(config.advantage_mode)
    }

    fn defense_value(&mut self) -> Result<u32> {
        let mut config = AttackConfig::new();
        self.ask(&mut config, &ARMOR_CLASS)?;
        config.defense_value.ok_or(Error::IncompleteConfiguration {
            field: Field::DefenseValue,
            block: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::parse::DamageTerm;

    fn prompt(input: &str) -> TerminalPrompt<Cursor<&str>, Vec<u8>> {
        TerminalPrompt::new(Cursor::new(input), Vec::new())
    }

    fn output(prompt: &TerminalPrompt<Cursor<&str>, Vec<u8>>) -> String {
        String::from_utf8_lossy(&prompt.output).into_owned()
    }

    #[test]
    fn test_advantage_mode_retries_until_valid() {
        let mut prompt = prompt("x\nadvantage\nd\n");
        assert_eq!(prompt.advantage_mode().unwrap(), AdvantageMode::Disadvantage);
        assert_eq!(
            output(&prompt),
            format!("{}{}{}", ATTACK_TYPE.text, ATTACK_TYPE.retry, ATTACK_TYPE.retry)
        );
    }

    #[test]
    fn test_empty_advantage_mode_is_normal() {
        let mut prompt = prompt("\n");
        assert_eq!(prompt.advantage_mode().unwrap(), AdvantageMode::Normal);
    }

    #[test]
    fn test_defense_value_must_be_positive() {
        let mut prompt = prompt("zero\n0\n 14 \n");
        assert_eq!(prompt.defense_value().unwrap(), 14);
        assert_eq!(output(&prompt).matches(ARMOR_CLASS.retry).count(), 2);
    }

    #[test]
    fn test_closed_input() {
        let mut prompt = prompt("abc\n");
        assert!(matches!(
            prompt.defense_value(),
            Err(Error::PromptClosed { .. })
        ));
    }

    #[test]
    fn test_ask_config() {
        let mut prompt = prompt("3\n-1\na\n\nnot damage\n2d6 + 3 slashing\n16\n");
        let config = prompt.ask_config().unwrap();

        assert_eq!(config.attack_count(), Some(3));
        assert_eq!(config.attack_modifier(), -1);
        assert_eq!(config.advantage_mode(), AdvantageMode::Advantage);
        assert_eq!(config.critical_threshold(), 20);
        assert_eq!(
            config.damage_terms(),
            [DamageTerm::new(2, 6, 3, "slashing")]
        );
        assert_eq!(config.defense_value(), Some(16));
        assert!(config.ensure_complete(None).is_ok());
        assert_eq!(output(&prompt).matches(DAMAGE.retry).count(), 1);
    }

    #[test]
    fn test_ask_config_with_crit_range() {
        let mut prompt = prompt("1\n0\n\n25\n19\n1d8 fire\n12\n");
        let config = prompt.ask_config().unwrap();

        assert_eq!(config.advantage_mode(), AdvantageMode::Normal);
        assert_eq!(config.critical_threshold(), 19);
        assert_eq!(output(&prompt).matches(CRIT_RANGE.retry).count(), 1);
    }

    #[test]
    fn test_strict_damage_prompt() {
        let mut prompt = prompt("1\n0\n\n\nbite 1d8 piercing\n1d8 piercing\n12\n")
            .with_syntax(DamageSyntax::Strict);
        let config = prompt.ask_config().unwrap();

        assert_eq!(config.damage_terms().len(), 1);
        assert_eq!(output(&prompt).matches(DAMAGE.retry).count(), 1);
    }
}
