use tracing::trace;
use winnow::{combinator::alt, PResult, Parser};

use super::{AdvantageMode, AttackConfig, DamageSyntax, DamageTerm, D20};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A field of an [`AttackConfig`] that can be set from a flag, a prompt or a
/// `key:value` line.
pub enum Field {
    /// `ac:{n}`, n >= 1
    DefenseValue,
    /// `attacks:{n}`, n >= 1
    AttackCount,
    /// `crit range:{n}`, 1 <= n <= 20
    CriticalThreshold,
    /// `modifier:{n}`, any integer
    AttackModifier,
    /// `attack type:{a|d|n}`, empty means normal
    AdvantageMode,
    /// `damage:{expression}`, appended to the damage already read
    Damage,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::DefenseValue,
        Field::AttackCount,
        Field::CriticalThreshold,
        Field::AttackModifier,
        Field::AdvantageMode,
        Field::Damage,
    ];

    /// The key used in configuration files.
    pub fn key(self) -> &'static str {
        match self {
            Field::DefenseValue => "ac",
            Field::AttackCount => "attacks",
            Field::CriticalThreshold => "crit range",
            Field::AttackModifier => "modifier",
            Field::AdvantageMode => "attack type",
            Field::Damage => "damage",
        }
    }

    /// Splits a `key:value` line into its field and raw value.
    /// Keys are case sensitive and must start the line.
    pub fn split_line(line: &str) -> Option<(Field, &str)> {
        let mut value = line;
        let field = field_key.parse_next(&mut value).ok()?;
        Some((field, value))
    }
}

fn field_key(input: &mut &str) -> PResult<Field> {
    alt((
        "ac:".value(Field::DefenseValue),
        "attacks:".value(Field::AttackCount),
        "crit range:".value(Field::CriticalThreshold),
        "modifier:".value(Field::AttackModifier),
        "attack type:".value(Field::AdvantageMode),
        "damage:".value(Field::Damage),
    ))
    .parse_next(input)
}

impl AdvantageMode {
    /// `a`/`A` for advantage, `d`/`D` for disadvantage, `n`/`N` or nothing
    /// for a normal roll.
    pub fn parse(input: &str) -> Option<AdvantageMode> {
        match input.trim() {
            "a" | "A" => Some(AdvantageMode::Advantage),
            "d" | "D" => Some(AdvantageMode::Disadvantage),
            "n" | "N" | "" => Some(AdvantageMode::Normal),
            _ => None,
        }
    }
}

impl AttackConfig {
    /// Validates `value` for `field` and stores it.
    /// Damage is appended to the terms already present, every other field
    /// overwrites its previous value.
    pub fn apply(&mut self, field: Field, value: &str, syntax: DamageSyntax) -> Result<()> {
        let trimmed = value.trim();
        let invalid = |expected| Error::InvalidFieldValue {
            field,
            value: trimmed.to_string(),
            expected,
        };

        match field {
            Field::DefenseValue => {
                let ac = trimmed.parse::<u32>().ok().filter(|ac| *ac >= 1);
                self.defense_value = Some(ac.ok_or_else(|| invalid("an integer greater than 0"))?);
            }
            Field::AttackCount => {
                let count = trimmed.parse::<u32>().ok().filter(|count| *count >= 1);
                self.attack_count =
                    Some(count.ok_or_else(|| invalid("an integer greater than 0"))?);
            }
            Field::CriticalThreshold => {
                let threshold = trimmed
                    .parse::<u32>()
                    .ok()
                    .filter(|threshold| (1..=D20).contains(threshold));
                self.critical_threshold =
                    threshold.ok_or_else(|| invalid("an integer between 1 and 20"))?;
            }
            Field::AttackModifier => {
                self.attack_modifier = trimmed.parse().map_err(|_| invalid("an integer"))?;
            }
            Field::AdvantageMode => {
                self.advantage_mode = AdvantageMode::parse(trimmed)
                    .ok_or_else(|| invalid("A for advantage, D for disadvantage or N for normal"))?;
            }
            Field::Damage => {
                let terms = DamageTerm::parse_with(trimmed, syntax)?;
                self.damage_terms.extend(terms);
            }
        }

        trace!(field = field.key(), value = trimmed, "applied field");
        self.fresh = false;
        Ok(())
    }

    /// Checks that every field needed to roll is present.
    /// `block` is reported back in the error when the config came from a file.
    pub fn ensure_complete(&self, block: Option<usize>) -> Result<()> {
        let missing = |field| -> Result<()> { Err(Error::IncompleteConfiguration { field, block }) };

        if self.attack_count.is_none() {
            return missing(Field::AttackCount);
        }
        if self.damage_terms.is_empty() {
            return missing(Field::Damage);
        }
        if self.advantage_mode == AdvantageMode::Unset {
            return missing(Field::AdvantageMode);
        }
        if self.defense_value.is_none() {
            return missing(Field::DefenseValue);
        }
        Ok(())
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Field::DefenseValue => "AC",
            Field::AttackCount => "attack count",
            Field::CriticalThreshold => "crit range",
            Field::AttackModifier => "attack modifier",
            Field::AdvantageMode => "attack type",
            Field::Damage => "damage",
        };
        write!(f, "{str}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(field: Field, value: &str) -> Result<AttackConfig> {
        let mut config = AttackConfig::new();
        config.apply(field, value, DamageSyntax::Lenient)?;
        Ok(config)
    }

    #[test]
    fn test_split_line() {
        #[rustfmt::skip]
        let inputs = [
            ("ac:15", Some((Field::DefenseValue, "15"))),
            ("attacks: 3", Some((Field::AttackCount, " 3"))),
            ("crit range:19", Some((Field::CriticalThreshold, "19"))),
            ("modifier:-2", Some((Field::AttackModifier, "-2"))),
            ("attack type:", Some((Field::AdvantageMode, ""))),
            ("damage:1d6 fire", Some((Field::Damage, "1d6 fire"))),
            ("AC:15", None),
            (" ac:15", None),
            ("ac 15", None),
            ("armor:15", None),
        ];

        for (input, expected) in inputs {
            assert_eq!(Field::split_line(input), expected, "{input:?}");
        }
    }

    #[test]
    fn test_every_key_is_recognized() {
        for field in Field::ALL {
            let line = format!("{}:1", field.key());
            assert_eq!(Field::split_line(&line).map(|(f, _)| f), Some(field));
        }
    }

    #[test]
    fn test_apply_numbers() {
        assert_eq!(apply(Field::DefenseValue, "15").unwrap().defense_value(), Some(15));
        assert_eq!(apply(Field::AttackCount, " 4 ").unwrap().attack_count(), Some(4));
        assert_eq!(apply(Field::CriticalThreshold, "19").unwrap().critical_threshold(), 19);
        assert_eq!(apply(Field::AttackModifier, "-3").unwrap().attack_modifier(), -3);
    }

    #[test]
    fn test_apply_out_of_range() {
        #[rustfmt::skip]
        let inputs = [
            (Field::DefenseValue, "0"),
            (Field::DefenseValue, "-5"),
            (Field::DefenseValue, "twelve"),
            (Field::AttackCount, "0"),
            (Field::AttackCount, ""),
            (Field::CriticalThreshold, "0"),
            (Field::CriticalThreshold, "21"),
            (Field::AttackModifier, "+-1"),
            (Field::AdvantageMode, "x"),
            (Field::AdvantageMode, "advantage"),
        ];

        for (field, value) in inputs {
            let err = apply(field, value).unwrap_err();
            assert!(
                matches!(err, Error::InvalidFieldValue { field: f, .. } if f == field),
                "{field:?} {value:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_apply_advantage_mode() {
        #[rustfmt::skip]
        let inputs = [
            ("a", AdvantageMode::Advantage),
            ("A", AdvantageMode::Advantage),
            ("d", AdvantageMode::Disadvantage),
            ("D", AdvantageMode::Disadvantage),
            ("n", AdvantageMode::Normal),
            ("N", AdvantageMode::Normal),
            ("", AdvantageMode::Normal),
        ];

        for (value, expected) in inputs {
            assert_eq!(apply(Field::AdvantageMode, value).unwrap().advantage_mode(), expected);
        }
    }

    #[test]
    fn test_damage_is_appended() {
        let mut config = AttackConfig::new();
        config
            .apply(Field::Damage, "1d8 + 3 slashing", DamageSyntax::Lenient)
            .unwrap();
        config
            .apply(Field::Damage, "2d6 fire", DamageSyntax::Lenient)
            .unwrap();

        let labels: Vec<_> = config.damage_terms().iter().map(|t| t.type_label()).collect();
        assert_eq!(labels, ["slashing", "fire"]);
    }

    #[test]
    fn test_fresh_until_a_field_is_set() {
        let mut config = AttackConfig::new();
        assert!(config.is_fresh());

        config
            .apply(Field::AttackModifier, "2", DamageSyntax::Lenient)
            .unwrap();
        assert!(!config.is_fresh());
    }

    #[test]
    fn test_ensure_complete_names_the_missing_field() {
        let config = AttackConfig::new();
        let err = config.ensure_complete(Some(2)).unwrap_err();
        assert!(matches!(
            err,
            Error::IncompleteConfiguration {
                field: Field::AttackCount,
                block: Some(2)
            }
        ));
        assert_eq!(err.to_string(), "missing attack count in attack set 2");

        let config = AttackConfig::manual().with_attack_count(2);
        let err = config.ensure_complete(None).unwrap_err();
        assert!(matches!(
            err,
            Error::IncompleteConfiguration {
                field: Field::Damage,
                block: None
            }
        ));

        let config = AttackConfig::manual()
            .with_attack_count(2)
            .with_damage([DamageTerm::new(1, 6, 0, "fire")]);
        assert!(matches!(
            config.ensure_complete(None),
            Err(Error::IncompleteConfiguration {
                field: Field::DefenseValue,
                ..
            })
        ));
        assert!(config.with_defense_value(12).ensure_complete(None).is_ok());
    }
}
