use tracing::warn;
use winnow::{
    ascii::{alpha1, digit1, multispace0},
    combinator::{delimited, opt, preceded, separated},
    token::one_of,
    PResult, Parser,
};

use super::{DamageSyntax, DamageTerm};
use crate::error::{Error, Result};

/// A term as it appears in the text, before any number is converted.
struct RawTerm<'s> {
    dice_count: &'s str,
    dice_sides: &'s str,
    flat_modifier: Option<(char, &'s str)>,
    type_label: &'s str,
}

impl DamageTerm {
    /// Parses every damage term found in `text`, in order of appearance.
    ///
    /// The text is scanned for `{count}d{sides}`, an optional `+{n}` or `-{n}`
    /// and a type label made of letters. Whatever sits between two terms is
    /// skipped, so `1d6 + 7 piercing + 1d6 poison` and
    /// `bite: 1d6 + 7 piercing, 1d6 poison` read the same.
    pub fn parse_all(text: &str) -> Result<Vec<DamageTerm>> {
        let mut terms = Vec::new();
        let mut skipped = false;
        let mut rest = text;

        while !rest.is_empty() {
            let mut attempt = rest;
            match raw_term.parse_next(&mut attempt) {
                Ok(raw) => {
                    terms.push(raw.into_term(text)?);
                    rest = attempt;
                }
                Err(_) => {
                    let mut chars = rest.chars();
                    if chars.next().is_some_and(|c| !c.is_whitespace() && c != '+') {
                        skipped = true;
                    }
                    rest = chars.as_str();
                }
            }
        }

        if terms.is_empty() {
            return Err(malformed(text, "no `{count}d{sides} {type}` term found"));
        }
        if skipped {
            warn!(expression = text, "ignored text between damage terms");
        }

        Ok(terms)
    }

    /// Parses `text` as a whole: only damage terms separated by `+` are allowed.
    pub fn parse_strict(text: &str) -> Result<Vec<DamageTerm>> {
        let raw_terms: Vec<RawTerm<'_>> = delimited(
            multispace0,
            separated(1.., raw_term, (multispace0, '+', multispace0)),
            multispace0,
        )
        .parse(text)
        .map_err(|e| malformed(text, &e.to_string()))?;

        raw_terms
            .into_iter()
            .map(|raw| raw.into_term(text))
            .collect()
    }

    /// Parses `text` with the chosen syntax.
    pub fn parse_with(text: &str, syntax: DamageSyntax) -> Result<Vec<DamageTerm>> {
        match syntax {
            DamageSyntax::Lenient => Self::parse_all(text),
            DamageSyntax::Strict => Self::parse_strict(text),
        }
    }
}

impl RawTerm<'_> {
    fn into_term(self, expression: &str) -> Result<DamageTerm> {
        let dice_count = positive(self.dice_count, expression, "dice count")?;
        let dice_sides = positive(self.dice_sides, expression, "dice sides")?;

        let flat_modifier = match self.flat_modifier {
            None => 0,
            Some((sign, digits)) => {
                let value: i32 = digits
                    .parse()
                    .map_err(|_| malformed(expression, &format!("modifier {digits} is too large")))?;
                if sign == '-' {
                    -value
                } else {
                    value
                }
            }
        };

        Ok(DamageTerm {
            dice_count,
            dice_sides,
            flat_modifier,
            type_label: self.type_label.to_string(),
        })
    }
}

fn positive(digits: &str, expression: &str, what: &str) -> Result<u32> {
    match digits.parse::<u32>() {
        Ok(0) => Err(malformed(expression, &format!("{what} must be at least 1"))),
        Ok(n) => Ok(n),
        Err(_) => Err(malformed(expression, &format!("{what} {digits} is too large"))),
    }
}

fn malformed(expression: &str, reason: &str) -> Error {
    Error::MalformedDamageExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

fn raw_term<'s>(input: &mut &'s str) -> PResult<RawTerm<'s>> {
    (digit1, 'd', digit1, opt(flat_modifier), type_label)
        .map(
            |(dice_count, _, dice_sides, flat_modifier, type_label)| RawTerm {
                dice_count,
                dice_sides,
                flat_modifier,
                type_label,
            },
        )
        .parse_next(input)
}

fn flat_modifier<'s>(input: &mut &'s str) -> PResult<(char, &'s str)> {
    preceded(
        multispace0,
        (one_of(['+', '-']), preceded(multispace0, digit1)),
    )
    .parse_next(input)
}

fn type_label<'s>(input: &mut &'s str) -> PResult<&'s str> {
    preceded(multispace0, alpha1).parse_next(input)
}
