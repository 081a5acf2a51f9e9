use std::io::Write;

use tracing::{debug, trace};

use super::{dice::DieRoller, totals::DamageTotals};
use crate::error::{Error, Result};
use crate::parse::{AttackConfig, Field, D20};

/// A natural roll of 1 always misses.
pub const CRITICAL_MISS: u32 = 1;
/// Dice damage of a critical hit is multiplied by this, flat modifiers are not.
pub const CRITICAL_MULTIPLIER: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Damage dealt by one damage term of a hit.
pub struct TermDamage {
    pub amount: i64,
    pub type_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The damage of every term, in the order the terms were declared.
    Hit {
        critical: bool,
        damage: Vec<TermDamage>,
    },
    /// `critical` is set when the natural roll was a 1.
    Miss { critical: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackRoll {
    pub(crate) number: usize,
    pub(crate) natural: u32,
    pub(crate) total: i64,
    pub(crate) outcome: AttackOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Every attack of a batch and the damage they dealt per type.
pub struct RollReport {
    pub(crate) attacks: Vec<AttackRoll>,
    pub(crate) totals: DamageTotals,
}

impl AttackConfig {
    /// Rolls every attack of the config against its defense value.
    ///
    /// Fails with [`Error::IncompleteConfiguration`] when the attack count,
    /// the damage, the advantage mode or the defense value is missing.
    /// Every roll is kept in the report, use [`AttackConfig::roll_into`] to
    /// write them out one by one instead.
    pub fn resolve(&self, roller: &mut impl DieRoller) -> Result<RollReport> {
        let mut attacks = self.attacks(roller)?;
        let rolls = attacks.by_ref().collect();
        Ok(RollReport {
            attacks: rolls,
            totals: attacks.into_totals(),
        })
    }

    /// Rolls the attacks lazily, one per call to `next`.
    pub fn attacks<'a, R: DieRoller>(&'a self, roller: &'a mut R) -> Result<Attacks<'a, R>> {
        self.ensure_complete(None)?;
        let (Some(attack_count), Some(defense_value)) = (self.attack_count, self.defense_value)
        else {
            return Err(Error::IncompleteConfiguration {
                field: Field::AttackCount,
                block: None,
            });
        };

        debug!(
            attack_count,
            defense_value,
            mode = %self.advantage_mode,
            "resolving attacks"
        );

        Ok(Attacks {
            config: self,
            roller,
            defense_value,
            remaining: attack_count,
            number: 0,
            totals: DamageTotals::new(),
        })
    }

    /// Rolls the attacks and writes each one to `out` as soon as it is rolled,
    /// followed by the damage totals.
    pub fn roll_into(
        &self,
        roller: &mut impl DieRoller,
        out: &mut impl Write,
    ) -> Result<DamageTotals> {
        let mut attacks = self.attacks(roller)?;
        for attack in attacks.by_ref() {
            writeln!(out, "{attack}")?;
        }

        let totals = attacks.into_totals();
        write!(out, "{totals}")?;
        Ok(totals)
    }
}

/// Iterator over the attacks of an [`AttackConfig`], see [`AttackConfig::attacks`].
///
/// Damage of every hit is added to the totals as the attacks are rolled.
pub struct Attacks<'a, R> {
    config: &'a AttackConfig,
    roller: &'a mut R,
    defense_value: u32,
    remaining: u32,
    number: usize,
    totals: DamageTotals,
}

impl<R: DieRoller> Attacks<'_, R> {
    /// Damage dealt by the attacks rolled so far.
    pub fn totals(&self) -> &DamageTotals {
        &self.totals
    }

    pub fn into_totals(self) -> DamageTotals {
        self.totals
    }

    fn roll_attack(&mut self, natural: u32, total: i64) -> AttackOutcome {
        let config = self.config;

        if natural == CRITICAL_MISS {
            return AttackOutcome::Miss { critical: true };
        }
        if total < i64::from(self.defense_value) && natural != D20 {
            return AttackOutcome::Miss { critical: false };
        }

        let critical = natural >= config.critical_threshold;
        let multiplier = if critical { CRITICAL_MULTIPLIER } else { 1 };

        let damage = config
            .damage_terms
            .iter()
            .map(|term| {
                let amount = term.roll_damage(multiplier, &mut *self.roller);
                self.totals.add(&term.type_label, amount);
                TermDamage {
                    amount,
                    type_label: term.type_label.clone(),
                }
            })
            .collect();

        AttackOutcome::Hit { critical, damage }
    }
}

impl<R: DieRoller> Iterator for Attacks<'_, R> {
    type Item = AttackRoll;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.number += 1;

        // The mode was checked when the iterator was created.
        let natural = self.config.advantage_mode.roll_d20(&mut *self.roller)?;
        let total = i64::from(natural) + i64::from(self.config.attack_modifier);
        let outcome = self.roll_attack(natural, total);

        trace!(number = self.number, natural, total, ?outcome, "rolled attack");
        Some(AttackRoll {
            number: self.number,
            natural,
            total,
            outcome,
        })
    }
}

impl AttackRoll {
    /// 1-based position of the attack in its batch.
    pub fn number(&self) -> usize {
        self.number
    }
    /// The d20 that was kept, before the attack modifier.
    pub fn natural(&self) -> u32 {
        self.natural
    }
    /// Natural roll plus attack modifier.
    pub fn total(&self) -> i64 {
        self.total
    }
    pub fn outcome(&self) -> &AttackOutcome {
        &self.outcome
    }
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, AttackOutcome::Hit { .. })
    }
    /// Damage dealt by this attack over every type.
    pub fn damage(&self) -> i64 {
        match &self.outcome {
            AttackOutcome::Hit { damage, .. } => damage.iter().map(|d| d.amount).sum(),
            AttackOutcome::Miss { .. } => 0,
        }
    }
}

impl RollReport {
    pub fn attacks(&self) -> &[AttackRoll] {
        &self.attacks
    }
    pub fn totals(&self) -> &DamageTotals {
        &self.totals
    }
    pub fn hits(&self) -> usize {
        self.attacks.iter().filter(|a| a.is_hit()).count()
    }
}

impl std::fmt::Display for TermDamage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.type_label)
    }
}

impl std::fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttackOutcome::Hit { critical, damage } => {
                let parts = damage
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(" + ");
                write!(f, "{parts} Damage")?;
                if *critical {
                    write!(f, " (Critical Hit)")?;
                }
                Ok(())
            }
            AttackOutcome::Miss { critical } => {
                write!(f, "Missed")?;
                if *critical {
                    write!(f, " (Critical Miss)")?;
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for AttackRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Attack {}: {}", self.number, self.outcome)
    }
}

impl std::fmt::Display for RollReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for attack in &self.attacks {
            writeln!(f, "{attack}")?;
        }
        write!(f, "{}", self.totals)
    }
}
