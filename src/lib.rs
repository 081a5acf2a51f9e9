//! Resolve tabletop attack rolls and total their damage by type.
//!
//! ```rust
//! # use attack_roller::{parse_damage, roll_with, AttackConfig, AdvantageMode};
//! # use rand::rngs::StdRng;
//! # use rand::SeedableRng;
//! #
//! # fn main() -> Result<(), attack_roller::Error> {
//! // Two attacks at +7 with advantage against AC 15.
//! let config = AttackConfig::manual()
//!     .with_attack_count(2)
//!     .with_attack_modifier(7)
//!     .with_advantage_mode(AdvantageMode::Advantage)
//!     .with_defense_value(15)
//!     .with_damage(parse_damage("1d8 + 4 slashing + 1d6 fire")?);
//!
//! // Use a custom Rng that implements the rand::Rng trait
//! let mut rng = StdRng::seed_from_u64(1);
//! let report = roll_with(&config, &mut rng)?;
//! assert_eq!(report.attacks().len(), 2);
//!
//! // Prints each attack followed by the damage totals, e.g.
//! // Attack 1: 6 slashing + 4 fire Damage
//! // Attack 2: Missed
//! // Total Damage:
//! // 4 fire Damage
//! // 6 slashing Damage
//! print!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! Attacks can also be read in blocks from a file, see [`block`].

pub mod block;
mod error;
mod evaluate;
mod parse;

pub use error::{Error, Result};
pub use evaluate::attack::{
    AttackOutcome, AttackRoll, Attacks, RollReport, TermDamage, CRITICAL_MISS,
    CRITICAL_MULTIPLIER,
};
pub use evaluate::dice::DieRoller;
pub use evaluate::totals::DamageTotals;
pub use parse::{AdvantageMode, AttackConfig, DamageSyntax, DamageTerm, Field, D20};

/// Parses every damage term found in the expression, e.g. `1d6 + 7 piercing + 1d6 poison`.
pub fn parse_damage(expression: &str) -> Result<Vec<DamageTerm>> {
    DamageTerm::parse_all(expression)
}

/// Rolls every attack of the config.
pub fn roll(config: &AttackConfig) -> Result<RollReport> {
    config.resolve(&mut rand::thread_rng())
}

/// Same as `roll()` but allows you to choose the rng, or any [`DieRoller`],
/// you prefer to use.
pub fn roll_with(config: &AttackConfig, roller: &mut impl DieRoller) -> Result<RollReport> {
    config.resolve(roller)
}
