use rand::Rng;

use crate::parse::{AdvantageMode, DamageTerm, D20};

/// Source of die rolls used while resolving attacks.
///
/// Every [`rand::Rng`] is a `DieRoller`, implement it yourself to script the
/// values that come up.
pub trait DieRoller {
    /// Rolls a single die, returning a value between 1 and `sides`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl<R: Rng> DieRoller for R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.gen_range(1..=sides.max(1))
    }
}

impl AdvantageMode {
    /// Rolls the d20 for an attack, twice when rolling with advantage or
    /// disadvantage.
    /// Returns `None` if the mode was never set.
    pub fn roll_d20(self, roller: &mut impl DieRoller) -> Option<u32> {
        match self {
            AdvantageMode::Unset => None,
            AdvantageMode::Normal => Some(roller.roll_die(D20)),
            AdvantageMode::Advantage => {
                let first = roller.roll_die(D20);
                Some(first.max(roller.roll_die(D20)))
            }
            AdvantageMode::Disadvantage => {
                let first = roller.roll_die(D20);
                Some(first.min(roller.roll_die(D20)))
            }
        }
    }
}

impl DamageTerm {
    /// Rolls the dice of the term, multiplies their sum and adds the flat
    /// modifier. The modifier is never multiplied.
    pub fn roll_damage(&self, multiplier: i64, roller: &mut impl DieRoller) -> i64 {
        let dice: i64 = (0..self.dice_count)
            .map(|_| i64::from(roller.roll_die(self.dice_sides)))
            .sum();

        dice * multiplier + i64::from(self.flat_modifier)
    }
}
