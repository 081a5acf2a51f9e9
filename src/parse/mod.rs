mod config;
mod damage;

pub use config::*;

/// Highest value of the die used for attack rolls.
pub const D20: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One component of a damage expression, e.g. `2d8 - 3 fire`.
pub struct DamageTerm {
    pub(crate) dice_count: u32,
    pub(crate) dice_sides: u32,
    pub(crate) flat_modifier: i32,
    pub(crate) type_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvantageMode {
    /// Not provided yet, the block reader asks for it before rolling.
    #[default]
    Unset,
    /// Roll a single d20.
    Normal,
    /// Roll two d20 and keep the highest.
    Advantage,
    /// Roll two d20 and keep the lowest.
    Disadvantage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How strictly damage expressions are read.
pub enum DamageSyntax {
    /// Scan the text for terms, anything in between them is ignored.
    #[default]
    Lenient,
    /// The whole text must be terms separated by `+`.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything needed to roll one batch of attacks.
///
/// A config is filled field by field, in any order, from flags, prompts or
/// file lines through [`AttackConfig::apply`]. Missing fields are `None`
/// until they are provided.
pub struct AttackConfig {
    pub(crate) defense_value: Option<u32>,
    pub(crate) attack_count: Option<u32>,
    pub(crate) attack_modifier: i32,
    pub(crate) advantage_mode: AdvantageMode,
    pub(crate) critical_threshold: u32,
    pub(crate) damage_terms: Vec<DamageTerm>,
    pub(crate) fresh: bool,
}

impl DamageTerm {
    /// Creates a new damage term.
    /// Dice count and sides are raised to 1 if 0 is passed in, the damage
    /// parser rejects such terms instead.
    pub fn new(dice_count: u32, dice_sides: u32, flat_modifier: i32, type_label: &str) -> Self {
        Self {
            dice_count: dice_count.max(1),
            dice_sides: dice_sides.max(1),
            flat_modifier,
            type_label: type_label.to_string(),
        }
    }

    pub fn dice_count(&self) -> u32 {
        self.dice_count
    }
    pub fn dice_sides(&self) -> u32 {
        self.dice_sides
    }
    pub fn flat_modifier(&self) -> i32 {
        self.flat_modifier
    }
    pub fn type_label(&self) -> &str {
        &self.type_label
    }
}

impl AttackConfig {
    /// An empty config as read from a file: the advantage mode is left unset
    /// so it can be asked for before rolling.
    pub fn new() -> Self {
        Self {
            defense_value: None,
            attack_count: None,
            attack_modifier: 0,
            advantage_mode: AdvantageMode::Unset,
            critical_threshold: D20,
            damage_terms: Vec::new(),
            fresh: true,
        }
    }

    /// An empty config for attacks entered through flags or prompts, those
    /// default to a normal roll.
    pub fn manual() -> Self {
        Self {
            advantage_mode: AdvantageMode::Normal,
            ..Self::new()
        }
    }

    pub fn with_defense_value(mut self, defense_value: u32) -> Self {
        self.defense_value = Some(defense_value);
        self.fresh = false;
        self
    }
    pub fn with_attack_count(mut self, attack_count: u32) -> Self {
        self.attack_count = Some(attack_count);
        self.fresh = false;
        self
    }
    pub fn with_attack_modifier(mut self, attack_modifier: i32) -> Self {
        self.attack_modifier = attack_modifier;
        self.fresh = false;
        self
    }
    pub fn with_advantage_mode(mut self, advantage_mode: AdvantageMode) -> Self {
        self.advantage_mode = advantage_mode;
        self.fresh = false;
        self
    }
    /// The threshold is clamped between 1 and 20, [`AttackConfig::apply`]
    /// rejects values outside that range instead.
    pub fn with_critical_threshold(mut self, critical_threshold: u32) -> Self {
        self.critical_threshold = critical_threshold.clamp(1, D20);
        self.fresh = false;
        self
    }
    pub fn with_damage(mut self, terms: impl IntoIterator<Item = DamageTerm>) -> Self {
        self.damage_terms.extend(terms);
        self.fresh = false;
        self
    }

    pub fn defense_value(&self) -> Option<u32> {
        self.defense_value
    }
    pub fn attack_count(&self) -> Option<u32> {
        self.attack_count
    }
    pub fn attack_modifier(&self) -> i32 {
        self.attack_modifier
    }
    pub fn advantage_mode(&self) -> AdvantageMode {
        self.advantage_mode
    }
    pub fn critical_threshold(&self) -> u32 {
        self.critical_threshold
    }
    pub fn damage_terms(&self) -> &[DamageTerm] {
        &self.damage_terms
    }
    /// True until the first field has been set.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DamageTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.dice_count, self.dice_sides)?;
        match self.flat_modifier {
            0 => {}
            m if m < 0 => write!(f, " - {}", m.unsigned_abs())?,
            m => write!(f, " + {m}")?,
        }
        write!(f, " {}", self.type_label)
    }
}

impl std::fmt::Display for AdvantageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            AdvantageMode::Unset => "unset",
            AdvantageMode::Normal => "normal",
            AdvantageMode::Advantage => "advantage",
            AdvantageMode::Disadvantage => "disadvantage",
        };
        write!(f, "{str}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_clamp_what_parsing_rejects() {
        let term = DamageTerm::new(0, 0, 2, "fire");
        assert_eq!((term.dice_count(), term.dice_sides()), (1, 1));
        assert!(DamageTerm::parse_all("0d0 + 2 fire").is_err());

        let config = AttackConfig::manual().with_critical_threshold(25);
        assert_eq!(config.critical_threshold(), D20);
        assert_eq!(config.with_critical_threshold(0).critical_threshold(), 1);

        let mut config = AttackConfig::manual();
        assert!(config
            .apply(Field::CriticalThreshold, "25", DamageSyntax::Lenient)
            .is_err());
        assert_eq!(config.critical_threshold(), D20);
    }
}
