pub mod attack;
pub mod dice;
pub mod totals;
