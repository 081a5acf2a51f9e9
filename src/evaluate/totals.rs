use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Damage accumulated per damage type over one batch of attacks.
/// Types are kept sorted by label, labels are case sensitive.
pub struct DamageTotals {
    totals: BTreeMap<String, i64>,
}

impl DamageTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, type_label: &str, amount: i64) {
        *self.totals.entry(type_label.to_string()).or_insert(0) += amount;
    }

    pub fn get(&self, type_label: &str) -> Option<i64> {
        self.totals.get(type_label).copied()
    }

    /// Damage summed over every type.
    pub fn grand_total(&self) -> i64 {
        self.totals.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.totals.iter().map(|(label, amount)| (label.as_str(), *amount))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl std::fmt::Display for DamageTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total Damage:")?;
        for (label, amount) in self.iter() {
            writeln!(f, "{amount} {label} Damage")?;
        }
        Ok(())
    }
}
