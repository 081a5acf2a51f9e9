use rand::{rngs::StdRng, SeedableRng};

use attack_roller::{
    parse_damage, roll, roll_with, AdvantageMode, AttackConfig, AttackOutcome, Error, Field,
    CRITICAL_MISS, D20,
};

fn test_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn config(mode: AdvantageMode) -> AttackConfig {
    AttackConfig::manual()
        .with_attack_count(50)
        .with_attack_modifier(4)
        .with_advantage_mode(mode)
        .with_critical_threshold(19)
        .with_defense_value(14)
        .with_damage(parse_damage("1d6 + 7 piercing + 1d6 poison").unwrap())
}

#[test]
fn test_hit_rules_hold_for_every_attack() {
    for mode in [
        AdvantageMode::Normal,
        AdvantageMode::Advantage,
        AdvantageMode::Disadvantage,
    ] {
        let config = config(mode);
        for seed in 0..20 {
            let report = roll_with(&config, &mut test_rng(seed)).unwrap();
            assert_eq!(report.attacks().len(), 50);

            for attack in report.attacks() {
                assert!((1..=D20).contains(&attack.natural()));
                assert_eq!(attack.total(), i64::from(attack.natural()) + 4);

                let should_hit = attack.natural() != CRITICAL_MISS
                    && (attack.total() >= 14 || attack.natural() == D20);
                assert_eq!(attack.is_hit(), should_hit, "{attack:?}");

                match attack.outcome() {
                    AttackOutcome::Hit { critical, damage } => {
                        assert_eq!(*critical, attack.natural() >= 19);
                        let multiplier = if *critical { 2 } else { 1 };
                        assert!((multiplier + 7..=6 * multiplier + 7).contains(&damage[0].amount));
                        assert!((multiplier..=6 * multiplier).contains(&damage[1].amount));
                    }
                    AttackOutcome::Miss { critical } => {
                        assert_eq!(*critical, attack.natural() == CRITICAL_MISS);
                    }
                }
            }
        }
    }
}

#[test]
fn test_totals_match_attacks() {
    let report = roll_with(&config(AdvantageMode::Advantage), &mut test_rng(7)).unwrap();

    let dealt: i64 = report.attacks().iter().map(|a| a.damage()).sum();
    assert_eq!(report.totals().grand_total(), dealt);
    assert_eq!(
        report.to_string().lines().count(),
        50 + 1 + report.totals().len()
    );
}

#[test]
fn test_same_seed_same_rolls() {
    let config = config(AdvantageMode::Normal);
    let first = roll_with(&config, &mut test_rng(42)).unwrap();
    let second = roll_with(&config, &mut test_rng(42)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_roll_with_thread_rng() {
    let report = roll(&config(AdvantageMode::Disadvantage)).unwrap();
    assert_eq!(report.attacks().len(), 50);
}

#[test]
fn test_incomplete_then_fresh_config() {
    let incomplete = AttackConfig::manual()
        .with_defense_value(12)
        .with_damage(parse_damage("1d4 fire").unwrap());
    assert!(matches!(
        roll(&incomplete),
        Err(Error::IncompleteConfiguration {
            field: Field::AttackCount,
            block: None
        })
    ));

    let fresh = incomplete.with_attack_count(1);
    assert!(roll(&fresh).is_ok());
}
