use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use attack_roller::{
    block::{roll_batch, TerminalPrompt},
    AttackConfig, DamageSyntax, Field,
};
use clap::{CommandFactory, Parser};
use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;

const FILE_FORMAT: &str = "\
File formatting:
  attacks:<amount of attacks>     format: integer greater than 0
  modifier:<attack modifier>      format: integer
  crit range:<crit range>         format: integer between 1 and 20
  damage:<damage format>          format: 1d6 + 7 piercing + 1d6 poison
  ac:<ac>                         format: integer greater than 0
  attack type:<attack type>       format: A or a for Advantage, D or d for Disadvantage, N or n for Normal

Above values can be in any order.
\"attacks\" and \"damage\" must be present, \"ac\" and \"attack type\" are asked for when missing.
Blocks are separated by an empty line, there can be any number of blocks in a file.";

/// Roll attacks against a target and total the damage by type.
///
/// Without any argument every value is asked for interactively.
#[derive(Debug, Parser)]
#[command(name = "attack-roller", version, after_help = FILE_FORMAT)]
struct Cli {
    /// Damage of a hit (format: 1d6 + 7 piercing + 1d6 poison)
    #[arg(long, value_name = "DMG")]
    damage: Option<String>,

    /// Attack modifier added to the d20
    #[arg(long, value_name = "MOD", allow_hyphen_values = true)]
    modifier: Option<String>,

    /// Number of attacks
    #[arg(long, value_name = "COUNT")]
    attack_count: Option<String>,

    /// Armor class of the target
    #[arg(long, value_name = "AC", alias = "armor-class")]
    ac: Option<String>,

    /// A for advantage, D for disadvantage, N for normal
    #[arg(long, value_name = "TYPE")]
    attack_type: Option<String>,

    /// Lowest natural roll that is a critical hit (default is 20)
    #[arg(long, value_name = "RANGE")]
    crit_range: Option<String>,

    /// Seed for the dice, every run with the same seed rolls the same values
    #[arg(long, env = "ATTACK_ROLLER_SEED")]
    seed: Option<u64>,

    /// Reject damage expressions with anything other than terms separated by `+`
    #[arg(long)]
    strict_damage: bool,

    /// Files with attack blocks to roll
    files: Vec<PathBuf>,
}

impl Cli {
    fn syntax(&self) -> DamageSyntax {
        if self.strict_damage {
            DamageSyntax::Strict
        } else {
            DamageSyntax::Lenient
        }
    }

    fn flags(&self) -> [(Field, Option<&String>); 6] {
        [
            (Field::AttackCount, self.attack_count.as_ref()),
            (Field::AttackModifier, self.modifier.as_ref()),
            (Field::AdvantageMode, self.attack_type.as_ref()),
            (Field::CriticalThreshold, self.crit_range.as_ref()),
            (Field::Damage, self.damage.as_ref()),
            (Field::DefenseValue, self.ac.as_ref()),
        ]
    }

    /// Fills an attack from whichever flags were given.
    fn config(&self) -> attack_roller::Result<AttackConfig> {
        let mut config = AttackConfig::manual();
        for (field, value) in self.flags() {
            if let Some(value) = value {
                config.apply(field, value, self.syntax())?;
            }
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let interactive = std::env::args_os().len() == 1;
    let cli = Cli::parse();

    match run(&cli, interactive) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let _ = Cli::command().print_help();
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, interactive: bool) -> Result<()> {
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    debug!(seed = ?cli.seed, files = cli.files.len(), interactive, "starting run");
    let mut prompt = TerminalPrompt::stdio().with_syntax(cli.syntax());
    let mut out = std::io::stdout().lock();

    if interactive {
        let config = prompt.ask_config()?;
        writeln!(out, "Rolling dice...")?;
        config.roll_into(&mut rng, &mut out)?;
        return Ok(());
    }

    let failures = roll_batch(
        &cli.config()?,
        &cli.files,
        cli.syntax(),
        &mut prompt,
        &mut rng,
        &mut out,
    )?;

    let failed = failures.len();
    for failure in failures {
        eprintln!("Error: {:#}", anyhow::Error::new(failure));
    }
    if failed > 0 {
        bail!("{failed} of {} file(s) could not be rolled", cli.files.len());
    }
    Ok(())
}
