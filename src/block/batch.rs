use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use super::{roll_file, Prompt};
use crate::error::{Error, Result};
use crate::evaluate::dice::DieRoller;
use crate::parse::{AttackConfig, DamageSyntax};

#[derive(Debug, Error)]
#[error("failed to roll {}", .path.display())]
/// A file of a batch that could not be rolled.
pub struct FileFailure {
    pub path: PathBuf,
    #[source]
    pub error: Error,
}

/// Rolls the attack described by `flags`, then every file in order.
///
/// The flags are rolled only when they describe a whole attack. Without any
/// file they have to. Every file must exist before anything is rolled. A file
/// that fails is returned in the failures and the next file is still rolled.
pub fn roll_batch(
    flags: &AttackConfig,
    files: &[PathBuf],
    syntax: DamageSyntax,
    prompt: &mut impl Prompt,
    roller: &mut impl DieRoller,
    out: &mut impl Write,
) -> Result<Vec<FileFailure>> {
    if let Some(missing) = files.iter().find(|path| !path.exists()) {
        return Err(Error::FileNotFound(missing.clone()));
    }

    match flags.ensure_complete(None) {
        Ok(()) => {
            writeln!(out, "Rolling dice...")?;
            flags.roll_into(roller, out)?;
        }
        Err(_) if !files.is_empty() => debug!("flags incomplete, rolling files only"),
        Err(err) => return Err(err),
    }

    let mut failures = Vec::new();
    for path in files {
        writeln!(out, "Rolling dice of file: {}...", path.display())?;
        let rolled = roll_file(path, syntax, prompt, roller, out);
        writeln!(out)?;

        if let Err(error) = rolled {
            warn!(path = %path.display(), %error, "file could not be rolled");
            failures.push(FileFailure {
                path: path.clone(),
                error,
            });
        }
    }

    Ok(failures)
}
