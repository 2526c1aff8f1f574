use std::{path::PathBuf, process::ExitCode};

use cinder_crypto::{format::HashInfo, PasswordHasher, Verification};
use cinder_fs::fs::FileReadExt;
use clap::{Args, Subcommand};
use color_eyre::{eyre::eyre, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Hash a password with the configured settings.
    Hash {
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// Check a password against a stored hash.
    Verify {
        /// Base64 encoded hash.
        hash: String,
        #[command(flatten)]
        password: PasswordArgs,
    },
    /// Show the parameters embedded in a stored hash.
    Inspect {
        /// Base64 encoded hash.
        hash: String,
    },
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    /// Read from the first line of stdin when neither this nor a file is given.
    pub password: Option<String>,

    /// File whose first line is the password.
    #[arg(long, conflicts_with = "password")]
    pub password_file: Option<PathBuf>,
}

impl PasswordArgs {
    /// # Errors
    /// If the password file cannot be read or stdin is closed before a line arrives.
    pub async fn resolve(self) -> Result<String> {
        if let Some(password) = self.password {
            return Ok(password);
        }
        if let Some(path) = self.password_file {
            return Ok(path.read_secret_line().await?);
        }

        BufReader::new(tokio::io::stdin())
            .lines()
            .next_line()
            .await?
            .ok_or_else(|| eyre!("no password on stdin"))
    }
}

impl Command {
    /// Runs the command, printing results to stdout.
    ///
    /// Key derivation is CPU bound, so it runs on the blocking pool.
    ///
    /// # Errors
    /// On invalid input arguments, misconfigured hashing or a failed random source.
    /// A password that does not match is not an error, it yields a failing exit code.
    pub async fn run(self, hasher: PasswordHasher) -> Result<ExitCode> {
        match self {
            Command::Hash { password } => {
                let password = password.resolve().await?;
                let hashed =
                    tokio::task::spawn_blocking(move || hasher.hash_password(password.as_str()))
                        .await??;

                println!("{hashed}");
                Ok(ExitCode::SUCCESS)
            }
            Command::Verify { hash, password } => {
                let password = password.resolve().await?;
                let (outcome, rehashed) = tokio::task::spawn_blocking(move || {
                    verify_and_rehash(&hasher, &hash, &password)
                })
                .await??;

                println!("{outcome}");
                if let Some(rehashed) = rehashed {
                    println!("{rehashed}");
                }

                Ok(if outcome.is_success() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Command::Inspect { hash } => {
                let info = HashInfo::from_base64(hash.trim())?;
                let stale = hasher.is_stale(info.iter_count);
                if stale {
                    warn!(
                        iter_count = info.iter_count,
                        current = hasher.settings().iter_count,
                        "hash is weaker than current settings"
                    );
                }

                println!("{info}, stale: {stale}");
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Verifies, and on a stale match produces the replacement hash.
fn verify_and_rehash(
    hasher: &PasswordHasher,
    hash: &str,
    password: &str,
) -> Result<(Verification, Option<String>)> {
    let outcome = hasher.verify_hashed_password(hash.trim(), password)?;
    info!(%outcome, "verified password");

    let rehashed = match outcome {
        Verification::SuccessRehashNeeded => Some(hasher.hash_password(password)?),
        Verification::Success | Verification::Failed => None,
    };
    Ok((outcome, rehashed))
}
