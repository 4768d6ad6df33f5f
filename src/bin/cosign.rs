// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! cosign - cooperative RSA signatures from the command line.
//!
//! One invocation performs one operation and exits. Key material moves
//! through PEM files; messages and signatures move through stdin and stdout
//! as raw bytes, so logging goes to stderr only.

use clap::{Parser, Subcommand};
use cosign::{
    keyfile, keygen, keyrefresh, sign, tshare, CallerError, KeyPair, PartialSignature, Result,
    MAX_SHARES,
};
use rand::rngs::OsRng;
use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cosign")]
#[command(about = "Cooperative RSA signatures over shared private-key shards", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSA key and deal it into N unanimous shards
    Genkey {
        /// Number of parties, between 1 and 16
        shares: usize,

        /// Prefix for the emitted .pub, .pem and -i.key files
        basename: String,
    },

    /// Deal a fresh 2-of-3 threshold key, or re-deal one from two shards
    #[command(alias = "split")]
    Threshold {
        /// Prefix for the emitted .pub, .pem and -i.key files
        basename: String,

        /// First existing threshold shard to re-deal from
        #[arg(requires = "second")]
        first: Option<PathBuf>,

        /// Second existing threshold shard to re-deal from
        second: Option<PathBuf>,
    },

    /// Produce a partial signature over stdin with one shard
    Sign {
        /// The party's key shard
        keyfile: PathBuf,
    },

    /// Combine partial signatures into one RSA signature on stdout
    Merge {
        /// The shared public key
        pubkey: PathBuf,

        /// Partial-signature files, one per party
        #[arg(required = true)]
        signatures: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Failure-site diagnostics carry the offending filename, so show errors
    // even without RUST_LOG. Never log to stdout; it is a data channel.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cosign: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Genkey { shares, basename } => cmd_genkey(shares, &basename),
        Commands::Threshold {
            basename,
            first: Some(first),
            second: Some(second),
        } => cmd_threshold_resplit(&basename, &first, &second),
        Commands::Threshold { basename, .. } => cmd_threshold_fresh(&basename),
        Commands::Sign { keyfile } => cmd_sign(&keyfile),
        Commands::Merge { pubkey, signatures } => cmd_merge(&pubkey, &signatures),
    }
}

fn cmd_genkey(shares: usize, basename: &str) -> Result<()> {
    // Check the count before paying for key generation.
    if shares == 0 || shares > MAX_SHARES {
        error!("cannot deal {shares} shares; the supported range is 1 through {MAX_SHARES}");
        Err(CallerError::TooManyShares)?;
    }

    let mut rng = OsRng;
    let pair = KeyPair::generate(&mut rng)?;
    let shards = keygen::deal(pair.public(), pair.secret(), shares, &mut rng)?;
    keyfile::write_key_set(basename, pair.public(), pair.secret(), &shards, &mut rng)
}

fn cmd_threshold_fresh(basename: &str) -> Result<()> {
    let mut rng = OsRng;
    let pair = KeyPair::generate(&mut rng)?;
    let shards = tshare::deal(pair.public(), pair.secret(), &mut rng)?;
    keyfile::write_key_set(basename, pair.public(), pair.secret(), &shards, &mut rng)
}

fn cmd_threshold_resplit(basename: &str, first: &Path, second: &Path) -> Result<()> {
    let mut rng = OsRng;

    let shard_a = keyfile::read_shard(first)?;
    if !shard_a.is_threshold() {
        error!("{}: not a threshold key", first.display());
        Err(CallerError::NotAThresholdKey)?;
    }
    let shard_b = keyfile::read_shard(second)?;
    if !shard_b.is_threshold() {
        error!("{}: not a threshold key", second.display());
        Err(CallerError::NotAThresholdKey)?;
    }

    let secret = keyrefresh::reconstruct(&shard_a, &shard_b)?;
    let public = shard_a.public();
    let shards = tshare::deal(&public, &secret, &mut rng)?;
    keyfile::write_key_set(basename, &public, &secret, &shards, &mut rng)
}

fn cmd_sign(shard_path: &Path) -> Result<()> {
    let shard = keyfile::read_shard(shard_path)?;
    let message = read_stdin()?;
    let partial = sign::partial_sign(&shard, &message)?;
    write_stdout(&partial)
}

fn cmd_merge(pubkey: &Path, signatures: &[PathBuf]) -> Result<()> {
    let public = keyfile::read_public_key(pubkey)?;
    let block_length = public.block_length();

    let mut partials = Vec::with_capacity(signatures.len());
    for path in signatures {
        let bytes = std::fs::read(path).map_err(|source| CallerError::FileAccess {
            path: path.display().to_string(),
            source,
        })?;
        let partial = PartialSignature::from_bytes(&bytes, block_length).map_err(|err| {
            error!("{}: length mismatch", path.display());
            err
        })?;
        partials.push(partial);
    }

    let signature = sign::merge(&public, &partials)?;
    write_stdout(&signature)
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut message = Vec::new();
    std::io::stdin()
        .lock()
        .read_to_end(&mut message)
        .map_err(|source| CallerError::FileAccess {
            path: "<stdin>".into(),
            source,
        })?;
    Ok(message)
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(bytes)
        .and_then(|()| out.flush())
        .map_err(|source| {
            CallerError::FileAccess {
                path: "<stdout>".into(),
                source,
            }
            .into()
        })
}
