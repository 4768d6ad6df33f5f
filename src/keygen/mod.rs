//! Types and functions related to RSA key generation and unanimous dealing.
//!
//! A trusted dealer produces a standard 2048-bit RSA key pair and splits the
//! private exponent `d` into N additive shares, one per party. The split is a
//! plain integer sum: shares 0 through N-2 are drawn uniformly from
//! `[0, 2^(8*(block_length-2)))` and the last share carries the remainder
//! `d - sum`. No reduction modulo lambda(n) is applied. At signing time each
//! share is used as a bare exponent, so the product of the partial signatures
//! is `m^(sum of shares) = m^d (mod n)` and the missing reduction never
//! matters.
//!
//! The draw bound leaves the partial sum a few hundred bits below `d`, which
//! keeps the remainder positive; the dealer redraws in the rare case it is
//! not, so every persisted share is a non-negative integer.
// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

mod keyshare;

pub use keyshare::{KeyShard, PublicKey, SecretExponent, THRESHOLD_MAGIC};
pub(crate) use keyshare::threshold_magic;

use crate::{
    errors::{CallerError, Result},
    utils::{random_by_size, CRYPTOGRAPHIC_RETRY_MAX},
};
use rand::{CryptoRng, RngCore};
use tracing::error;
use unknown_order::BigNumber;
use zeroize::Zeroize;

/// Fixed RSA modulus size.
pub const MODULUS_BITS: usize = 2048;

/// Size of every raw signature block, in bytes.
pub const BLOCK_LENGTH: usize = MODULUS_BITS / 8;

/// Fixed public exponent (F4).
pub const PUBLIC_EXPONENT: u64 = 65537;

/// Upper bound on the number of parties in unanimous mode.
pub const MAX_SHARES: usize = 16;

/// Width of every uniformly drawn share. Two bytes short of a full block, so
/// even sixteen draws sum to far less than the private exponent.
pub(crate) const SHARE_BITS: usize = 8 * (BLOCK_LENGTH - 2);

/// A freshly generated RSA key pair.
///
/// The private exponent exists only inside the dealer; it is wiped when the
/// pair is dropped and is never written anywhere.
#[derive(Debug)]
pub struct KeyPair {
    public: PublicKey,
    secret: SecretExponent,
}

impl KeyPair {
    /// Generate a 2048-bit RSA key pair with `e = 65537`.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let e = BigNumber::from(PUBLIC_EXPONENT);
        let min_modulus = BigNumber::one() << (MODULUS_BITS - 1);

        for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
            let mut p = BigNumber::prime_from_rng(MODULUS_BITS / 2, rng);
            let mut q = BigNumber::prime_from_rng(MODULUS_BITS / 2, rng);
            if p == q {
                p.zeroize();
                q.zeroize();
                continue;
            }

            let n = &p * &q;
            // Insist on a full 2048-bit modulus so every signature block is
            // exactly BLOCK_LENGTH bytes.
            if n < min_modulus {
                p.zeroize();
                q.zeroize();
                continue;
            }

            let mut p_minus_one = &p - &BigNumber::one();
            let mut q_minus_one = &q - &BigNumber::one();
            let mut lambda = p_minus_one.lcm(&q_minus_one);
            let d = e.invert(&lambda);

            p.zeroize();
            q.zeroize();
            p_minus_one.zeroize();
            q_minus_one.zeroize();
            lambda.zeroize();

            // e is prime, so it divides lambda(n) only with negligible
            // probability. Retry with fresh primes if it does.
            if let Some(d) = d {
                return Ok(KeyPair {
                    public: PublicKey::new(n, e),
                    secret: SecretExponent::new(d),
                });
            }
        }

        error!("failed to generate an RSA key pair after {CRYPTOGRAPHIC_RETRY_MAX} attempts");
        Err(CallerError::RetryFailed)?
    }

    /// Assemble a key pair from a public key and a reconstructed exponent.
    pub fn from_parts(public: PublicKey, secret: SecretExponent) -> Self {
        Self { public, secret }
    }

    /// The public half of this key.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// The private exponent.
    pub fn secret(&self) -> &SecretExponent {
        &self.secret
    }
}

/// Split the private exponent into `shares` additive parts, one shard per
/// party.
///
/// Fails with [`CallerError::TooManyShares`] unless `1 <= shares <= 16`.
pub fn deal<R: RngCore + CryptoRng>(
    public: &PublicKey,
    secret: &SecretExponent,
    shares: usize,
    rng: &mut R,
) -> Result<Vec<KeyShard>> {
    if shares == 0 || shares > MAX_SHARES {
        error!("cannot deal {shares} shares; the supported range is 1 through {MAX_SHARES}");
        Err(CallerError::TooManyShares)?;
    }

    let d = secret.as_ref();
    for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
        let mut parts: Vec<BigNumber> = (0..shares - 1)
            .map(|_| random_by_size(rng, SHARE_BITS))
            .collect();

        let mut sum = parts
            .iter()
            .fold(BigNumber::zero(), |sum, part| sum + part.clone());
        let remainder = d - &sum;
        sum.zeroize();

        if remainder < BigNumber::zero() {
            // The draws overshot the exponent. Possible only for an
            // atypically small d, and even then vanishingly rare.
            for part in parts.iter_mut() {
                part.zeroize();
            }
            continue;
        }

        parts.push(remainder);
        let shards = parts
            .iter()
            .map(|part| KeyShard::unanimous(public, part.clone()))
            .collect();
        for part in parts.iter_mut() {
            part.zeroize();
        }
        return Ok(shards);
    }

    error!("could not find a non-negative additive split of the private exponent");
    Err(CallerError::RetryFailed)?
}
