//! Types and functions related to 2-of-3 threshold dealing.
//!
//! The dealer draws three uniform values r0, r1, r2 and hands party i the
//! pair `(x_i, y_i) = (r_i, d - r_{i+1})` with the index taken cyclically:
//!
//! | shard | x (stored in p) | y (stored in q) |
//! |-------|-----------------|-----------------|
//! | 0     | r0              | d - r1          |
//! | 1     | r1              | d - r2          |
//! | 2     | r2              | d - r0          |
//!
//! Any two shards i and j then admit two cross sums, `x_i + y_j` and
//! `y_i + x_j`, of which exactly one telescopes to `d`. Which one depends on
//! the pair, so reconstruction probes both; see the `keyrefresh` module.
//!
//! The halves travel in the `p` and `q` slots of the persisted RSAPrivateKey
//! structure, and the private-exponent slot carries the
//! [`THRESHOLD_MAGIC`](crate::keygen::THRESHOLD_MAGIC) sentinel so signers
//! and the re-splitter can tell the two sharing modes apart.
// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    errors::{CallerError, Result},
    keygen::{KeyShard, PublicKey, SecretExponent},
    utils::{random_by_size, CRYPTOGRAPHIC_RETRY_MAX},
};
use rand::{CryptoRng, RngCore};
use tracing::error;
use unknown_order::BigNumber;
use zeroize::Zeroize;

use crate::keygen::SHARE_BITS;

/// Number of shards in a threshold dealing.
pub const SHARE_COUNT: usize = 3;

/// Deal three threshold shards of the given private exponent.
///
/// Used both for fresh keys and for re-dealing a reconstructed exponent; the
/// two paths are indistinguishable from the shards alone.
pub fn deal<R: RngCore + CryptoRng>(
    public: &PublicKey,
    secret: &SecretExponent,
    rng: &mut R,
) -> Result<[KeyShard; SHARE_COUNT]> {
    let d = secret.as_ref();

    for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
        let mut r: Vec<BigNumber> = (0..SHARE_COUNT)
            .map(|_| random_by_size(rng, SHARE_BITS))
            .collect();
        let mut y: Vec<BigNumber> = (0..SHARE_COUNT)
            .map(|i| d - &r[(i + 1) % SHARE_COUNT])
            .collect();

        // The draw bound keeps each r a couple hundred bits below d, so a
        // negative half can only happen for an atypically small exponent.
        if y.iter().any(|half| half < &BigNumber::zero()) {
            for value in r.iter_mut().chain(y.iter_mut()) {
                value.zeroize();
            }
            continue;
        }

        let shards =
            [0, 1, 2].map(|i| KeyShard::threshold(public, r[i].clone(), y[i].clone()));
        for value in r.iter_mut().chain(y.iter_mut()) {
            value.zeroize();
        }
        return Ok(shards);
    }

    error!("could not find a non-negative threshold split of the private exponent");
    Err(CallerError::RetryFailed)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{init_testing, shared_keypair};

    #[test]
    fn every_pair_reveals_the_exponent_exactly_once() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = deal(pair.public(), pair.secret(), &mut rng).unwrap();
        let d = pair.secret().as_ref();

        for i in 0..SHARE_COUNT {
            for j in 0..SHARE_COUNT {
                if i == j {
                    continue;
                }
                let da = &shards[i].p + &shards[j].q;
                let db = &shards[i].q + &shards[j].p;
                let hits = usize::from(&da == d) + usize::from(&db == d);
                assert_eq!(hits, 1, "pair ({i}, {j})");
            }
        }
    }

    #[test]
    fn threshold_shards_are_marked_and_crt_free() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = deal(pair.public(), pair.secret(), &mut rng).unwrap();
        for shard in &shards {
            assert!(shard.is_threshold());
            assert_eq!(shard.dp, BigNumber::zero());
            assert_eq!(shard.dq, BigNumber::zero());
            assert_eq!(shard.qinv, BigNumber::zero());
            assert_eq!(&shard.public(), pair.public());
        }
    }

    #[test]
    fn no_single_shard_reveals_the_exponent() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = deal(pair.public(), pair.secret(), &mut rng).unwrap();
        let d = pair.secret().as_ref();
        for shard in &shards {
            assert_ne!(&shard.p, d);
            assert_ne!(&shard.q, d);
            assert_ne!(&(&shard.p + &shard.q), d);
        }
    }

    #[test]
    fn redealings_are_independent() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let first = deal(pair.public(), pair.secret(), &mut rng).unwrap();
        let second = deal(pair.public(), pair.secret(), &mut rng).unwrap();
        assert_ne!(first[0].p, second[0].p);
    }
}
