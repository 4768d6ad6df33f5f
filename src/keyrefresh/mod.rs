//! Types and functions related to reconstructing and re-dealing a threshold
//! key.
//!
//! Any two of the three threshold shards determine the private exponent, but
//! which of their two cross sums is the right one depends on which pair was
//! presented. Rather than track shard indices, reconstruction probes both
//! candidates with the public exponent: the sentinel plaintext is raised to
//! `e` and then to each candidate, and the candidate that round-trips back to
//! the sentinel is the real exponent. The losing candidate is wiped.
//!
//! The reconstructed exponent lives just long enough to deal three fresh
//! shards (and to self-sign the re-issued certificate); it is never written
//! out. Fresh shards use new randomness, so partial signatures from the old
//! and new dealings do not combine.
// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    errors::{CallerError, Result},
    keygen::{threshold_magic, KeyShard, SecretExponent},
    utils::modpow,
};
use tracing::error;
use zeroize::Zeroize;

/// Recover the private exponent from two threshold shards of the same key.
///
/// Fails if either shard is not marked as threshold, if the moduli differ, or
/// if neither cross sum survives the sentinel probe.
pub fn reconstruct(first: &KeyShard, second: &KeyShard) -> Result<SecretExponent> {
    if !first.is_threshold() || !second.is_threshold() {
        error!("reconstruction needs two threshold shards");
        Err(CallerError::NotAThresholdKey)?;
    }
    if first.modulus() != second.modulus() {
        error!("the two shards belong to different public keys");
        Err(CallerError::MismatchedModuli)?;
    }

    let public = first.public();
    let n = public.modulus();
    let magic = threshold_magic();
    // c = MAGIC^e; a candidate d is correct exactly when c^d = MAGIC.
    let probe = modpow(&magic, public.exponent(), n);

    let mut da = &first.p + &second.q;
    let mut db = &first.q + &second.p;

    if modpow(&probe, &da, n) == magic {
        db.zeroize();
        return Ok(SecretExponent::new(da));
    }
    if modpow(&probe, &db, n) == magic {
        da.zeroize();
        return Ok(SecretExponent::new(db));
    }

    da.zeroize();
    db.zeroize();
    error!("neither candidate exponent survives the sentinel probe");
    Err(CallerError::ReconstructionFailed)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::InternalError,
        keygen::{KeyShard, PublicKey},
        tshare,
        utils::testing::{init_testing, shared_keypair},
    };
    use unknown_order::BigNumber;

    #[test]
    fn every_shard_pair_reconstructs() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = tshare::deal(pair.public(), pair.secret(), &mut rng).unwrap();
        for (i, j) in [(0, 1), (1, 2), (0, 2), (1, 0), (2, 1), (2, 0)] {
            let secret = reconstruct(&shards[i], &shards[j]).unwrap();
            assert_eq!(&secret, pair.secret(), "pair ({i}, {j})");
        }
    }

    #[test]
    fn redealt_shards_still_reconstruct() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = tshare::deal(pair.public(), pair.secret(), &mut rng).unwrap();
        let secret = reconstruct(&shards[0], &shards[2]).unwrap();
        let fresh = tshare::deal(pair.public(), &secret, &mut rng).unwrap();
        let again = reconstruct(&fresh[1], &fresh[2]).unwrap();
        assert_eq!(&again, pair.secret());
    }

    #[test]
    fn unanimous_shards_are_rejected() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let threshold = tshare::deal(pair.public(), pair.secret(), &mut rng).unwrap();
        let unanimous = KeyShard::unanimous(pair.public(), BigNumber::from(42u64));
        let result = reconstruct(&unanimous, &threshold[0]);
        assert!(matches!(
            result,
            Err(InternalError::CallingApplicationMistake(
                CallerError::NotAThresholdKey
            ))
        ));
    }

    #[test]
    fn mismatched_moduli_are_rejected() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = tshare::deal(pair.public(), pair.secret(), &mut rng).unwrap();
        // A threshold shard under some other modulus. It does not need to be
        // a workable key to trip the check.
        let other = PublicKey::new(
            pair.public().modulus() + &BigNumber::from(2u64),
            pair.public().exponent().clone(),
        );
        let foreign = KeyShard::threshold(&other, BigNumber::from(5u64), BigNumber::from(7u64));
        let result = reconstruct(&shards[0], &foreign);
        assert!(matches!(
            result,
            Err(InternalError::CallingApplicationMistake(
                CallerError::MismatchedModuli
            ))
        ));
    }

    #[test]
    fn corrupted_halves_fail_the_probe() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = tshare::deal(pair.public(), pair.secret(), &mut rng).unwrap();
        let mut bad = shards[1].clone();
        bad.q = &bad.q + &BigNumber::one();
        let result = reconstruct(&shards[0], &bad);
        assert!(matches!(
            result,
            Err(InternalError::CallingApplicationMistake(
                CallerError::ReconstructionFailed
            ))
        ));
    }
}
