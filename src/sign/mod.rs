// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Partial signing and signature merging.
//!
//! Each party raises the same deterministically encoded message to its own
//! share exponent. A unanimous shard yields one block, `m^d_i (mod n)`. A
//! threshold shard yields two blocks, `m^x (mod n)` followed by `m^y (mod n)`,
//! one per stored half. The merger multiplies the blocks from all parties
//! back together and picks out the combination whose `e`-th power carries
//! PKCS#1 v1.5 framing.

mod merge;

pub use merge::{merge, PartialSignature};

use crate::{
    errors::Result,
    keygen::KeyShard,
    pkcs1v15,
    utils::{modpow, to_padded_bytes},
};
use unknown_order::BigNumber;

/// Produce this shard's partial signature over `message`.
///
/// Returns one raw block for a unanimous shard and two concatenated raw
/// blocks for a threshold shard.
pub fn partial_sign(shard: &KeyShard, message: &[u8]) -> Result<Vec<u8>> {
    let public = shard.public();
    let n = public.modulus();
    let block_length = public.block_length();

    let em = pkcs1v15::encode(message, block_length)?;
    let m = BigNumber::from_slice(&em);

    if shard.is_threshold() {
        let mut out = Vec::with_capacity(2 * block_length);
        for exponent in [&shard.p, &shard.q] {
            out.extend_from_slice(&to_padded_bytes(&modpow(&m, exponent, n), block_length)?);
        }
        Ok(out)
    } else {
        to_padded_bytes(&modpow(&m, &shard.d, n), block_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        keygen,
        tshare,
        utils::testing::{init_testing, shared_keypair},
    };

    const MESSAGE: &[u8] = b"The Magic Words are Squeamish Ossifrage\n";

    #[test]
    fn unanimous_partials_are_one_block() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = keygen::deal(pair.public(), pair.secret(), 2, &mut rng).unwrap();
        let partial = partial_sign(&shards[0], MESSAGE).unwrap();
        assert_eq!(partial.len(), pair.public().block_length());
    }

    #[test]
    fn threshold_partials_are_two_blocks() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = tshare::deal(pair.public(), pair.secret(), &mut rng).unwrap();
        let partial = partial_sign(&shards[0], MESSAGE).unwrap();
        assert_eq!(partial.len(), 2 * pair.public().block_length());
    }

    #[test]
    fn single_shard_output_is_a_complete_signature_for_one_party() {
        // Dealing to one party degenerates into ordinary RSA signing.
        let mut rng = init_testing();
        let pair = shared_keypair();
        let shards = keygen::deal(pair.public(), pair.secret(), 1, &mut rng).unwrap();
        let partial = partial_sign(&shards[0], MESSAGE).unwrap();

        let n = pair.public().modulus();
        let s = BigNumber::from_slice(&partial);
        let recovered = to_padded_bytes(
            &modpow(&s, pair.public().exponent(), n),
            pair.public().block_length(),
        )
        .unwrap();
        let em = pkcs1v15::encode(MESSAGE, pair.public().block_length()).unwrap();
        assert_eq!(recovered, em);
    }
}
