// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::errors::{InternalError, Result};
use rand::{CryptoRng, RngCore};
use tracing::error;
use unknown_order::BigNumber;

pub(crate) const CRYPTOGRAPHIC_RETRY_MAX: usize = 500usize;

/// Compute a^e (mod n).
pub(crate) fn modpow(a: &BigNumber, e: &BigNumber, n: &BigNumber) -> BigNumber {
    a.modpow(e, n)
}

/// Sample a number uniformly at random from the range `[0, 2^bits)`.
pub(crate) fn random_by_size<R: RngCore + CryptoRng>(rng: &mut R, bits: usize) -> BigNumber {
    // `from_rng()` samples the open interval below the bound, which is
    // exactly the range we want for a power-of-two bound.
    let bound = BigNumber::one() << bits;
    BigNumber::from_rng(&bound, rng)
}

/// Render a non-negative number as exactly `len` big-endian bytes, left-padded
/// with zeros.
///
/// Fails if the value does not fit, which would mean a signature or encoded
/// message escaped its modulus.
pub(crate) fn to_padded_bytes(x: &BigNumber, len: usize) -> Result<Vec<u8>> {
    let bytes = x.to_bytes();
    if bytes.len() > len {
        error!(
            "cannot render a {}-byte value into {} bytes",
            bytes.len(),
            len
        );
        return Err(InternalError::InternalInvariantFailed);
    }
    let mut out = vec![0u8; len];
    out[len - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// Minimal big-endian encoding of a non-negative number, as expected for the
/// content octets of a DER INTEGER. Zero is a single zero byte.
pub(crate) fn to_uint_bytes(x: &BigNumber) -> Vec<u8> {
    let bytes = x.to_bytes();
    match bytes.iter().position(|&b| b != 0) {
        Some(i) => bytes[i..].to_vec(),
        None => vec![0u8],
    }
}


////////////////////////////
// Test Utility Functions //
////////////////////////////

#[cfg(test)]
pub(crate) mod testing {
    use crate::keygen::KeyPair;
    use once_cell::sync::Lazy;
    use rand::{
        rngs::{OsRng, StdRng},
        Rng, SeedableRng,
    };

    /// Returns an rng to be used for testing. This will print the rng seed
    /// to stderr so that if a test fails, the failing seed can be recovered
    /// and used for debugging.
    pub(crate) fn init_testing() -> StdRng {
        let mut seeder = OsRng;
        let seed = seeder.gen();
        eprintln!(
            "To re-run test with the same randomness, use init_testing_with_seed() with the following seed:"
        );
        eprintln!("\t{seed:?}");
        StdRng::from_seed(seed)
    }

    /// A seeded version of [`init_testing`]. Use this to reproduce a run that
    /// failed under a specific RNG seed.
    #[allow(unused)]
    pub(crate) fn init_testing_with_seed(seed: [u8; 32]) -> StdRng {
        StdRng::from_seed(seed)
    }

    static KEYPAIR: Lazy<KeyPair> =
        Lazy::new(|| KeyPair::generate(&mut OsRng).expect("RSA key generation failed"));

    /// A 2048-bit key pair shared across the test suite. Generating RSA keys
    /// is far too slow to repeat in every test.
    pub(crate) fn shared_keypair() -> &'static KeyPair {
        &KEYPAIR
    }
}
