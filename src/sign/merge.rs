// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    errors::{CallerError, Result},
    keygen::PublicKey,
    pkcs1v15::ENCODED_MESSAGE_PREFIX,
    utils::{modpow, to_padded_bytes},
};
use tracing::error;
use unknown_order::BigNumber;

/// One party's contribution to a merge, parsed from raw bytes.
#[derive(Debug, Clone)]
pub enum PartialSignature {
    /// A unanimous-mode block, `m^d_i (mod n)`.
    Single(BigNumber),
    /// A threshold-mode pair of blocks, `(m^x, m^y) (mod n)`.
    Pair(BigNumber, BigNumber),
}

impl PartialSignature {
    /// Classify a raw partial-signature file by its length: one block is a
    /// unanimous contribution, two blocks a threshold contribution.
    pub fn from_bytes(bytes: &[u8], block_length: usize) -> Result<Self> {
        if bytes.len() == block_length {
            Ok(Self::Single(BigNumber::from_slice(bytes)))
        } else if bytes.len() == 2 * block_length {
            Ok(Self::Pair(
                BigNumber::from_slice(&bytes[..block_length]),
                BigNumber::from_slice(&bytes[block_length..]),
            ))
        } else {
            error!(
                "a partial signature must be {} or {} bytes, not {}",
                block_length,
                2 * block_length,
                bytes.len()
            );
            Err(CallerError::SignatureLengthMismatch)?
        }
    }
}

/// Combine partial signatures into one standard RSA signature block.
///
/// Unanimous contributions multiply into a single running product. The first
/// threshold pair seeds a second running product so both cross sums of the
/// two parties' halves are pursued in parallel; the second pair multiplies in
/// crosswise. Only one of the two products can carry the true exponent, and
/// the final public-exponent check selects it: a candidate is accepted when
/// its `e`-th power starts with the `00 01 ff ff` framing every PKCS#1 v1.5
/// encoded message begins with. A third pair has no defined meaning and is
/// rejected outright.
pub fn merge(public: &PublicKey, partials: &[PartialSignature]) -> Result<Vec<u8>> {
    let n = public.modulus();
    let block_length = public.block_length();

    let mut sig0 = BigNumber::one();
    let mut sig1 = BigNumber::one();
    let mut pairs_seen = 0usize;

    for partial in partials {
        match partial {
            PartialSignature::Single(s) => {
                sig0 = (&sig0 * s).nmod(n);
            }
            PartialSignature::Pair(a, b) => {
                pairs_seen += 1;
                match pairs_seen {
                    1 => {
                        sig0 = a.clone();
                        sig1 = b.clone();
                    }
                    2 => {
                        sig0 = (&sig0 * b).nmod(n);
                        sig1 = (&sig1 * a).nmod(n);
                    }
                    _ => {
                        error!("a merge can combine at most two threshold pairs");
                        Err(CallerError::TooManyThresholdPairs)?;
                    }
                }
            }
        }
    }

    for candidate in [&sig0, &sig1] {
        let message = to_padded_bytes(&modpow(candidate, public.exponent(), n), block_length)?;
        if message.starts_with(&ENCODED_MESSAGE_PREFIX) {
            return to_padded_bytes(candidate, block_length);
        }
    }

    error!("no combination of the partial signatures carries PKCS#1 v1.5 framing");
    Err(CallerError::InvalidPartialSignatures)?
}
