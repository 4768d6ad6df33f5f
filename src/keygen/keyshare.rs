// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use std::fmt::Debug;
use unknown_order::BigNumber;
use zeroize::ZeroizeOnDrop;

/// Sentinel stored in the private-exponent field of threshold shards.
///
/// It doubles as the probe plaintext when two threshold shards are combined:
/// a candidate exponent `d` is accepted exactly when
/// `(MAGIC^e)^d = MAGIC (mod n)`.
pub const THRESHOLD_MAGIC: u64 = 0x2323_2323_2323_2323;

pub(crate) fn threshold_magic() -> BigNumber {
    BigNumber::from(THRESHOLD_MAGIC)
}

/// The public half of a shared RSA key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    n: BigNumber,
    e: BigNumber,
}

impl PublicKey {
    pub(crate) fn new(n: BigNumber, e: BigNumber) -> Self {
        Self { n, e }
    }

    /// The modulus `n`.
    pub fn modulus(&self) -> &BigNumber {
        &self.n
    }

    /// The public exponent `e`.
    pub fn exponent(&self) -> &BigNumber {
        &self.e
    }

    /// Size of a raw signature block under this key, in bytes.
    pub fn block_length(&self) -> usize {
        self.n.to_bytes().len()
    }
}

/// The full private exponent `d`.
///
/// This exists only inside the dealer and the re-splitter. It is wiped on
/// drop and is never serialized.
#[derive(Clone, ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretExponent {
    d: BigNumber,
}

impl Debug for SecretExponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretExponent([redacted])")
    }
}

impl SecretExponent {
    pub(crate) fn new(d: BigNumber) -> Self {
        Self { d }
    }
}

impl AsRef<BigNumber> for SecretExponent {
    /// Get the exponent as a number.
    fn as_ref(&self) -> &BigNumber {
        &self.d
    }
}

/// One party's persisted fragment of a shared RSA key.
///
/// A shard carries the full public parameters plus the RSAPrivateKey fields
/// `(d, p, q, dp, dq, qinv)`, repurposed by the sharing scheme:
///
/// - unanimous: `d` is the party's additive share; `p = q = 1` and the CRT
///   fields are zero.
/// - threshold: `d` is [`THRESHOLD_MAGIC`] and `(p, q)` hold the two additive
///   halves assigned to the party; the CRT fields are zero.
///
/// Either way the fields are deliberately inconsistent with a real RSA
/// factorization, so shards must never pass through a validating RSA key
/// type.
#[derive(Clone, ZeroizeOnDrop, PartialEq, Eq)]
pub struct KeyShard {
    pub(crate) n: BigNumber,
    pub(crate) e: BigNumber,
    pub(crate) d: BigNumber,
    pub(crate) p: BigNumber,
    pub(crate) q: BigNumber,
    pub(crate) dp: BigNumber,
    pub(crate) dq: BigNumber,
    pub(crate) qinv: BigNumber,
}

impl Debug for KeyShard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyShard([redacted])")
    }
}

impl KeyShard {
    /// Build a unanimous-mode shard holding one additive share of `d`.
    pub fn unanimous(public: &PublicKey, share: BigNumber) -> Self {
        Self {
            n: public.modulus().clone(),
            e: public.exponent().clone(),
            d: share,
            p: BigNumber::one(),
            q: BigNumber::one(),
            dp: BigNumber::zero(),
            dq: BigNumber::zero(),
            qinv: BigNumber::zero(),
        }
    }

    /// Build a threshold-mode shard holding the pair of halves `(x, y)`.
    pub fn threshold(public: &PublicKey, x: BigNumber, y: BigNumber) -> Self {
        Self {
            n: public.modulus().clone(),
            e: public.exponent().clone(),
            d: threshold_magic(),
            p: x,
            q: y,
            dp: BigNumber::zero(),
            dq: BigNumber::zero(),
            qinv: BigNumber::zero(),
        }
    }

    /// Rebuild a shard from raw RSAPrivateKey fields, as read from disk.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_raw(
        n: BigNumber,
        e: BigNumber,
        d: BigNumber,
        p: BigNumber,
        q: BigNumber,
        dp: BigNumber,
        dq: BigNumber,
        qinv: BigNumber,
    ) -> Self {
        Self {
            n,
            e,
            d,
            p,
            q,
            dp,
            dq,
            qinv,
        }
    }

    /// Whether this shard belongs to a 2-of-3 threshold sharing.
    pub fn is_threshold(&self) -> bool {
        self.d == threshold_magic()
    }

    /// The shared public key. Every shard carries it in full.
    pub fn public(&self) -> PublicKey {
        PublicKey::new(self.n.clone(), self.e.clone())
    }

    /// The modulus `n`.
    pub fn modulus(&self) -> &BigNumber {
        &self.n
    }
}
