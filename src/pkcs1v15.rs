// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Deterministic EMSA-PKCS1-v1_5 message encoding (RFC 8017, section 9.2).
//!
//! The encoded message is `00 01 PS 00 T` where `PS` is a run of `ff` bytes
//! and `T` is the DER encoding of a `DigestInfo` holding a SHA-256 digest.
//! Every byte is a fixed function of the message and the modulus length, so
//! two parties encoding the same message always agree bit for bit. That is
//! what lets independently produced partial signatures multiply into one
//! signature a stock RSA verifier accepts.

use crate::errors::{CallerError, Result};
use sha2::{Digest, Sha256};
use tracing::error;

/// DER prefix of `DigestInfo { sha256, NULL }`, up to and including the
/// OCTET STRING header of the digest itself.
const DIGEST_INFO_PREFIX: [u8; 19] = [
    0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    0x05, 0x00, 0x04, 0x20,
];

/// Bytes every valid encoded message starts with: the `00 01` frame followed
/// by the first two padding bytes.
pub const ENCODED_MESSAGE_PREFIX: [u8; 4] = [0x00, 0x01, 0xff, 0xff];

/// Encode `message` into an `em_len`-byte block ready for raw RSA signing.
pub fn encode(message: &[u8], em_len: usize) -> Result<Vec<u8>> {
    let digest = Sha256::digest(message);
    let t_len = DIGEST_INFO_PREFIX.len() + digest.len();

    // RFC 8017 requires at least eight padding bytes.
    if em_len < t_len + 11 {
        error!(
            "a {}-byte digest info cannot be padded into {} bytes",
            t_len, em_len
        );
        return Err(CallerError::EncodedMessageTooShort.into());
    }

    let mut em = Vec::with_capacity(em_len);
    em.push(0x00);
    em.push(0x01);
    em.resize(em_len - t_len - 1, 0xff);
    em.push(0x00);
    em.extend_from_slice(&DIGEST_INFO_PREFIX);
    em.extend_from_slice(&digest);
    Ok(em)
}
