//! A toolkit for cooperative RSA signatures.
//!
//! A trusted dealer generates a standard 2048-bit RSA key and splits the
//! private exponent between several parties, so that no single party can sign
//! alone once dealing is finished, yet the parties can jointly produce an
//! ordinary PKCS#1 v1.5 signature that any stock RSA verifier accepts under
//! the dealt public key.
//!
//! # Sharing modes
//!
//! Two modes are supported:
//!
//! - **Unanimous (N-of-N, N up to 16).** The exponent is split into N
//!   additive integer shares. Every party raises the encoded message to its
//!   share; the product of all N partial signatures modulo `n` is the
//!   signature. Leave one party out and the product is noise.
//! - **Threshold (2-of-3).** Three shards each carry a pair of additive
//!   halves, arranged cyclically so any two shards contain a pair of halves
//!   summing to the exponent. Each signer emits two blocks, one per half, and
//!   the merger works out which cross combination is the real one. Two shards
//!   can also re-deal three fresh shards without the third's cooperation.
//!
//! Partial signatures are raw modular exponentiations with no padding of
//! their own; determinism of the PKCS#1 v1.5 encoding is what makes the
//! products line up. The merger confirms its choice by raising the result to
//! the public exponent and checking the framing bytes, so missing or
//! corrupted partials surface as a merge failure rather than a bad file.
//!
//! # Key material on disk
//!
//! Shards are PKCS#8 PEM files whose inner RSAPrivateKey repurposes the
//! factorization fields for sharing-scheme bookkeeping; they parse everywhere
//! but are intentionally not valid RSA keys. The public key is an ordinary
//! SubjectPublicKeyInfo PEM, accompanied by a self-signed certificate. The
//! full private exponent is never persisted and is wiped from memory once
//! dealing completes.
// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

#![warn(missing_docs)]

pub mod errors;
pub mod keyfile;
pub mod keygen;
pub mod keyrefresh;
pub mod pkcs1v15;
pub mod sign;
pub mod tshare;
mod utils;

pub use errors::{CallerError, InternalError, Result};
pub use keygen::{
    KeyPair, KeyShard, PublicKey, SecretExponent, BLOCK_LENGTH, MAX_SHARES, MODULUS_BITS,
    PUBLIC_EXPONENT, THRESHOLD_MAGIC,
};
pub use sign::{merge, partial_sign, PartialSignature};
