// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Error types for the cooperative signing engine.
//!
//! Errors are split into two tiers. [`CallerError`] captures mistakes made by
//! the calling application or by the key material and signature files it
//! supplied; these carry the short diagnostics the command-line tool prints.
//! [`InternalError`] is the crate-wide error type; it wraps caller mistakes
//! and otherwise signals that an internal invariant did not hold.

use thiserror::Error;

/// The default Result type used by this crate.
pub type Result<T> = std::result::Result<T, InternalError>;

/// Errors caused by the calling application or the material it supplied.
#[derive(Debug, Error)]
pub enum CallerError {
    /// The unanimous dealer was asked for an unsupported share count.
    #[error("too many shares")]
    TooManyShares,

    /// A threshold operation was handed a shard whose private exponent is not
    /// the threshold sentinel.
    #[error("not a threshold key")]
    NotAThresholdKey,

    /// Two threshold shards carry different moduli and cannot belong to the
    /// same key.
    #[error("different public key modulii")]
    MismatchedModuli,

    /// Neither additive combination of two threshold shards reconstructs a
    /// working private exponent.
    #[error("don't make a real private key")]
    ReconstructionFailed,

    /// A partial-signature file is neither one nor two blocks long.
    #[error("length mismatch")]
    SignatureLengthMismatch,

    /// More than two threshold pairs were offered to a single merge.
    #[error("too many threshold signature pairs")]
    TooManyThresholdPairs,

    /// The merged product fails the public-exponent check, so at least one
    /// partial signature is corrupt or absent.
    #[error("invalid or missing partial signatures")]
    InvalidPartialSignatures,

    /// The modulus is too small to hold a PKCS#1 v1.5 encoded digest.
    #[error("intended encoded message length too short")]
    EncodedMessageTooShort,

    /// Key material or a certificate could not be parsed.
    #[error("could not deserialize key material")]
    DeserializationFailed,

    /// A file could not be read or written.
    #[error("{path}: {source}")]
    FileAccess {
        /// The offending path.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A cryptographic operation was retried too many times.
    #[error("reached the maximum allowed number of retries for a cryptographic operation")]
    RetryFailed,
}

/// Errors that can arise while running a signing operation.
#[derive(Debug, Error)]
pub enum InternalError {
    /// An invariant inside the library did not hold. This is a bug.
    #[error("an internal invariant was violated")]
    InternalInvariantFailed,

    /// The calling application made a mistake; see the wrapped error.
    #[error(transparent)]
    CallingApplicationMistake(#[from] CallerError),
}
