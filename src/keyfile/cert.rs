// Copyright (c) 2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Self-signed X.509 certificate emission for a freshly dealt public key.
//!
//! The certificate is assembled from `x509-cert` structures and self-signed
//! with this crate's own PKCS#1 v1.5 encoder and modular exponentiation,
//! since the full private exponent exists only inside the dealer and cannot
//! be handed to a general-purpose signing key type.

use super::{internal, public_key_der, CERTIFICATE_LABEL};
use crate::{
    errors::Result,
    keygen::{PublicKey, SecretExponent},
    pkcs1v15,
    utils::{modpow, to_padded_bytes},
};
use const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION;
use der::{asn1::BitString, Any, Decode, Encode};
use pem_rfc7468::LineEnding;
use rand::{CryptoRng, RngCore};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use std::{str::FromStr, time::Duration};
use unknown_order::BigNumber;
use x509_cert::{
    certificate::{Certificate, TbsCertificate, Version},
    name::Name,
    serial_number::SerialNumber,
    time::Validity,
};

const COMMON_NAME: &str = "CN=cosign.dev";
const VALIDITY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Build a self-signed certificate for the public key and render it as a PEM
/// `CERTIFICATE` block.
pub fn encode_certificate<R: RngCore + CryptoRng>(
    public: &PublicKey,
    secret: &SecretExponent,
    rng: &mut R,
) -> Result<String> {
    let spki_der = public_key_der(public)?;
    let spki = SubjectPublicKeyInfoOwned::from_der(&spki_der).map_err(internal)?;

    let mut serial = [0u8; 16];
    rng.fill_bytes(&mut serial);
    // The serial is a positive, nonzero INTEGER.
    serial[0] &= 0x7f;
    serial[15] |= 0x01;

    let algorithm = AlgorithmIdentifierOwned {
        oid: SHA_256_WITH_RSA_ENCRYPTION,
        parameters: Some(Any::null()),
    };
    let name = Name::from_str(COMMON_NAME).map_err(internal)?;

    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&serial).map_err(internal)?,
        signature: algorithm.clone(),
        issuer: name.clone(),
        validity: Validity::from_now(VALIDITY).map_err(internal)?,
        subject: name,
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    };

    let tbs_der = tbs.to_der().map_err(internal)?;
    let em = pkcs1v15::encode(&tbs_der, public.block_length())?;
    let m = BigNumber::from_slice(&em);
    let signature = modpow(&m, secret.as_ref(), public.modulus());
    let signature_bytes = to_padded_bytes(&signature, public.block_length())?;

    let certificate = Certificate {
        tbs_certificate: tbs,
        signature_algorithm: algorithm,
        signature: BitString::from_bytes(&signature_bytes).map_err(internal)?,
    };
    let der = certificate.to_der().map_err(internal)?;
    pem_rfc7468::encode_string(CERTIFICATE_LABEL, LineEnding::LF, &der).map_err(internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{init_testing, shared_keypair};

    fn parse(pem: &str) -> Certificate {
        let (label, der) = pem_rfc7468::decode_vec(pem.as_bytes()).unwrap();
        assert_eq!(label, CERTIFICATE_LABEL);
        Certificate::from_der(&der).unwrap()
    }

    #[test]
    fn certificate_is_self_signed_and_verifiable() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let pem = encode_certificate(pair.public(), pair.secret(), &mut rng).unwrap();
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));

        let certificate = parse(&pem);
        let tbs_der = certificate.tbs_certificate.to_der().unwrap();
        let em = pkcs1v15::encode(&tbs_der, pair.public().block_length()).unwrap();

        let signature = BigNumber::from_slice(certificate.signature.raw_bytes());
        let recovered = modpow(
            &signature,
            pair.public().exponent(),
            pair.public().modulus(),
        );
        let recovered_bytes =
            to_padded_bytes(&recovered, pair.public().block_length()).unwrap();
        assert_eq!(recovered_bytes, em);
    }

    #[test]
    fn subject_and_issuer_match() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let certificate = parse(
            &encode_certificate(pair.public(), pair.secret(), &mut rng).unwrap(),
        );
        let tbs = &certificate.tbs_certificate;
        assert_eq!(tbs.issuer, tbs.subject);
        assert!(tbs.subject.to_string().contains("cosign.dev"));
    }

    #[test]
    fn serials_are_random() {
        let mut rng = init_testing();
        let pair = shared_keypair();
        let a = parse(&encode_certificate(pair.public(), pair.secret(), &mut rng).unwrap());
        let b = parse(&encode_certificate(pair.public(), pair.secret(), &mut rng).unwrap());
        assert_ne!(
            a.tbs_certificate.serial_number,
            b.tbs_certificate.serial_number
        );
    }
}
