// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! RSA request signing.

use std::fmt::{self, Debug};

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha512};

use crate::hash::{base64_decode, base64_encode};
use crate::{Error, Result};

/// Hash algorithm used before the RSA PKCS#1 v1.5 signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignType {
    /// SHA-256, the only algorithm the gateway accepts today.
    #[default]
    Sha256,
    /// SHA-512.
    Sha512,
}

impl SignType {
    /// Name used in `signType=` and in the `X-Signature` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignType::Sha256 => "sha256",
            SignType::Sha512 => "sha512",
        }
    }
}

/// RSA private key used to sign requests. Never leaves the process.
#[derive(Clone)]
pub struct PrivateKey(RsaPrivateKey);

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(***)")
    }
}

impl PrivateKey {
    /// Parse a PEM encoded key, PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let pem = pem.trim();
        let key = match RsaPrivateKey::from_pkcs1_pem(pem) {
            Ok(key) => key,
            Err(_) => RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| {
                Error::config_invalid("invalid format of private key").with_source(e)
            })?,
        };
        key.validate()
            .map_err(|e| Error::config_invalid("private key is inconsistent").with_source(e))?;
        Ok(Self(key))
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self(key)
    }
}

/// RSA public key, used to verify signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Parse a PEM encoded key, SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let pem = pem.trim();
        let key = match RsaPublicKey::from_public_key_pem(pem) {
            Ok(key) => key,
            Err(_) => RsaPublicKey::from_pkcs1_pem(pem).map_err(|e| {
                Error::config_invalid("invalid format of public key").with_source(e)
            })?,
        };
        Ok(Self(key))
    }

    /// Verify a base64 signature produced by [`sign`] over the same params.
    pub fn verify<S: AsRef<str>>(
        &self,
        sign_type: SignType,
        params: &[S],
        signature: &str,
    ) -> Result<()> {
        let buf = join_params(params);
        let sig = base64_decode(signature)?;
        let sig = Signature::try_from(sig.as_slice())
            .map_err(|e| Error::signing_failed("malformed signature").with_source(e))?;

        let verified = match sign_type {
            SignType::Sha256 => VerifyingKey::<Sha256>::new(self.0.clone()).verify(&buf, &sig),
            SignType::Sha512 => VerifyingKey::<Sha512>::new(self.0.clone()).verify(&buf, &sig),
        };
        verified.map_err(|e| Error::signing_failed("signature mismatch").with_source(e))
    }
}

/// Sign `params` joined with `&`, returns the standard base64 signature.
///
/// The order of `params` is part of the signature: callers must pass them
/// exactly in the order the gateway rebuilds them.
pub fn sign<S: AsRef<str>>(sign_type: SignType, params: &[S], key: &PrivateKey) -> Result<String> {
    let buf = join_params(params);
    let mut rng = rand::thread_rng();

    let signature = match sign_type {
        SignType::Sha256 => SigningKey::<Sha256>::new(key.0.clone())
            .try_sign_with_rng(&mut rng, &buf)
            .map(|s| s.to_bytes()),
        SignType::Sha512 => SigningKey::<Sha512>::new(key.0.clone())
            .try_sign_with_rng(&mut rng, &buf)
            .map(|s| s.to_bytes()),
    }
    .map_err(|e| Error::signing_failed("failed to sign request").with_source(e))?;

    Ok(base64_encode(&signature))
}

fn join_params<S: AsRef<str>>(params: &[S]) -> Vec<u8> {
    let size = params.iter().map(|p| p.as_ref().len() + 1).sum();
    let mut buf = Vec::with_capacity(size);
    for (idx, p) in params.iter().enumerate() {
        if idx > 0 {
            buf.push(b'&');
        }
        buf.extend_from_slice(p.as_ref().as_bytes());
    }
    buf
}

/// The parameters covered by a request signature.
///
/// [`SigningMaterial::params`] renders them in the fixed order
/// `data`, `method`, `nonceStr`, `requestUrl`, `signType`, `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningMaterial {
    /// Base64 of the canonical body, `None` when the request has no body.
    pub data: Option<String>,
    /// Lower cased HTTP method.
    pub method: String,
    /// Per call random nonce.
    pub nonce_str: String,
    /// Request URL exactly as sent.
    pub request_url: String,
    /// Hash algorithm.
    pub sign_type: SignType,
    /// Unix seconds.
    pub timestamp: String,
}

impl SigningMaterial {
    /// Render the `key=value` list in signing order.
    pub fn params(&self) -> Vec<String> {
        let mut params = Vec::with_capacity(6);
        if let Some(data) = &self.data {
            params.push(format!("data={data}"));
        }
        params.push(format!("method={}", self.method));
        params.push(format!("nonceStr={}", self.nonce_str));
        params.push(format!("requestUrl={}", self.request_url));
        params.push(format!("signType={}", self.sign_type.as_str()));
        params.push(format!("timestamp={}", self.timestamp));
        params
    }

    /// The exact string that gets hashed and signed.
    pub fn string_to_sign(&self) -> String {
        self.params().join("&")
    }

    /// Sign this material with `key`.
    pub fn sign(&self, key: &PrivateKey) -> Result<String> {
        sign(self.sign_type, &self.params(), key)
    }
}
