//! Request signing
//!
//! The signer appends the identity parameters, builds a canonical string from
//! the stably key-sorted, percent-encoded parameter list and signs
//! `METHOD\nPATH\nCANONICAL` with HMAC-SHA256 keyed by the account secret.
//! The base64 digest is appended as the `signature` parameter.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use iaasctl_core::marshal::ParameterList;
//! use iaasctl_core::operation::HttpMethod;
//! use iaasctl_core::sign::{Credentials, Signer};
//!
//! let credentials = Credentials::new("QYACCESSKEYIDEXAMPLE", "SECRETACCESSKEY");
//! let signer = Signer::new(&credentials, "1").unwrap();
//!
//! let mut params = ParameterList::new();
//! params.push("action", "DescribeCaches");
//! params.push("zone", "pek3");
//!
//! let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let first = signer.sign(&params, HttpMethod::Get, "/iaas/", at);
//! let second = signer.sign(&params, HttpMethod::Get, "/iaas/", at);
//! assert_eq!(first.signature, second.signature);
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::trace;

use crate::config::ConfigError;
use crate::error::Result;
use crate::marshal::{ParameterList, encode_pairs};
use crate::operation::HttpMethod;

pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const SIGNATURE_VERSION: &str = "1";

/// Wire format of the `time_stamp` parameter
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

type HmacSha256 = Hmac<Sha256>;

/// Account key pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

/// A parameter list ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: HttpMethod,
    pub path: String,
    /// Marshalled parameters, identity parameters and `signature`, in wire order
    pub params: ParameterList,
    pub string_to_sign: String,
    pub signature: String,
}

impl SignedRequest {
    /// Percent-encoded query string or form body
    pub fn encoded(&self) -> String {
        self.params.to_query_string()
    }
}

/// Signs parameter lists for one account
#[derive(Clone)]
pub struct Signer<'a> {
    credentials: &'a Credentials,
    api_version: &'a str,
    mac: HmacSha256,
}

impl std::fmt::Debug for Signer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("credentials", self.credentials)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl<'a> Signer<'a> {
    /// Key a signer with the account secret
    pub fn new(credentials: &'a Credentials, api_version: &'a str) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(credentials.secret_access_key.as_bytes()).map_err(
            |e| ConfigError::InvalidValue {
                field: "secret_access_key",
                message: e.to_string(),
            },
        )?;
        Ok(Self {
            credentials,
            api_version,
            mac,
        })
    }

    /// Sign `params` for `method` on `path` at `timestamp`.
    ///
    /// The input list is not modified; the result carries a copy extended
    /// with the identity parameters and the signature.
    pub fn sign(
        &self,
        params: &ParameterList,
        method: HttpMethod,
        path: &str,
        timestamp: DateTime<Utc>,
    ) -> SignedRequest {
        let mut signed = params.clone();
        signed.push("access_key_id", self.credentials.access_key_id.as_str());
        signed.push("signature_method", SIGNATURE_METHOD);
        signed.push("signature_version", SIGNATURE_VERSION);
        signed.push("time_stamp", timestamp.format(TIMESTAMP_FORMAT).to_string());
        signed.push("version", self.api_version);

        let string_to_sign = string_to_sign(&signed, method, path);
        trace!("String to sign: {:?}", string_to_sign);

        let signature = self.digest(&string_to_sign);
        signed.push("signature", signature.as_str());

        SignedRequest {
            method,
            path: path.to_string(),
            params: signed,
            string_to_sign,
            signature,
        }
    }

    fn digest(&self, string_to_sign: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// `METHOD\nPATH\nCANONICAL_QUERY`
pub fn string_to_sign(params: &ParameterList, method: HttpMethod, path: &str) -> String {
    let canonical = encode_pairs(params.canonical().into_iter());
    format!("{}\n{}\n{}", method, path, canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 8, 27, 14, 30, 10).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("QYACCESSKEYIDEXAMPLE", "SECRETACCESSKEY")
    }

    fn params() -> ParameterList {
        vec![
            ("action", "RunInstances"),
            ("count", "1"),
            ("image_id", "centos64x86a"),
            ("instance_name", "demo"),
            ("instance_type", "small_b"),
            ("login_mode", "passwd"),
            ("login_passwd", "QingCloud20130712"),
            ("vxnets.1", "vxnet-0"),
            ("zone", "pek1"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_identity_parameters_appended() {
        let creds = credentials();
        let signer = Signer::new(&creds, "1").unwrap();
        let signed = signer.sign(&params(), HttpMethod::Get, "/iaas/", at());

        assert_eq!(signed.params.get("access_key_id"), Some("QYACCESSKEYIDEXAMPLE"));
        assert_eq!(signed.params.get("signature_method"), Some("HmacSHA256"));
        assert_eq!(signed.params.get("signature_version"), Some("1"));
        assert_eq!(signed.params.get("time_stamp"), Some("2013-08-27T14:30:10Z"));
        assert_eq!(signed.params.get("version"), Some("1"));
        assert_eq!(signed.params.get("signature"), Some(signed.signature.as_str()));
        assert_eq!(signed.params.len(), params().len() + 6);
    }

    #[test]
    fn test_input_list_not_mutated() {
        let creds = credentials();
        let original = params();
        let signer = Signer::new(&creds, "1").unwrap();
        let _ = signer.sign(&original, HttpMethod::Get, "/iaas/", at());
        assert_eq!(original, params());
    }

    #[test]
    fn test_string_to_sign_layout() {
        let creds = credentials();
        let signer = Signer::new(&creds, "1").unwrap();
        let signed = signer.sign(&params(), HttpMethod::Get, "/iaas/", at());

        assert_eq!(
            signed.string_to_sign,
            "GET\n/iaas/\n\
             access_key_id=QYACCESSKEYIDEXAMPLE&action=RunInstances&count=1\
             &image_id=centos64x86a&instance_name=demo&instance_type=small_b\
             &login_mode=passwd&login_passwd=QingCloud20130712\
             &signature_method=HmacSHA256&signature_version=1\
             &time_stamp=2013-08-27T14%3A30%3A10Z&version=1&vxnets.1=vxnet-0&zone=pek1"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let creds = credentials();
        let signer = Signer::new(&creds, "1").unwrap();
        let a = signer.sign(&params(), HttpMethod::Get, "/iaas/", at());
        let b = signer.sign(&params(), HttpMethod::Get, "/iaas/", at());
        assert_eq!(a, b);
        // base64 of a 32-byte digest
        assert_eq!(a.signature.len(), 44);
    }

    #[test]
    fn test_any_change_changes_signature() {
        let creds = credentials();
        let signer = Signer::new(&creds, "1").unwrap();
        let baseline = signer.sign(&params(), HttpMethod::Get, "/iaas/", at()).signature;

        let mut changed = params();
        changed.push("instance_name", "other");
        assert_ne!(
            signer.sign(&changed, HttpMethod::Get, "/iaas/", at()).signature,
            baseline
        );

        let tweaked: ParameterList = params()
            .iter()
            .map(|(k, v)| (k, if k == "count" { "2" } else { v }))
            .collect();
        assert_ne!(
            signer.sign(&tweaked, HttpMethod::Get, "/iaas/", at()).signature,
            baseline
        );

        assert_ne!(
            signer.sign(&params(), HttpMethod::Post, "/iaas/", at()).signature,
            baseline
        );

        let later = at() + chrono::Duration::seconds(1);
        assert_ne!(
            signer.sign(&params(), HttpMethod::Get, "/iaas/", later).signature,
            baseline
        );

        let other_creds = Credentials::new("QYACCESSKEYIDEXAMPLE", "ANOTHERSECRET");
        assert_ne!(
            Signer::new(&other_creds, "1")
                .unwrap()
                .sign(&params(), HttpMethod::Get, "/iaas/", at())
                .signature,
            baseline
        );
    }

    #[test]
    fn test_known_digest() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let creds = Credentials::new("id", "key");
        let signer = Signer::new(&creds, "1").unwrap();
        assert_eq!(
            signer.digest("The quick brown fox jumps over the lazy dog"),
            "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg="
        );
    }

    #[test]
    fn test_key_of_any_length_is_accepted() {
        let long = "k".repeat(200);
        for secret in ["", "short", long.as_str()] {
            let creds = Credentials::new("id", secret);
            let signer = Signer::new(&creds, "1").unwrap();
            let signed = signer.sign(&params(), HttpMethod::Get, "/iaas/", at());
            assert_eq!(signed.signature.len(), 44);
        }
    }

    #[test]
    fn test_debug_masks_secret() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("QYACCESSKEYIDEXAMPLE"));
        assert!(!debug.contains("SECRETACCESSKEY"));
    }
}
