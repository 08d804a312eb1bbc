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

use crate::canonical::{normalize_params, percent_encode};
use crate::constants::*;
use crate::Credential;
use log::debug;
use nutrisign_core::hash::base64_hmac_sha1;
use nutrisign_core::time::{format_unix_timestamp, now, DateTime};
use nutrisign_core::{Context, Result, SignRequest, SigningCredential, SigningRequest};

/// RequestSigner that implements two-legged OAuth 1.0 `HMAC-SHA1`.
///
/// - [RFC 5849 Section 3](https://datatracker.ietf.org/doc/html/rfc5849#section-3)
/// - [fatsecret OAuth 1.0](https://platform.fatsecret.com/docs/guides/authentication/oauth1)
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
    nonce: Option<String>,
}

impl RequestSigner {
    /// Create a new builder for fatsecret signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the nonce.
    ///
    /// # Note
    ///
    /// A fresh random nonce must be used for every request.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_nonce(mut self, nonce: &str) -> Self {
        self.nonce = Some(nonce.to_string());
        self
    }

    fn get_time(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    fn get_nonce(&self) -> String {
        match &self.nonce {
            Some(nonce) => nonce.clone(),
            None => generate_nonce(),
        }
    }
}

/// 64 random bits, hex encoded.
fn generate_nonce() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes)
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        _: &Context,
        mut req: SigningRequest,
        credential: Option<&Self::Credential>,
    ) -> Result<Option<SigningRequest>> {
        let Some(cred) = credential.filter(|c| c.is_valid()) else {
            debug!("fatsecret credential is not configured, skip signing");
            return Ok(None);
        };

        // Callers must not smuggle in their own signature.
        req.params.remove(OAUTH_SIGNATURE);

        req.params
            .insert(OAUTH_CONSUMER_KEY.to_string(), cred.consumer_key.clone());
        req.params.insert(OAUTH_NONCE.to_string(), self.get_nonce());
        req.params
            .insert(OAUTH_SIGNATURE_METHOD.to_string(), HMAC_SHA1.to_string());
        req.params.insert(
            OAUTH_TIMESTAMP.to_string(),
            format_unix_timestamp(self.get_time()),
        );
        req.params
            .insert(OAUTH_VERSION.to_string(), OAUTH_VERSION_1_0.to_string());

        let string_to_sign = string_to_sign(&req);
        let signing_key = signing_key(cred);
        let signature = base64_hmac_sha1(signing_key.as_bytes(), string_to_sign.as_bytes());
        debug!("calculated signature base string: {string_to_sign}");

        // Raw base64: the query string encoder is the only place that may
        // percent-encode it.
        req.params.insert(OAUTH_SIGNATURE.to_string(), signature);

        Ok(Some(req))
    }
}

/// `METHOD&url&params`, each part percent-encoded.
fn string_to_sign(req: &SigningRequest) -> String {
    format!(
        "{}&{}&{}",
        percent_encode(&req.method.as_str().to_uppercase()),
        percent_encode(req.base_url()),
        percent_encode(&normalize_params(&req.params)),
    )
}

/// Token secret is always empty in two-legged OAuth, hence the bare `&`.
fn signing_key(cred: &Credential) -> String {
    format!("{}&", percent_encode(&cred.consumer_secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use http::Method;
    use pretty_assertions::assert_eq;

    fn fixture_time(ts: i64) -> DateTime {
        chrono::Utc
            .timestamp_opt(ts, 0)
            .single()
            .expect("timestamp must be valid")
    }

    fn search_request() -> SigningRequest {
        SigningRequest::get(DEFAULT_SEARCH_ENDPOINT)
            .with_param("search_expression", "banana split")
            .with_param("max_results", 1)
            .with_param("page_number", 0)
            .with_param("format", "json")
    }

    fn sign(
        signer: &RequestSigner,
        req: SigningRequest,
        cred: &Credential,
    ) -> Result<Option<SigningRequest>> {
        signer.sign_request(&Context::new(), req, Some(cred))
    }

    #[test]
    fn test_string_to_sign() {
        let req = SigningRequest::get(DEFAULT_FOOD_ENDPOINT)
            .with_param("food_id", "12345")
            .with_param("format", "json")
            .with_param(OAUTH_CONSUMER_KEY, "fixture-consumer-key")
            .with_param(OAUTH_NONCE, "fedcba9876543210")
            .with_param(OAUTH_SIGNATURE_METHOD, HMAC_SHA1)
            .with_param(OAUTH_TIMESTAMP, 1700000123)
            .with_param(OAUTH_VERSION, OAUTH_VERSION_1_0);

        assert_eq!(
            string_to_sign(&req),
            "GET&https%3A%2F%2Fplatform.fatsecret.com%2Frest%2Ffood%2Fv5&\
             food_id%3D12345%26format%3Djson%26oauth_consumer_key%3Dfixture-consumer-key%26\
             oauth_nonce%3Dfedcba9876543210%26oauth_signature_method%3DHMAC-SHA1%26\
             oauth_timestamp%3D1700000123%26oauth_version%3D1.0"
        );
    }

    #[test]
    fn test_golden_signature_search() -> Result<()> {
        let signer = RequestSigner::new()
            .with_time(fixture_time(1700000000))
            .with_nonce("0123456789abcdef");
        let cred = Credential::new("fixture-consumer-key", "fixture-consumer-secret");

        let signed = sign(&signer, search_request(), &cred)?.expect("must be signed");

        assert_eq!(signed.param(OAUTH_SIGNATURE), Some("PaEf8D3zH0rZgod6Ouh+NuruT/U="));
        assert_eq!(signed.param(OAUTH_CONSUMER_KEY), Some("fixture-consumer-key"));
        assert_eq!(signed.param(OAUTH_NONCE), Some("0123456789abcdef"));
        assert_eq!(signed.param(OAUTH_SIGNATURE_METHOD), Some("HMAC-SHA1"));
        assert_eq!(signed.param(OAUTH_TIMESTAMP), Some("1700000000"));
        assert_eq!(signed.param(OAUTH_VERSION), Some("1.0"));
        // Caller parameters survive untouched.
        assert_eq!(signed.param("search_expression"), Some("banana split"));
        assert_eq!(signed.params.len(), 10);
        Ok(())
    }

    #[test]
    fn test_golden_signature_with_reserved_secret() -> Result<()> {
        let signer = RequestSigner::new()
            .with_time(fixture_time(1700000123))
            .with_nonce("fedcba9876543210");
        let cred = Credential::new("fixture-consumer-key", "s3cr&t+/=");
        let req = SigningRequest::get(DEFAULT_FOOD_ENDPOINT)
            .with_param("food_id", "12345")
            .with_param("format", "json");

        let signed = sign(&signer, req, &cred)?.expect("must be signed");
        assert_eq!(signed.param(OAUTH_SIGNATURE), Some("zaVjDbQOBIKa/BX0bsY5Aaxv1Jk="));
        Ok(())
    }

    #[test]
    fn test_signature_ignores_url_query_and_existing_signature() -> Result<()> {
        let signer = RequestSigner::new()
            .with_time(fixture_time(1700000000))
            .with_nonce("0123456789abcdef");
        let cred = Credential::new("fixture-consumer-key", "fixture-consumer-secret");
        let mut req = search_request().with_param(OAUTH_SIGNATURE, "forged");
        req.url = format!("{DEFAULT_SEARCH_ENDPOINT}?ignored=1");

        let signed = sign(&signer, req, &cred)?.expect("must be signed");
        assert_eq!(signed.param(OAUTH_SIGNATURE), Some("PaEf8D3zH0rZgod6Ouh+NuruT/U="));
        Ok(())
    }

    #[test]
    fn test_method_is_uppercased() {
        let req = SigningRequest::new(
            Method::from_bytes(b"get").expect("method must be valid"),
            DEFAULT_FOOD_ENDPOINT,
        );
        assert!(string_to_sign(&req).starts_with("GET&"));
    }

    #[test]
    fn test_missing_credential_returns_none() -> Result<()> {
        let signer = RequestSigner::new();
        let ctx = Context::new();

        for cred in [
            Credential::new("", "fixture-consumer-secret"),
            Credential::new("fixture-consumer-key", ""),
        ] {
            assert!(signer
                .sign_request(&ctx, search_request(), Some(&cred))?
                .is_none());
        }
        assert!(signer.sign_request(&ctx, search_request(), None)?.is_none());
        Ok(())
    }

    #[test]
    fn test_nonce_is_fresh_per_request() -> Result<()> {
        let signer = RequestSigner::new();
        let cred = Credential::new("fixture-consumer-key", "fixture-consumer-secret");

        let a = sign(&signer, search_request(), &cred)?.expect("must be signed");
        let b = sign(&signer, search_request(), &cred)?.expect("must be signed");

        let nonce = a.param(OAUTH_NONCE).expect("nonce must be set");
        assert_eq!(nonce.len(), 16);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.param(OAUTH_NONCE), b.param(OAUTH_NONCE));
        Ok(())
    }
}
