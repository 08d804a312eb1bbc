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

use std::collections::BTreeMap;

use http::Method;

/// Query parameters of a request, keyed by their raw (unencoded) name.
///
/// A map makes it impossible to carry the same parameter twice.
pub type QueryParams = BTreeMap<String, String>;

/// Signing context for request.
///
/// Parameters are kept raw until the request goes on the wire; signers and
/// senders do their own encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// Endpoint URL, without query string.
    pub url: String,
    /// Query parameters.
    pub params: QueryParams,
}

impl SigningRequest {
    /// Create a new signing request.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: QueryParams::new(),
        }
    }

    /// Create a new `GET` signing request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a parameter, coercing the value to a string.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Get a parameter value.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The URL with any query string and fragment removed.
    pub fn base_url(&self) -> &str {
        let end = self
            .url
            .find(|c| c == '?' || c == '#')
            .unwrap_or(self.url.len());
        &self.url[..end]
    }
}
