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

//! RFC 3986 percent-encoding and OAuth 1.0 parameter normalization.
//!
//! - [RFC 5849 3.4.1.3.2](https://datatracker.ietf.org/doc/html/rfc5849#section-3.4.1.3.2)

use crate::constants::OAUTH_ENCODE_SET;
use nutrisign_core::QueryParams;
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;

/// Percent-encode every byte outside `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, &OAUTH_ENCODE_SET).to_string()
}

/// Reverse of [`percent_encode`]. Invalid UTF-8 is replaced lossily.
pub fn percent_decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

/// Build the normalized parameter string.
///
/// Keys and values are encoded first, then pairs are sorted by encoded key
/// and encoded value using byte order.
pub fn normalize_params(params: &QueryParams) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    pairs.sort();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
