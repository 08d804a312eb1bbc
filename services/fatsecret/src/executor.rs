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

use crate::canonical::percent_encode;
use bytes::Bytes;
use http::header::ACCEPT;
use log::debug;
use nutrisign_core::{Context, Error, Result, SigningRequest};
use serde_json::Value;

/// RequestExecutor sends signed requests and hands back the decoded JSON.
///
/// It owns no connections itself: the pooled client lives in the
/// [`Context`], and every clone of an executor shares it.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    ctx: Context,
}

impl RequestExecutor {
    /// Create a new executor over the HTTP client configured in `ctx`.
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Send a signed `GET` and return the JSON body.
    ///
    /// Non-success status, non-JSON body, and `{"error": ...}` payloads are
    /// all errors here.
    pub async fn get(&self, req: &SigningRequest) -> Result<Value> {
        let http_req = http::Request::builder()
            .method(req.method.clone())
            .uri(build_uri(req))
            .header(ACCEPT, "application/json")
            .body(Bytes::new())?;

        let (parts, body) = self.ctx.http_send(http_req).await?.into_parts();

        if !parts.status.is_success() {
            debug!(
                "fatsecret responded {} with body: {}",
                parts.status,
                String::from_utf8_lossy(&body)
            );
            return Err(Error::service_error(format!(
                "unexpected status {}",
                parts.status
            )));
        }

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            debug!(
                "fatsecret responded with non-json body: {}",
                String::from_utf8_lossy(&body)
            );
            Error::response_invalid("response is not valid json").with_source(e)
        })?;

        if let Some(err) = value.get("error") {
            debug!("fatsecret responded with error payload: {err}");
            return Err(Error::service_error(describe_api_error(err)));
        }

        Ok(value)
    }

    /// Release the pooled connections. Safe to call more than once.
    pub fn close(&self) -> Result<()> {
        self.ctx.http_close()
    }
}

/// Base URL plus the query string, every key and value encoded exactly once.
pub fn build_uri(req: &SigningRequest) -> String {
    let mut uri = req.base_url().to_string();
    if req.params.is_empty() {
        return uri;
    }

    uri.push('?');
    for (i, (k, v)) in req.params.iter().enumerate() {
        if i > 0 {
            uri.push('&');
        }
        uri.push_str(&percent_encode(k));
        uri.push('=');
        uri.push_str(&percent_encode(v));
    }
    uri
}

fn describe_api_error(err: &Value) -> String {
    let code = err.get("code").map(Value::to_string);
    let message = err.get("message").and_then(Value::as_str);

    match (code, message) {
        (Some(code), Some(message)) => format!("api error {code}: {message}"),
        (None, Some(message)) => format!("api error: {message}"),
        _ => format!("api error: {err}"),
    }
}
