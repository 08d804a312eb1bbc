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

//! Pooled [`reqwest`] implementation of [`HttpSend`].
//!
//! The client is created lazily on first send and shared by every clone of
//! [`ReqwestHttpSend`], so concurrent callers reuse the same connection pool.
//! [`HttpSend::close`] drops the pool; the next send builds a fresh one from
//! the same configuration.

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use nutrisign_core::{Error, HttpSend, Result};
use reqwest::{Client, ClientBuilder};
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

type MakeClient = dyn Fn() -> reqwest::Result<Client> + Send + Sync;

#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    inner: Arc<Inner>,
}

struct Inner {
    make_client: Box<MakeClient>,
    client: Mutex<Option<Client>>,
    in_flight: AtomicUsize,
}

impl Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inner")
            .field("client", &self.client)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    ///
    /// The given client is handed out again after every `close`, so its
    /// timeout, proxy and TLS settings always apply. Its connections live as
    /// long as the client itself; use [`ReqwestHttpSend::with_builder`] for a
    /// pool that `close` really drops.
    pub fn new(client: Client) -> Self {
        Self::from_factory(move || Ok(client.clone()))
    }

    /// Create a new ReqwestHttpSend that builds its client from `builder`
    /// on first use and again after every `close`.
    pub fn with_builder(builder: impl Fn() -> ClientBuilder + Send + Sync + 'static) -> Self {
        Self::from_factory(move || builder().build())
    }

    /// Create a new ReqwestHttpSend whose lazily built client uses `timeout`
    /// for every request.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_builder(move || Client::builder().timeout(timeout))
    }

    fn from_factory(
        make_client: impl Fn() -> reqwest::Result<Client> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                make_client: Box::new(make_client),
                client: Mutex::new(None),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of requests currently on the wire.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Whether a pooled client currently exists.
    pub fn is_open(&self) -> bool {
        self.inner.client.lock().expect("lock poisoned").is_some()
    }

    fn client(&self) -> Result<Client> {
        let mut slot = self.inner.client.lock().expect("lock poisoned");
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        debug!("building http client");
        let client = (self.inner.make_client)()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;
        *slot = Some(client.clone());
        Ok(client)
    }
}

/// Keeps `in_flight` honest even when the request future is dropped midway.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "failed to connect"
    } else if err.is_body() || err.is_decode() {
        "failed to read response body"
    } else {
        "failed to send request"
    };
    Error::transport(message).with_source(err)
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let client = self.client()?;
        let _guard = InFlightGuard::enter(&self.inner.in_flight);

        let req = reqwest::Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        let resp = client.execute(req).await.map_err(transport_error)?;

        let status = resp.status();
        let version = resp.version();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(transport_error)?;

        let mut out = http::Response::new(body);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }

    fn close(&self) -> Result<()> {
        if self
            .inner
            .client
            .lock()
            .expect("lock poisoned")
            .take()
            .is_some()
        {
            debug!("http client closed");
        }
        Ok(())
    }
}
