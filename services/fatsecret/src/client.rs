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

use crate::{Config, Credential, DefaultCredentialProvider, RequestExecutor, RequestSigner};
use log::debug;
use nutrisign_core::{Context, ProvideCredential, Result, Signer, SigningRequest};
use serde_json::Value;

/// FoodClient talks to the fatsecret platform API.
///
/// Cloning is cheap and clones share the same connection pool, so a single
/// client can serve concurrent resolutions. Call [`FoodClient::close`] once
/// the client is no longer needed, or use [`crate::resolve_food`] which
/// does it for you.
#[derive(Debug, Clone)]
pub struct FoodClient {
    pub(crate) config: Config,
    signer: Signer<Credential>,
    executor: RequestExecutor,
}

impl FoodClient {
    /// Create a client that loads credentials through [`DefaultCredentialProvider`].
    pub fn new(ctx: Context, config: Config) -> Self {
        let loader = DefaultCredentialProvider::new(&config);
        Self::with_credential_provider(ctx, config, loader)
    }

    /// Create a client with a custom credential provider.
    pub fn with_credential_provider(
        ctx: Context,
        config: Config,
        loader: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        Self {
            config,
            signer: Signer::new(ctx.clone(), loader, RequestSigner::new()),
            executor: RequestExecutor::new(ctx),
        }
    }

    /// Sign and send `req`.
    ///
    /// `Ok(None)` means no credential is configured and nothing was sent.
    pub(crate) async fn signed_get(&self, req: SigningRequest) -> Result<Option<Value>> {
        let Some(signed) = self.signer.sign(req).await? else {
            debug!("fatsecret is not configured, skip remote call");
            return Ok(None);
        };

        self.executor.get(&signed).await.map(Some)
    }

    /// Release pooled connections. Safe to call more than once.
    pub fn close(&self) -> Result<()> {
        self.executor.close()
    }
}
