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

use crate::provide_credential::{EnvCredentialProvider, StaticCredentialProvider};
use crate::{Config, Credential};
use async_trait::async_trait;
use nutrisign_core::{Context, ProvideCredential, Result};

/// DefaultCredentialProvider will try to load credential from different sources.
///
/// Resolution order:
///
/// 1. Consumer key and secret set on [`Config`]
/// 2. Environment variables
#[derive(Debug, Default)]
pub struct DefaultCredentialProvider {
    r#static: Option<StaticCredentialProvider>,
    env: EnvCredentialProvider,
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new(config: &Config) -> Self {
        let r#static = match (&config.consumer_key, &config.consumer_secret) {
            (Some(key), Some(secret)) => Some(StaticCredentialProvider::new(key, secret)),
            _ => None,
        };

        Self {
            r#static,
            env: EnvCredentialProvider::new(),
        }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if let Some(provider) = &self.r#static {
            if let Some(cred) = provider.provide_credential(ctx).await? {
                return Ok(Some(cred));
            }
        }

        self.env.provide_credential(ctx).await
    }
}
