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

use crate::constants::*;
use nutrisign_core::Context;

/// Config carries all the configuration for fatsecret services.
#[derive(Clone, Debug)]
pub struct Config {
    /// `consumer_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`FATSECRET_CONSUMER_KEY`]
    pub consumer_key: Option<String>,
    /// `consumer_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`FATSECRET_CONSUMER_SECRET`]
    pub consumer_secret: Option<String>,
    /// `search_endpoint` will be loaded from
    ///
    /// - env value: [`FATSECRET_SEARCH_ENDPOINT`] if this field is still the default
    /// - default to [`DEFAULT_SEARCH_ENDPOINT`]
    pub search_endpoint: String,
    /// `food_endpoint` will be loaded from
    ///
    /// - env value: [`FATSECRET_FOOD_ENDPOINT`] if this field is still the default
    /// - default to [`DEFAULT_FOOD_ENDPOINT`]
    pub food_endpoint: String,
    /// Page size used by [`FoodClient::search_default`](crate::FoodClient::search_default).
    ///
    /// - default to [`DEFAULT_MAX_RESULTS`]
    pub max_results: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consumer_key: None,
            consumer_secret: None,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            food_endpoint: DEFAULT_FOOD_ENDPOINT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on `self` win over the environment.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(FATSECRET_CONSUMER_KEY) {
            self.consumer_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(FATSECRET_CONSUMER_SECRET) {
            self.consumer_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(FATSECRET_SEARCH_ENDPOINT) {
            if self.search_endpoint == DEFAULT_SEARCH_ENDPOINT {
                self.search_endpoint = v;
            }
        }
        if let Some(v) = ctx.env_var(FATSECRET_FOOD_ENDPOINT) {
            if self.food_endpoint == DEFAULT_FOOD_ENDPOINT {
                self.food_endpoint = v;
            }
        }

        self
    }

    /// Point both endpoints at another host, keeping the fatsecret paths.
    ///
    /// Mostly used to talk to a local mock server.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.search_endpoint = format!("{base}/rest/foods/search/v1");
        self.food_endpoint = format!("{base}/rest/food/v5");
        self
    }
}
