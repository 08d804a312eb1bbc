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

use crate::models::{scalar_string, OneOrMany};
use crate::{CandidateItem, FoodClient};
use log::warn;
use nutrisign_core::{Result, SigningRequest};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Option<FoodsPage>,
}

#[derive(Debug, Default, Deserialize)]
struct FoodsPage {
    #[serde(default)]
    food: Option<OneOrMany<Value>>,
}

impl FoodClient {
    /// Search foods, first page, [`Config::max_results`](crate::Config::max_results) per page.
    ///
    /// Never fails: any error is logged and yields an empty list.
    pub async fn search_default(&self, query: &str) -> Vec<CandidateItem> {
        self.search(query, self.config.max_results).await
    }

    /// Search foods, first page, `max_results` per page.
    ///
    /// Never fails: any error is logged and yields an empty list.
    pub async fn search(&self, query: &str, max_results: u32) -> Vec<CandidateItem> {
        self.foods_search(query, max_results, 0).await
    }

    /// Search foods with an explicit page.
    ///
    /// Never fails: any error is logged and yields an empty list.
    pub async fn foods_search(
        &self,
        query: &str,
        max_results: u32,
        page_number: u32,
    ) -> Vec<CandidateItem> {
        let req = SigningRequest::get(&self.config.search_endpoint)
            .with_param("search_expression", query)
            .with_param("max_results", max_results)
            .with_param("page_number", page_number)
            .with_param("format", "json");

        let value = match self.signed_get(req).await {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("fatsecret foods.search failed: {err}");
                return Vec::new();
            }
        };

        parse_search_response(value).unwrap_or_else(|err| {
            warn!("fatsecret foods.search returned unexpected shape: {err}");
            Vec::new()
        })
    }
}

/// Turn a search payload into candidates, dropping items without id or name.
pub(crate) fn parse_search_response(value: Value) -> Result<Vec<CandidateItem>> {
    let resp: SearchResponse = serde_json::from_value(value)?;
    let foods = resp
        .foods
        .and_then(|page| page.food)
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    Ok(foods
        .iter()
        .filter_map(|f| {
            Some(CandidateItem {
                id: scalar_string(f.get("food_id"))?,
                name: scalar_string(f.get("food_name"))?,
                brand: scalar_string(f.get("brand_name")),
            })
        })
        .collect())
}
