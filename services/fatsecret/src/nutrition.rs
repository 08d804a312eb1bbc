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

use crate::models::{scalar_f64, scalar_string, OneOrMany};
use crate::{FoodClient, ServingNutrition};
use log::warn;
use nutrisign_core::{Result, SigningRequest};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct FoodResponse {
    #[serde(default)]
    food: Option<FoodDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct FoodDetail {
    #[serde(default)]
    servings: Option<Servings>,
}

#[derive(Debug, Default, Deserialize)]
struct Servings {
    #[serde(default)]
    serving: Option<OneOrMany<Value>>,
}

impl FoodClient {
    /// Calories per 100 g of the food's first serving.
    ///
    /// `None` when the request fails, or when the first serving isn't a
    /// positive gram amount with numeric calories.
    pub async fn food_kcal_per_100g(&self, food_id: &str) -> Option<f64> {
        self.food_servings_raw(food_id)
            .await?
            .first()
            .and_then(parse_serving)?
            .kcal_per_100g()
    }

    /// Every serving listed for the food that carries calories, amount and unit.
    pub async fn food_servings(&self, food_id: &str) -> Vec<ServingNutrition> {
        self.food_servings_raw(food_id)
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(parse_serving)
            .collect()
    }

    async fn food_servings_raw(&self, food_id: &str) -> Option<Vec<Value>> {
        let req = SigningRequest::get(&self.config.food_endpoint)
            .with_param("food_id", food_id)
            .with_param("format", "json");

        let value = match self.signed_get(req).await {
            Ok(value) => value?,
            Err(err) => {
                warn!("fatsecret food.get failed: {err}");
                return None;
            }
        };

        match parse_food_response(value) {
            Ok(servings) => Some(servings),
            Err(err) => {
                warn!("fatsecret food.get returned unexpected shape: {err}");
                None
            }
        }
    }
}

/// Extract the raw serving list, in the order the service sent it.
pub(crate) fn parse_food_response(value: Value) -> Result<Vec<Value>> {
    let resp: FoodResponse = serde_json::from_value(value)?;
    Ok(resp
        .food
        .and_then(|food| food.servings)
        .and_then(|servings| servings.serving)
        .map(OneOrMany::into_vec)
        .unwrap_or_default())
}

pub(crate) fn parse_serving(raw: &Value) -> Option<ServingNutrition> {
    Some(ServingNutrition {
        calories: scalar_f64(raw.get("calories"))?,
        amount: scalar_f64(raw.get("metric_serving_amount"))?,
        unit: scalar_string(raw.get("metric_serving_unit"))?,
        protein: scalar_f64(raw.get("protein")),
        fat: scalar_f64(raw.get("fat")),
        carbohydrate: scalar_f64(raw.get("carbohydrate")),
        description: scalar_string(raw.get("serving_description")),
    })
}
