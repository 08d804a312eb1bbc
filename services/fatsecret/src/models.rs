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

use crate::constants::GRAM;
use serde::Deserialize;
use serde_json::Value;

/// A food returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    /// fatsecret `food_id`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Brand, for branded products.
    pub brand: Option<String>,
}

/// Nutrition facts of a single serving as reported by the detail endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ServingNutrition {
    /// Energy of the serving, in kcal.
    pub calories: f64,
    /// Metric serving amount.
    pub amount: f64,
    /// Metric serving unit, e.g. `g`, `ml`, `oz`.
    pub unit: String,
    /// Protein in grams.
    pub protein: Option<f64>,
    /// Fat in grams.
    pub fat: Option<f64>,
    /// Carbohydrate in grams.
    pub carbohydrate: Option<f64>,
    /// Human readable serving, e.g. `1 medium (7" to 7-7/8" long)`.
    pub description: Option<String>,
}

/// Nutrition facts scaled to 100 grams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Per100g {
    /// kcal per 100 g.
    pub kcal: f64,
    /// Protein grams per 100 g.
    pub protein: Option<f64>,
    /// Fat grams per 100 g.
    pub fat: Option<f64>,
    /// Carbohydrate grams per 100 g.
    pub carbohydrate: Option<f64>,
}

impl ServingNutrition {
    /// Factor that turns this serving into 100 g.
    ///
    /// Only gram servings with a positive amount can be scaled; nothing is
    /// converted from other units.
    fn scale_to_100g(&self) -> Option<f64> {
        if self.unit != GRAM || !(self.amount > 0.0) {
            return None;
        }
        Some(100.0 / self.amount)
    }

    /// Calories per 100 g, `None` when scaling overflows.
    pub fn kcal_per_100g(&self) -> Option<f64> {
        self.scale_to_100g()
            .map(|f| self.calories * f)
            .filter(|kcal| kcal.is_finite())
    }

    /// Calories and macros per 100 g.
    pub fn per_100g(&self) -> Option<Per100g> {
        let f = self.scale_to_100g()?;
        let kcal = self.kcal_per_100g()?;
        Some(Per100g {
            kcal,
            protein: self.protein.map(|v| v * f).filter(|v| v.is_finite()),
            fat: self.fat.map(|v| v * f).filter(|v| v.is_finite()),
            carbohydrate: self
                .carbohydrate
                .map(|v| v * f)
                .filter(|v| v.is_finite()),
        })
    }
}

/// A food resolved to its calorie density.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFood {
    /// Display name.
    pub name: String,
    /// Always positive.
    pub kcal_per_100g: f64,
}

/// fatsecret collapses one-element lists into a bare object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(v) => vec![v],
        }
    }
}

/// Read a non-empty string or a number as a string.
pub(crate) fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a finite number encoded either as a JSON number or a string.
pub(crate) fn scalar_f64(value: Option<&Value>) -> Option<f64> {
    let v = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}
