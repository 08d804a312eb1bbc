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

use crate::{Config, FoodClient, ResolvedFood};
use log::{debug, warn};
use nutrisign_core::Context;

impl FoodClient {
    /// Resolve a free-text query to a food and its calories per 100 g.
    ///
    /// Takes the first search hit and the first serving of that food, with
    /// no ranking or retry. `None` covers every failure as well as a
    /// non-positive result.
    ///
    /// The client stays open; see [`resolve_food`] for a one-shot call that
    /// releases connections.
    pub async fn resolve(&self, query: &str) -> Option<ResolvedFood> {
        let Some(item) = self.search(query, 1).await.into_iter().next() else {
            debug!("fatsecret found nothing for {query:?}");
            return None;
        };

        let kcal_per_100g = self.food_kcal_per_100g(&item.id).await?;
        if !(kcal_per_100g.is_finite() && kcal_per_100g > 0.0) {
            return None;
        }

        Some(ResolvedFood {
            name: item.name,
            kcal_per_100g,
        })
    }
}

/// Build a client, resolve `query`, and close the client on every exit path.
///
/// Closing releases the pooled connections of `ctx`'s transport. Other
/// clients sharing `ctx` keep working and reconnect on their next request
/// with the same transport settings.
///
/// Failing to close is logged and never hides the resolution result.
pub async fn resolve_food(ctx: Context, config: Config, query: &str) -> Option<ResolvedFood> {
    let client = FoodClient::new(ctx, config);
    let _guard = CloseOnDrop(&client);

    client.resolve(query).await
}

/// Closes the client when dropped: on return, on panic, and when the
/// enclosing future is cancelled.
struct CloseOnDrop<'a>(&'a FoodClient);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.0.close() {
            warn!("failed to close fatsecret client: {err}");
        }
    }
}
