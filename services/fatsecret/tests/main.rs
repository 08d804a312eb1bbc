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

use std::collections::BTreeMap;
use std::time::Duration;

use nutrisign_core::hash::base64_hmac_sha1;
use nutrisign_core::{Context, StaticEnv};
use nutrisign_fatsecret::canonical::{normalize_params, percent_encode};
use nutrisign_fatsecret::{resolve_food, Config, FoodClient, ResolvedFood};
use nutrisign_http_send_reqwest::ReqwestHttpSend;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const CONSUMER_KEY: &str = "test_consumer_key";
const CONSUMER_SECRET: &str = "test&consumer+secret";
const SEARCH_PATH: &str = "/rest/foods/search/v1";
const FOOD_PATH: &str = "/rest/food/v5";

/// Recomputes the OAuth signature the way the real service does and only
/// matches requests that carry the right one.
struct ValidSignature;

impl Match for ValidSignature {
    fn matches(&self, request: &Request) -> bool {
        let mut params: BTreeMap<String, String> = request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let Some(signature) = params.remove("oauth_signature") else {
            return false;
        };

        let mut base_url = request.url.clone();
        base_url.set_query(None);
        let string_to_sign = format!(
            "{}&{}&{}",
            percent_encode(request.method.as_str()),
            percent_encode(base_url.as_str()),
            percent_encode(&normalize_params(&params)),
        );
        let key = format!("{}&", percent_encode(CONSUMER_SECRET));

        base64_hmac_sha1(key.as_bytes(), string_to_sign.as_bytes()) == signature
    }
}

struct Fixture {
    server: MockServer,
    http: ReqwestHttpSend,
    ctx: Context,
    config: Config,
}

async fn init() -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();

    let server = MockServer::start().await;
    let http = ReqwestHttpSend::with_timeout(Duration::from_secs(2));
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_env(StaticEnv::default());
    let config = Config {
        consumer_key: Some(CONSUMER_KEY.to_string()),
        consumer_secret: Some(CONSUMER_SECRET.to_string()),
        ..Default::default()
    }
    .with_base_url(&server.uri());

    Fixture {
        server,
        http,
        ctx,
        config,
    }
}

fn search_body(foods: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "foods": {"food": foods, "max_results": "1", "page_number": "0", "total_results": "1"}
    }))
}

fn food_body(servings: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "food": {"food_id": "12345", "food_name": "Banana", "servings": {"serving": servings}}
    }))
}

async fn mount_banana(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("search_expression", "banana"))
        .and(ValidSignature)
        .respond_with(search_body(json!({"food_id": "12345", "food_name": "Banana"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(FOOD_PATH))
        .and(query_param("food_id", "12345"))
        .and(ValidSignature)
        .respond_with(food_body(json!({
            "calories": "89",
            "metric_serving_amount": "100.000",
            "metric_serving_unit": "g",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_resolve_banana() {
    let f = init().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("search_expression", "banana"))
        .and(query_param("max_results", "1"))
        .and(query_param("page_number", "0"))
        .and(query_param("format", "json"))
        .and(query_param("oauth_consumer_key", CONSUMER_KEY))
        .and(query_param("oauth_signature_method", "HMAC-SHA1"))
        .and(query_param("oauth_version", "1.0"))
        .and(ValidSignature)
        .respond_with(search_body(json!({"food_id": "12345", "food_name": "Banana"})))
        .expect(1)
        .mount(&f.server)
        .await;
    Mock::given(method("GET"))
        .and(path(FOOD_PATH))
        .and(query_param("food_id", "12345"))
        .and(query_param("format", "json"))
        .and(ValidSignature)
        .respond_with(food_body(json!([{
            "calories": "89",
            "metric_serving_amount": "100.000",
            "metric_serving_unit": "g",
        }])))
        .expect(1)
        .mount(&f.server)
        .await;

    let food = resolve_food(f.ctx, f.config, "banana").await;
    assert_eq!(
        food,
        Some(ResolvedFood {
            name: "Banana".to_string(),
            kcal_per_100g: 89.0,
        })
    );
}

#[tokio::test]
async fn test_signature_survives_reserved_characters_in_query() {
    let f = init().await;
    let query = "mac & cheese 100% +extra/äpfel";
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("search_expression", query))
        .and(ValidSignature)
        .respond_with(search_body(json!({"food_id": "7", "food_name": "Mac & Cheese"})))
        .expect(1)
        .mount(&f.server)
        .await;

    let client = FoodClient::new(f.ctx, f.config);
    let items = client.search(query, 1).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Mac & Cheese");
    client.close().expect("close must succeed");
}

#[tokio::test]
async fn test_empty_search_skips_detail() {
    let f = init().await;
    Mock::given(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "foods": {"max_results": "1", "page_number": "0", "total_results": "0"}
        })))
        .expect(1)
        .mount(&f.server)
        .await;
    Mock::given(path(FOOD_PATH))
        .respond_with(food_body(json!({})))
        .expect(0)
        .mount(&f.server)
        .await;

    assert_eq!(resolve_food(f.ctx, f.config, "unobtainium").await, None);
}

#[tokio::test]
async fn test_unconfigured_credentials_send_nothing() {
    let f = init().await;
    mount_banana(&f.server).await;

    let config = Config::default().with_base_url(&f.server.uri());
    assert_eq!(resolve_food(f.ctx, config, "banana").await, None);

    let received = f.server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_failures_resolve_to_none() {
    let cases: Vec<(&str, ResponseTemplate, ResponseTemplate)> = vec![
        (
            "search error payload",
            ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 8, "message": "Invalid signature"}
            })),
            food_body(json!({})),
        ),
        (
            "search server error",
            ResponseTemplate::new(500),
            food_body(json!({})),
        ),
        (
            "detail not json",
            search_body(json!({"food_id": "12345", "food_name": "Banana"})),
            ResponseTemplate::new(200).set_body_string("<html>oops</html>"),
        ),
        (
            "detail in ounces",
            search_body(json!({"food_id": "12345", "food_name": "Banana"})),
            food_body(json!({
                "calories": "105", "metric_serving_amount": "4.000", "metric_serving_unit": "oz"
            })),
        ),
        (
            "detail with zero calories",
            search_body(json!({"food_id": "12345", "food_name": "Banana"})),
            food_body(json!({
                "calories": "0", "metric_serving_amount": "100", "metric_serving_unit": "g"
            })),
        ),
        (
            "detail overflowing per 100 g",
            search_body(json!({"food_id": "12345", "food_name": "Banana"})),
            food_body(json!({
                "calories": "1e308", "metric_serving_amount": "0.5", "metric_serving_unit": "g"
            })),
        ),
        (
            "search timeout",
            search_body(json!({"food_id": "12345", "food_name": "Banana"}))
                .set_delay(Duration::from_secs(3)),
            food_body(json!({})),
        ),
        (
            "detail timeout",
            search_body(json!({"food_id": "12345", "food_name": "Banana"})),
            food_body(json!({
                "calories": "89", "metric_serving_amount": "100", "metric_serving_unit": "g"
            }))
            .set_delay(Duration::from_secs(3)),
        ),
        (
            "detail with zero amount",
            search_body(json!({"food_id": "12345", "food_name": "Banana"})),
            food_body(json!({
                "calories": "89", "metric_serving_amount": "0", "metric_serving_unit": "g"
            })),
        ),
    ];

    for (name, search, detail) in cases {
        let f = init().await;
        Mock::given(path(SEARCH_PATH))
            .respond_with(search)
            .mount(&f.server)
            .await;
        Mock::given(path(FOOD_PATH))
            .respond_with(detail)
            .mount(&f.server)
            .await;

        assert_eq!(
            resolve_food(f.ctx, f.config, "banana").await,
            None,
            "case: {name}"
        );
        assert_eq!(f.http.in_flight(), 0, "case: {name}");
        assert!(!f.http.is_open(), "case: {name}");
    }
}

#[tokio::test]
async fn test_unreachable_service_resolves_to_none() {
    let f = init().await;
    let config = f.config.with_base_url("http://127.0.0.1:1");

    assert_eq!(resolve_food(f.ctx, config, "banana").await, None);
    assert_eq!(f.http.in_flight(), 0);
    assert!(!f.http.is_open());
}

#[tokio::test]
async fn test_search_default_uses_configured_page_size() {
    let f = init().await;
    Mock::given(path(SEARCH_PATH))
        .and(query_param("search_expression", "oats"))
        .and(query_param("max_results", "7"))
        .and(query_param("page_number", "0"))
        .and(ValidSignature)
        .respond_with(search_body(json!([
            {"food_id": "1", "food_name": "Rolled Oats"},
            {"food_id": "2", "food_name": "Steel Cut Oats"},
        ])))
        .expect(1)
        .mount(&f.server)
        .await;

    let config = Config {
        max_results: 7,
        ..f.config
    };
    let client = FoodClient::new(f.ctx, config);
    let items = client.search_default("oats").await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Rolled Oats");
    client.close().expect("close must succeed");
}

#[tokio::test]
async fn test_connections_are_released() {
    let f = init().await;
    mount_banana(&f.server).await;
    Mock::given(path(SEARCH_PATH))
        .and(query_param("search_expression", "broken"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&f.server)
        .await;

    for query in ["banana", "broken", "banana", "nothing-mounted"] {
        let _ = resolve_food(f.ctx.clone(), f.config.clone(), query).await;
        assert_eq!(f.http.in_flight(), 0, "query {query}");
        assert!(!f.http.is_open(), "query {query}");
    }
}

#[tokio::test]
async fn test_cancelled_resolution_releases_connections() {
    let f = init().await;
    Mock::given(path(SEARCH_PATH))
        .respond_with(
            search_body(json!({"food_id": "12345", "food_name": "Banana"}))
                .set_delay(Duration::from_secs(1)),
        )
        .mount(&f.server)
        .await;

    let fut = resolve_food(f.ctx.clone(), f.config.clone(), "banana");
    let res = tokio::time::timeout(Duration::from_millis(100), fut).await;

    assert!(res.is_err());
    assert_eq!(f.http.in_flight(), 0);
    assert!(!f.http.is_open());
}

#[tokio::test]
async fn test_concurrent_resolutions_share_client() {
    let f = init().await;
    mount_banana(&f.server).await;
    Mock::given(path(SEARCH_PATH))
        .and(query_param("search_expression", "apple"))
        .and(ValidSignature)
        .respond_with(search_body(json!([
            {"food_id": "777", "food_name": "Apple", "brand_name": "Orchard"}
        ])))
        .mount(&f.server)
        .await;
    Mock::given(path(FOOD_PATH))
        .and(query_param("food_id", "777"))
        .and(ValidSignature)
        .respond_with(food_body(json!({
            "calories": "78", "metric_serving_amount": "150", "metric_serving_unit": "g"
        })))
        .mount(&f.server)
        .await;

    let client = FoodClient::new(f.ctx, f.config);
    let (banana, apple) = tokio::join!(client.resolve("banana"), client.resolve("apple"));

    assert_eq!(banana.map(|food| food.kcal_per_100g), Some(89.0));
    let apple = apple.expect("apple must resolve");
    assert_eq!(apple.name, "Apple");
    assert!((apple.kcal_per_100g - 52.0).abs() < 1e-9);

    assert!(f.http.is_open());
    client.close().expect("close must succeed");
    assert!(!f.http.is_open());
}

#[tokio::test]
async fn test_food_servings_and_paging() {
    let f = init().await;
    Mock::given(path(SEARCH_PATH))
        .and(query_param("page_number", "2"))
        .and(query_param("max_results", "20"))
        .and(ValidSignature)
        .respond_with(search_body(json!([
            {"food_id": "1", "food_name": "Chicken Breast"},
            {"food_id": "2", "food_name": "Chicken Thigh", "brand_name": "Farm"},
        ])))
        .expect(1)
        .mount(&f.server)
        .await;
    Mock::given(path(FOOD_PATH))
        .and(query_param("food_id", "1"))
        .respond_with(food_body(json!([
            {"calories": "140", "metric_serving_amount": "85", "metric_serving_unit": "g", "protein": "26"},
            {"calories": "n/a", "metric_serving_amount": "1", "metric_serving_unit": "serving"},
            {"calories": "284", "metric_serving_amount": "172", "metric_serving_unit": "g"},
        ])))
        .mount(&f.server)
        .await;

    let client = FoodClient::new(f.ctx, f.config);
    let items = client.foods_search("chicken", 20, 2).await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].brand.as_deref(), Some("Farm"));

    let servings = client.food_servings("1").await;
    assert_eq!(servings.len(), 2);
    assert_eq!(servings[0].protein, Some(26.0));
    assert_eq!(servings[1].amount, 172.0);

    client.close().expect("close must succeed");
}
