//! fatsecret platform API support for nutrisign.
//!
//! This crate resolves a free-text food query to calories per 100 g. It
//! signs every request with two-legged OAuth 1.0 (`HMAC-SHA1`), searches
//! for the food, fetches its servings, and normalizes the first one.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nutrisign_core::{Context, OsEnv};
//! use nutrisign_fatsecret::{resolve_food, Config};
//! use nutrisign_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Reads FATSECRET_CONSUMER_KEY and FATSECRET_CONSUMER_SECRET.
//!     let config = Config::default().from_env(&ctx);
//!
//!     match resolve_food(ctx, config, "banana").await {
//!         Some(food) => println!("{}: {:.1} kcal/100g", food.name, food.kcal_per_100g),
//!         None => println!("not found"),
//!     }
//! }
//! ```
//!
//! ## Long-lived clients
//!
//! ```no_run
//! use nutrisign_core::{Context, OsEnv};
//! use nutrisign_fatsecret::{Config, FoodClient};
//! use nutrisign_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> nutrisign_core::Result<()> {
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//! let client = FoodClient::new(ctx.clone(), Config::default().from_env(&ctx));
//!
//! let candidates = client.search("chicken breast", 5).await;
//! for item in &candidates {
//!     let servings = client.food_servings(&item.id).await;
//!     println!("{} ({} servings)", item.name, servings.len());
//! }
//!
//! client.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! Nothing here returns an error to the caller. Missing credentials skip
//! the remote call, transport and parse failures are logged with `log` and
//! turn into an empty list or `None`, and servings that can't be
//! normalized are silently `None`.

mod constants;

pub mod canonical;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;

mod executor;
pub use executor::{build_uri, RequestExecutor};

mod models;
pub use models::{CandidateItem, Per100g, ResolvedFood, ServingNutrition};

mod client;
pub use client::FoodClient;

mod search;
mod nutrition;

mod resolver;
pub use resolver::resolve_food;
