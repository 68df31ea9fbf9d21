//!  Travel Buddy Tools
//!
//!  Copyright (C) 2026  Travel Buddy Contributors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Latest exchange rates from CurrencyFreaks.

use crate::api_client::JsonApiClient;
use crate::config::CurrencyConfig;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRates {
    pub date: String,
    pub base: String,
    #[serde(deserialize_with = "rates_as_strings")]
    pub rates: BTreeMap<String, String>,
}

impl CurrencyRates {
    pub fn from_response(doc: Value) -> Result<Self> {
        serde_json::from_value(doc).context("API request failed: malformed rates response")
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).and_then(|r| r.parse().ok())
    }
}

fn rates_as_strings<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(code, rate)| match rate {
            Value::String(s) => Some((code, s)),
            Value::Number(n) => Some((code, n.to_string())),
            _ => None,
        })
        .collect())
}

pub(crate) fn normalize_base(base: &str) -> Result<String> {
    let base = base.trim().to_ascii_uppercase();
    ensure!(
        !base.is_empty() && base.chars().all(|c| c.is_ascii_alphanumeric()),
        "Invalid base currency: '{}'",
        base
    );
    Ok(base)
}

#[derive(Clone)]
pub struct CurrencyClient {
    http: JsonApiClient,
    config: CurrencyConfig,
}

impl CurrencyClient {
    pub fn new(config: CurrencyConfig) -> Result<Self> {
        let http = JsonApiClient::new(config.timeout_secs)
            .context("Failed to create CurrencyFreaks client")?;
        Ok(Self { http, config })
    }

    pub async fn latest_rates(&self, base: &str) -> Result<CurrencyRates> {
        let base = normalize_base(base)?;
        let query = [
            ("apikey", self.config.api_key.clone()),
            ("base", base.clone()),
        ];
        let doc = self.http.get_json(&self.config.endpoint, &query).await?;
        let rates = CurrencyRates::from_response(doc)?;
        tracing::info!("Fetched {} rates for base {}", rates.rates.len(), base);
        Ok(rates)
    }
}
