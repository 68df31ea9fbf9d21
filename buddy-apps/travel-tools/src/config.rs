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

//! Upstream endpoints, credentials and timeouts.

use std::fmt;

pub const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";
pub const CURRENCYFREAKS_ENDPOINT: &str = "https://api.currencyfreaks.com/v2.0/rates/latest";
pub const KAYAK_BASE_URL: &str = "https://www.ca.kayak.com";

pub const SERPAPI_TIMEOUT_SECS: u64 = 30;
pub const CURRENCYFREAKS_TIMEOUT_SECS: u64 = 10;
pub const KAYAK_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct SerpConfig {
    pub api_key: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl SerpConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: SERPAPI_ENDPOINT.to_string(),
            timeout_secs: SERPAPI_TIMEOUT_SECS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl fmt::Debug for SerpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerpConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone)]
pub struct CurrencyConfig {
    pub api_key: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl CurrencyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: CURRENCYFREAKS_ENDPOINT.to_string(),
            timeout_secs: CURRENCYFREAKS_TIMEOUT_SECS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl fmt::Debug for CurrencyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrencyConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct KayakConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for KayakConfig {
    fn default() -> Self {
        Self {
            base_url: KAYAK_BASE_URL.to_string(),
            timeout_secs: KAYAK_TIMEOUT_SECS,
        }
    }
}

impl KayakConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() { "<unset>" } else { "<redacted>" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_api_keys() {
        let serp = SerpConfig::new("super-secret-serp");
        let currency = CurrencyConfig::new("super-secret-cf");
        let rendered = format!("{:?} {:?}", serp, currency);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains(SERPAPI_ENDPOINT));
    }

    #[test]
    fn test_kayak_base_url_trailing_slash() {
        let cfg = KayakConfig::default().with_base_url("http://127.0.0.1:9999/");
        assert_eq!(cfg.base_url, "http://127.0.0.1:9999");
        assert_eq!(cfg.timeout_secs, KAYAK_TIMEOUT_SECS);
    }
}
