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

//! Tool boundary: every outcome becomes a JSON document, failures as `{"error": ...}`.

use serde::Serialize;
use serde_json::{Value, json};

pub fn respond<T: Serialize>(outcome: anyhow::Result<T>) -> Value {
    match outcome.and_then(|t| serde_json::to_value(t).map_err(anyhow::Error::from)) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Tool failed: {:#}", e);
            json!({ "error": format!("{:#}", e) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn test_ok_passes_through() {
        let v = respond(Ok(json!({"date": "2026-01-01"})));
        assert_eq!(v, json!({"date": "2026-01-01"}));
    }

    #[test]
    fn test_error_only_key() {
        let v = respond::<Value>(Err(anyhow!("boom")).context("API request failed"));
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["error"], "API request failed: boom");
    }
}
