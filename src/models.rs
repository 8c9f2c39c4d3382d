use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A non-fatal note the backend attached to a shorten result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

/// The backend's answer to a shorten request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicLinkShortenResult {
    pub id: String,
    pub short_link: url::Url,
    pub canonical_link: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

/// Body of a resolve request.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveRequest<'a> {
    pub link: &'a str,
}

/// The backend's answer to a resolve request: either a ready-made long link
/// or the flat parameter bag the long link would have carried.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveResponse {
    LongLink(url::Url),
    Params(Map<String, Value>),
}

impl ResolveResponse {
    /// Interpret a resolve response body. An object with a string `longLink`
    /// is a long link; any other object is a flat parameter bag.
    pub fn from_json(body: Value) -> Result<Self, String> {
        let Value::Object(object) = body else {
            return Err("expected a JSON object".into());
        };
        match object.get("longLink") {
            Some(Value::String(long_link)) => url::Url::parse(long_link)
                .map(ResolveResponse::LongLink)
                .map_err(|e| format!("invalid longLink {long_link:?}: {e}")),
            _ => Ok(ResolveResponse::Params(object)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shorten_result_defaults_optional_fields() {
        let result: DynamicLinkShortenResult = serde_json::from_value(json!({
            "id": "abc",
            "shortLink": "https://acme.example/abc",
            "canonicalLink": "https://acme.example/abc",
        }))
        .expect("deserialize");
        assert_eq!(result.name, None);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn shorten_result_keeps_warning_order() {
        let result: DynamicLinkShortenResult = serde_json::from_value(json!({
            "id": "abc",
            "shortLink": "https://acme.example/abc",
            "canonicalLink": "https://acme.example/abc",
            "name": "promo",
            "warnings": [
                {"code": "W1", "message": "first"},
                {"code": "W2", "message": "second"},
            ],
        }))
        .expect("deserialize");
        let codes: Vec<_> = result.warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, ["W1", "W2"]);
    }

    #[test]
    fn resolve_response_variants() {
        let long = ResolveResponse::from_json(json!({"longLink": "https://acme.example/?link=x"}))
            .expect("long link");
        assert!(matches!(long, ResolveResponse::LongLink(_)));

        let params = ResolveResponse::from_json(json!({"link": "https://app.example/"}))
            .expect("params");
        assert!(matches!(params, ResolveResponse::Params(_)));

        assert!(ResolveResponse::from_json(json!(["nope"])).is_err());
        assert!(ResolveResponse::from_json(json!({"longLink": "not a url"})).is_err());
    }
}
