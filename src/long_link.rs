//! Long-link decoding: from a flat parameter bag back to a structured result.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use url::Url;

use crate::error::LinkError;
use crate::params::*;

/// Flat query / JSON parameter bag keyed by wire key.
pub type FlatParams = BTreeMap<String, String>;

/// The structured part of a long link that callers act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongLinkResult {
    pub target: Url,
    /// Full `utm_*` keys mapped to their values.
    pub utm_parameters: BTreeMap<String, String>,
    pub minimum_app_version: Option<i32>,
}

/// Collect a URL's query string into a flat bag. The first occurrence of a
/// repeated key wins; a key without `=` maps to an empty value.
pub fn query_params(url: &Url) -> FlatParams {
    let mut params = FlatParams::new();
    for (key, value) in url.query_pairs() {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

/// Collect a flat JSON object (as returned by the resolve endpoint) into a
/// flat bag. Scalars are stringified, `null` becomes an empty string, and
/// nested arrays or objects are skipped.
pub fn flat_params_from_json(object: &Map<String, Value>) -> FlatParams {
    object
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key.clone(), value))
        })
        .collect()
}

/// Decode a flat parameter bag into a [`LongLinkResult`].
///
/// Fails only when `link` is absent or not a URL. A non-numeric `amv` is
/// treated as absent.
pub fn parse_long_link(params: &FlatParams) -> Result<LongLinkResult, LinkError> {
    let target = params
        .get(LINK)
        .and_then(|link| Url::parse(link).ok())
        .ok_or(LinkError::MissingTargetLink)?;

    let minimum_app_version = params
        .get(ANDROID_MIN_VERSION)
        .and_then(|v| v.parse::<i32>().ok());

    let utm_parameters = params
        .iter()
        .filter(|(key, _)| key.starts_with(UTM_PREFIX))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(LongLinkResult {
        target,
        utm_parameters,
        minimum_app_version,
    })
}

// ── Diagnostics ────────────────────────────────────────────────────────────

/// Parameter groups echoed back in a flat bag, rebuilt for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognizedParameters {
    pub android: Option<AndroidParameters>,
    pub ios: Option<IosParameters>,
    pub analytics: Option<AnalyticsParameters>,
    pub social_meta: Option<SocialMetaParameters>,
    pub itunes_affiliate: Option<ItunesAffiliateParameters>,
    pub other_platform: Option<OtherPlatformParameters>,
    pub options: Option<OptionsParameters>,
    /// Keys outside the known vocabulary, in key order.
    pub unknown: Vec<String>,
}

const KNOWN_KEYS: &[&str] = &[
    LINK,
    ANDROID_PACKAGE_NAME,
    ANDROID_FALLBACK_URL,
    ANDROID_MIN_VERSION,
    IOS_APP_STORE_ID,
    IOS_FALLBACK_URL,
    IOS_IPAD_FALLBACK_URL,
    IOS_MIN_VERSION,
    OTHER_PLATFORM_FALLBACK_URL,
    SOCIAL_TITLE,
    SOCIAL_DESCRIPTION,
    SOCIAL_IMAGE_URL,
    ITUNES_AFFILIATE_TOKEN,
    ITUNES_CAMPAIGN_TOKEN,
    ITUNES_PROVIDER_TOKEN,
    PATH_LENGTH,
];

impl RecognizedParameters {
    /// Names of the groups that were echoed, in wire precedence order.
    pub fn group_names(&self) -> Vec<&'static str> {
        [
            (self.analytics.is_some(), "analytics"),
            (self.social_meta.is_some(), "social"),
            (self.ios.is_some(), "ios"),
            (self.android.is_some(), "android"),
            (self.itunes_affiliate.is_some(), "itunes"),
            (self.other_platform.is_some(), "other"),
            (self.options.is_some(), "options"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }
}

/// Rebuild whichever parameter groups are present in a flat bag. Never
/// fails: Android needs `apn` to be rebuilt, and unparsable numeric or enum
/// values are dropped.
pub fn recognize_parameters(params: &FlatParams) -> RecognizedParameters {
    let get = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();

    let android = get(ANDROID_PACKAGE_NAME).map(|package_name| AndroidParameters {
        package_name,
        fallback_url: get(ANDROID_FALLBACK_URL),
        minimum_version: params
            .get(ANDROID_MIN_VERSION)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
    });

    let ios = IosParameters {
        app_store_id: get(IOS_APP_STORE_ID),
        fallback_url: get(IOS_FALLBACK_URL),
        ipad_fallback_url: get(IOS_IPAD_FALLBACK_URL),
        minimum_app_version: get(IOS_MIN_VERSION),
    };

    let analytics = AnalyticsParameters {
        source: get(UTM_SOURCE),
        medium: get(UTM_MEDIUM),
        campaign: get(UTM_CAMPAIGN),
        term: get(UTM_TERM),
        content: get(UTM_CONTENT),
    };

    let social_meta = SocialMetaParameters {
        title: get(SOCIAL_TITLE),
        description: get(SOCIAL_DESCRIPTION),
        image_url: get(SOCIAL_IMAGE_URL),
    };

    let itunes_affiliate = ItunesAffiliateParameters {
        affiliate_token: get(ITUNES_AFFILIATE_TOKEN),
        campaign_token: get(ITUNES_CAMPAIGN_TOKEN),
        provider_token: get(ITUNES_PROVIDER_TOKEN),
    };

    let other_platform = OtherPlatformParameters {
        fallback_url: get(OTHER_PLATFORM_FALLBACK_URL),
    };

    let options = params
        .get(PATH_LENGTH)
        .and_then(|v| PathLength::parse(v))
        .map(|path_length| OptionsParameters { path_length });

    let unknown = params
        .keys()
        .filter(|key| !key.starts_with(UTM_PREFIX) && !KNOWN_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();

    RecognizedParameters {
        android,
        ios: (ios != IosParameters::default()).then_some(ios),
        analytics: (analytics != AnalyticsParameters::default()).then_some(analytics),
        social_meta: (social_meta != SocialMetaParameters::default()).then_some(social_meta),
        itunes_affiliate: (itunes_affiliate != ItunesAffiliateParameters::default())
            .then_some(itunes_affiliate),
        other_platform: (other_platform != OtherPlatformParameters::default())
            .then_some(other_platform),
        options,
        unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{build_long_link, LinkComponents};
    use serde_json::json;

    fn bag(pairs: &[(&str, &str)]) -> FlatParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decodes_target_utm_and_version() {
        let params = bag(&[
            ("link", "https://app.example/product/123"),
            ("amv", "10"),
            ("utm_source", "email"),
            ("utm_campaign", "sale"),
            ("apn", "com.app"),
        ]);
        let result = parse_long_link(&params).expect("decode");
        assert_eq!(result.target.as_str(), "https://app.example/product/123");
        assert_eq!(result.minimum_app_version, Some(10));
        assert_eq!(
            result.utm_parameters,
            bag(&[("utm_campaign", "sale"), ("utm_source", "email")])
        );
    }

    #[test]
    fn missing_link_fails() {
        let params = bag(&[("utm_source", "email")]);
        assert_eq!(parse_long_link(&params), Err(LinkError::MissingTargetLink));
    }

    #[test]
    fn unparsable_link_fails() {
        let params = bag(&[("link", "not a url")]);
        assert_eq!(parse_long_link(&params), Err(LinkError::MissingTargetLink));
    }

    #[test]
    fn non_numeric_min_version_is_absent() {
        let params = bag(&[("link", "https://app.example/"), ("amv", "not-a-number")]);
        let result = parse_long_link(&params).expect("decode");
        assert_eq!(result.minimum_app_version, None);
    }

    #[test]
    fn negative_min_version_is_kept() {
        let params = bag(&[("link", "https://app.example/"), ("amv", "-1")]);
        let result = parse_long_link(&params).expect("decode");
        assert_eq!(result.minimum_app_version, Some(-1));

        let overflow = bag(&[("link", "https://app.example/"), ("amv", "99999999999")]);
        let result = parse_long_link(&overflow).expect("decode");
        assert_eq!(result.minimum_app_version, None);
    }

    #[test]
    fn empty_utm_values_are_kept() {
        let url = Url::parse("https://acme.example/?link=https%3A%2F%2Fapp.example%2F&utm_term")
            .expect("valid url");
        let result = parse_long_link(&query_params(&url)).expect("decode");
        assert_eq!(result.utm_parameters, bag(&[("utm_term", "")]));
    }

    #[test]
    fn first_repeated_query_key_wins() {
        let url = Url::parse("https://acme.example/?link=https%3A%2F%2Fa.example%2F&link=x")
            .expect("valid url");
        assert_eq!(
            query_params(&url).get("link").map(String::as_str),
            Some("https://a.example/")
        );
    }

    #[test]
    fn round_trips_through_encoder() {
        let analytics = AnalyticsParameters {
            source: Some("email".into()),
            medium: Some("newsletter & more".into()),
            campaign: Some("sale".into()),
            term: None,
            content: Some("".into()),
        };
        let target = Url::parse("https://app.example/p?id=1&ref=a b").expect("valid url");
        let components = LinkComponents::new(target.clone(), "https://acme.example")
            .android(AndroidParameters::new("com.app").minimum_version(7))
            .analytics(analytics.clone());

        let long_link = build_long_link(&components).expect("build");
        let result = parse_long_link(&query_params(&long_link)).expect("decode");

        assert_eq!(result.target, target);
        let expected: BTreeMap<String, String> = analytics
            .fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(result.utm_parameters, expected);
        assert_eq!(result.minimum_app_version, Some(7));
    }

    #[test]
    fn json_scalars_are_stringified() {
        let body = json!({
            "link": "https://app.example/",
            "amv": 12,
            "utm_source": null,
            "nested": {"a": 1},
        });
        let params = flat_params_from_json(body.as_object().expect("object"));
        assert_eq!(
            params,
            bag(&[
                ("amv", "12"),
                ("link", "https://app.example/"),
                ("utm_source", ""),
            ])
        );
        let result = parse_long_link(&params).expect("decode");
        assert_eq!(result.minimum_app_version, Some(12));
        assert_eq!(result.utm_parameters, bag(&[("utm_source", "")]));
    }

    #[test]
    fn recognizes_echoed_groups() {
        let params = bag(&[
            ("link", "https://app.example/"),
            ("apn", "com.app"),
            ("amv", "oops"),
            ("isi", "42"),
            ("st", "Title"),
            ("pathLength", "SHORT"),
            ("utm_source", "email"),
            ("x-custom", "1"),
        ]);
        let recognized = recognize_parameters(&params);

        assert_eq!(recognized.android, Some(AndroidParameters::new("com.app")));
        assert_eq!(
            recognized.ios.and_then(|ios| ios.app_store_id).as_deref(),
            Some("42")
        );
        assert_eq!(
            recognized.options.map(|o| o.path_length),
            Some(PathLength::Short)
        );
        assert!(recognized.itunes_affiliate.is_none());
        assert!(recognized.other_platform.is_none());
        assert_eq!(recognized.unknown, vec!["x-custom".to_string()]);
    }

    #[test]
    fn group_names_follow_precedence() {
        let params = bag(&[
            ("ofl", "https://web.example"),
            ("apn", "com.app"),
            ("utm_medium", "cpc"),
        ]);
        assert_eq!(
            recognize_parameters(&params).group_names(),
            ["analytics", "android", "other"]
        );
    }

    #[test]
    fn android_needs_package_name() {
        let params = bag(&[("afl", "https://fallback.example"), ("amv", "3")]);
        assert!(recognize_parameters(&params).android.is_none());
    }
}
