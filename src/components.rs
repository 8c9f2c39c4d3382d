//! Link components and the long-link encoder.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::LinkError;
use crate::params::{
    AndroidParameters, AnalyticsParameters, FieldMap, IosParameters, ItunesAffiliateParameters,
    OptionsParameters, OtherPlatformParameters, ParameterGroup, PathLength, SocialMetaParameters,
    ANDROID_MIN_VERSION, LINK, UTM_PREFIX,
};

/// Everything except RFC 3986 unreserved characters is escaped, so `&`, `=`
/// and `+` inside a key or value can never alter the query structure.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Inputs to a single long-link encode.
///
/// The domain prefix is only checked when the link is built, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkComponents {
    pub target: Url,
    pub domain_prefix: String,
    pub android: Option<AndroidParameters>,
    pub ios: IosParameters,
    pub itunes_affiliate: Option<ItunesAffiliateParameters>,
    pub social_meta: Option<SocialMetaParameters>,
    pub options: OptionsParameters,
    pub other_platform: Option<OtherPlatformParameters>,
    pub analytics: Option<AnalyticsParameters>,
}

impl LinkComponents {
    pub fn new(target: Url, domain_prefix: impl Into<String>) -> Self {
        Self {
            target,
            domain_prefix: domain_prefix.into(),
            android: None,
            ios: IosParameters::default(),
            itunes_affiliate: None,
            social_meta: None,
            options: OptionsParameters::default(),
            other_platform: None,
            analytics: None,
        }
    }

    pub fn android(mut self, android: AndroidParameters) -> Self {
        self.android = Some(android);
        self
    }

    pub fn ios(mut self, ios: IosParameters) -> Self {
        self.ios = ios;
        self
    }

    pub fn itunes_affiliate(mut self, itunes: ItunesAffiliateParameters) -> Self {
        self.itunes_affiliate = Some(itunes);
        self
    }

    pub fn social_meta(mut self, social: SocialMetaParameters) -> Self {
        self.social_meta = Some(social);
        self
    }

    pub fn path_length(mut self, path_length: PathLength) -> Self {
        self.options = OptionsParameters { path_length };
        self
    }

    pub fn other_platform(mut self, other: OtherPlatformParameters) -> Self {
        self.other_platform = Some(other);
        self
    }

    pub fn analytics(mut self, analytics: AnalyticsParameters) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Present groups in wire precedence order: analytics, social, iOS,
    /// Android, iTunes, other platform, options.
    pub fn groups(&self) -> Vec<ParameterGroup<'_>> {
        [
            self.analytics.as_ref().map(ParameterGroup::Analytics),
            self.social_meta.as_ref().map(ParameterGroup::SocialMeta),
            Some(ParameterGroup::Ios(&self.ios)),
            self.android.as_ref().map(ParameterGroup::Android),
            self.itunes_affiliate
                .as_ref()
                .map(ParameterGroup::ItunesAffiliate),
            self.other_platform.as_ref().map(ParameterGroup::OtherPlatform),
            Some(ParameterGroup::Options(&self.options)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// The prefix must be an `https` URL without a fragment, and its own query
/// must not carry keys the decoder reads (`link`, `amv`, `utm_*`).
fn parse_domain_prefix(prefix: &str) -> Result<Url, LinkError> {
    let invalid = || LinkError::InvalidDomainPrefix(prefix.to_owned());

    let url = Url::parse(prefix).map_err(|_| invalid())?;
    if url.scheme() != "https" || url.fragment().is_some() {
        return Err(invalid());
    }
    let shadows_decoded_key = url
        .query_pairs()
        .any(|(key, _)| key == LINK || key == ANDROID_MIN_VERSION || key.starts_with(UTM_PREFIX));
    if shadows_decoded_key {
        return Err(invalid());
    }
    Ok(url)
}

/// Flatten components into the ordered key/value list sent on the wire:
/// `link` first, then every present group in precedence order.
pub fn flatten_long_link(components: &LinkComponents) -> Result<FieldMap, LinkError> {
    parse_domain_prefix(&components.domain_prefix)?;

    let mut fields = vec![(LINK, components.target.as_str().to_owned())];
    for group in components.groups() {
        fields.extend(group.to_field_map());
    }
    Ok(fields)
}

/// Encode components as a long dynamic link under their domain prefix.
pub fn build_long_link(components: &LinkComponents) -> Result<Url, LinkError> {
    let fields = flatten_long_link(components)?;

    let query = fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let mut url = parse_domain_prefix(&components.domain_prefix)?;
    let query = match url.query().filter(|q| !q.is_empty()) {
        Some(existing) => format!("{}&{query}", existing.trim_end_matches('&')),
        None => query,
    };
    url.set_query(Some(&query));
    Ok(url)
}
