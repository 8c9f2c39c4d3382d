//! Typed parameter groups and their short wire keys.
//!
//! Every group knows how to emit its present fields as an ordered list of
//! `(wire key, value)` pairs. Absent fields (`None`, or an empty string)
//! contribute nothing; `OptionsParameters` always contributes `pathLength`.

/// Ordered `(wire key, value)` pairs produced by a parameter group.
pub type FieldMap = Vec<(&'static str, String)>;

// ── Wire keys ──────────────────────────────────────────────────────────────

pub const LINK: &str = "link";

pub const ANDROID_PACKAGE_NAME: &str = "apn";
pub const ANDROID_FALLBACK_URL: &str = "afl";
pub const ANDROID_MIN_VERSION: &str = "amv";

pub const IOS_APP_STORE_ID: &str = "isi";
pub const IOS_FALLBACK_URL: &str = "ifl";
pub const IOS_IPAD_FALLBACK_URL: &str = "ipfl";
pub const IOS_MIN_VERSION: &str = "imv";

pub const OTHER_PLATFORM_FALLBACK_URL: &str = "ofl";

pub const SOCIAL_TITLE: &str = "st";
pub const SOCIAL_DESCRIPTION: &str = "sd";
pub const SOCIAL_IMAGE_URL: &str = "si";

pub const UTM_PREFIX: &str = "utm_";
pub const UTM_SOURCE: &str = "utm_source";
pub const UTM_MEDIUM: &str = "utm_medium";
pub const UTM_CAMPAIGN: &str = "utm_campaign";
pub const UTM_TERM: &str = "utm_term";
pub const UTM_CONTENT: &str = "utm_content";

pub const ITUNES_AFFILIATE_TOKEN: &str = "at";
pub const ITUNES_CAMPAIGN_TOKEN: &str = "ct";
pub const ITUNES_PROVIDER_TOKEN: &str = "pt";

pub const PATH_LENGTH: &str = "pathLength";

fn push(fields: &mut FieldMap, key: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        fields.push((key, v.to_owned()));
    }
}

// ── Groups ─────────────────────────────────────────────────────────────────

/// Android app behaviour. The package name is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidParameters {
    pub package_name: String,
    pub fallback_url: Option<String>,
    /// Minimum app version code; `0` means "no minimum" and is not emitted.
    pub minimum_version: i32,
}

impl AndroidParameters {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            fallback_url: None,
            minimum_version: 0,
        }
    }

    pub fn fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    pub fn minimum_version(mut self, version: i32) -> Self {
        self.minimum_version = version;
        self
    }

    pub fn fields(&self) -> FieldMap {
        let mut fields = vec![(ANDROID_PACKAGE_NAME, self.package_name.clone())];
        push(&mut fields, ANDROID_FALLBACK_URL, &self.fallback_url);
        if self.minimum_version != 0 {
            fields.push((ANDROID_MIN_VERSION, self.minimum_version.to_string()));
        }
        fields
    }
}

/// iOS app behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IosParameters {
    pub app_store_id: Option<String>,
    pub fallback_url: Option<String>,
    pub ipad_fallback_url: Option<String>,
    pub minimum_app_version: Option<String>,
}

impl IosParameters {
    pub fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        push(&mut fields, IOS_APP_STORE_ID, &self.app_store_id);
        push(&mut fields, IOS_FALLBACK_URL, &self.fallback_url);
        push(&mut fields, IOS_IPAD_FALLBACK_URL, &self.ipad_fallback_url);
        push(&mut fields, IOS_MIN_VERSION, &self.minimum_app_version);
        fields
    }
}

/// UTM attribution tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsParameters {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
}

impl AnalyticsParameters {
    pub fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        push(&mut fields, UTM_SOURCE, &self.source);
        push(&mut fields, UTM_MEDIUM, &self.medium);
        push(&mut fields, UTM_CAMPAIGN, &self.campaign);
        push(&mut fields, UTM_TERM, &self.term);
        push(&mut fields, UTM_CONTENT, &self.content);
        fields
    }
}

/// Social preview metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialMetaParameters {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl SocialMetaParameters {
    pub fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        push(&mut fields, SOCIAL_TITLE, &self.title);
        push(&mut fields, SOCIAL_DESCRIPTION, &self.description);
        push(&mut fields, SOCIAL_IMAGE_URL, &self.image_url);
        fields
    }
}

/// iTunes Connect affiliate tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItunesAffiliateParameters {
    pub affiliate_token: Option<String>,
    pub campaign_token: Option<String>,
    pub provider_token: Option<String>,
}

impl ItunesAffiliateParameters {
    pub fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        push(&mut fields, ITUNES_AFFILIATE_TOKEN, &self.affiliate_token);
        push(&mut fields, ITUNES_CAMPAIGN_TOKEN, &self.campaign_token);
        push(&mut fields, ITUNES_PROVIDER_TOKEN, &self.provider_token);
        fields
    }
}

/// Fallback for platforms other than Android and iOS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherPlatformParameters {
    pub fallback_url: Option<String>,
}

impl OtherPlatformParameters {
    pub fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        push(&mut fields, OTHER_PLATFORM_FALLBACK_URL, &self.fallback_url);
        fields
    }
}

/// How guessable the backend should make the generated short path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PathLength {
    #[default]
    Unguessable,
    Short,
}

impl PathLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathLength::Unguessable => "UNGUESSABLE",
            PathLength::Short => "SHORT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNGUESSABLE" => Some(PathLength::Unguessable),
            "SHORT" => Some(PathLength::Short),
            _ => None,
        }
    }
}

/// Link-creation options. Always emits exactly one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionsParameters {
    pub path_length: PathLength,
}

impl OptionsParameters {
    pub fn fields(&self) -> FieldMap {
        vec![(PATH_LENGTH, self.path_length.as_str().to_owned())]
    }
}

// ── Closed set ─────────────────────────────────────────────────────────────

/// A borrowed view of one parameter group, used by the encoder to walk
/// groups uniformly in precedence order.
#[derive(Debug, Clone, Copy)]
pub enum ParameterGroup<'a> {
    Analytics(&'a AnalyticsParameters),
    SocialMeta(&'a SocialMetaParameters),
    Ios(&'a IosParameters),
    Android(&'a AndroidParameters),
    ItunesAffiliate(&'a ItunesAffiliateParameters),
    OtherPlatform(&'a OtherPlatformParameters),
    Options(&'a OptionsParameters),
}

impl ParameterGroup<'_> {
    /// The group's present fields, in the group's fixed key order.
    pub fn to_field_map(&self) -> FieldMap {
        match self {
            ParameterGroup::Analytics(p) => p.fields(),
            ParameterGroup::SocialMeta(p) => p.fields(),
            ParameterGroup::Ios(p) => p.fields(),
            ParameterGroup::Android(p) => p.fields(),
            ParameterGroup::ItunesAffiliate(p) => p.fields(),
            ParameterGroup::OtherPlatform(p) => p.fields(),
            ParameterGroup::Options(p) => p.fields(),
        }
    }
}
