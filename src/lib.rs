//! Build, validate and resolve dynamic links.
//!
//! The codec ([`build_long_link`], [`parse_long_link`]) and the validator
//! ([`is_recognized_link`]) are pure functions of their arguments. Backend
//! calls go through [`DynamicLinks`] and a [`LinkTransport`].

pub mod client;
pub mod components;
pub mod config;
pub mod error;
pub mod long_link;
pub mod models;
pub mod params;
pub mod transport;
pub mod validate;

pub use client::DynamicLinks;
pub use components::{build_long_link, flatten_long_link, LinkComponents};
pub use config::ClientConfig;
pub use error::{ClientError, LinkError};
pub use long_link::{
    flat_params_from_json, parse_long_link, query_params, recognize_parameters, FlatParams,
    LongLinkResult, RecognizedParameters,
};
pub use models::{DynamicLinkShortenResult, ResolveResponse, Warning};
pub use params::{
    AndroidParameters, AnalyticsParameters, FieldMap, IosParameters, ItunesAffiliateParameters,
    OptionsParameters, OtherPlatformParameters, ParameterGroup, PathLength, SocialMetaParameters,
};
pub use transport::{HttpTransport, LinkTransport};
pub use validate::{is_recognized_link, is_recognized_url};
