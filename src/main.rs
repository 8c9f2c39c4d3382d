use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use dynlinks::{
    config::parse_host_list, parse_long_link, query_params, recognize_parameters,
    AndroidParameters, AnalyticsParameters, ClientConfig, DynamicLinks, IosParameters,
    ItunesAffiliateParameters, LinkComponents, OtherPlatformParameters, PathLength,
    SocialMetaParameters,
};

#[derive(Parser)]
#[command(name = "dynlinks")]
#[command(about = "Build, inspect, shorten and resolve dynamic links", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the long link for the given components
    Build(LinkArgs),
    /// Create a short link through the backend
    Shorten(LinkArgs),
    /// Decode a long link's query string
    Parse {
        url: String,
    },
    /// Report whether a link is one this client handles
    Check {
        url: String,
        /// Allowed host (repeatable); adds to DYNLINKS_ALLOWED_HOSTS
        #[arg(long = "host")]
        hosts: Vec<String>,
    },
    /// Exchange a link with the backend and decode the result
    Resolve {
        url: String,
    },
}

/// Link components as command-line flags
#[derive(Args, Debug)]
struct LinkArgs {
    /// Deep-link target
    target: String,

    /// Domain prefix (defaults to DYNLINKS_DOMAIN_PREFIX)
    #[arg(long)]
    domain_prefix: Option<String>,

    /// Request a short, guessable path instead of an unguessable one
    #[arg(long)]
    short_path: bool,

    #[arg(long)]
    android_package: Option<String>,
    #[arg(long)]
    android_fallback: Option<String>,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    android_min_version: i32,

    #[arg(long)]
    ios_app_store_id: Option<String>,
    #[arg(long)]
    ios_fallback: Option<String>,
    #[arg(long)]
    ipad_fallback: Option<String>,
    #[arg(long)]
    ios_min_version: Option<String>,

    #[arg(long)]
    utm_source: Option<String>,
    #[arg(long)]
    utm_medium: Option<String>,
    #[arg(long)]
    utm_campaign: Option<String>,
    #[arg(long)]
    utm_term: Option<String>,
    #[arg(long)]
    utm_content: Option<String>,

    #[arg(long)]
    social_title: Option<String>,
    #[arg(long)]
    social_description: Option<String>,
    #[arg(long)]
    social_image: Option<String>,

    #[arg(long)]
    affiliate_token: Option<String>,
    #[arg(long)]
    campaign_token: Option<String>,
    #[arg(long)]
    provider_token: Option<String>,

    #[arg(long)]
    other_fallback: Option<String>,
}

impl LinkArgs {
    fn into_components(self, default_prefix: Option<String>) -> Result<LinkComponents> {
        let target = Url::parse(&self.target)
            .with_context(|| format!("target {:?} is not an absolute URL", self.target))?;
        let prefix = self
            .domain_prefix
            .or(default_prefix)
            .context("--domain-prefix or DYNLINKS_DOMAIN_PREFIX must be set")?;

        let mut components = LinkComponents::new(target, prefix).ios(IosParameters {
            app_store_id: self.ios_app_store_id,
            fallback_url: self.ios_fallback,
            ipad_fallback_url: self.ipad_fallback,
            minimum_app_version: self.ios_min_version,
        });

        if let Some(package) = self.android_package {
            let mut android =
                AndroidParameters::new(package).minimum_version(self.android_min_version);
            android.fallback_url = self.android_fallback;
            components = components.android(android);
        }

        let analytics = AnalyticsParameters {
            source: self.utm_source,
            medium: self.utm_medium,
            campaign: self.utm_campaign,
            term: self.utm_term,
            content: self.utm_content,
        };
        if analytics != AnalyticsParameters::default() {
            components = components.analytics(analytics);
        }

        let social = SocialMetaParameters {
            title: self.social_title,
            description: self.social_description,
            image_url: self.social_image,
        };
        if social != SocialMetaParameters::default() {
            components = components.social_meta(social);
        }

        let itunes = ItunesAffiliateParameters {
            affiliate_token: self.affiliate_token,
            campaign_token: self.campaign_token,
            provider_token: self.provider_token,
        };
        if itunes != ItunesAffiliateParameters::default() {
            components = components.itunes_affiliate(itunes);
        }

        if self.other_fallback.is_some() {
            components = components.other_platform(OtherPlatformParameters {
                fallback_url: self.other_fallback,
            });
        }

        if self.short_path {
            components = components.path_length(PathLength::Short);
        }

        Ok(components)
    }
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file is absent, env vars may already be set)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dynlinks=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => {
            let prefix = std::env::var("DYNLINKS_DOMAIN_PREFIX").ok();
            let components = args.into_components(prefix)?;
            let long_link = dynlinks::build_long_link(&components)?;
            println!("{long_link}");
        }
        Command::Shorten(args) => {
            let links = connect()?;
            let components = args.into_components(links.config().domain_prefix.clone())?;
            let result = links.shorten(&components).await?;
            println!("{}", result.short_link);
            for warning in &result.warnings {
                eprintln!("warning {}: {}", warning.code, warning.message);
            }
        }
        Command::Parse { url } => {
            let url = Url::parse(&url).with_context(|| format!("{url:?} is not a URL"))?;
            let params = query_params(&url);
            let result = parse_long_link(&params)?;
            print_result(&result);
            let recognized = recognize_parameters(&params);
            println!("groups: {}", recognized.group_names().join(", "));
            if !recognized.unknown.is_empty() {
                println!("unknown keys: {}", recognized.unknown.join(", "));
            }
        }
        Command::Check { url, hosts } => {
            let mut allowed = std::env::var("DYNLINKS_ALLOWED_HOSTS")
                .map(|h| parse_host_list(&h))
                .unwrap_or_default();
            allowed.extend(hosts);
            let recognized = dynlinks::is_recognized_url(&url, &allowed);
            println!("{}", if recognized { "recognized" } else { "not recognized" });
            if !recognized {
                std::process::exit(1);
            }
        }
        Command::Resolve { url } => {
            let links = connect()?;
            let result = links.resolve(&url).await?;
            print_result(&result);
        }
    }

    Ok(())
}

fn connect() -> Result<DynamicLinks> {
    let config = ClientConfig::from_env()?;
    tracing::info!("Backend: {}", config.base_url);
    DynamicLinks::new(config).context("failed to build HTTP client")
}

fn print_result(result: &dynlinks::LongLinkResult) {
    println!("target: {}", result.target);
    if let Some(version) = result.minimum_app_version {
        println!("minimum app version: {version}");
    }
    for (key, value) in &result.utm_parameters {
        println!("{key}: {value}");
    }
}
