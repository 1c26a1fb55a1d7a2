// src/probes/takeover.rs
use crate::probes::Probe;
use crate::resolver::Resolver;
use crate::session::Session;
use crate::types::{Classification, Outcome, Target};
use async_trait::async_trait;
use log::debug;
use std::time::Duration;

/// Body fragments hosting providers serve for unclaimed custom domains.
/// Checked in order; the first match wins.
pub const FINGERPRINTS: &[(&str, &str)] = &[
    ("GitHub Pages", "There isn't a GitHub Pages site here."),
    ("Heroku", "No such app"),
    ("Shopify", "Sorry, this shop is currently unavailable."),
    ("Tumblr", "There's nothing here."),
    ("WordPress", "Do you want to register *.wordpress.com?"),
    ("Amazon S3", "The specified bucket does not exist"),
    ("Bitbucket", "Repository not found"),
    ("Ghost", "The thing you were looking for is no longer here, or never was"),
    ("Pantheon", "The gods are wise, but do not know of the site which you seek."),
    ("Fastly", "Fastly error: unknown domain"),
    ("Zendesk", "Help Center Closed"),
    ("Teamwork", "Oops - We didn't find your site."),
    ("Helpjuice", "We could not find what you're looking for."),
    ("Helpscout", "No settings were found for this company:"),
    ("Cargo", "If you're moving your domain away from Cargo you must make this configuration through your registrar's DNS control panel."),
    ("Uservoice", "This UserVoice subdomain is currently available!"),
    ("Surge", "project not found"),
    ("Intercom", "This page is reserved for artistic dogs."),
    ("Webflow", "The page you are looking for doesn't exist or has been moved."),
    ("Kajabi", "The page you were looking for doesn't exist."),
    ("Thinkific", "You may have mistyped the address or the page may have moved."),
    ("Tave", "Sorry, this page is no longer available."),
    ("Wishpond", "https://www.wishpond.com/404?campaign=true"),
    ("Aftership", "Oops.</h2><p class=\"text-muted text-tight\">The page you're looking for doesn't exist."),
    ("Aha", "There is no portal here ... sending you back to Aha!"),
    ("Brightcove", "<p class=\"bc-gallery-error-code\">Error Code: 404</p>"),
    ("Bigcartel", "<h1>Oops! We couldn&#8217;t find that page.</h1>"),
    ("Activecompaign", "alt=\"LIGHTTPD - fly light.\""),
    ("Compaignmonitor", "Double check the URL or <a href=\"mailto:help@createsend.com"),
    ("Acquia", "The site you are looking for could not be found."),
    ("Proposify", "If you need immediate assistance, please contact <a href=\"mailto:support@proposify.biz"),
    ("Simplebooklet", "We can't find this <a href=\"https://simplebooklet.com"),
    ("Getresponse", "With GetResponse Landing Pages, lead generation has never been easier"),
    ("Vend", "Looks like you've traveled too far into cyberspace."),
    ("Jetbrains", "is not a registered InCloud YouTrack."),
    ("Azure", "404 Web Site not found."),
];

pub const DANGLING_CNAME: &str = "Dangling CNAME";

pub fn fingerprint(body: &str) -> Option<&'static str> {
    FINGERPRINTS
        .iter()
        .find(|(_, signature)| body.contains(signature))
        .map(|(service, _)| *service)
}

/// True when the request died resolving the host name.
fn is_dns_failure(e: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(e);
    while let Some(err) = source {
        let message = err.to_string();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        source = err.source();
    }
    false
}

/// Checks already discovered hostnames for signs of an unclaimed service.
/// Candidates are full hostnames; the scan target is only used for logging.
#[derive(Clone)]
pub struct TakeoverProbe {
    session: Session,
    resolver: Resolver,
}

impl TakeoverProbe {
    pub fn new(session: Session, resolver: Resolver) -> Self {
        Self { session, resolver }
    }
}

#[async_trait]
impl Probe for TakeoverProbe {
    fn name(&self) -> &str {
        "Subdomain Takeover"
    }

    async fn probe(&self, _target: &Target, candidate: &str, timeout: Duration) -> Vec<Outcome> {
        let url = format!("http://{}", candidate);

        // Unclaimed-service pages often sit behind an http to https hop
        let outcome = match self.session.follow(&url, timeout).await {
            Ok(response) => match response.text().await {
                Ok(body) => match fingerprint(&body) {
                    Some(service) => Outcome::hit(
                        candidate,
                        Classification::Takeover {
                            service: service.to_string(),
                        },
                        url,
                    ),
                    None => Outcome::miss(candidate, Classification::NotVulnerable, url),
                },
                Err(e) => Outcome::failed(candidate, url, e),
            },
            Err(e) if is_dns_failure(&e) => {
                // Unresolvable host that still has a CNAME points at a released resource
                let host = candidate.split(':').next().unwrap_or(candidate);
                match self.resolver.lookup_cname(host).await {
                    Some(cname) => {
                        debug!("{} has dangling CNAME {}", candidate, cname);
                        Outcome::hit(
                            candidate,
                            Classification::Takeover {
                                service: DANGLING_CNAME.to_string(),
                            },
                            cname,
                        )
                    }
                    None => Outcome::failed(candidate, url, e),
                }
            }
            Err(e) => Outcome::failed(candidate, url, e),
        };

        vec![outcome]
    }
}
