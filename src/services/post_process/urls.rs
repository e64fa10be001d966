use std::collections::BTreeMap;

use url::{form_urlencoded, Url};

use crate::models::{GenerationResult, Recommendation, ToolId};

const SEARCH_BASE: &str = "https://www.google.com/search?q=";
const WATCH_MODE_KEY: &str = "watchMode";
const CINEMA_WATCH_MODE: &str = "Cinema";

/// Aggregator and social domains whose links are assumed durable
const TRUSTED_DOMAINS: &[&str] = &[
    "google.com",
    "facebook.com",
    "instagram.com",
    "yelp.com",
    "tripadvisor.com",
    "booking.com",
    "airbnb.com",
    "youtube.com",
    "youtu.be",
];

/// Ticketing brands trusted under any domain label they start (ticketmaster.co.uk, ...)
const TRUSTED_BRANDS: &[&str] = &["ticketmaster", "eventbrite"];

/// Repairs or synthesizes recommendation links
///
/// Model-written links to small venues are frequently stale or invented, so
/// anything outside the trusted domains is swapped for a search link built from
/// the venue name, location and the tool's suffix. Running it twice is a no-op.
pub fn normalize_venue_urls(
    mut result: GenerationResult,
    tool: ToolId,
    target_location: &str,
    inputs: &BTreeMap<String, String>,
) -> GenerationResult {
    if tool == ToolId::Movie
        && inputs.get(WATCH_MODE_KEY).map(String::as_str) == Some(CINEMA_WATCH_MODE)
    {
        for rec in &mut result.recommendations {
            force_showtimes_search(rec, target_location);
        }
        return result;
    }

    // Video links are canonical upstream
    if tool == ToolId::Youtube {
        return result;
    }

    let Some(suffix) = tool.url_suffix() else {
        return result;
    };

    for rec in &mut result.recommendations {
        let keep = match rec.website.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(website) => is_google_search(website) || is_trusted(website),
        };
        if !keep {
            rec.website = Some(search_url(&rec.name, target_location, suffix));
        }
    }

    result
}

fn force_showtimes_search(rec: &mut Recommendation, location: &str) {
    let already_showtimes = rec
        .website
        .as_deref()
        .map(|website| is_google_search(website) && website.contains("showtimes"))
        .unwrap_or(false);

    if !already_showtimes {
        rec.website = Some(showtimes_url(&rec.name, location));
    }
}

fn encode(part: &str) -> String {
    form_urlencoded::byte_serialize(part.trim().as_bytes()).collect()
}

fn join_terms(terms: &[String]) -> String {
    let terms: Vec<&str> = terms
        .iter()
        .map(String::as_str)
        .filter(|term| !term.is_empty())
        .collect();
    format!("{}{}", SEARCH_BASE, terms.join("+"))
}

/// `https://www.google.com/search?q={name}+showtimes+near+{location}`
pub fn showtimes_url(name: &str, location: &str) -> String {
    join_terms(&[
        encode(name),
        "showtimes+near".to_string(),
        encode(location),
    ])
}

/// `https://www.google.com/search?q={name}+{location}+{suffix}`
///
/// Name and location are form-encoded (spaces become `+`); the suffix is
/// appended as-is since it is already in query form.
pub fn search_url(name: &str, location: &str, suffix: &str) -> String {
    join_terms(&[encode(name), encode(location), suffix.to_string()])
}

fn parse_lenient(website: &str) -> Option<Url> {
    let website = website.trim();
    Url::parse(website)
        .ok()
        .filter(|url| url.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{}", website)).ok())
}

fn host_of(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Whether the link is already a Google search page
pub fn is_google_search(website: &str) -> bool {
    let Some(url) = parse_lenient(website) else {
        return false;
    };
    let is_google = host_of(&url).map_or(false, |host| is_google_host(&host));
    is_google && url.path().starts_with("/search")
}

/// `google.com`, `google.<cc>`, `google.co.<cc>` or `google.com.<cc>`
fn is_google_host(host: &str) -> bool {
    let Some(rest) = host.strip_prefix("google.") else {
        return false;
    };
    let country = rest
        .strip_prefix("co.")
        .or_else(|| rest.strip_prefix("com."))
        .unwrap_or(rest);

    rest == "com" || (country.len() == 2 && country.bytes().all(|b| b.is_ascii_lowercase()))
}

/// Whether the link's domain is on the trusted list
pub fn is_trusted(website: &str) -> bool {
    let Some(host) = parse_lenient(website).as_ref().and_then(host_of) else {
        return false;
    };

    let trusted_domain = TRUSTED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));

    let trusted_brand = host
        .split('.')
        .any(|label| TRUSTED_BRANDS.iter().any(|brand| label.starts_with(brand)));

    trusted_domain || trusted_brand
}
