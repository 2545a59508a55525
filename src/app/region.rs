//! Country code to region name normalization
//!
//! Both acquisition pipelines address regions by the lowercase names the Geofabrik
//! index and earth_osm use. Configuration, on the other hand, lists ISO country
//! codes. This module is the single place where one becomes the other.

/// Look up the region name for an uppercase two-letter country code
fn lookup(code: &str) -> Option<&'static str> {
    match code {
        "CO" => Some("colombia"),
        "BR" => Some("brazil"),
        "AR" => Some("argentina"),
        "PE" => Some("peru"),
        "VE" => Some("venezuela"),
        "EC" => Some("ecuador"),
        "CL" => Some("chile"),
        "BO" => Some("bolivia"),
        "UY" => Some("uruguay"),
        "PY" => Some("paraguay"),
        _ => None,
    }
}

/// Normalize a country code into a region name
///
/// Two-character inputs are treated as country codes: known codes map to their
/// region name, unknown codes are lowercased. Anything else is assumed to already be
/// a region name and is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use osm_power_fetcher::app::normalize_region;
///
/// assert_eq!(normalize_region("co"), "colombia");
/// assert_eq!(normalize_region("XX"), "xx");
/// assert_eq!(normalize_region("central-america"), "central-america");
/// ```
pub fn normalize_region(code: &str) -> String {
    if code.chars().count() != 2 {
        return code.to_string();
    }

    match lookup(&code.to_uppercase()) {
        Some(region) => region.to_string(),
        None => code.to_lowercase(),
    }
}

/// Normalize a list of country codes, preserving order
pub fn normalize_regions<S: AsRef<str>>(codes: &[S]) -> Vec<String> {
    codes
        .iter()
        .map(|code| normalize_region(code.as_ref()))
        .collect()
}
