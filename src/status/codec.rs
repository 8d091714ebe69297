// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Status snapshot <-> URL query parameters
//!
//! A status link carries everything the receiver needs:
//!
//! ```text
//! <base>?view=status&msg=<text>[&lat=<f64>&lon=<f64>][&bat=<0..1>&chg=<1|0>]
//! ```
//!
//! Decoding is tolerant. A coordinate or battery pair that is incomplete or does not
//! parse is dropped on its own and the rest of the snapshot survives.

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::core::{BatterySample, LocationSample};

pub const VIEW_PARAM: &str = "view";
pub const STATUS_VIEW: &str = "status";

/// Point-in-time copy of what an alert reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub message: String,
    pub location: Option<LocationSample>,
    pub battery: Option<BatterySample>,
}

impl StatusSnapshot {
    pub fn new(
        message: impl Into<String>,
        location: Option<LocationSample>,
        battery: Option<BatterySample>,
    ) -> Self {
        Self {
            message: message.into(),
            location,
            battery,
        }
    }
}

/// Percent-encode a value the way a URI component is encoded; space becomes `%20`
pub fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Build the status link against `base`, replacing any query or fragment it had
pub fn encode(base: &Url, snapshot: &StatusSnapshot) -> Url {
    let mut query = format!(
        "{}={}&msg={}",
        VIEW_PARAM,
        STATUS_VIEW,
        encode_component(&snapshot.message)
    );
    if let Some(location) = snapshot.location {
        query.push_str(&format!("&lat={}&lon={}", location.latitude, location.longitude));
    }
    if let Some(battery) = snapshot.battery {
        let charging = if battery.charging { "1" } else { "0" };
        query.push_str(&format!("&bat={}&chg={}", battery.level, charging));
    }

    let mut url = base.clone();
    url.set_fragment(None);
    url.set_query(Some(&query));
    url
}

/// True when the link asks for the read-only status view
pub fn is_status_view(url: &Url) -> bool {
    first_value(url.query().unwrap_or(""), VIEW_PARAM).as_deref() == Some(STATUS_VIEW)
}

/// Read a snapshot out of a link's query. Never fails as a whole.
pub fn decode(url: &Url) -> StatusSnapshot {
    decode_query(url.query().unwrap_or(""))
}

/// Same as [`decode`] for a bare query string, with or without the leading `?`
pub fn decode_query(query: &str) -> StatusSnapshot {
    let query = query.strip_prefix('?').unwrap_or(query);

    let message = first_value(query, "msg").unwrap_or_default();

    let location = match (number(query, "lat"), number(query, "lon")) {
        (Some(lat), Some(lon)) => Some(LocationSample::new(lat, lon)).filter(LocationSample::is_valid),
        _ => None,
    };

    let battery = match (number(query, "bat"), first_value(query, "chg")) {
        (Some(level), Some(chg)) => Some(BatterySample::new(level, chg == "1")),
        _ => None,
    };

    StatusSnapshot {
        message,
        location,
        battery,
    }
}

/// Parse a link given as text; `None` unless it is a status view link
pub fn parse_status_link(link: &str) -> Option<StatusSnapshot> {
    let url = Url::parse(link).ok()?;
    is_status_view(&url).then(|| decode(&url))
}

/// First occurrence wins
fn first_value(query: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn number(query: &str, key: &str) -> Option<f64> {
    first_value(query, key)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> Url {
        Url::parse("https://distress-signal.app/").unwrap()
    }

    #[test]
    fn test_encodes_full_snapshot() {
        let snapshot = StatusSnapshot::new(
            "Help, car broke down",
            Some(LocationSample::new(37.774900, -122.419400)),
            Some(BatterySample::new(0.42, false)),
        );

        let url = encode(&base(), &snapshot);
        assert!(url.as_str().contains(
            "msg=Help%2C%20car%20broke%20down&lat=37.7749&lon=-122.4194&bat=0.42&chg=0"
        ));
        assert!(is_status_view(&url));
        assert_eq!(decode(&url), snapshot);
    }

    #[test]
    fn test_absent_parts_are_omitted() {
        let url = encode(&base(), &StatusSnapshot::new("ok", None, None));
        let query = url.query().unwrap();
        assert_eq!(query, "view=status&msg=ok");

        let decoded = decode(&url);
        assert_eq!(decoded.location, None);
        assert_eq!(decoded.battery, None);
    }

    #[test]
    fn test_replaces_existing_query() {
        let base = Url::parse("https://example.org/app/?view=main#top").unwrap();
        let url = encode(&base, &StatusSnapshot::new("x", None, None));
        assert_eq!(url.as_str(), "https://example.org/app/?view=status&msg=x");
    }

    #[test]
    fn test_half_pairs_decode_to_absent() {
        let decoded = decode_query("view=status&msg=hi&lat=37.7&bat=0.5");
        assert_eq!(decoded.message, "hi");
        assert_eq!(decoded.location, None);
        assert_eq!(decoded.battery, None);

        let decoded = decode_query("?view=status&lon=1.0&chg=1");
        assert_eq!(decoded.location, None);
        assert_eq!(decoded.battery, None);
    }

    #[test]
    fn test_bad_numbers_only_drop_their_field() {
        let decoded = decode_query("view=status&msg=a&lat=north&lon=2&bat=0.9&chg=1");
        assert_eq!(decoded.message, "a");
        assert_eq!(decoded.location, None);
        assert_eq!(decoded.battery, Some(BatterySample::new(0.9, true)));

        let decoded = decode_query("lat=NaN&lon=2&bat=inf&chg=0");
        assert_eq!(decoded.location, None);
        assert_eq!(decoded.battery, None);
    }

    #[test]
    fn test_plus_and_missing_message() {
        assert_eq!(decode_query("msg=two+words").message, "two words");
        assert_eq!(decode_query("view=status").message, "");
    }

    #[test]
    fn test_parse_status_link() {
        assert!(parse_status_link("https://a.example/?view=status&msg=x").is_some());
        assert!(parse_status_link("https://a.example/?view=main").is_none());
        assert!(parse_status_link("not a link").is_none());
    }

    proptest! {
        #[test]
        fn decode_never_panics(query in ".*") {
            let _ = decode_query(&query);
        }

        #[test]
        fn lat_alone_is_never_a_location(lat in -90.0f64..90.0, noise in "[a-z=&]{0,12}") {
            let query = format!("view=status&lat={lat}&{noise}");
            prop_assume!(!query.contains("lon="));
            prop_assert_eq!(decode_query(&query).location, None);
        }
    }
}
