// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Outbound SMS and share payloads

use url::Url;

use super::codec::encode_component;
use crate::core::ContactList;
use crate::platform::ShareData;

pub const SMS_BODY_PREFIX: &str = "EMERGENCY from a contact. View my live status and location here: ";

pub const SHARE_TITLE: &str = "Distress Signal App";
pub const SHARE_TEXT: &str = "Check out this emergency distress signal web app.";

/// `sms:` URI addressed to every contact, body pointing at the status link
pub fn compose_sms_uri(contacts: &ContactList, status_url: &Url) -> String {
    let recipients = contacts.iter().collect::<Vec<_>>().join(",");
    let body = format!("{}{}", SMS_BODY_PREFIX, status_url);
    format!("sms:{}?body={}", recipients, encode_component(&body))
}

/// Invitation to the app itself, pointing at the site origin
pub fn app_share_data(base: &Url) -> ShareData {
    ShareData {
        title: SHARE_TITLE.to_string(),
        text: SHARE_TEXT.to_string(),
        url: base.origin().ascii_serialization(),
    }
}
