// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Status links and outbound messages

pub mod codec;
pub mod outbound;

pub use codec::{decode, encode, is_status_view, parse_status_link, StatusSnapshot};
pub use outbound::{app_share_data, compose_sms_uri};
