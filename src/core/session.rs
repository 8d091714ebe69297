// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! User settings and the emergency contact list

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::db::{SettingsStore, StoreError};
use crate::signals::VibrationPattern;

pub const DEFAULT_MESSAGE: &str = "This is an emergency. Please help.";

/// Stored under these keys; message is raw text, the rest JSON
pub const KEY_MESSAGE: &str = "distressMessage";
pub const KEY_CONTACTS: &str = "distressContacts";
pub const KEY_SILENT: &str = "distressSilentMode";
pub const KEY_PATTERN: &str = "distressVibrationPattern";
pub const KEY_TEXT_COLOR: &str = "distressTextColor";

/// Foreground color of the active display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    #[default]
    White,
    Black,
    Yellow,
}

impl TextColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
            Self::Yellow => "yellow",
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            "yellow" => Ok(Self::Yellow),
            other => Err(format!("unknown text color '{other}' (white, black, yellow)")),
        }
    }
}

/// Ordered phone numbers, unique by value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ContactList(Vec<String>);

impl ContactList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims the number; returns false for blanks and duplicates
    pub fn add(&mut self, number: &str) -> bool {
        let number = number.trim();
        if number.is_empty() || self.contains(number) {
            return false;
        }
        self.0.push(number.to_string());
        true
    }

    pub fn remove(&mut self, number: &str) -> bool {
        let number = number.trim();
        let before = self.0.len();
        self.0.retain(|c| c != number);
        self.0.len() != before
    }

    pub fn contains(&self, number: &str) -> bool {
        self.0.iter().any(|c| c == number)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ContactList {
    fn from(numbers: Vec<String>) -> Self {
        let mut list = Self::new();
        for number in &numbers {
            list.add(number);
        }
        list
    }
}

impl From<ContactList> for Vec<String> {
    fn from(list: ContactList) -> Self {
        list.0
    }
}

impl<'a> FromIterator<&'a str> for ContactList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = Self::new();
        for number in iter {
            list.add(number);
        }
        list
    }
}

/// Everything the user configures between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub message: String,
    pub contacts: ContactList,
    pub silent: bool,
    pub pattern: VibrationPattern,
    pub text_color: TextColor,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            message: DEFAULT_MESSAGE.to_string(),
            contacts: ContactList::new(),
            silent: false,
            pattern: VibrationPattern::default(),
            text_color: TextColor::default(),
        }
    }
}

impl Settings {
    /// Read each key on its own; a missing or broken key keeps its default
    pub fn load(store: &dyn SettingsStore) -> Self {
        let mut settings = Self::default();

        match store.get(KEY_MESSAGE) {
            Ok(Some(message)) if !message.is_empty() => settings.message = message,
            Ok(_) => {}
            Err(e) => warn!("Failed to load {}: {}", KEY_MESSAGE, e),
        }
        if let Some(contacts) = load_json::<Vec<String>>(store, KEY_CONTACTS) {
            settings.contacts = contacts.into();
        }
        if let Some(silent) = load_json(store, KEY_SILENT) {
            settings.silent = silent;
        }
        if let Some(pattern) = load_json(store, KEY_PATTERN) {
            settings.pattern = pattern;
        }
        if let Some(color) = load_json(store, KEY_TEXT_COLOR) {
            settings.text_color = color;
        }

        debug!(
            "Settings loaded: {} contacts, silent {}, pattern {}",
            settings.contacts.len(),
            settings.silent,
            settings.pattern
        );
        settings
    }

    /// Write every key. Failures are logged and the in-memory values stand.
    pub fn save(&self, store: &dyn SettingsStore) -> bool {
        match self.try_save(store) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save settings: {}", e);
                false
            }
        }
    }

    fn try_save(&self, store: &dyn SettingsStore) -> Result<(), StoreError> {
        store.set(KEY_MESSAGE, &self.message)?;
        store.set(KEY_CONTACTS, &to_json(KEY_CONTACTS, &self.contacts)?)?;
        store.set(KEY_SILENT, &to_json(KEY_SILENT, &self.silent)?)?;
        store.set(KEY_PATTERN, &to_json(KEY_PATTERN, &self.pattern)?)?;
        store.set(KEY_TEXT_COLOR, &to_json(KEY_TEXT_COLOR, &self.text_color)?)?;
        Ok(())
    }
}

fn load_json<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return None,
        Err(e) => {
            warn!("Failed to load {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            let err = StoreError::Malformed {
                key: key.to_string(),
                reason: e.to_string(),
            };
            warn!("{}", err);
            None
        }
    }
}

fn to_json<T: Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Malformed {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
