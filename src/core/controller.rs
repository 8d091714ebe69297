// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Session controller - owns the alert lifecycle
//!
//! Activation is two-step: [`SessionController::request_activation`] only asks,
//! [`SessionController::confirm`] commits. Entering the active state starts the siren,
//! vibration and location coordinators as one unit; leaving it stops all three before
//! the session reports inactive. A coordinator that cannot start degrades its channel
//! and the session carries on without it.

use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use super::event_bus::{Channel, EventBus, SignalEvent};
use super::session::{ContactList, Settings};
use super::state::SignalState;
use crate::config::Config;
use crate::db::SettingsStore;
use crate::platform::{Capabilities, PlatformError};
use crate::signals::{AudioSiren, BatteryMonitor, LocationTracker, VibrationScheduler};
use crate::status::{self, StatusSnapshot};

/// User-facing failure of an alert action
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlertError {
    #[error("No emergency contacts configured. Please add contacts in settings.")]
    NoContacts,
}

/// Where the activation flow stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    #[default]
    Idle,
    PendingConfirmation,
    Active,
}

/// How a share attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
    Failed(String),
    Unavailable,
}

impl ShareOutcome {
    /// Text shown to the user, if any
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::Shared => None,
            Self::Copied => Some("App link copied to clipboard!"),
            Self::Failed(_) => Some("Could not share the app link."),
            Self::Unavailable => Some("Could not copy link to clipboard."),
        }
    }
}

pub struct SessionController {
    settings: Settings,
    activation: ActivationState,
    session_id: Option<Uuid>,
    degraded: Vec<Channel>,
    state: Arc<SignalState>,
    events: Arc<EventBus>,
    store: Arc<dyn SettingsStore>,
    base_url: Url,
    siren: AudioSiren,
    vibration: VibrationScheduler,
    location: LocationTracker,
}

impl SessionController {
    /// Wire the coordinators to the probed capabilities and load stored settings
    pub fn new(
        config: &Config,
        caps: &Capabilities,
        state: Arc<SignalState>,
        events: Arc<EventBus>,
        store: Arc<dyn SettingsStore>,
    ) -> Result<Self> {
        let base_url = config.app.base_url()?;
        let settings = Settings::load(store.as_ref());

        let siren = AudioSiren::new(caps.audio.clone(), config.siren.clone());
        let vibration = VibrationScheduler::new(caps.vibration.clone());
        let location = LocationTracker::new(
            caps.geolocation.clone(),
            state.clone(),
            events.clone(),
            config.location.options(),
            config.location.fix_interval(),
        );

        Ok(Self {
            settings,
            activation: ActivationState::Idle,
            session_id: None,
            degraded: Vec::new(),
            state,
            events,
            store,
            base_url,
            siren,
            vibration,
            location,
        })
    }

    /// Battery listener for the same state and bus; it outlives any session
    pub fn battery_monitor(&self, config: &Config, caps: &Capabilities) -> BatteryMonitor {
        BatteryMonitor::new(
            caps.battery.clone(),
            self.state.clone(),
            self.events.clone(),
            config.battery.poll_interval(),
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn activation(&self) -> ActivationState {
        self.activation
    }

    pub fn is_active(&self) -> bool {
        self.activation == ActivationState::Active
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Channels that failed to start in the current session
    pub fn degraded(&self) -> &[Channel] {
        &self.degraded
    }

    pub fn state(&self) -> &Arc<SignalState> {
        &self.state
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn is_siren_running(&self) -> bool {
        self.siren.is_running()
    }

    pub fn is_vibrating(&self) -> bool {
        self.vibration.is_running()
    }

    pub fn is_tracking(&self) -> bool {
        self.location.is_running()
    }

    /// Coordinators currently holding a live resource
    pub fn live_coordinators(&self) -> usize {
        [self.is_siren_running(), self.is_vibrating(), self.is_tracking()]
            .into_iter()
            .filter(|live| *live)
            .count()
    }

    /// Ask for confirmation. Nothing starts yet.
    pub fn request_activation(&mut self) {
        if self.is_active() {
            return;
        }
        self.activation = ActivationState::PendingConfirmation;
        self.events.publish(SignalEvent::ConfirmationRequested);
    }

    /// Answer a pending confirmation; returns true when the session went active
    pub fn confirm(&mut self, accept: bool) -> bool {
        if self.activation != ActivationState::PendingConfirmation {
            return false;
        }
        if !accept {
            self.activation = ActivationState::Idle;
            self.events.publish(SignalEvent::ConfirmationDeclined);
            return false;
        }
        self.activate();
        true
    }

    fn activate(&mut self) {
        let id = Uuid::new_v4();
        self.activation = ActivationState::Active;
        self.session_id = Some(id);
        self.degraded.clear();

        if let Err(e) = self.siren.start(self.settings.silent) {
            error!("Could not start audio: {}", e);
            self.degrade(Channel::Siren, e);
        }
        if let Err(e) = self.vibration.start(self.settings.pattern) {
            self.degrade(Channel::Vibration, e);
        }
        if let Err(e) = self.location.start() {
            self.degrade(Channel::Location, e);
        }

        self.state.set_active(true);
        info!(
            "Alert session {} active ({} of 3 channels live)",
            id,
            self.live_coordinators()
        );
        self.events.publish(SignalEvent::Activated {
            session_id: id.to_string(),
        });
    }

    fn degrade(&mut self, channel: Channel, reason: PlatformError) {
        warn!("{:?} channel degraded: {}", channel, reason);
        self.degraded.push(channel);
        self.events.publish(SignalEvent::Degraded {
            channel,
            reason: reason.to_string(),
        });
    }

    /// Stop every coordinator, then report inactive. Safe to repeat.
    pub fn deactivate(&mut self) {
        self.siren.stop();
        self.vibration.stop();
        self.location.stop();

        self.activation = ActivationState::Idle;
        self.degraded.clear();
        self.state.set_active(false);

        if let Some(id) = self.session_id.take() {
            info!("Alert session {} ended", id);
            self.events.publish(SignalEvent::Deactivated {
                session_id: id.to_string(),
            });
        }
    }

    /// Deactivate when active, otherwise ask for confirmation
    pub fn toggle(&mut self) {
        if self.is_active() {
            self.deactivate();
        } else {
            self.request_activation();
        }
    }

    /// Replace and persist settings; silent mode and pattern apply from the next activation
    pub fn save_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(self.store.as_ref());
    }

    pub fn add_contact(&mut self, number: &str) -> bool {
        let mut contacts = self.settings.contacts.clone();
        let added = contacts.add(number);
        if added {
            self.update_contacts(contacts);
        }
        added
    }

    pub fn remove_contact(&mut self, number: &str) -> bool {
        let mut contacts = self.settings.contacts.clone();
        let removed = contacts.remove(number);
        if removed {
            self.update_contacts(contacts);
        }
        removed
    }

    fn update_contacts(&mut self, contacts: ContactList) {
        let mut settings = self.settings.clone();
        settings.contacts = contacts;
        self.save_settings(settings);
    }

    /// Copy of the current message, location and battery
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::new(
            self.settings.message.clone(),
            self.state.location(),
            self.state.battery(),
        )
    }

    pub fn status_url(&self) -> Url {
        status::encode(&self.base_url, &self.snapshot())
    }

    /// `sms:` URI for every contact carrying the current status link
    pub fn compose_alert(&self) -> Result<String, AlertError> {
        if self.settings.contacts.is_empty() {
            return Err(AlertError::NoContacts);
        }
        Ok(status::compose_sms_uri(&self.settings.contacts, &self.status_url()))
    }

    /// Offer the app through the share sheet, or copy its link when there is none
    pub async fn share_app(&self, caps: &Capabilities) -> ShareOutcome {
        let data = status::app_share_data(&self.base_url);

        if let Some(share) = &caps.share {
            return match share.share(&data).await {
                Ok(()) => ShareOutcome::Shared,
                Err(e) => {
                    error!("Error sharing: {}", e);
                    ShareOutcome::Failed(e.to_string())
                }
            };
        }

        match &caps.clipboard {
            Some(clipboard) => match clipboard.write_text(&data.url).await {
                Ok(()) => ShareOutcome::Copied,
                Err(e) => {
                    error!("Failed to copy: {}", e);
                    ShareOutcome::Failed(e.to_string())
                }
            },
            None => {
                warn!("Neither share nor clipboard is available");
                ShareOutcome::Unavailable
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::platform::{SimulatedAudio, SimulatedClipboard, SimulatedVibrator};

    fn controller(caps: &Capabilities) -> SessionController {
        SessionController::new(
            &Config::default(),
            caps,
            Arc::new(SignalState::new()),
            Arc::new(EventBus::default()),
            Arc::new(MemoryStore::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_has_no_side_effects() {
        let audio = Arc::new(SimulatedAudio::new());
        let caps = Capabilities {
            audio: Some(audio.clone()),
            ..Capabilities::none()
        };
        let mut ctrl = controller(&caps);

        ctrl.request_activation();
        assert_eq!(ctrl.activation(), ActivationState::PendingConfirmation);
        assert_eq!(audio.opened(), 0);
        assert!(!ctrl.state().is_active());

        assert!(!ctrl.confirm(false));
        assert_eq!(ctrl.activation(), ActivationState::Idle);
        assert_eq!(audio.opened(), 0);
    }

    #[tokio::test]
    async fn test_confirm_without_request_is_ignored() {
        let mut ctrl = controller(&Capabilities::none());
        assert!(!ctrl.confirm(true));
        assert!(!ctrl.is_active());
    }

    #[tokio::test]
    async fn test_unsupported_channels_degrade() {
        let mut ctrl = controller(&Capabilities::none());
        ctrl.request_activation();
        assert!(ctrl.confirm(true));

        assert!(ctrl.is_active());
        assert!(ctrl.state().is_active());
        assert_eq!(
            ctrl.degraded(),
            [Channel::Siren, Channel::Vibration, Channel::Location]
        );

        ctrl.deactivate();
        assert!(ctrl.degraded().is_empty());
        assert_eq!(ctrl.session_id(), None);
    }

    #[tokio::test]
    async fn test_silent_mode_is_not_degraded() {
        let audio = Arc::new(SimulatedAudio::new());
        let caps = Capabilities {
            audio: Some(audio.clone()),
            vibration: Some(Arc::new(SimulatedVibrator::new())),
            ..Capabilities::none()
        };
        let mut ctrl = controller(&caps);
        let mut settings = ctrl.settings().clone();
        settings.silent = true;
        ctrl.save_settings(settings);

        ctrl.toggle();
        ctrl.confirm(true);
        assert!(!ctrl.is_siren_running());
        assert!(ctrl.is_vibrating());
        assert!(!ctrl.degraded().contains(&Channel::Siren));
        assert_eq!(audio.opened(), 0);

        ctrl.toggle();
        assert!(!ctrl.is_active());
        assert_eq!(ctrl.live_coordinators(), 0);
    }

    #[tokio::test]
    async fn test_compose_alert() {
        let mut ctrl = controller(&Capabilities::none());
        assert_eq!(ctrl.compose_alert(), Err(AlertError::NoContacts));

        assert!(ctrl.add_contact(" 555-0100 "));
        assert!(!ctrl.add_contact("555-0100"));
        let uri = ctrl.compose_alert().unwrap();
        assert!(uri.starts_with("sms:555-0100?body=EMERGENCY%20from%20a%20contact."));
        assert!(uri.contains("view%3Dstatus"));

        assert!(ctrl.remove_contact("555-0100"));
        assert!(ctrl.compose_alert().is_err());
    }

    #[tokio::test]
    async fn test_share_falls_back_to_clipboard() {
        let clipboard = Arc::new(SimulatedClipboard::new());
        let caps = Capabilities {
            clipboard: Some(clipboard.clone()),
            ..Capabilities::none()
        };
        let ctrl = controller(&caps);

        assert_eq!(ctrl.share_app(&caps).await, ShareOutcome::Copied);
        assert_eq!(clipboard.contents().as_deref(), Some("https://distress-signal.app"));
        assert_eq!(
            ctrl.share_app(&Capabilities::none()).await,
            ShareOutcome::Unavailable
        );
    }
}
