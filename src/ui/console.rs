// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Interactive console

use std::io::{self, Write};
use std::str::FromStr;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::render::{battery_widget, location_line, BatteryBand};
use crate::core::{ActivationState, Channel, SessionController, SignalEvent, TextColor};
use crate::platform::Capabilities;
use crate::signals::VibrationPattern;

/// One console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Activate,
    Deactivate,
    Toggle,
    Status,
    Send,
    Link,
    Share,
    Message(String),
    Silent(bool),
    Pattern(VibrationPattern),
    Color(TextColor),
    AddContact(String),
    RemoveContact(String),
    Contacts,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match cmd {
            "activate" => Ok(Self::Activate),
            "deactivate" => Ok(Self::Deactivate),
            "toggle" => Ok(Self::Toggle),
            "status" => Ok(Self::Status),
            "send" => Ok(Self::Send),
            "link" => Ok(Self::Link),
            "share" => Ok(Self::Share),
            "message" if !rest.is_empty() => Ok(Self::Message(rest.to_string())),
            "message" => Err("usage: message <text>".to_string()),
            "silent" => match rest {
                "on" => Ok(Self::Silent(true)),
                "off" => Ok(Self::Silent(false)),
                _ => Err("usage: silent on|off".to_string()),
            },
            "pattern" => rest.parse().map(Self::Pattern),
            "color" => rest.parse().map(Self::Color),
            "contact" => match rest.split_once(char::is_whitespace) {
                Some(("add", number)) => Ok(Self::AddContact(number.trim().to_string())),
                Some(("remove", number)) => Ok(Self::RemoveContact(number.trim().to_string())),
                _ => Err("usage: contact add|remove <number>".to_string()),
            },
            "contacts" => Ok(Self::Contacts),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Console {
    controller: SessionController,
    caps: Capabilities,
}

impl Console {
    pub fn new(controller: SessionController, caps: Capabilities) -> Self {
        Self { controller, caps }
    }

    /// Read commands until `quit` or end of input. Always leaves the session inactive.
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut lines = BufReader::new(stdin()).lines();
        let mut events = self.controller.events().subscribe();

        loop {
            self.prompt();
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        println!();
                        break;
                    };
                    if let Flow::Quit = self.handle_line(&line).await {
                        break;
                    }
                }
                event = events.recv() => match event {
                    Ok(event) => self.show_event(&event.payload),
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                },
            }
        }

        self.controller.deactivate();
        println!("Goodbye!");
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        let input = line.trim();
        if input.is_empty() {
            return Flow::Continue;
        }

        if self.controller.activation() == ActivationState::PendingConfirmation {
            let accept = matches!(input.to_ascii_lowercase().as_str(), "y" | "yes");
            if !self.controller.confirm(accept) {
                println!("{}", "Activation cancelled.".dimmed());
            }
            return Flow::Continue;
        }

        match input.parse::<Command>() {
            Ok(cmd) => self.execute(cmd).await,
            Err(e) => {
                println!("{} {}", "?".yellow(), e);
                println!("Type {} for available commands", "help".yellow());
                Flow::Continue
            }
        }
    }

    async fn execute(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Activate => {
                if self.controller.is_active() {
                    println!("{}", "Signal already active.".dimmed());
                } else {
                    self.controller.request_activation();
                }
            }
            Command::Deactivate => self.controller.deactivate(),
            Command::Toggle => self.controller.toggle(),
            Command::Status => self.print_status(),
            Command::Send => match self.controller.compose_alert() {
                Ok(uri) => println!("{}\n{}", "Open this to text your contacts:".bright_cyan(), uri),
                Err(e) => println!("{} {}", "!".red(), e),
            },
            Command::Link => println!("{}", self.controller.status_url()),
            Command::Share => {
                let outcome = self.controller.share_app(&self.caps).await;
                if let Some(notice) = outcome.notice() {
                    println!("{}", notice);
                }
            }
            Command::Message(text) => self.update(|s| s.message = text),
            Command::Silent(on) => self.update(|s| s.silent = on),
            Command::Pattern(pattern) => self.update(|s| s.pattern = pattern),
            Command::Color(color) => self.update(|s| s.text_color = color),
            Command::AddContact(number) => {
                if !self.controller.add_contact(&number) {
                    println!("{}", "Contact is blank or already listed.".dimmed());
                }
            }
            Command::RemoveContact(number) => {
                if !self.controller.remove_contact(&number) {
                    println!("{}", "No such contact.".dimmed());
                }
            }
            Command::Contacts => self.print_contacts(),
            Command::Help => self.print_help(),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn update(&mut self, change: impl FnOnce(&mut crate::core::Settings)) {
        let mut settings = self.controller.settings().clone();
        change(&mut settings);
        self.controller.save_settings(settings);
        if self.controller.is_active() {
            println!("{}", "Saved. Takes effect on the next activation.".dimmed());
        } else {
            println!("{}", "Saved.".dimmed());
        }
    }

    fn show_event(&self, event: &SignalEvent) {
        match event {
            SignalEvent::ConfirmationRequested => {
                println!();
                println!("{}", "Confirm Activation".bright_cyan().bold());
                print!("Are you sure you want to activate the distress signal? [y/N] ");
                let _ = io::stdout().flush();
            }
            SignalEvent::Activated { .. } => {
                println!();
                println!("{}", " DISTRESS SIGNAL ACTIVE ".white().on_red().bold());
                self.print_status();
            }
            SignalEvent::Deactivated { .. } => {
                println!();
                println!("{}", "Signal deactivated.".bright_green());
            }
            SignalEvent::Degraded { channel, reason } => {
                let name = match channel {
                    Channel::Siren => "Siren",
                    Channel::Vibration => "Vibration",
                    Channel::Location => "Location",
                };
                println!("{} {} unavailable: {}", "!".yellow(), name, reason);
            }
            SignalEvent::LocationUpdated(_) | SignalEvent::LocationFailed(_)
                if self.controller.is_active() =>
            {
                println!();
                println!("{} {}", "Location:".bold(), self.location_text());
            }
            _ => {}
        }
    }

    fn prompt(&self) {
        if self.controller.activation() == ActivationState::PendingConfirmation {
            return;
        }
        let marker = if self.controller.is_active() {
            "SOS>".red().bold()
        } else {
            ">".bright_green()
        };
        print!("{} ", marker);
        let _ = io::stdout().flush();
    }

    fn paint(&self, text: &str) -> ColoredString {
        match self.controller.settings().text_color {
            TextColor::White => text.white(),
            TextColor::Black => text.black().on_white(),
            TextColor::Yellow => text.bright_yellow(),
        }
    }

    fn location_text(&self) -> String {
        let state = self.controller.state();
        location_line(state.location(), &state.location_status())
    }

    fn battery_text(&self) -> Option<ColoredString> {
        let battery = self.controller.state().battery()?;
        let widget = battery_widget(&battery);
        Some(match BatteryBand::of(battery.percent()) {
            BatteryBand::Good => widget.green(),
            BatteryBand::Low => widget.yellow(),
            BatteryBand::Critical => widget.red(),
        })
    }

    fn print_status(&self) {
        let settings = self.controller.settings();
        println!();
        if self.controller.is_active() {
            println!("{} {}", "Message:".bold(), self.paint(&settings.message));
            println!("{} {}", "Location:".bold(), self.paint(&self.location_text()));
            if let Some(battery) = self.battery_text() {
                println!("{} {}", "Battery:".bold(), battery);
            }
            if settings.contacts.is_empty() {
                println!("{}", "No contacts configured.".dimmed());
            }
        } else {
            println!("{}", "Signal inactive.".dimmed());
            if let Some(battery) = self.battery_text() {
                println!("{} {}", "Battery:".bold(), battery);
            }
            println!(
                "Silent {} | Pattern {} | Color {} | {} contact(s)",
                if settings.silent { "on" } else { "off" },
                settings.pattern,
                settings.text_color,
                settings.contacts.len()
            );
        }
        println!();
    }

    fn print_contacts(&self) {
        let contacts = &self.controller.settings().contacts;
        if contacts.is_empty() {
            println!("{}", "No contacts added yet.".dimmed());
            return;
        }
        for (i, number) in contacts.iter().enumerate() {
            println!("  {}. {}", i + 1, number);
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Distress Signal".bright_red().bold());
        println!("Activate to emit a loud siren, flashing screen, and SOS vibration pattern.");
        println!("Type {} for help, {} to quit", "help".yellow(), "quit".yellow());
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Signal:".bright_cyan());
        println!("  {:22} Start the signal (asks for confirmation)", "activate".yellow());
        println!("  {:22} Stop the signal", "deactivate".yellow());
        println!("  {:22} Activate or deactivate", "toggle".yellow());
        println!("  {:22} Show message, location and battery", "status".yellow());
        println!();
        println!("{}", "Sharing:".bright_cyan());
        println!("  {:22} Text your status link to every contact", "send".yellow());
        println!("  {:22} Print your status link", "link".yellow());
        println!("  {:22} Share the app", "share".yellow());
        println!();
        println!("{}", "Settings:".bright_cyan());
        println!("  {:22} Set the emergency message", "message <text>".yellow());
        println!("  {:22} Mute the siren", "silent on|off".yellow());
        println!("  {:22} Vibration pattern", "pattern sos|continuous".yellow());
        println!("  {:22} Text color", "color white|black|yellow".yellow());
        println!("  {:22} Edit contacts", "contact add|remove <n>".yellow());
        println!("  {:22} List contacts", "contacts".yellow());
        println!();
        println!("  {:22} Deactivate and exit", "quit".yellow());
        println!();
    }
}
