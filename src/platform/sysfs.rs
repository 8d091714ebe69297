// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Linux battery via /sys/class/power_supply

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{BatterySource, PlatformError};
use crate::core::BatterySample;

pub struct SysfsBattery {
    dir: PathBuf,
}

impl SysfsBattery {
    /// First `BAT*` supply under `root`, if any
    pub fn probe(root: &Path) -> Option<Self> {
        let entries = std::fs::read_dir(root).ok()?;
        let mut batteries: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("BAT"))
                    .unwrap_or(false)
            })
            .filter(|p| p.join("capacity").exists())
            .collect();
        batteries.sort();

        let dir = batteries.into_iter().next()?;
        debug!("Using battery at {:?}", dir);
        Some(Self { dir })
    }

    fn read_attr(&self, name: &str) -> Result<String, PlatformError> {
        std::fs::read_to_string(self.dir.join(name))
            .map(|s| s.trim().to_string())
            .map_err(|e| PlatformError::Device(format!("{name}: {e}")))
    }
}

#[async_trait]
impl BatterySource for SysfsBattery {
    async fn read(&self) -> Result<BatterySample, PlatformError> {
        let capacity: f64 = self
            .read_attr("capacity")?
            .parse()
            .map_err(|e| PlatformError::Device(format!("capacity: {e}")))?;
        // "Full" on AC counts as charging
        let charging = matches!(self.read_attr("status")?.as_str(), "Charging" | "Full");
        Ok(BatterySample::new(capacity / 100.0, charging))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_supply(root: &Path, name: &str, capacity: &str, status: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("capacity"), capacity).unwrap();
        std::fs::write(dir.join("status"), status).unwrap();
    }

    #[tokio::test]
    async fn test_reads_first_battery() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("AC")).unwrap();
        fake_supply(root.path(), "BAT1", "10\n", "Discharging\n");
        fake_supply(root.path(), "BAT0", "42\n", "Discharging\n");

        let battery = SysfsBattery::probe(root.path()).unwrap();
        let sample = battery.read().await.unwrap();
        assert!((sample.level - 0.42).abs() < 1e-9);
        assert!(!sample.charging);
    }

    #[tokio::test]
    async fn test_charging_status() {
        let root = tempfile::tempdir().unwrap();
        fake_supply(root.path(), "BAT0", "100", "Full");
        let battery = SysfsBattery::probe(root.path()).unwrap();
        assert!(battery.read().await.unwrap().charging);
    }

    #[test]
    fn test_no_battery() {
        let root = tempfile::tempdir().unwrap();
        assert!(SysfsBattery::probe(root.path()).is_none());
        assert!(SysfsBattery::probe(&root.path().join("missing")).is_none());
    }
}
