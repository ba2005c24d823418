// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Types shared by every MCAL driver.

/// Module identification reported by each driver's `version_info`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VersionInfo {
    pub vendor_id: u16,
    pub module_id: u16,
    pub sw_major: u8,
    pub sw_minor: u8,
    pub sw_patch: u8,
}

/// Logic level of a single channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    #[inline]
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> bool {
        level.is_high()
    }
}
