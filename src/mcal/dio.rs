// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Digital I/O driver.
//!
//! Channels are addressed as `port << 4 | pin`. All writes go through the port's bit set/reset
//! register, so a write to one channel never disturbs another channel on the same port, even if an
//! interrupt writes the same port in between.

use crate::mcal::cfg;
use crate::mcal::std_types::{Level, VersionInfo};

/// Raw state of all 16 pins of a port.
pub type PortLevel = u16;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PortId(pub u8);

impl PortId {
    pub const A: PortId = PortId(0);
    pub const B: PortId = PortId(1);
    pub const C: PortId = PortId(2);
    pub const D: PortId = PortId(3);
}

/// Pins per port.
pub const PINS_PER_PORT: u8 = 16;

/// A single pin. Out-of-range pins are representable and rejected by [`Dio`] with
/// [`Error::InvalidChannel`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelId {
    port: PortId,
    pin: u8,
}

impl ChannelId {
    pub const fn new(port: PortId, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Decode `port << 4 | pin`.
    pub const fn from_raw(raw: u8) -> Self {
        Self::new(PortId(raw >> 4), raw & 0x0F)
    }

    /// `port << 4 | pin`, or `None` if either does not fit.
    pub fn raw(self) -> Option<u8> {
        (self.port.0 < 16 && self.pin < PINS_PER_PORT).then(|| (self.port.0 << 4) | self.pin)
    }

    #[inline]
    pub fn port(self) -> PortId {
        self.port
    }

    #[inline]
    pub fn pin(self) -> u8 {
        self.pin
    }

    /// Only valid once the pin is known to be in range.
    #[inline]
    fn mask(self) -> PortLevel {
        1 << self.pin
    }
}

/// Adjacent pins of one port handled as a single value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelGroup {
    pub port: PortId,
    pub mask: PortLevel,
    /// Position of the lowest bit of `mask`.
    pub offset: u8,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    InvalidPort(PortId),
    InvalidChannel(ChannelId),
    /// Empty mask or an offset that does not match the mask.
    InvalidGroup,
}

/// Register level access to GPIO ports.
pub trait PortAccess {
    /// Input data register.
    fn read_input(&self, port: PortId) -> PortLevel;
    /// Output data register.
    fn read_output(&self, port: PortId) -> PortLevel;
    /// Atomically drive the `set` bits high and the `reset` bits low. Set wins on overlap.
    fn set_reset(&mut self, port: PortId, set: PortLevel, reset: PortLevel);
}

pub struct Dio<P: PortAccess> {
    ports: P,
    configured: &'static [PortId],
}

impl<P: PortAccess> Dio<P> {
    pub fn new(ports: P, configured: &'static [PortId]) -> Self {
        Self { ports, configured }
    }

    fn check_port(&self, port: PortId) -> Result<(), Error> {
        if self.configured.contains(&port) {
            Ok(())
        } else {
            Err(Error::InvalidPort(port))
        }
    }

    fn check_channel(&self, ch: ChannelId) -> Result<(), Error> {
        if ch.pin >= PINS_PER_PORT {
            return Err(Error::InvalidChannel(ch));
        }
        self.check_port(ch.port)
            .map_err(|_| Error::InvalidChannel(ch))
    }

    fn check_group(&self, group: &ChannelGroup) -> Result<(), Error> {
        self.check_port(group.port)?;
        if group.mask == 0 || group.offset as u32 != group.mask.trailing_zeros() {
            return Err(Error::InvalidGroup);
        }
        Ok(())
    }

    pub fn read_channel(&self, ch: ChannelId) -> Result<Level, Error> {
        self.check_channel(ch)?;
        let port = self.ports.read_input(ch.port());
        Ok(Level::from(port & ch.mask() != 0))
    }

    pub fn write_channel(&mut self, ch: ChannelId, level: Level) -> Result<(), Error> {
        self.check_channel(ch)?;
        match level {
            Level::High => self.ports.set_reset(ch.port(), ch.mask(), 0),
            Level::Low => self.ports.set_reset(ch.port(), 0, ch.mask()),
        }
        Ok(())
    }

    /// Invert an output channel and return its new level.
    pub fn flip_channel(&mut self, ch: ChannelId) -> Result<Level, Error> {
        self.check_channel(ch)?;
        let current = Level::from(self.ports.read_output(ch.port()) & ch.mask() != 0);
        let next = current.toggled();
        self.write_channel(ch, next)?;
        Ok(next)
    }

    pub fn read_port(&self, port: PortId) -> Result<PortLevel, Error> {
        self.check_port(port)?;
        Ok(self.ports.read_input(port))
    }

    pub fn write_port(&mut self, port: PortId, level: PortLevel) -> Result<(), Error> {
        self.check_port(port)?;
        self.ports.set_reset(port, level, !level);
        Ok(())
    }

    /// Write only the bits selected by `mask`.
    pub fn masked_write_port(
        &mut self,
        port: PortId,
        level: PortLevel,
        mask: PortLevel,
    ) -> Result<(), Error> {
        self.check_port(port)?;
        self.ports.set_reset(port, level & mask, !level & mask);
        Ok(())
    }

    pub fn read_channel_group(&self, group: &ChannelGroup) -> Result<PortLevel, Error> {
        self.check_group(group)?;
        Ok((self.ports.read_input(group.port) & group.mask) >> group.offset)
    }

    pub fn write_channel_group(
        &mut self,
        group: &ChannelGroup,
        level: PortLevel,
    ) -> Result<(), Error> {
        self.check_group(group)?;
        let bits = (level << group.offset) & group.mask;
        self.ports.set_reset(group.port, bits, !bits & group.mask);
        Ok(())
    }

    pub fn version_info(&self) -> VersionInfo {
        cfg::DIO_VERSION
    }

    pub fn free(self) -> P {
        self.ports
    }
}
