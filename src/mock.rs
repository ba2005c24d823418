// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Test doubles for the hardware seams. Host-only.

use core::convert::Infallible;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use bxcan::{Frame, Mailbox};
use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::serial;
use embedded_hal::PwmPin;

use crate::hw::lin_port::{self, LinTransmit, RxEvent, RxFeed};
use crate::mcal::can::{CanHw, CanIf, ControllerState, ErrorCounters, Overrun, PduId};
use crate::mcal::dio::{PortAccess, PortId, PortLevel};
use crate::mcal::lin::{LinHw, RxByte};
use crate::mcal::spi::{HwUnit, SpiHw};
use crate::protocol::can_timing::BitTiming;

// ---------------------------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------------------------

/// Adds up requested delays instead of sleeping.
#[derive(Default, Debug)]
pub struct MockDelay {
    total_us: u64,
}

impl MockDelay {
    pub fn total_us(&self) -> u64 {
        self.total_us
    }
}

macro_rules! mock_delay {
    ($($t:ty),*) => {$(
        impl DelayUs<$t> for MockDelay {
            fn delay_us(&mut self, us: $t) {
                self.total_us += us as u64;
            }
        }

        impl DelayMs<$t> for MockDelay {
            fn delay_ms(&mut self, ms: $t) {
                self.total_us += ms as u64 * 1000;
            }
        }
    )*};
}

mock_delay!(u8, u16, u32);

// ---------------------------------------------------------------------------------------------
// Single pin
// ---------------------------------------------------------------------------------------------

/// Output pin that records every level it is driven to (`true` = high).
#[derive(Default, Debug)]
pub struct MockPin {
    pub history: Vec<bool>,
}

impl OutputPin for MockPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.history.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.history.push(true);
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------
// GPIO ports
// ---------------------------------------------------------------------------------------------

#[derive(Default)]
pub struct MockPorts {
    input: [PortLevel; 8],
    output: [PortLevel; 8],
    pub writes: Vec<(PortId, PortLevel, PortLevel)>,
}

impl MockPorts {
    pub fn set_input(&mut self, port: PortId, level: PortLevel) {
        self.input[port.0 as usize] = level;
    }

    pub fn output(&self, port: PortId) -> PortLevel {
        self.output[port.0 as usize]
    }
}

impl PortAccess for MockPorts {
    fn read_input(&self, port: PortId) -> PortLevel {
        self.input[port.0 as usize]
    }

    fn read_output(&self, port: PortId) -> PortLevel {
        self.output[port.0 as usize]
    }

    fn set_reset(&mut self, port: PortId, set: PortLevel, reset: PortLevel) {
        let odr = &mut self.output[port.0 as usize];
        *odr = (*odr & !reset) | set;
        self.writes.push((port, set, reset));
    }
}

// ---------------------------------------------------------------------------------------------
// SPI master peripheral
// ---------------------------------------------------------------------------------------------

/// Records MOSI and answers from a MISO queue (0x00 once empty).
#[derive(Default)]
pub struct MockSpiBus {
    pub mosi: Vec<u8>,
    pub miso: VecDeque<u8>,
}

impl Transfer<u8> for MockSpiBus {
    type Error = Infallible;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Infallible> {
        for w in words.iter_mut() {
            self.mosi.push(*w);
            *w = self.miso.pop_front().unwrap_or(0);
        }
        Ok(words)
    }
}

// ---------------------------------------------------------------------------------------------
// SPI handler hardware
// ---------------------------------------------------------------------------------------------

pub struct MockSpiHw {
    /// Byte the slave answers for each byte sent.
    pub reply: fn(u8) -> u8,
    /// `(unit, cs, bytes written)` per transfer.
    pub sent: Vec<(HwUnit, u8, Vec<u8>)>,
    /// `(unit, cs, selected)` per chip-select edge.
    pub selects: Vec<(HwUnit, u8, bool)>,
    /// Fail every transfer once this many have succeeded.
    pub fail_after: Option<usize>,
    ok_transfers: usize,
    cs: u8,
}

impl Default for MockSpiHw {
    fn default() -> Self {
        Self {
            reply: |b| b,
            sent: Vec::new(),
            selects: Vec::new(),
            fail_after: None,
            ok_transfers: 0,
            cs: 0,
        }
    }
}

impl SpiHw for MockSpiHw {
    type Error = ();

    fn select(&mut self, unit: HwUnit, cs: u8) {
        self.cs = cs;
        self.selects.push((unit, cs, true));
    }

    fn deselect(&mut self, unit: HwUnit, cs: u8) {
        self.selects.push((unit, cs, false));
    }

    fn transfer(&mut self, unit: HwUnit, buf: &mut [u8]) -> Result<(), ()> {
        if self.fail_after.map_or(false, |n| self.ok_transfers >= n) {
            return Err(());
        }
        self.sent.push((unit, self.cs, buf.to_vec()));
        for b in buf.iter_mut() {
            *b = (self.reply)(*b);
        }
        self.ok_transfers += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------
// CAN controller
// ---------------------------------------------------------------------------------------------

const MAILBOXES: [Mailbox; 3] = [Mailbox::Mailbox0, Mailbox::Mailbox1, Mailbox::Mailbox2];

#[derive(Default)]
pub struct MockCanHw {
    /// Last BTR value applied.
    pub btr: Option<u32>,
    /// Number of `start` polls that report `WouldBlock` before the controller joins the bus.
    pub start_delay: u32,
    pub sent: Vec<Frame>,
    busy: [bool; 3],
    completed: VecDeque<Mailbox>,
    pub rx: VecDeque<Result<Frame, Overrun>>,
    pub counters: ErrorCounters,
    /// Every interrupt enable (`true`) or disable (`false`) request.
    pub interrupts: Vec<bool>,
    pub wakeup: bool,
}

impl MockCanHw {
    /// Finish every pending transmission.
    pub fn complete_all(&mut self) {
        for (i, busy) in self.busy.iter_mut().enumerate() {
            if *busy {
                *busy = false;
                self.completed.push_back(MAILBOXES[i]);
            }
        }
    }
}

impl CanHw for MockCanHw {
    fn apply_timing(&mut self, _ctrl: u8, timing: BitTiming, _loopback: bool, _silent: bool) {
        self.btr = Some(timing.btr());
    }

    fn start(&mut self, _ctrl: u8) -> nb::Result<(), Infallible> {
        if self.start_delay > 0 {
            self.start_delay -= 1;
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }

    fn stop(&mut self, _ctrl: u8) {}

    fn sleep(&mut self, _ctrl: u8) {}

    fn wakeup(&mut self, _ctrl: u8) {}

    fn transmit(&mut self, _ctrl: u8, frame: &Frame) -> nb::Result<Mailbox, Infallible> {
        let free = self.busy.iter().position(|b| !b).ok_or(nb::Error::WouldBlock)?;
        self.busy[free] = true;
        self.sent.push(frame.clone());
        Ok(MAILBOXES[free])
    }

    fn poll_tx_complete(&mut self, _ctrl: u8) -> Option<Mailbox> {
        self.completed.pop_front()
    }

    fn receive(&mut self, _ctrl: u8) -> nb::Result<Frame, Overrun> {
        match self.rx.pop_front() {
            Some(Ok(frame)) => Ok(frame),
            Some(Err(e)) => Err(nb::Error::Other(e)),
            None => Err(nb::Error::WouldBlock),
        }
    }

    fn error_counters(&self, _ctrl: u8) -> ErrorCounters {
        self.counters
    }

    fn set_interrupts(&mut self, _ctrl: u8, enabled: bool) {
        self.interrupts.push(enabled);
    }

    fn wakeup_pending(&mut self, _ctrl: u8) -> bool {
        self.wakeup
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpperEvent {
    Rx(u8, Frame),
    TxConfirmation(PduId),
    Mode(u8, ControllerState),
    BusOff(u8),
}

#[derive(Default)]
pub struct RecordingCanIf {
    pub events: Vec<UpperEvent>,
}

impl CanIf for RecordingCanIf {
    fn rx_indication(&mut self, ctrl: u8, frame: &Frame) {
        self.events.push(UpperEvent::Rx(ctrl, frame.clone()));
    }

    fn tx_confirmation(&mut self, handle: PduId) {
        self.events.push(UpperEvent::TxConfirmation(handle));
    }

    fn controller_mode_indication(&mut self, ctrl: u8, state: ControllerState) {
        self.events.push(UpperEvent::Mode(ctrl, state));
    }

    fn controller_bus_off(&mut self, ctrl: u8) {
        self.events.push(UpperEvent::BusOff(ctrl));
    }
}

// ---------------------------------------------------------------------------------------------
// LIN UART
// ---------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinTx {
    Break,
    Byte(u8),
}

#[derive(Default)]
pub struct MockLinHw {
    /// `(channel, baudrate)` per enable.
    pub enabled: Vec<(u8, u32)>,
    pub tx: Vec<LinTx>,
    pub rx: VecDeque<RxByte>,
    /// Make `send_break` and `write` fail.
    pub fail_writes: bool,
    /// Reported (and cleared) by `wakeup_detected`.
    pub wakeup_flag: bool,
}

impl LinHw for MockLinHw {
    type Error = ();

    fn enable(&mut self, ch: u8, baudrate: u32) {
        self.enabled.push((ch, baudrate));
    }

    fn send_break(&mut self, _ch: u8) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.tx.push(LinTx::Break);
        Ok(())
    }

    fn write(&mut self, _ch: u8, byte: u8) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.tx.push(LinTx::Byte(byte));
        Ok(())
    }

    fn read(&mut self, _ch: u8) -> nb::Result<RxByte, ()> {
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn wakeup_detected(&mut self, _ch: u8) -> bool {
        core::mem::take(&mut self.wakeup_flag)
    }
}

/// Single-wire bus behind a LIN UART: every transmission comes back through the receive
/// interrupt, as do the slaves' replies.
pub struct EchoWire<'a> {
    feed: RxFeed<'a>,
    pub sent: Vec<LinTx>,
    pub baudrate: Option<u32>,
    /// Loop transmissions back to the receiver.
    pub echo: bool,
}

impl<'a> EchoWire<'a> {
    pub fn new(feed: RxFeed<'a>) -> Self {
        Self {
            feed,
            sent: Vec::new(),
            baudrate: None,
            echo: true,
        }
    }

    /// Bytes sent by a slave.
    pub fn slave_reply(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.feed.push(RxEvent::Data(b));
        }
    }

    /// Raw event from the receive interrupt.
    pub fn inject(&mut self, event: RxEvent) {
        self.feed.push(event);
    }
}

impl LinTransmit for EchoWire<'_> {
    fn enable(&mut self, baudrate: u32) {
        self.baudrate = Some(baudrate);
    }

    fn send_break(&mut self) -> Result<(), lin_port::Error> {
        self.sent.push(LinTx::Break);
        if self.echo {
            self.feed.push(RxEvent::Break);
            self.feed.push(RxEvent::Framing(0));
        }
        Ok(())
    }

    fn write(&mut self, byte: u8) -> Result<(), lin_port::Error> {
        self.sent.push(LinTx::Byte(byte));
        if self.echo {
            self.feed.push(RxEvent::Data(byte));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------
// I2C bus with an AT24C32 on it
// ---------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum I2cPhase {
    Idle,
    Address,
    Write,
    Read,
}

/// Open-drain bus state plus a slave that follows the AT24C32 protocol: two word-address bytes
/// after a write address, page rollover on writes, sequential reads across the whole array.
struct I2cBus {
    scl: bool,
    sda_master: bool,
    sda_slave: bool,
    phase: I2cPhase,
    /// Bits clocked in the current byte.
    bits: u8,
    shift: u8,
    /// Currently inside the acknowledge clock.
    in_ack: bool,
    /// A rising SCL edge was seen since the last START.
    clocked: bool,
    master_ack: bool,
    reading: bool,
    address: u8,
    pointer_bytes: u8,
    pointer: u16,
    out: u8,
    memory: Vec<u8>,
    starts: usize,
    stops: usize,
}

impl I2cBus {
    fn sda(&self) -> bool {
        self.sda_master && self.sda_slave
    }

    fn drive_scl(&mut self, level: bool) {
        if level == self.scl {
            return;
        }
        self.scl = level;
        if level {
            self.rising();
        } else if self.clocked {
            self.clocked = false;
            self.falling();
        }
    }

    fn drive_sda(&mut self, level: bool) {
        let before = self.sda();
        self.sda_master = level;
        let after = self.sda();
        if self.scl && before != after {
            if after {
                self.stops += 1;
                self.phase = I2cPhase::Idle;
            } else {
                self.starts += 1;
                self.phase = I2cPhase::Address;
                self.bits = 0;
                self.shift = 0;
                self.in_ack = false;
                self.clocked = false;
            }
            self.sda_slave = true;
        }
    }

    fn rising(&mut self) {
        self.clocked = true;
        match self.phase {
            I2cPhase::Address | I2cPhase::Write if self.bits < 8 => {
                self.shift = (self.shift << 1) | self.sda() as u8;
                self.bits += 1;
            }
            I2cPhase::Read if self.bits < 8 => self.bits += 1,
            I2cPhase::Read => self.master_ack = !self.sda(),
            _ => {}
        }
    }

    fn falling(&mut self) {
        match self.phase {
            I2cPhase::Idle => {}
            I2cPhase::Address | I2cPhase::Write => {
                if self.in_ack {
                    self.sda_slave = true;
                    self.in_ack = false;
                    self.bits = 0;
                    self.shift = 0;
                    if self.phase == I2cPhase::Address {
                        if self.reading {
                            self.phase = I2cPhase::Read;
                            self.load_next();
                        } else {
                            self.phase = I2cPhase::Write;
                            self.pointer_bytes = 0;
                        }
                    }
                } else if self.bits == 8 {
                    let ack = self.byte_received();
                    self.in_ack = ack;
                    self.sda_slave = !ack;
                }
            }
            I2cPhase::Read => {
                if self.in_ack {
                    self.in_ack = false;
                    if self.master_ack {
                        self.load_next();
                    } else {
                        self.sda_slave = true;
                        self.phase = I2cPhase::Idle;
                    }
                } else if self.bits < 8 {
                    self.sda_slave = (self.out << self.bits) & 0x80 != 0;
                } else {
                    self.sda_slave = true;
                    self.in_ack = true;
                }
            }
        }
    }

    /// Handle a complete byte. Returns whether to acknowledge it.
    fn byte_received(&mut self) -> bool {
        let byte = self.shift;
        match self.phase {
            I2cPhase::Address => {
                if byte >> 1 != self.address {
                    self.phase = I2cPhase::Idle;
                    return false;
                }
                self.reading = byte & 0x01 != 0;
                true
            }
            I2cPhase::Write => {
                match self.pointer_bytes {
                    0 => self.pointer = (byte as u16) << 8,
                    1 => self.pointer = (self.pointer | byte as u16) & 0x0FFF,
                    _ => {
                        self.memory[self.pointer as usize] = byte;
                        let page = self.pointer & !0x1F;
                        self.pointer = page | ((self.pointer + 1) & 0x1F);
                    }
                }
                self.pointer_bytes = self.pointer_bytes.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    fn load_next(&mut self) {
        self.out = self.memory[self.pointer as usize];
        self.pointer = (self.pointer + 1) & 0x0FFF;
        self.bits = 0;
        self.sda_slave = self.out & 0x80 != 0;
    }
}

#[derive(Clone)]
pub struct I2cEeprom {
    bus: Rc<RefCell<I2cBus>>,
}

impl I2cEeprom {
    pub fn new(address: u8) -> Self {
        let bus = I2cBus {
            scl: true,
            sda_master: true,
            sda_slave: true,
            phase: I2cPhase::Idle,
            bits: 0,
            shift: 0,
            in_ack: false,
            clocked: false,
            master_ack: false,
            reading: false,
            address,
            pointer_bytes: 0,
            pointer: 0,
            out: 0,
            memory: vec![0xFF; 4096],
            starts: 0,
            stops: 0,
        };
        Self {
            bus: Rc::new(RefCell::new(bus)),
        }
    }

    /// `(scl, sda)`
    pub fn pins(&self) -> (I2cLine, I2cLine) {
        (
            I2cLine {
                bus: self.bus.clone(),
                sda: false,
            },
            I2cLine {
                bus: self.bus.clone(),
                sda: true,
            },
        )
    }

    pub fn load(&self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.bus.borrow_mut().memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn memory(&self, addr: u16, len: usize) -> Vec<u8> {
        let start = addr as usize;
        self.bus.borrow().memory[start..start + len].to_vec()
    }

    pub fn starts(&self) -> usize {
        self.bus.borrow().starts
    }

    pub fn stops(&self) -> usize {
        self.bus.borrow().stops
    }
}

/// One open-drain line of an [`I2cEeprom`] bus.
pub struct I2cLine {
    bus: Rc<RefCell<I2cBus>>,
    sda: bool,
}

impl I2cLine {
    fn drive(&mut self, level: bool) {
        let mut bus = self.bus.borrow_mut();
        if self.sda {
            bus.drive_sda(level);
        } else {
            bus.drive_scl(level);
        }
    }
}

impl OutputPin for I2cLine {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }
}

impl InputPin for I2cLine {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        let bus = self.bus.borrow();
        Ok(if self.sda { bus.sda() } else { bus.scl })
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

// ---------------------------------------------------------------------------------------------
// Bit-banged SPI
// ---------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum SpiRole {
    Sck,
    Mosi,
    Miso,
    Cs,
}

/// Mode 0 slave on the far side of a bit-banged master. Records what it receives and answers
/// from a queue of reply bytes (0x00 once the queue runs dry).
struct SniffState {
    sck: bool,
    mosi: bool,
    miso: bool,
    cs: bool,
    replies: VecDeque<u8>,
    reply: u8,
    bit: u8,
    shift: u8,
    received: Vec<u8>,
    cs_cycles: usize,
}

impl SniffState {
    fn drive(&mut self, role: SpiRole, level: bool) {
        match role {
            SpiRole::Mosi => self.mosi = level,
            SpiRole::Cs if level != self.cs => {
                self.cs = level;
                if level {
                    self.received.push(self.shift);
                    self.cs_cycles += 1;
                } else {
                    self.reply = self.replies.pop_front().unwrap_or(0);
                    self.bit = 0;
                    self.shift = 0;
                    self.miso = self.reply & 0x80 != 0;
                }
            }
            SpiRole::Sck if level != self.sck => {
                self.sck = level;
                if self.cs {
                    return;
                }
                if level {
                    self.shift = (self.shift << 1) | self.mosi as u8;
                } else {
                    self.bit += 1;
                    if self.bit < 8 {
                        self.miso = (self.reply << self.bit) & 0x80 != 0;
                    }
                }
            }
            _ => {}
        }
    }
}

pub struct SpiSniffer {
    state: Rc<RefCell<SniffState>>,
}

impl SpiSniffer {
    pub fn new(replies: &[u8]) -> Self {
        let state = SniffState {
            sck: false,
            mosi: false,
            miso: false,
            cs: true,
            replies: replies.iter().copied().collect(),
            reply: 0,
            bit: 0,
            shift: 0,
            received: Vec::new(),
            cs_cycles: 0,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// `(sck, mosi, miso, cs)`
    pub fn pins(&self) -> (SpiPin, SpiPin, SpiPin, SpiPin) {
        let pin = |role| SpiPin {
            state: self.state.clone(),
            role,
        };
        (
            pin(SpiRole::Sck),
            pin(SpiRole::Mosi),
            pin(SpiRole::Miso),
            pin(SpiRole::Cs),
        )
    }

    pub fn received(&self) -> Vec<u8> {
        self.state.borrow().received.clone()
    }

    pub fn cs_cycles(&self) -> usize {
        self.state.borrow().cs_cycles
    }
}

pub struct SpiPin {
    state: Rc<RefCell<SniffState>>,
    role: SpiRole,
}

impl OutputPin for SpiPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.state.borrow_mut().drive(self.role, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.state.borrow_mut().drive(self.role, true);
        Ok(())
    }
}

impl InputPin for SpiPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        let s = self.state.borrow();
        Ok(match self.role {
            SpiRole::Sck => s.sck,
            SpiRole::Mosi => s.mosi,
            SpiRole::Miso => s.miso,
            SpiRole::Cs => s.cs,
        })
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

#[derive(Copy, Clone, Debug)]
struct Sample {
    cs: bool,
    sck: bool,
    mosi: bool,
}

const BUS_IDLE: Sample = Sample {
    cs: true,
    sck: false,
    mosi: false,
};

/// Prerecorded master waveform for the polling slave.
///
/// Each SCK read moves to the next sample; CS and MOSI read the current one. A CS read that
/// lands on a deselected sample consumes it, so idle gaps pass while the slave polls CS. Past the
/// end the bus is idle.
struct Waveform {
    samples: Vec<Sample>,
    pos: usize,
    started: bool,
}

impl Waveform {
    fn current(&self) -> Sample {
        self.samples.get(self.pos).copied().unwrap_or(BUS_IDLE)
    }
}

pub struct SpiWaveform {
    wave: Rc<RefCell<Waveform>>,
}

impl SpiWaveform {
    fn push_bits(samples: &mut Vec<Sample>, byte: u8, bits: u8) {
        for i in 0..bits {
            let mosi = (byte << i) & 0x80 != 0;
            samples.push(Sample {
                cs: false,
                sck: false,
                mosi,
            });
            samples.push(Sample {
                cs: false,
                sck: true,
                mosi,
            });
        }
    }

    fn from_samples(samples: Vec<Sample>) -> Self {
        let wave = Waveform {
            samples,
            pos: 0,
            started: false,
        };
        Self {
            wave: Rc::new(RefCell::new(wave)),
        }
    }

    /// Back-to-back bytes with CS held low.
    pub fn bytes(data: &[u8]) -> Self {
        let mut samples = Vec::new();
        for &b in data {
            Self::push_bits(&mut samples, b, 8);
        }
        Self::from_samples(samples)
    }

    /// `bits` clocks of a byte, CS released, then a full `byte`.
    pub fn aborted_then(bits: u8, byte: u8) -> Self {
        let mut samples = Vec::new();
        Self::push_bits(&mut samples, 0xFF, bits);
        samples.push(BUS_IDLE);
        Self::push_bits(&mut samples, byte, 8);
        Self::from_samples(samples)
    }

    /// `(sck, mosi, cs)`
    pub fn pins(&self) -> (WavePin, WavePin, WavePin) {
        let pin = |role| WavePin {
            wave: self.wave.clone(),
            role,
        };
        (pin(SpiRole::Sck), pin(SpiRole::Mosi), pin(SpiRole::Cs))
    }
}

pub struct WavePin {
    wave: Rc<RefCell<Waveform>>,
    role: SpiRole,
}

impl InputPin for WavePin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        let mut w = self.wave.borrow_mut();
        Ok(match self.role {
            SpiRole::Sck => {
                if w.started {
                    w.pos += 1;
                } else {
                    w.started = true;
                }
                w.current().sck
            }
            SpiRole::Cs => {
                let cs = w.current().cs;
                if cs && w.pos < w.samples.len() {
                    w.pos += 1;
                    w.started = false;
                }
                cs
            }
            _ => w.current().mosi,
        })
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

// ---------------------------------------------------------------------------------------------
// PWM
// ---------------------------------------------------------------------------------------------

pub struct MockPwm {
    pub duty: u16,
    pub max: u16,
    pub enabled: bool,
}

impl MockPwm {
    pub fn new(max: u16) -> Self {
        Self {
            duty: 0,
            max,
            enabled: false,
        }
    }
}

impl PwmPin for MockPwm {
    type Duty = u16;

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn get_duty(&self) -> u16 {
        self.duty
    }

    fn get_max_duty(&self) -> u16 {
        self.max
    }

    fn set_duty(&mut self, duty: u16) {
        self.duty = duty;
    }
}

// ---------------------------------------------------------------------------------------------
// Serial
// ---------------------------------------------------------------------------------------------

#[derive(Default)]
pub struct MockSerial {
    pub tx: Vec<u8>,
    /// Number of `write` polls that report a full transmit register.
    pub busy_polls: u32,
}

impl serial::Write<u8> for MockSerial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            return Err(nb::Error::WouldBlock);
        }
        self.tx.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------------------------
// ADC
// ---------------------------------------------------------------------------------------------

pub struct MockAdcUnit;

pub struct MockAdcPin;

impl Channel<MockAdcUnit> for MockAdcPin {
    type ID = u8;

    fn channel() -> u8 {
        0
    }
}

/// Converts to queued samples. Fails once the queue is empty.
pub struct MockAdc {
    samples: VecDeque<u16>,
    /// Number of reads that report a conversion in progress.
    pub busy_polls: u32,
}

impl MockAdc {
    pub fn new(samples: &[u16]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            busy_polls: 0,
        }
    }
}

impl OneShot<MockAdcUnit, u16, MockAdcPin> for MockAdc {
    type Error = ();

    fn read(&mut self, _pin: &mut MockAdcPin) -> nb::Result<u16, ()> {
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            return Err(nb::Error::WouldBlock);
        }
        self.samples.pop_front().ok_or(nb::Error::Other(()))
    }
}
