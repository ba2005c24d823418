// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! LIN master driver.
//!
//! Headers are always sent by this node. Depending on [`FrameResponse`] the response is then sent
//! by us (`Tx`), expected from a slave (`Rx`) or exchanged between two slaves (`Ignore`). Slave
//! responses are collected lazily: every call to [`Lin::get_status`] drains the received bytes into
//! the channel's [`Parser`].

use core::fmt::Debug;

use crate::mcal::cfg;
use crate::mcal::std_types::VersionInfo;
use crate::protocol::lin::{
    self, ChecksumModel, Pid, GO_TO_SLEEP, MASTER_REQUEST_ID, MAX_DATA_LEN, SYNC_BYTE, WAKEUP_BYTE,
};
use crate::protocol::lin_parser::{Event, Parser};

pub const MAX_CHANNELS: usize = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChannelState {
    Sleep,
    Operational,
    /// Go-to-sleep command sent, confirmed by the next status request.
    SleepPending,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    NotOk,
    TxOk,
    TxBusy,
    TxHeaderError,
    TxError,
    RxOk,
    RxBusy,
    RxError,
    RxNoResponse,
    Operational,
    ChSleep,
}

/// Who sends the response of a frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FrameResponse {
    Tx,
    Rx,
    /// Slave-to-slave; the master only sends the header.
    Ignore,
}

#[derive(Copy, Clone, Debug)]
pub struct Pdu<'a> {
    pub pid: Pid,
    pub cs: ChecksumModel,
    pub drc: FrameResponse,
    /// Response length, 1 to 8.
    pub dl: u8,
    /// Response data for `Tx` frames, at least `dl` bytes.
    pub data: &'a [u8],
}

#[derive(Copy, Clone, Debug)]
pub struct ChannelConfig {
    pub baudrate: u32,
    pub wakeup_support: bool,
}

#[derive(Copy, Clone, Debug)]
pub struct LinConfig {
    pub channels: &'static [ChannelConfig],
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    Uninit,
    Config,
    InvalidChannel(u8),
    /// Channel is asleep (or going to sleep).
    Sleeping(u8),
    /// Wakeup requested on a channel that is not asleep.
    NotSleeping(u8),
    DataLength(u8),
    Frame(lin::Error),
    /// The hardware refused a byte.
    Hw,
}

impl From<lin::Error> for Error {
    fn from(e: lin::Error) -> Self {
        Error::Frame(e)
    }
}

/// What the UART delivered.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RxByte {
    Break,
    Data(u8),
}

/// UART in LIN mode. Reads never return the echo of our own transmissions.
pub trait LinHw {
    type Error: Debug;

    fn enable(&mut self, ch: u8, baudrate: u32);
    fn send_break(&mut self, ch: u8) -> Result<(), Self::Error>;
    fn write(&mut self, ch: u8, byte: u8) -> Result<(), Self::Error>;
    fn read(&mut self, ch: u8) -> nb::Result<RxByte, Self::Error>;
    /// Bus activity seen while asleep. Clears the flag.
    fn wakeup_detected(&mut self, ch: u8) -> bool;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum FrameStatus {
    None,
    TxOk,
    TxHeaderError,
    TxError,
    Rx,
    RxOk,
    RxError,
}

struct Channel {
    state: ChannelState,
    frame: FrameStatus,
    parser: Parser,
    sdu: [u8; MAX_DATA_LEN],
    sdu_len: usize,
}

impl Channel {
    fn new() -> Self {
        Self {
            state: ChannelState::Operational,
            frame: FrameStatus::None,
            parser: Parser::new(),
            sdu: [0; MAX_DATA_LEN],
            sdu_len: 0,
        }
    }
}

pub struct Lin<H: LinHw> {
    hw: H,
    config: Option<&'static LinConfig>,
    channels: [Channel; MAX_CHANNELS],
}

impl<H: LinHw> Lin<H> {
    pub fn new(hw: H) -> Self {
        Self {
            hw,
            config: None,
            channels: [Channel::new(), Channel::new()],
        }
    }

    /// Enable every configured channel. Channels start out operational.
    pub fn init(&mut self, config: &'static LinConfig) -> Result<(), Error> {
        if config.channels.is_empty() || config.channels.len() > MAX_CHANNELS {
            return Err(Error::Config);
        }
        for (i, ch) in config.channels.iter().enumerate() {
            self.hw.enable(i as u8, ch.baudrate);
            self.channels[i] = Channel::new();
        }
        self.config = Some(config);
        Ok(())
    }

    fn check(&self, ch: u8) -> Result<&'static ChannelConfig, Error> {
        self.config
            .ok_or(Error::Uninit)?
            .channels
            .get(ch as usize)
            .ok_or(Error::InvalidChannel(ch))
    }

    /// True if a slave woke the bus. Only channels with wakeup support report it.
    pub fn check_wakeup(&mut self, ch: u8) -> Result<bool, Error> {
        let cfg = self.check(ch)?;
        Ok(cfg.wakeup_support && self.hw.wakeup_detected(ch))
    }

    /// Send the header for `pdu` and, for `Tx` frames, the response.
    pub fn send_frame(&mut self, ch: u8, pdu: &Pdu) -> Result<(), Error> {
        self.check(ch)?;
        if self.channels[ch as usize].state != ChannelState::Operational {
            return Err(Error::Sleeping(ch));
        }
        if !(1..=MAX_DATA_LEN as u8).contains(&pdu.dl) {
            return Err(Error::DataLength(pdu.dl));
        }

        let mut response = [0u8; MAX_DATA_LEN + 1];
        let response_len = match pdu.drc {
            FrameResponse::Tx => {
                let data = pdu
                    .data
                    .get(..pdu.dl as usize)
                    .ok_or(Error::DataLength(pdu.dl))?;
                lin::encode_response(pdu.cs, pdu.pid, data, &mut response)?
            }
            _ => 0,
        };

        let channel = &mut self.channels[ch as usize];
        channel.parser.reset();
        channel.sdu_len = 0;

        if send_header(&mut self.hw, ch, pdu.pid).is_err() {
            channel.frame = FrameStatus::TxHeaderError;
            return Ok(());
        }

        channel.frame = match pdu.drc {
            FrameResponse::Tx => {
                let sent = response[..response_len]
                    .iter()
                    .try_for_each(|&b| self.hw.write(ch, b));
                if sent.is_ok() {
                    FrameStatus::TxOk
                } else {
                    FrameStatus::TxError
                }
            }
            FrameResponse::Rx => {
                channel.parser.begin_response(pdu.pid, pdu.dl, pdu.cs);
                FrameStatus::Rx
            }
            FrameResponse::Ignore => FrameStatus::TxOk,
        };
        Ok(())
    }

    /// Broadcast the go-to-sleep command. The channel reports `ChSleep` from the next status
    /// request on.
    pub fn go_to_sleep(&mut self, ch: u8) -> Result<(), Error> {
        self.check(ch)?;
        if self.channels[ch as usize].state == ChannelState::Sleep {
            return Ok(());
        }

        let pid = Pid::from_id(MASTER_REQUEST_ID)?;
        let mut frame = [0u8; MAX_DATA_LEN + 1];
        let n = lin::encode_response(ChecksumModel::Classic, pid, &GO_TO_SLEEP, &mut frame)?;

        send_header(&mut self.hw, ch, pid).map_err(|_| Error::Hw)?;
        for &b in &frame[..n] {
            self.hw.write(ch, b).map_err(|_| Error::Hw)?;
        }

        let channel = &mut self.channels[ch as usize];
        channel.parser.reset();
        channel.frame = FrameStatus::None;
        channel.state = ChannelState::SleepPending;
        Ok(())
    }

    /// Enter sleep without sending the command, after another master put the cluster to sleep.
    pub fn go_to_sleep_internal(&mut self, ch: u8) -> Result<(), Error> {
        self.check(ch)?;
        let channel = &mut self.channels[ch as usize];
        channel.parser.reset();
        channel.frame = FrameStatus::None;
        channel.state = ChannelState::Sleep;
        Ok(())
    }

    /// Wake the cluster with a wakeup pulse.
    pub fn wakeup(&mut self, ch: u8) -> Result<(), Error> {
        self.check(ch)?;
        if self.channels[ch as usize].state == ChannelState::Operational {
            return Err(Error::NotSleeping(ch));
        }

        self.hw.send_break(ch).map_err(|_| Error::Hw)?;
        self.hw.write(ch, WAKEUP_BYTE).map_err(|_| Error::Hw)?;

        self.channels[ch as usize].state = ChannelState::Operational;
        Ok(())
    }

    /// Become operational after a wakeup from a slave.
    pub fn wakeup_internal(&mut self, ch: u8) -> Result<(), Error> {
        self.check(ch)?;
        if self.channels[ch as usize].state == ChannelState::Operational {
            return Err(Error::NotSleeping(ch));
        }
        self.channels[ch as usize].state = ChannelState::Operational;
        Ok(())
    }

    /// State of the last frame. The response data is returned only with `RxOk`.
    pub fn get_status(&mut self, ch: u8) -> Result<(Status, Option<&[u8]>), Error> {
        self.check(ch)?;
        self.poll_rx(ch);

        let channel = &mut self.channels[ch as usize];
        match channel.state {
            ChannelState::SleepPending => {
                channel.state = ChannelState::Sleep;
                return Ok((Status::ChSleep, None));
            }
            ChannelState::Sleep => return Ok((Status::ChSleep, None)),
            ChannelState::Operational => {}
        }

        let status = match channel.frame {
            FrameStatus::None => Status::Operational,
            FrameStatus::TxOk => Status::TxOk,
            FrameStatus::TxHeaderError => Status::TxHeaderError,
            FrameStatus::TxError => Status::TxError,
            FrameStatus::Rx if channel.parser.response_progress() == 0 => Status::RxNoResponse,
            FrameStatus::Rx => Status::RxBusy,
            FrameStatus::RxOk => {
                return Ok((Status::RxOk, Some(&channel.sdu[..channel.sdu_len])));
            }
            FrameStatus::RxError => Status::RxError,
        };
        Ok((status, None))
    }

    pub fn channel_state(&self, ch: u8) -> Result<ChannelState, Error> {
        self.check(ch)?;
        Ok(self.channels[ch as usize].state)
    }

    pub fn version_info(&self) -> VersionInfo {
        cfg::LIN_VERSION
    }

    pub fn hw(&mut self) -> &mut H {
        &mut self.hw
    }

    fn poll_rx(&mut self, ch: u8) {
        let channel = &mut self.channels[ch as usize];
        loop {
            let byte = match self.hw.read(ch) {
                Ok(RxByte::Data(b)) => b,
                // A break aborts a response in progress.
                Ok(RxByte::Break) => {
                    if channel.frame == FrameStatus::Rx {
                        channel.parser.reset();
                        channel.frame = FrameStatus::RxError;
                    }
                    continue;
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(_)) => {
                    if channel.frame == FrameStatus::Rx {
                        channel.parser.reset();
                        channel.frame = FrameStatus::RxError;
                    }
                    continue;
                }
            };

            if channel.frame != FrameStatus::Rx {
                continue;
            }
            match channel.parser.push(byte) {
                Some(Event::Response { data, len, .. }) => {
                    channel.sdu = data;
                    channel.sdu_len = len as usize;
                    channel.frame = FrameStatus::RxOk;
                }
                Some(Event::Error(_)) => channel.frame = FrameStatus::RxError,
                _ => {}
            }
        }
    }
}

fn send_header<H: LinHw>(hw: &mut H, ch: u8, pid: Pid) -> Result<(), H::Error> {
    hw.send_break(ch)?;
    hw.write(ch, SYNC_BYTE)?;
    hw.write(ch, pid.raw())
}
