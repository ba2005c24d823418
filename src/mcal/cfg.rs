// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board configuration for the MCAL drivers.
//!
//! Everything here is fixed at compile time. Channel, job and sequence ids used by the firmware are
//! indices into these tables.

use crate::mcal::can::{CanConfig, ControllerConfig};
use crate::mcal::dio::{ChannelId, PortId};
use crate::mcal::lin::{self, LinConfig};
use crate::mcal::spi::{BufferKind, ChannelConfig, JobConfig, SequenceConfig, SpiConfig};
use crate::mcal::std_types::VersionInfo;
use crate::protocol::can_timing::Baudrate;

pub const VENDOR_ID: u16 = 0xFFFF;

pub const DIO_VERSION: VersionInfo = VersionInfo {
    vendor_id: VENDOR_ID,
    module_id: 120,
    sw_major: 1,
    sw_minor: 0,
    sw_patch: 0,
};

pub const SPI_VERSION: VersionInfo = VersionInfo {
    vendor_id: VENDOR_ID,
    module_id: 83,
    sw_major: 1,
    sw_minor: 0,
    sw_patch: 0,
};

pub const CAN_VERSION: VersionInfo = VersionInfo {
    vendor_id: VENDOR_ID,
    module_id: 80,
    sw_major: 1,
    sw_minor: 0,
    sw_patch: 0,
};

pub const LIN_VERSION: VersionInfo = VersionInfo {
    vendor_id: VENDOR_ID,
    module_id: 82,
    sw_major: 1,
    sw_minor: 0,
    sw_patch: 3,
};

// ================================
// DIO
// ================================

pub const DIO_PORTS: [PortId; 4] = [PortId::A, PortId::B, PortId::C, PortId::D];

/// On-board LED, active low.
pub const DIO_LED: ChannelId = ChannelId::new(PortId::C, 13);
/// User button, pulled up.
pub const DIO_BUTTON: ChannelId = ChannelId::new(PortId::A, 0);

// ================================
// SPI
// ================================

/// SPI1 on PA5/PA6/PA7.
pub const SPI_UNIT_1: u8 = 0;

/// Chip select PA4: temperature sensor.
pub const SPI_CS_SENSOR: u8 = 0;
/// Chip select PB0: EEPROM.
pub const SPI_CS_EEPROM: u8 = 1;

pub const SPI_CH_SENSOR: u8 = 0;
pub const SPI_CH_EEPROM_CMD: u8 = 1;
pub const SPI_CH_EEPROM_DATA: u8 = 2;

pub const SPI_JOB_READ_TEMP_SENSOR: u8 = 0;
pub const SPI_JOB_WRITE_EEPROM: u8 = 1;
pub const SPI_JOB_READ_EEPROM: u8 = 2;

pub const SPI_SEQ_TEMP: u8 = 0;
pub const SPI_SEQ_EEPROM_WRITE: u8 = 1;
pub const SPI_SEQ_EEPROM_READ: u8 = 2;

pub static SPI_CONFIG: SpiConfig = SpiConfig {
    channels: &[
        ChannelConfig {
            buffer: BufferKind::Internal,
            len: 2,
            default_data: 0x00,
        },
        ChannelConfig {
            buffer: BufferKind::Internal,
            len: 3,
            default_data: 0x00,
        },
        ChannelConfig {
            buffer: BufferKind::External,
            len: 32,
            default_data: 0xFF,
        },
    ],
    jobs: &[
        JobConfig {
            hw_unit: SPI_UNIT_1,
            cs: SPI_CS_SENSOR,
            channels: &[SPI_CH_SENSOR],
        },
        JobConfig {
            hw_unit: SPI_UNIT_1,
            cs: SPI_CS_EEPROM,
            channels: &[SPI_CH_EEPROM_CMD, SPI_CH_EEPROM_DATA],
        },
        JobConfig {
            hw_unit: SPI_UNIT_1,
            cs: SPI_CS_EEPROM,
            channels: &[SPI_CH_EEPROM_CMD, SPI_CH_EEPROM_DATA],
        },
    ],
    sequences: &[
        SequenceConfig {
            jobs: &[SPI_JOB_READ_TEMP_SENSOR],
        },
        SequenceConfig {
            jobs: &[SPI_JOB_WRITE_EEPROM],
        },
        SequenceConfig {
            jobs: &[SPI_JOB_READ_EEPROM],
        },
    ],
};

// ================================
// CAN
// ================================

/// APB1 clock with the 72 MHz system clock setup used by every binary.
pub const PCLK1_HZ: u32 = 36_000_000;

pub const CAN_CONTROLLER_1: u8 = 0;
pub const CAN_HTH_1: u8 = 0;

pub static CAN_CONFIG: CanConfig = CanConfig {
    controllers: &[ControllerConfig {
        pclk: PCLK1_HZ,
        default_baudrate: Baudrate::Kbps500,
        loopback: false,
        silent: false,
    }],
    baudrates: &Baudrate::ALL,
    hths: &[CAN_CONTROLLER_1],
};

// ================================
// LIN
// ================================

/// USART1 on PA9/PA10.
pub const LIN_CHANNEL_1: u8 = 0;

pub static LIN_CONFIG: LinConfig = LinConfig {
    channels: &[lin::ChannelConfig {
        baudrate: 19_200,
        wakeup_support: true,
    }],
};
