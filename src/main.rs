// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCAL showcase: the on-board LED through DIO, a temperature sensor through the SPI handler and a
//! heartbeat frame through the CAN driver, all configured from `mcal::cfg`.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::hw::{ChipSelect, GpioPorts, SpiBus, SpiUnit, Usart};
use bluepill_mcal::hw::CanBus;
use bluepill_mcal::mcal::can::{CanIf, ControllerState, PduId, PduInfo, StateTransition};
use bluepill_mcal::mcal::{cfg, Can, Dio, Level, Spi};
use bluepill_mcal::protocol::can_timing::{Baudrate, BitTiming};
use bxcan::{Frame, Id, StandardId};
use hal::{
    can as hal_can, pac,
    prelude::*,
    serial::{Config, Serial},
    spi::{Mode, Phase, Polarity, Spi as HalSpi},
};
use stm32f1xx_hal as hal;

const HEARTBEAT_ID: u16 = 0x100;

/// Upper layer that reports CAN events on the debug port.
struct Console<W> {
    usart: Usart<W>,
}

impl<W: embedded_hal::serial::Write<u8>> CanIf for Console<W> {
    fn rx_indication(&mut self, _ctrl: u8, frame: &Frame) {
        let id = match frame.id() {
            Id::Standard(id) => id.as_raw() as u32,
            Id::Extended(id) => id.as_raw(),
        };
        let _ = write!(self.usart, "rx {:#05x} ", id);
        if let Some(data) = frame.data() {
            self.usart.print_bytes(data);
        }
        self.usart.println("");
    }

    fn tx_confirmation(&mut self, handle: PduId) {
        let _ = writeln!(self.usart, "tx ok {}\r", handle);
    }

    fn controller_mode_indication(&mut self, ctrl: u8, state: ControllerState) {
        let _ = writeln!(self.usart, "can{} {:?}\r", ctrl, state);
    }

    fn controller_bus_off(&mut self, ctrl: u8) {
        let _ = writeln!(self.usart, "can{} bus off\r", ctrl);
    }
}

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let mut flash = dp.FLASH.constrain();
    let rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(72.MHz())
        .pclk1(36.MHz())
        .freeze(&mut flash.acr);

    // GPIO
    let mut afio = dp.AFIO.constrain();
    let mut gpioa = dp.GPIOA.split();
    let mut gpiob = dp.GPIOB.split();
    let mut gpioc = dp.GPIOC.split();

    // USART2 (DBG)
    let tx = gpioa.pa2.into_alternate_push_pull(&mut gpioa.crl);
    let rx = gpioa.pa3;
    let serial = Serial::new(
        dp.USART2,
        (tx, rx),
        &mut afio.mapr,
        Config::default().baudrate(115_200.bps()),
        &clocks,
    );
    let (tx, _rx) = serial.split();
    let mut usart = Usart::new(tx);

    // DIO: PC13 LED
    let _led = gpioc.pc13.into_push_pull_output(&mut gpioc.crh);
    let mut dio = Dio::new(GpioPorts::new(), &cfg::DIO_PORTS);

    // SPI1 + chip selects PA4 (sensor), PB0 (EEPROM)
    let sck = gpioa.pa5.into_alternate_push_pull(&mut gpioa.crl);
    let miso = gpioa.pa6;
    let mosi = gpioa.pa7.into_alternate_push_pull(&mut gpioa.crl);
    let spi_mode = Mode {
        polarity: Polarity::IdleLow,
        phase: Phase::CaptureOnFirstTransition,
    };
    let spi1 = HalSpi::spi1(dp.SPI1, (sck, miso, mosi), &mut afio.mapr, spi_mode, 1.MHz(), clocks);
    let cs_sensor = gpioa.pa4.into_push_pull_output(&mut gpioa.crl).erase();
    let cs_eeprom = gpiob.pb0.into_push_pull_output(&mut gpiob.crl).erase();
    let unit = SpiUnit::new(
        cfg::SPI_UNIT_1,
        SpiBus::new(spi1),
        [ChipSelect::active_low(cs_sensor), ChipSelect::active_low(cs_eeprom)],
    );
    let mut spi = Spi::new(unit);
    if spi.init(&cfg::SPI_CONFIG).is_err() {
        usart.println("spi init failed");
    }

    // CAN1 on PA11/PA12
    let mut can1 = hal_can::Can::new(dp.CAN1, dp.USB);
    let can_rx = gpioa.pa11.into_floating_input(&mut gpioa.crh);
    let can_tx = gpioa.pa12.into_alternate_push_pull(&mut gpioa.crh);
    can1.assign_pins((can_tx, can_rx), &mut afio.mapr);

    let timing = BitTiming::compute(cfg::PCLK1_HZ, Baudrate::Kbps500.bits_per_second()).unwrap();
    let mut bus = CanBus::new(can1, timing, false, false);
    bus.accept_all();

    let mut can = Can::new(bus, Console { usart });
    if let Err(e) = can.init(&cfg::CAN_CONFIG) {
        let _ = writeln!(can.upper().usart, "can init: {:?}\r", e);
    }
    if let Err(e) = can.set_controller_mode(cfg::CAN_CONTROLLER_1, StateTransition::Start) {
        let _ = writeln!(can.upper().usart, "can start: {:?}\r", e);
    }

    let v = dio.version_info();
    let _ = writeln!(
        can.upper().usart,
        "mcal demo: dio {}.{}.{}\r",
        v.sw_major, v.sw_minor, v.sw_patch
    );

    let mut delay = cp.SYST.delay(&clocks);
    let mut beat: u8 = 0;

    loop {
        // LED
        let _ = dio.flip_channel(cfg::DIO_LED);

        // Sensor
        let mut raw = [0u8; 2];
        let _ = spi.write_ib(cfg::SPI_CH_SENSOR, &[0x00, 0x00]);
        match spi
            .sync_transmit(cfg::SPI_SEQ_TEMP)
            .and_then(|_| spi.read_ib(cfg::SPI_CH_SENSOR, &mut raw))
        {
            Ok(_) => {
                let usart = &mut can.upper().usart;
                usart.write_str("temp raw ");
                usart.print_hex_u16(u16::from_be_bytes(raw));
                usart.println("");
            }
            Err(e) => {
                let _ = writeln!(can.upper().usart, "spi: {:?}\r", e);
            }
        }

        // Heartbeat
        if let Some(id) = StandardId::new(HEARTBEAT_ID) {
            let level = dio.read_channel(cfg::DIO_LED).unwrap_or(Level::Low);
            let data = [beat, level as u8];
            let pdu = PduInfo {
                id: Id::Standard(id),
                data: &data,
                handle: beat as PduId,
            };
            if let Err(e) = can.write(cfg::CAN_HTH_1, &pdu) {
                let _ = writeln!(can.upper().usart, "can write: {:?}\r", e);
            }
        }
        beat = beat.wrapping_add(1);

        for _ in 0..50 {
            can.main_function_write();
            can.main_function_read();
            can.main_function_bus_off();
            can.main_function_mode();
            delay.delay_ms(10_u16);
        }
    }
}
