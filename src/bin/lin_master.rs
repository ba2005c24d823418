// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! LIN master on USART1 (PA9 TX, PA10 RX) through a single-wire transceiver, 19200 baud.
//!
//! Runs a two-frame schedule every 100 ms: a master-transmitted command frame (id 0x10) and a
//! slave-response status frame (id 0x20). After 50 cycles the cluster is put to sleep and woken
//! again. Everything is logged on USART2.
//!
//! The USART1 interrupt drains the receiver into a queue, so slave responses are kept even though
//! the schedule only looks at them once per slot.

#![no_main]
#![no_std]

use core::cell::RefCell;
use core::fmt::Write as _;

use cortex_m::interrupt::Mutex;
use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::hw::lin_port::{RxFeed, RxQueue};
use bluepill_mcal::hw::{LinPort, LinRxIrq, LinUart, Usart};
use bluepill_mcal::mcal::lin::{FrameResponse, Pdu, Status};
use bluepill_mcal::mcal::{cfg, Lin};
use bluepill_mcal::protocol::lin::{ChecksumModel, Pid};
use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

const COMMAND_ID: u8 = 0x10;
const STATUS_ID: u8 = 0x20;
const STATUS_LEN: u8 = 4;
const SLOT_MS: u16 = 50;
const SLEEP_AFTER: u32 = 50;

static LIN_RX: Mutex<RefCell<Option<LinRxIrq>>> = Mutex::new(RefCell::new(None));

#[interrupt]
fn USART1() {
    cortex_m::interrupt::free(|cs| {
        if let Some(rx) = LIN_RX.borrow(cs).borrow_mut().as_mut() {
            rx.on_interrupt();
        }
    });
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(72.MHz())
        .pclk2(72.MHz())
        .freeze(&mut flash.acr);

    let mut afio = dp.AFIO.constrain();
    let mut gpioa = dp.GPIOA.split();

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

    // USART1 in LIN mode
    let _lin_tx = gpioa.pa9.into_alternate_push_pull(&mut gpioa.crh);
    let _lin_rx = gpioa.pa10.into_floating_input(&mut gpioa.crh);
    let queue = cortex_m::singleton!(: RxQueue = RxQueue::new()).unwrap();
    let (feed, rx) = queue.split();
    cortex_m::interrupt::free(|cs| {
        *LIN_RX.borrow(cs).borrow_mut() = Some(LinRxIrq::new(RxFeed::new(feed)));
    });

    let port = LinPort::new(LinUart::new(dp.USART1, clocks.pclk2().raw()), rx);
    let mut lin = Lin::new(port);
    if let Err(e) = lin.init(&cfg::LIN_CONFIG) {
        let _ = writeln!(usart, "lin init: {:?}\r", e);
    }
    unsafe { NVIC::unmask(pac::Interrupt::USART1) };

    let v = lin.version_info();
    let _ = writeln!(
        usart,
        "lin_master: {} baud, driver {}.{}.{}\r",
        cfg::LIN_CONFIG.channels[0].baudrate,
        v.sw_major,
        v.sw_minor,
        v.sw_patch
    );

    let command_pid = Pid::from_id(COMMAND_ID).unwrap();
    let status_pid = Pid::from_id(STATUS_ID).unwrap();
    let ch = cfg::LIN_CHANNEL_1;

    let mut delay = cp.SYST.delay(&clocks);
    let mut cycle: u32 = 0;

    loop {
        // Slot 1: command
        let command = [(cycle & 0xFF) as u8, 0xA5];
        let pdu = Pdu {
            pid: command_pid,
            cs: ChecksumModel::Enhanced,
            drc: FrameResponse::Tx,
            dl: command.len() as u8,
            data: &command,
        };
        if let Err(e) = lin.send_frame(ch, &pdu) {
            let _ = writeln!(usart, "send {:#04x}: {:?}\r", COMMAND_ID, e);
        }
        delay.delay_ms(SLOT_MS);
        if let Ok((status, _)) = lin.get_status(ch) {
            if status != Status::TxOk {
                let _ = writeln!(usart, "{:#04x}: {:?}\r", COMMAND_ID, status);
            }
        }

        // Slot 2: status from the slave
        let pdu = Pdu {
            pid: status_pid,
            cs: ChecksumModel::Enhanced,
            drc: FrameResponse::Rx,
            dl: STATUS_LEN,
            data: &[],
        };
        if let Err(e) = lin.send_frame(ch, &pdu) {
            let _ = writeln!(usart, "send {:#04x}: {:?}\r", STATUS_ID, e);
        }
        delay.delay_ms(SLOT_MS);
        match lin.get_status(ch) {
            Ok((Status::RxOk, Some(data))) => {
                let _ = write!(usart, "{:#04x}: ", STATUS_ID);
                usart.print_bytes(data);
                usart.println("");
            }
            Ok((status, _)) => {
                let _ = writeln!(usart, "{:#04x}: {:?}\r", STATUS_ID, status);
            }
            Err(e) => {
                let _ = writeln!(usart, "status: {:?}\r", e);
            }
        }

        cycle += 1;
        if cycle % SLEEP_AFTER == 0 {
            let _ = lin.go_to_sleep(ch);
            delay.delay_ms(SLOT_MS);
            if let Ok((status, _)) = lin.get_status(ch) {
                let _ = writeln!(usart, "sleep: {:?}\r", status);
            }
            delay.delay_ms(1000_u16);
            match lin.wakeup(ch) {
                Ok(()) => usart.println("wakeup sent"),
                Err(e) => {
                    let _ = writeln!(usart, "wakeup: {:?}\r", e);
                }
            }
            delay.delay_ms(SLOT_MS);
        }
    }
}
