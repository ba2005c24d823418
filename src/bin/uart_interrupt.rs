// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART1 at 9600 baud with an RXNE interrupt.
//!
//! The handler echoes every byte and queues it; the main loop prints the received bytes in blocks
//! of ten.

#![no_main]
#![no_std]

use core::cell::RefCell;
use core::fmt::Write as _;

use cortex_m::interrupt::Mutex;
use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::hw::{BlockCollector, Usart};
use heapless::spsc::{Producer, Queue};
use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

const CAPTURE_LEN: usize = 10;
const QUEUE_LEN: usize = 32;

static RX_QUEUE: Mutex<RefCell<Option<Producer<'static, u8, QUEUE_LEN>>>> =
    Mutex::new(RefCell::new(None));

#[interrupt]
fn USART1() {
    // Only RXNE is enabled. Reading SR then DR clears it.
    let usart = unsafe { &*pac::USART1::ptr() };
    if usart.sr.read().rxne().bit_is_clear() {
        return;
    }
    let byte = usart.dr.read().dr().bits() as u8;
    cortex_m::interrupt::free(|cs| {
        if let Some(queue) = RX_QUEUE.borrow(cs).borrow_mut().as_mut() {
            let _ = queue.enqueue(byte);
        }
    });

    while usart.sr.read().txe().bit_is_clear() {}
    usart.dr.write(|w| unsafe { w.dr().bits(byte as u16) });
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(72.MHz())
        .freeze(&mut flash.acr);

    let mut afio = dp.AFIO.constrain();
    let mut gpioa = dp.GPIOA.split();

    let tx = gpioa.pa9.into_alternate_push_pull(&mut gpioa.crh);
    let rx = gpioa.pa10;
    let serial = Serial::new(
        dp.USART1,
        (tx, rx),
        &mut afio.mapr,
        Config::default().baudrate(9600.bps()),
        &clocks,
    );
    let (tx, mut rx) = serial.split();
    let mut usart = Usart::new(tx);

    usart.println("uart_interrupt: echo on, capturing 10 bytes");

    let queue = cortex_m::singleton!(: Queue<u8, QUEUE_LEN> = Queue::new()).unwrap();
    let (producer, consumer) = queue.split();
    cortex_m::interrupt::free(|cs| *RX_QUEUE.borrow(cs).borrow_mut() = Some(producer));
    let mut capture: BlockCollector<QUEUE_LEN, CAPTURE_LEN> = BlockCollector::new(consumer);

    rx.listen();
    unsafe { NVIC::unmask(pac::Interrupt::USART1) };

    loop {
        if let Some(block) = capture.poll() {
            usart.write_str("\r\ncaptured: ");
            usart.print_bytes(&block);
            usart.println("");
        }
        cortex_m::asm::wfi();
    }
}
