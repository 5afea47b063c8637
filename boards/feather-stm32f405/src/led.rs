#![deny(unsafe_code)]
#![deny(warnings)]
//! Status LED patterns
//!
//! [`LedIndicator`] only records the latest [`Indication`]; the LED task
//! plays it, dropping whatever pattern was running:
//!
//! | Indication   | Pattern                                  |
//! |--------------|------------------------------------------|
//! | `Identify`   | 10 blinks, toggling every 200 ms         |
//! | `Connecting` | toggle every 500 ms until told otherwise |
//! | `Connected`  | off                                      |
//! | `DataSent`   | one 100 ms flash                         |

use embassy_futures::select::{select, Either};
use embassy_stm32::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use hal_abstractions::{Indication, StatusIndicator};

const IDENTIFY_CYCLES: u32 = 10;

static PATTERN: Signal<CriticalSectionRawMutex, Indication> = Signal::new();

/// Control-loop handle on the status LED
#[derive(Debug, Default)]
pub struct LedIndicator;

impl StatusIndicator for LedIndicator {
    fn signal(&mut self, indication: Indication) {
        PATTERN.signal(indication);
    }
}

async fn play(led: &mut Output<'static>, indication: Indication) {
    match indication {
        Indication::Identify => {
            for _ in 0..IDENTIFY_CYCLES * 2 {
                led.toggle();
                Timer::after_millis(200).await;
            }
            led.set_low();
        }
        Indication::Connecting => loop {
            led.toggle();
            Timer::after_millis(500).await;
        },
        Indication::Connected => led.set_low(),
        Indication::DataSent => {
            led.set_high();
            Timer::after_millis(100).await;
            led.set_low();
        }
    }
}

/// Play indications as they arrive; never returns
pub async fn run(led: &mut Output<'static>) -> ! {
    led.set_low();
    let mut current = PATTERN.wait().await;
    loop {
        current = match select(play(led, current), PATTERN.wait()).await {
            Either::First(()) => PATTERN.wait().await,
            Either::Second(next) => next,
        };
    }
}
