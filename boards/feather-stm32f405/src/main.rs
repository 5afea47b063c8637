#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

extern crate alloc;

use defmt_rtt as _; // global logger
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use node_core::telemetry::PulseCounter;
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;

use network::{MqttConfig, SntpConfig};

mod clock;
mod eth;
mod heap;
mod led;
mod network;
mod storage;
mod system;

stm32_tim2_monotonic!(Mono, 1_000_000);

/// Name used in topics and the MQTT client id; override at build time with
/// `NODE_DEVICE_NAME`
const DEVICE_NAME: &str = match option_env!("NODE_DEVICE_NAME") {
    Some(name) => name,
    None => "flow_1",
};

/// Broker and NTP settings from the common configuration
struct NetworkSettings {
    mqtt: MqttConfig,
    sntp: SntpConfig,
}

/// Handed from the control loop to the network task once config is loaded
static SETTINGS: Signal<CriticalSectionRawMutex, NetworkSettings> = Signal::new();

/// Flow meter pulses, counted on PC7 falling edges
static PULSES: PulseCounter = PulseCounter::new();

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1, USART2, USART3])]
mod app {
    use super::*;
    use alloc::string::String;
    use defmt::{info, warn};
    use embassy_futures::select::{select, select3, Either, Either3};
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::flash::Flash;
    use embassy_stm32::gpio::{Level, Output, Pull, Speed};
    use embassy_stm32::peripherals;
    use embassy_stm32::rcc::{Hse, HseMode};
    use embassy_stm32::spi::{self, Spi};
    use embassy_stm32::time::Hertz;
    use node_core::network::LinkConfig;
    use node_core::sensors::WaterFlow;
    use node_core::{Node, NodeParts};

    use clock::BoardClock;
    use led::LedIndicator;
    use network::link;
    use network::{manager, MqttLink, MqttSession, NetworkClient, NetworkConfig, SntpClient};
    use storage::FlashStore;
    use system::SystemReset;

    type SpiPeripheral = embassy_stm32::Peri<'static, peripherals::SPI2>;
    type PinPB13 = embassy_stm32::Peri<'static, peripherals::PB13>;
    type PinPB15 = embassy_stm32::Peri<'static, peripherals::PB15>;
    type PinPB14 = embassy_stm32::Peri<'static, peripherals::PB14>;
    type PinPC6 = embassy_stm32::Peri<'static, peripherals::PC6>;
    type PinPC3 = embassy_stm32::Peri<'static, peripherals::PC3>;
    type PinPC2 = embassy_stm32::Peri<'static, peripherals::PC2>;
    type PinPC7 = embassy_stm32::Peri<'static, peripherals::PC7>;
    type ExtiChannel = embassy_stm32::Peri<'static, peripherals::EXTI2>;
    type PulseExtiChannel = embassy_stm32::Peri<'static, peripherals::EXTI7>;
    type DmaTx = embassy_stm32::Peri<'static, peripherals::DMA1_CH4>;
    type DmaRx = embassy_stm32::Peri<'static, peripherals::DMA1_CH3>;
    type FlashPeripheral = embassy_stm32::Peri<'static, peripherals::FLASH>;

    struct NetworkPeripherals {
        spi: SpiPeripheral,
        sck: PinPB13,
        mosi: PinPB15,
        miso: PinPB14,
        cs: PinPC6,
        reset: PinPC3,
        int: PinPC2,
        exti: ExtiChannel,
        dma_tx: DmaTx,
        dma_rx: DmaRx,
    }

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        led: Output<'static>,
    }

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("Sensor node {} starting...", DEVICE_NAME);
        heap::init();

        // Adafruit Feather STM32F405: 12 MHz HSE
        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz(12_000_000),
            mode: HseMode::Oscillator,
        });

        // HSE (12 MHz) / PREDIV(6) = 2 MHz (PLL input)
        // 2 MHz * MUL(168) = 336 MHz (VCO)
        // VCO / DIVP(4) = 84 MHz (SYSCLK)
        // VCO / DIVQ(7) = 48 MHz (USB/RNG clock)
        config.rcc.pll_src = embassy_stm32::rcc::PllSource::HSE;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            prediv: embassy_stm32::rcc::PllPreDiv::DIV6,
            mul: embassy_stm32::rcc::PllMul::MUL168,
            divp: Some(embassy_stm32::rcc::PllPDiv::DIV4),
            divq: Some(embassy_stm32::rcc::PllQDiv::DIV7),
            divr: None,
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_P;
        config.rcc.ahb_pre = embassy_stm32::rcc::AHBPrescaler::DIV1; // 84 MHz
        config.rcc.apb1_pre = embassy_stm32::rcc::APBPrescaler::DIV2; // 42 MHz
        config.rcc.apb2_pre = embassy_stm32::rcc::APBPrescaler::DIV1; // 84 MHz

        let p = embassy_stm32::init(config);
        info!("PLL configured: SYSCLK=84MHz");

        // TIM2 on APB1: timer clock = 2*APB1 when prescaler != 1
        let timer_clock_hz = 84_000_000;
        Mono::start(timer_clock_hz);

        let led = Output::new(p.PC1, Level::Low, Speed::Low);

        let net_periph = NetworkPeripherals {
            spi: p.SPI2,
            sck: p.PB13,
            mosi: p.PB15,
            miso: p.PB14,
            cs: p.PC6,
            reset: p.PC3,
            int: p.PC2,
            exti: p.EXTI2,
            dma_tx: p.DMA1_CH4,
            dma_rx: p.DMA1_CH3,
        };

        led_task::spawn().ok();
        pulse_task::spawn(p.PC7, p.EXTI7).ok();
        control_loop::spawn(p.FLASH).ok();
        network_task::spawn(net_periph).ok();

        (Shared {}, Local { led })
    }

    /// Status LED patterns
    #[task(priority = 1, local = [led])]
    async fn led_task(cx: led_task::Context) {
        led::run(cx.local.led).await
    }

    /// Flow meter pulse counter
    #[task(priority = 2)]
    async fn pulse_task(_cx: pulse_task::Context, pin: PinPC7, exti: PulseExtiChannel) {
        let mut input = ExtiInput::new(pin, exti, Pull::Up);
        loop {
            input.wait_for_falling_edge().await;
            PULSES.record();
        }
    }

    /// Control loop - owns the node and polls it every millisecond
    #[task(priority = 1)]
    async fn control_loop(_cx: control_loop::Context, flash: FlashPeripheral) {
        let parts = NodeParts {
            clock: BoardClock,
            transport: MqttLink,
            storage: FlashStore::new(Flash::new_blocking(flash)),
            module: WaterFlow::new(&PULSES),
            indicator: LedIndicator,
            system: SystemReset,
        };
        let mut node = match Node::new(DEVICE_NAME, parts, LinkConfig::default()) {
            Ok(node) => node,
            Err(e) => defmt::panic!("Device name {} unusable: {}", DEVICE_NAME, e),
        };
        if let Err(e) = node.boot() {
            defmt::panic!("Boot failed: {}", e);
        }

        let common = node.config().common();
        let mut mqtt = MqttConfig {
            broker_port: common.mqtt_port,
            ..MqttConfig::default()
        };
        if !common.mqtt_server.is_empty() {
            mqtt.broker_host = common.mqtt_server.clone();
        }
        let mut sntp = SntpConfig::default();
        if !common.ntp_server.is_empty() {
            sntp.server = common.ntp_server.clone();
        }
        SETTINGS.signal(NetworkSettings { mqtt, sntp });

        loop {
            node.poll();
            Mono::delay(1_u64.millis()).await;
        }
    }

    /// Network task - orchestrates network stack and protocol clients
    ///
    /// Stack is !Send and must remain within this task.
    #[task(priority = 1)]
    async fn network_task(_cx: network_task::Context, periph: NetworkPeripherals) {
        use embassy_net::{Config, StackResources};
        use static_cell::StaticCell;

        info!("Network task started");

        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(10_000_000); // 10 MHz for W5500

        let spi = Spi::new(
            periph.spi,
            periph.sck,
            periph.mosi,
            periph.miso,
            periph.dma_tx,
            periph.dma_rx,
            spi_config,
        );

        let cs = Output::new(periph.cs, Level::High, Speed::VeryHigh);
        let reset = Output::new(periph.reset, Level::High, Speed::Low);
        let int = ExtiInput::new(periph.int, periph.exti, Pull::Up);

        let eth_periph = eth::EthPeripherals {
            spi,
            cs,
            reset,
            int,
        };

        let net_config = NetworkConfig::default();
        let (device, w5500_runner) = match eth::init_w5500(eth_periph, net_config.mac_addr).await {
            Ok(parts) => parts,
            Err(e) => defmt::panic!("Ethernet unavailable: {}", e),
        };

        static RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
        let (stack, mut net_runner) = embassy_net::new(
            device,
            Config::dhcpv4(Default::default()),
            RESOURCES.init(StackResources::new()),
            net_config.seed,
        );
        info!("Network stack initialized with DHCP");

        match select3(w5500_runner.run(), net_runner.run(), run_clients(stack)).await {
            Either3::First(never) | Either3::Second(never) | Either3::Third(never) => never,
        }
    }

    async fn run_clients(stack: embassy_net::Stack<'static>) -> ! {
        let settings = SETTINGS.wait().await;
        manager::wait_for_config(&stack).await;

        match select(run_sntp(stack, settings.sntp), run_mqtt(stack, settings.mqtt)).await {
            Either::First(never) | Either::Second(never) => never,
        }
    }

    /// Initial sync, then periodic resync using RTIC monotonic timer
    async fn run_sntp(stack: embassy_net::Stack<'static>, config: SntpConfig) -> ! {
        let mut sntp = SntpClient::with_config(config);
        loop {
            let next_sync = match sntp.run(&stack).await {
                Ok(_) => 15_u64.minutes(),
                Err(e) => {
                    warn!("SNTP sync failed: {}", e);
                    1_u64.minutes()
                }
            };
            Mono::delay(next_sync).await;
        }
    }

    /// One broker session per connect request from the control loop
    async fn run_mqtt(stack: embassy_net::Stack<'static>, config: MqttConfig) -> ! {
        loop {
            let client_id: String = link::CONNECT_REQUEST.wait().await;
            let mut session = MqttSession::new(config.clone(), client_id);
            if let Err(e) = session.run(&stack).await {
                warn!("MQTT session ended: {}", e);
            }
        }
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        info!("Idle task started - entering WFI loop");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
