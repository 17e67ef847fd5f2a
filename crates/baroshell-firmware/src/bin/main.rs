#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use baroshell_core::app_state::AppState;
use baroshell_core::console::{RX_MAILBOX, RxSource};
use baroshell_core::shell::Shell;
use baroshell_firmware::config::firmware_config;
use baroshell_firmware::hardware::{
    create_debug_uart, create_host_uart, create_i2c_bus, create_twai,
};
use baroshell_firmware::motor_bus::TwaiMotorBus;
use baroshell_firmware::serial::{SerialLinks, serial_reader};
use embassy_executor::Spawner;
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use log::{LevelFilter, info, warn};
use rtt_target::rprintln;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "the shell transcript and line buffer live in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let i2c = create_i2c_bus(peripherals.I2C0, peripherals.GPIO12, peripherals.GPIO11);
    let twai = create_twai(peripherals.TWAI0, peripherals.GPIO6, peripherals.GPIO5);
    let (debug_rx, debug_tx) =
        create_debug_uart(peripherals.UART0, peripherals.GPIO43, peripherals.GPIO44).split();
    let (host_rx, host_tx) =
        create_host_uart(peripherals.UART1, peripherals.GPIO17, peripherals.GPIO18).split();

    spawner
        .spawn(serial_reader(debug_rx, RxSource::Debug))
        .expect("Failed to spawn debug link reader");
    spawner
        .spawn(serial_reader(host_rx, RxSource::Host))
        .expect("Failed to spawn host link reader");

    let app_config = firmware_config();
    let mut state = AppState::new(i2c, TwaiMotorBus::new(twai), &app_config);
    if let Err(e) = state.init().await {
        warn!("Starting shell in degraded mode: {}", e);
    }

    let mut links = SerialLinks {
        debug: debug_tx,
        host: host_tx,
    };
    let mut shell = Shell::new(&app_config.shell);
    links.broadcast(shell.banner().as_bytes()).await;

    loop {
        let rx = RX_MAILBOX.receive().await;
        let transcript = shell.process(rx.byte, &mut state).await;
        if !transcript.is_empty() {
            links.broadcast(transcript.as_bytes()).await;
        }
    }
}
