use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::usart::{BufferedUart, Config as UartConfig};
use static_cell::StaticCell;

use crate::calibration::HOST_UART_BAUD;
use crate::hw::{AdcSensor, ReadyLed};

mod trial_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

const UART_BUFFER_SIZE: usize = 512;

static UART_TX_BUFFER: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();
static UART_RX_BUFFER: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();

embassy_stm32::bind_interrupts!(struct UartIrqs {
    USART2_LPUART2 => embassy_stm32::usart::BufferedInterruptHandler<hal::peripherals::USART2>;
});

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA5,
        PA6,
        PA7,
        PA2,
        PA3,
        ADC1,
        USART2,
        ..
    } = hal::init(config);

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = HOST_UART_BAUD;

    let uart = BufferedUart::new(
        USART2,
        PA3,
        PA2,
        UART_TX_BUFFER.init([0; UART_BUFFER_SIZE]),
        UART_RX_BUFFER.init([0; UART_BUFFER_SIZE]),
        UartIrqs,
        uart_config,
    )
    .expect("failed to initialize host UART");

    let sensor = AdcSensor::new(
        Adc::new(ADC1),
        PA0,
        [
            Input::new(PA6, Pull::Down),
            Input::new(PA7, Pull::Down),
        ],
    );

    let indicator = ReadyLed::new(Output::new(PA5, Level::Low, Speed::Low));

    spawner
        .spawn(trial_task::run(uart, sensor, indicator))
        .expect("failed to spawn trial task");

    core::future::pending::<()>().await;
}
