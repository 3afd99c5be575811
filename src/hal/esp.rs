//! ESP32-S3 implementation of [`Hal`] using raw ESP-IDF sys calls.
//!
//! * Header pins are routed to S3 GPIOs by the carrier board; see
//!   [`gpio_for`].
//! * ADC1 oneshot, 12-bit, scaled down to the 10-bit contract.
//! * Flow pulses: rising-edge GPIO ISR incrementing an atomic.  Masking
//!   "global" interrupts masks this source, the only one that touches
//!   foreground-visible state.
//! * Reversal overflow: periodic `esp_timer`, started and stopped by
//!   `set_overflow_interrupt`.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_svc::sys::*;
use log::{info, warn};

use super::{DirectionOutputs, Hal, PinMode};
use crate::actuators::reversal;
use crate::error::HwInitError;
use crate::pins::{self, AnalogChannel, Pin, TimerChannel};

// ── Board routing ─────────────────────────────────────────────

/// Header pin → ESP32-S3 GPIO.
pub const fn gpio_for(pin: Pin) -> Option<i32> {
    match pin {
        pins::MAIN_RELAY_PIN => Some(4),
        pins::WASH_PUMP_PIN => Some(5),
        pins::HEATER_PIN => Some(6),
        pins::FILL_VALVE_PIN => Some(7),
        pins::REGEN_VALVE_PIN => Some(15),
        pins::DIVERTER_PIN => Some(16),
        pins::DRAIN_PUMP_PIN => Some(17),
        pins::DRYER_FAN_PIN => Some(18),
        pins::DISPENSER_PIN => Some(8),
        pins::PUMP_PHASE_A_PIN => Some(9),
        pins::PUMP_PHASE_B_PIN => Some(10),
        pins::DIVERTER_DIR_1_PIN => Some(11),
        pins::DIVERTER_DIR_2_PIN => Some(12),
        pins::SALT_LEVEL_PIN => Some(13),
        pins::RINSE_AID_LEVEL_PIN => Some(14),
        pins::FLOW_PULSE_PIN => Some(47),
        _ => None,
    }
}

/// A0/A1 sit on ADC1 channels 0/1 (GPIO 1/2).
const fn adc_channel_for(channel: AnalogChannel) -> u32 {
    adc_channel_t_ADC_CHANNEL_0 + channel as u32
}

const FLOW_GPIO: i32 = 47;

// ── Shared ISR / driver state ─────────────────────────────────

static FLOW_PULSES: AtomicU32 = AtomicU32::new(0);
static COUNTER_ARMED: AtomicBool = AtomicBool::new(false);

static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();
static mut REVERSAL_TIMER_HANDLE: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: ADC1_HANDLE is written once in `EspHal::init()` before any read.
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

/// SAFETY: Same invariants as `adc1_handle()`.
unsafe fn reversal_timer() -> esp_timer_handle_t {
    unsafe { REVERSAL_TIMER_HANDLE }
}

unsafe extern "C" fn flow_gpio_isr(_arg: *mut core::ffi::c_void) {
    FLOW_PULSES.fetch_add(1, Ordering::Relaxed);
}

/// Direction pins as seen from the reversal timer callback.
struct DirectionPins;

impl DirectionOutputs for DirectionPins {
    fn write_direction(&mut self, pin: Pin, high: bool) {
        if let Some(gpio) = gpio_for(pin) {
            // SAFETY: register write on a pin configured as output at boot.
            unsafe { gpio_set_level(gpio, u32::from(high)) };
        }
    }
}

unsafe extern "C" fn reversal_tick_cb(_arg: *mut core::ffi::c_void) {
    reversal::on_overflow(&mut DirectionPins);
}

// ── EspHal ────────────────────────────────────────────────────

/// Zero-sized handle; every copy drives the same peripherals.
#[derive(Debug, Clone, Copy)]
pub struct EspHal {
    _private: (),
}

impl EspHal {
    /// One-shot peripheral bring-up.  Call once from `main()`.
    pub fn init() -> Result<Self, HwInitError> {
        // SAFETY: called once from main() before any other HAL use;
        // single-threaded.
        unsafe {
            init_adc()?;
            init_flow_isr()?;
            init_reversal_timer()?;
        }
        info!("hal: ADC1, flow ISR and reversal timer ready");
        Ok(Self { _private: () })
    }
}

unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    for channel in [pins::THERMISTOR_ADC, pins::TURBIDITY_ADC] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), adc_channel_for(channel), &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }
    Ok(())
}

unsafe fn init_flow_isr() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service is already installed.
    let ret = unsafe { gpio_install_isr_service(0) };
    if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
        return Err(HwInitError::IsrInstallFailed(ret));
    }
    let ret = unsafe { gpio_isr_handler_add(FLOW_GPIO, Some(flow_gpio_isr), core::ptr::null_mut()) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::IsrInstallFailed(ret));
    }
    // Stays masked until the sensor interface arms the counter.
    unsafe { gpio_intr_disable(FLOW_GPIO) };
    Ok(())
}

unsafe fn init_reversal_timer() -> Result<(), HwInitError> {
    let args = esp_timer_create_args_t {
        callback: Some(reversal_tick_cb),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: c"reversal".as_ptr(),
        skip_unhandled_events: true,
    };
    // SAFETY: REVERSAL_TIMER_HANDLE is written here once at boot.
    let ret = unsafe { esp_timer_create(&args, &raw mut REVERSAL_TIMER_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::TimerCreateFailed(ret));
    }
    Ok(())
}

impl DelayNs for EspHal {
    fn delay_ns(&mut self, ns: u32) {
        let ms = ns / 1_000_000;
        if ms > 0 {
            FreeRtos::delay_ms(ms);
        }
        let us = (ns % 1_000_000).div_ceil(1_000);
        if us > 0 {
            Ets::delay_us(us);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}

impl Hal for EspHal {
    fn pin_mode(&mut self, pin: Pin, mode: PinMode) {
        let Some(gpio) = gpio_for(pin) else {
            warn!("hal: header pin {} not routed", pin);
            return;
        };
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << gpio,
            mode: match mode {
                PinMode::Input => gpio_mode_t_GPIO_MODE_INPUT,
                PinMode::Output => gpio_mode_t_GPIO_MODE_OUTPUT,
            },
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: plain register configuration of a routed pad.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            warn!("hal: {}", HwInitError::GpioConfigFailed(ret));
        }
    }

    fn digital_write(&mut self, pin: Pin, high: bool) {
        if let Some(gpio) = gpio_for(pin) {
            // SAFETY: register write on a configured output.
            unsafe { gpio_set_level(gpio, u32::from(high)) };
        }
    }

    fn digital_read(&mut self, pin: Pin) -> bool {
        match gpio_for(pin) {
            // SAFETY: read-only register access.
            Some(gpio) => (unsafe { gpio_get_level(gpio) }) != 0,
            None => false,
        }
    }

    fn analog_read(&mut self, channel: AnalogChannel) -> u16 {
        let mut raw: i32 = 0;
        // SAFETY: handle initialised in EspHal::init().
        let ret = unsafe { adc_oneshot_read(adc1_handle(), adc_channel_for(channel), &mut raw) };
        if ret != ESP_OK as i32 {
            return 0;
        }
        (raw.max(0) as u16) >> 2
    }

    fn set_overflow_interrupt(&mut self, timer: TimerChannel, enabled: bool) {
        if timer != pins::REVERSAL_TIMER {
            warn!("hal: timer {} has no overflow source", timer);
            return;
        }
        // SAFETY: handle created in EspHal::init(); start on a running timer
        // and stop on a stopped one return INVALID_STATE, which is harmless.
        unsafe {
            let t = reversal_timer();
            if enabled {
                esp_timer_start_periodic(t, u64::from(pins::REVERSAL_PERIOD_MS) * 1_000);
            } else {
                esp_timer_stop(t);
            }
        }
    }

    fn configure_pulse_counter(&mut self, timer: TimerChannel) {
        if timer != pins::FLOW_COUNTER_TIMER {
            warn!("hal: timer {} has no external clock input", timer);
            return;
        }
        // SAFETY: edge-type change on the flow pad; handler already attached.
        unsafe { gpio_set_intr_type(FLOW_GPIO, gpio_int_type_t_GPIO_INTR_POSEDGE) };
        COUNTER_ARMED.store(true, Ordering::Release);
    }

    fn clear_pulse_count(&mut self, _timer: TimerChannel) {
        FLOW_PULSES.store(0, Ordering::Relaxed);
    }

    fn pulse_count(&mut self, _timer: TimerChannel) -> u16 {
        FLOW_PULSES.load(Ordering::Relaxed).min(u32::from(u16::MAX)) as u16
    }

    fn disable_interrupts(&mut self) {
        // SAFETY: masking an installed GPIO interrupt source.
        unsafe { gpio_intr_disable(FLOW_GPIO) };
    }

    fn enable_interrupts(&mut self) {
        if COUNTER_ARMED.load(Ordering::Acquire) {
            // SAFETY: unmasking the flow source armed by configure_pulse_counter.
            unsafe { gpio_intr_enable(FLOW_GPIO) };
        }
    }
}
