//! Dishwasher controller firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  main (telemetry loop)                       │
//! │                                              │
//! │  ActuatorController ◄── RecoveryPoint        │
//! │  SensorInterface                             │
//! │  ─────────────── Hal trait ───────────────   │
//! │  EspHal (GPIO · ADC1 · flow ISR · esp_timer) │
//! └──────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use dishwasher::hal::esp::EspHal;
use dishwasher::{ActuatorController, Calibration, ReasonCode, RecoveryPoint, SensorInterface};

const TELEMETRY_PERIOD_MS: u32 = 5_000;

/// Drop every load and wait for the cycle program to restart the phase.
fn safe_stop(ctl: &mut ActuatorController<EspHal>, reason: ReasonCode) {
    error!("recovery: {} (code {}), all loads off", reason, reason.code());
    ctl.all_off();
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Dishwasher v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    let hal = EspHal::init().map_err(|e| anyhow::anyhow!("HAL init failed: {e}"))?;

    let calibration = Calibration::default();
    if let Err(e) = calibration.validate() {
        anyhow::bail!("calibration rejected: {e}");
    }

    // ── 3. Core ───────────────────────────────────────────────
    let mut actuators = ActuatorController::new(hal);
    let mut sensors = SensorInterface::new(hal, calibration);

    actuators.register_recovery(RecoveryPoint::new("safe-stop", safe_stop));
    actuators.init_state();

    // ── 4. Telemetry loop ─────────────────────────────────────
    let mut delay = hal;
    loop {
        let snap = sensors.read_all();
        info!(
            "telemetry: {:.1}°C, {:.0} NTU ({}), salt={}, rinse-aid={}",
            snap.temperature_c, snap.turbidity_ntu, snap.turbidity, snap.salt_present, snap.rinse_aid_present
        );
        if !snap.salt_present {
            warn!("telemetry: salt reservoir empty");
        }
        if !snap.rinse_aid_present {
            warn!("telemetry: rinse-aid reservoir empty");
        }

        let violations = actuators.state().violations();
        if !violations.is_empty() {
            warn!("telemetry: interlock violations {:?}", violations.as_slice());
        }

        delay.delay_ms(TELEMETRY_PERIOD_MS);
    }
}
