//! Calibration constants for the R_S/R_0 sensing method.
//!
//! The rig feeds each MQ sensor's analog output through a 470 Ohm / 1 kOhm
//! voltage divider into the MCP3008, whose reference is 3.3 V while the
//! sensors run from the 5 V rail. These constants describe that wiring.
//!
//! The acquisition path logs raw 10-bit codes only; converting a logged code
//! back to a sensor resistance is a post-processing step for the calibration
//! analysis, not part of the sampling cycle.

/// Load resistance on each sensor output, in kOhm.
pub const LOAD_RESISTANCE_KOHM: f64 = 1.0;

/// Voltage divider ratio between the sensor output and the ADC input
/// (470 Ohm / 1 kOhm divider).
pub const DIVIDER_RATIO: f64 = 1.47;

/// Full-scale value of the logged 10-bit codes.
pub const ADC_MAX_10BIT: f64 = 1023.0;

/// MCP3008 reference voltage.
pub const ADC_REF_VOLTS: f64 = 3.3;

/// Sensor heater/measurement supply rail.
pub const SUPPLY_VOLTS: f64 = 5.0;

/// Voltage seen at the ADC input for a logged 10-bit code.
pub fn adc_volts(raw_code: u16) -> f64 {
    f64::from(raw_code) / ADC_MAX_10BIT * ADC_REF_VOLTS
}

/// Voltage at the sensor output node, undoing the divider.
pub fn sensor_node_volts(raw_code: u16) -> f64 {
    adc_volts(raw_code) * DIVIDER_RATIO
}

/// Sensor resistance R_S in kOhm for a logged 10-bit code.
///
/// Returns `None` when the code implies a node voltage at or beyond the
/// supply rail (including a zero reading), where the divider law has no
/// solution. The 470/1k divider can place full-scale slightly above the
/// 3.3 V reference, so clipped readings land here rather than producing a
/// negative resistance.
pub fn sensor_resistance_kohm(raw_code: u16) -> Option<f64> {
    let v_node = sensor_node_volts(raw_code);
    if v_node <= 0.0 || v_node >= SUPPLY_VOLTS {
        return None;
    }
    Some(LOAD_RESISTANCE_KOHM * (SUPPLY_VOLTS - v_node) / v_node)
}
