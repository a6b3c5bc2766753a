use analysis::Calibration;
use core_types::SampleFrame;
use std::io::{self, Write};

pub const CSV_HEADER: &str = "t_ms,voltage_V,adc_8bit";

/// Write one retained frame as the three derived columns: elapsed time in
/// milliseconds, calibrated voltage, raw sample code.
pub fn write_csv<W: Write>(
    out: &mut W,
    frame: &SampleFrame,
    calibration: &Calibration,
    sample_rate_hz: f32,
) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for (i, &code) in frame.codes.iter().enumerate() {
        let t_ms = i as f32 / sample_rate_hz * 1000.0;
        writeln!(out, "{},{},{}", t_ms, calibration.volts(code), code)?;
    }
    Ok(())
}
