use serde::{Deserialize, Serialize};

/// Typed interpretation of one telemetry/status line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Telemetry {
    /// `R_GND:<integer>`: measured ground resistance in ohms.
    GroundResistance { ohms: i64 },
    /// `C_uF:<float>`: measured capacitance in microfarads.
    Capacitance { microfarads: f64 },
    /// `READY`: link-ready notice after device boot.
    Ready,
    /// `DBG_*`: diagnostic line, logged verbatim, not parsed further.
    Debug(String),
    /// Anything else: shown as free-form status text.
    Status(String),
}

/// Interpret a completed line.
///
/// Returns `None` when a recognized prefix carries a value that fails to
/// parse as its expected numeric type; such lines are ignored by consumers
/// rather than surfaced as errors.
pub fn parse_line(line: &str) -> Option<Telemetry> {
    if let Some(value) = line.strip_prefix("R_GND:") {
        let ohms = value.trim().parse().ok()?;
        return Some(Telemetry::GroundResistance { ohms });
    }
    if let Some(value) = line.strip_prefix("C_uF:") {
        let microfarads = value.trim().parse().ok()?;
        return Some(Telemetry::Capacitance { microfarads });
    }
    if line.starts_with("READY") {
        return Some(Telemetry::Ready);
    }
    if line.starts_with("DBG_") {
        return Some(Telemetry::Debug(line.to_string()));
    }
    Some(Telemetry::Status(line.to_string()))
}
