//! labstation: headless host for the PSoC bench instrument.
//!
//! Opens the serial link, optionally sends one generator or measurement
//! command, then polls the port on a fixed cadence, printing telemetry
//! lines and per-frame frequency/amplitude estimates. With `--capture N`
//! the tool exits after N frames and can export the last one as CSV.

use analysis::WaveformAnalyzer;
use clap::{Parser, ValueEnum};
use core_types::{ByteSource, LinkConfig, LinkEvent, TransportError};
use link_session::export::write_csv;
use link_session::LinkSession;
use log::{debug, error, warn};
use protocol::{parse_line, Command, Telemetry, WaveShape};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Matches the original host's 5 ms serial poll timer.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(name = "labstation", about = "Host-side readout for the PSoC lab station")]
struct Args {
    /// Serial port path, e.g. /dev/ttyACM0 or COM7.
    #[arg(short, long)]
    port: String,

    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Samples per binary frame; must match the firmware.
    #[arg(long, default_value_t = 252)]
    frame_samples: usize,

    /// Effective sample rate in Hz after device-side decimation.
    #[arg(long, default_value_t = 30_000.0)]
    sample_rate: f32,

    /// ADC full-scale voltage.
    #[arg(long, default_value_t = 5.0)]
    full_scale: f32,

    /// Calibration gain applied after full-scale conversion.
    #[arg(long, default_value_t = 1.0)]
    cal_gain: f32,

    /// Samples per triggered display trace.
    #[arg(long, default_value_t = 150)]
    n_out: usize,

    /// Enable the generator at this frequency before streaming.
    #[arg(long)]
    freq: Option<u32>,

    /// Generator amplitude in percent (used with --freq).
    #[arg(long, default_value_t = 100)]
    amp: u8,

    /// Generator wave shape (used with --freq).
    #[arg(long, value_enum, default_value = "sine")]
    shape: ShapeArg,

    /// Request a one-shot measurement before streaming.
    #[arg(long, value_enum)]
    measure: Option<MeasureArg>,

    /// Stop after this many frames.
    #[arg(long)]
    capture: Option<usize>,

    /// Write the last captured frame to this CSV path on exit.
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ShapeArg {
    Sine,
    Tri,
    Sqr,
}

impl From<ShapeArg> for WaveShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Sine => WaveShape::Sine,
            ShapeArg::Tri => WaveShape::Triangle,
            ShapeArg::Sqr => WaveShape::Square,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MeasureArg {
    R,
    C,
}

/// `ByteSource` over a native serial port.
struct SerialSource {
    port: Box<dyn serialport::SerialPort>,
}

impl ByteSource for SerialSource {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        let n = self
            .port
            .bytes_to_read()
            .map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(n as usize)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, TransportError> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(data)?;
        Ok(())
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = LinkConfig {
        frame_samples: args.frame_samples,
        sample_rate_hz: args.sample_rate,
        full_scale_v: args.full_scale,
        calibration_gain: args.cal_gain,
        n_out: args.n_out,
    };
    let analyzer = WaveformAnalyzer::from_config(&config)?;

    let port = serialport::new(&args.port, args.baud)
        .timeout(Duration::from_millis(10))
        .open()?;
    println!("Opened {} at {} baud", args.port, args.baud);

    let (mut session, events) = LinkSession::open(SerialSource { port }, &config)?;

    if let Some(freq_hz) = args.freq {
        session.send(&Command::Generator {
            freq_hz,
            amplitude_pct: args.amp.min(100),
            shape: args.shape.into(),
            enable: true,
        })?;
    }
    match args.measure {
        Some(MeasureArg::R) => session.send(&Command::MeasureResistance)?,
        Some(MeasureArg::C) => session.send(&Command::MeasureCapacitance)?,
        None => {}
    }

    let mut frames_seen = 0usize;
    'poll: loop {
        session.poll()?;

        for event in events.try_iter() {
            match event {
                LinkEvent::Line(line) => print_telemetry(&line),
                LinkEvent::Frame(frame) => {
                    let metrics = analyzer.estimate(&frame);
                    println!(
                        "Freq: {:7.1} Hz    Amp: {:5.3} Vpp",
                        metrics.frequency_hz, metrics.amplitude_vpp
                    );
                    if log::log_enabled!(log::Level::Debug) {
                        // No plot in a headless host; report the aligned
                        // trace to the debug log instead.
                        let trace = analyzer.trigger_align(&frame);
                        let peak = trace.volts.iter().cloned().fold(0.0f32, f32::max);
                        debug!("trace: {} samples, peak {:.3} V", trace.len(), peak);
                    }
                    frames_seen += 1;
                }
            }
        }

        if let Some(limit) = args.capture {
            if frames_seen >= limit {
                break 'poll;
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    if let Some(path) = &args.export {
        match session.last_frame() {
            Some(frame) => {
                let mut out = BufWriter::new(File::create(path)?);
                write_csv(&mut out, frame, analyzer.calibration(), config.sample_rate_hz)?;
                out.flush()?;
                println!("Saved waveform to {}", path.display());
            }
            None => warn!("no waveform captured, nothing to export"),
        }
    }

    Ok(())
}

fn print_telemetry(line: &str) {
    match parse_line(line) {
        Some(Telemetry::GroundResistance { ohms }) => println!("R (ohm): {}", ohms),
        Some(Telemetry::Capacitance { microfarads }) => println!("C (uF): {:.3}", microfarads),
        Some(Telemetry::Ready) => println!("Status: READY"),
        Some(Telemetry::Debug(text)) => debug!("{}", text),
        Some(Telemetry::Status(text)) => println!("Status: {}", text),
        None => warn!("ignoring malformed telemetry line: {}", line),
    }
}
