//! `sm-output` — output transports for the motion engine.
//!
//! | Transport              | Destination                                            |
//! |------------------------|--------------------------------------------------------|
//! | [`UdpOscTransport`]    | renderer, one OSC 1.0 message per UDP datagram         |
//! | [`CsvTransport`]       | `positions.csv`, `params.csv`, `groups.csv`            |
//! | [`RecordingTransport`] | memory, for tests and inspection                       |
//! | [`Tee`]                | two of the above at once                               |
//!
//! All implement `sm_engine::OutputTransport`.  Construction can fail with
//! [`OutputError`]; once running, a failed message only increments the
//! transport's `failed` counter.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sm_output::{CsvTransport, OscConfig, Tee, UdpOscTransport};
//!
//! let udp = UdpOscTransport::connect(OscConfig::default())?;
//! let csv = CsvTransport::new(Path::new("./output"))?;
//! let mut engine = EngineBuilder::new(config).transport(Tee(udp, csv)).build()?;
//! ```

pub mod csv;
pub mod error;
pub mod osc;
pub mod recorder;
pub mod udp;


pub use crate::csv::CsvTransport;
pub use error::{OutputError, OutputResult};
pub use osc::{OscArg, OscMessage};
pub use recorder::{RecordedFrame, RecordingTransport, Tee};
pub use udp::{OscConfig, UdpOscTransport};
