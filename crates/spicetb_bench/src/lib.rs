//! Digital testbench layer over an analog circuit simulator.
//!
//! This crate lets a digital design running inside an analog simulation
//! engine be driven and observed as logic. Nets digitize sampled voltages
//! against a threshold, inject driven logic values through external sources,
//! and report a snapshot line whenever any observed bit changes.
//!
//! # Architecture
//!
//! Two modes share the same digitizing and reporting machinery:
//!
//! - **Live**: a [`Session`] is attached to an [`Engine`]. The embedding code
//!   forwards the engine's run-initialization, sample-batch and source-value
//!   callbacks to the session, which evaluates every net in its
//!   [`NetRegistry`] and writes snapshots to a [`ReportSink`].
//! - **Playback**: a [`Playback`] walks the [`ResultVectors`] of a completed
//!   run by sample index, evaluating [`VectorWatch`]es and
//!   [`DebounceWatch`]es.
//!
//! # Usage
//!
//! ```ignore
//! use spicetb_bench::{Direction, Session, TextReporter};
//!
//! let mut session = Session::new(engine, TextReporter::new(std::io::stdout()), config);
//! session.registry_mut().scalar("clk", Direction::Input)?;
//! session.registry_mut().vector("q", 8, Direction::Output)?;
//! session.declare_supply()?;
//! session.instantiate("counter", &["clk", "q"])?;
//! session.tran("10p", "100n")?;
//! session.run()?;
//! ```
//!
//! # Modules
//!
//! - `error`: Testbench error types
//! - `levels`: Supply levels and change detection
//! - `port_order`: Subcircuit port ordering
//! - `net`: Scalar, time and aggregate nets
//! - `vector`: Multi-bit nets with text codecs
//! - `registry`: Net lookup and run binding
//! - `engine`: Simulation engine command seam
//! - `session`: Live engine callback handling
//! - `report`: Snapshot lines and report sinks
//! - `results`: Result vectors of a completed run
//! - `watch`: Playback observers
//! - `debounce`: Band-residency detection
//! - `playback`: Sample-indexed replay loop

#![warn(missing_docs)]

pub mod debounce;
pub mod engine;
pub mod error;
pub mod levels;
pub mod net;
pub mod playback;
pub mod port_order;
pub mod registry;
pub mod report;
pub mod results;
pub mod session;
pub mod vector;
pub mod watch;

pub use debounce::{DebounceEvent, DebounceWatch};
pub use engine::{CommandLog, Engine};
pub use error::BenchError;
pub use levels::{ChangeDetector, LogicLevels};
pub use net::{Direction, Net, NetShape, ScalarNet, TimeNet, TIME_VECTOR};
pub use playback::{Playback, PlaybackState, PlaybackSummary};
pub use port_order::{port_order, sort_ports};
pub use registry::{NetRegistry, VectorInfo, VectorTable};
pub use report::{format_raw, ReportSink, Snapshot, TextReporter};
pub use results::{ResultVector, ResultVectors};
pub use session::{EventHandler, Session};
pub use vector::VectorNet;
pub use watch::{TimeWatch, VectorWatch};
