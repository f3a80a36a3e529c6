//! Live testbench session driven by engine callbacks.
//!
//! A [`Session`] owns the engine handle, the [`NetRegistry`] and the report
//! sink. The embedding code forwards the engine's run-initialization callback
//! to [`Session::on_init`], every sample batch to [`Session::on_sample`], and
//! every external source value request to [`Session::source_value`].

use spicetb_config::BenchConfig;
use tracing::{debug, trace};

use crate::engine::Engine;
use crate::error::BenchError;
use crate::levels::LogicLevels;
use crate::registry::{NetRegistry, VectorInfo};
use crate::report::ReportSink;

/// Reacts to sample batches, e.g. to sequence resets or clocks by time.
///
/// Called for every batch, changed or not, so time-based stimulus can be
/// applied. Returning `true` makes the session emit an extra snapshot.
pub trait EventHandler {
    /// Handles one evaluated sample batch.
    fn handle_event(&mut self, nets: &mut NetRegistry, changed: bool) -> Result<bool, BenchError>;
}

impl<F> EventHandler for F
where
    F: FnMut(&mut NetRegistry, bool) -> Result<bool, BenchError>,
{
    fn handle_event(&mut self, nets: &mut NetRegistry, changed: bool) -> Result<bool, BenchError> {
        self(nets, changed)
    }
}

/// A testbench attached to a running simulation engine.
pub struct Session<E: Engine, R: ReportSink> {
    engine: E,
    registry: NetRegistry,
    sink: R,
    handler: Option<Box<dyn EventHandler>>,
    config: BenchConfig,
    batches: u64,
}

impl<E: Engine, R: ReportSink> Session<E, R> {
    /// Creates a session with an empty registry.
    pub fn new(engine: E, sink: R, config: BenchConfig) -> Self {
        let levels = LogicLevels::from_supply(&config.supply);
        Self {
            engine,
            registry: NetRegistry::new(levels),
            sink,
            handler: None,
            config,
            batches: 0,
        }
    }

    /// Returns the net registry.
    pub fn registry(&self) -> &NetRegistry {
        &self.registry
    }

    /// Returns the net registry for creating and driving nets.
    pub fn registry_mut(&mut self) -> &mut NetRegistry {
        &mut self.registry
    }

    /// Returns the engine handle.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the report sink.
    pub fn sink(&self) -> &R {
        &self.sink
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Returns the number of sample batches evaluated so far.
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Installs the handler called after every sample batch.
    pub fn set_event_handler(&mut self, handler: impl EventHandler + 'static) {
        self.handler = Some(Box::new(handler));
    }

    /// Returns the time of the last evaluated sample.
    pub fn sim_time(&self) -> f64 {
        self.registry.sim_time()
    }

    /// Submits a raw engine command.
    pub fn send_command(&mut self, command: &str) -> Result<(), BenchError> {
        debug!(command, "engine command");
        self.engine.send_command(command)
    }

    /// Appends one line to the circuit being built in the engine.
    pub fn send_circuit_line(&mut self, line: &str) -> Result<(), BenchError> {
        self.send_command(&format!("circbyline {line}"))
    }

    /// Declares the supply rail at the configured voltage.
    pub fn declare_supply(&mut self) -> Result<(), BenchError> {
        let vdd = self.config.supply.vdd;
        self.send_circuit_line(&format!("Vdd vdd gnd DC {vdd:.6}"))
    }

    /// Requests a transient analysis.
    pub fn tran(&mut self, step: &str, stop: &str) -> Result<(), BenchError> {
        self.send_circuit_line(&format!(".tran {step} {stop}"))
    }

    /// Instantiates subcircuit `top` with the given nets as ports.
    ///
    /// Ground and supply are bound first. Bus subnets are emitted in port
    /// order. External sources are declared afterwards, only for input ports.
    pub fn instantiate(&mut self, top: &str, ports: &[&str]) -> Result<(), BenchError> {
        let mut port_lines = Vec::new();
        let mut source_lines = Vec::new();
        for &port in ports {
            let net = self
                .registry
                .get(port)
                .ok_or_else(|| BenchError::UnknownNet(port.to_string()))?;
            port_lines.extend(net.port_lines());
            source_lines.extend(net.drive_source_lines());
        }
        self.send_circuit_line(&format!("X{top} 0 Vdd"))?;
        for line in &port_lines {
            self.send_circuit_line(line)?;
        }
        self.send_circuit_line(&format!("+{top}"))?;
        for line in &source_lines {
            self.send_circuit_line(line)?;
        }
        Ok(())
    }

    /// Drives `net` with a single pulse source per bit instead of an
    /// external source, high for `duration` after a `duration` delay.
    pub fn pulse(&mut self, net: &str, duration: &str) -> Result<(), BenchError> {
        let lines = self
            .registry
            .get(net)
            .ok_or_else(|| BenchError::UnknownNet(net.to_string()))?
            .pulse_lines(duration);
        for line in &lines {
            self.send_circuit_line(line)?;
        }
        Ok(())
    }

    /// Closes the circuit and starts the simulation.
    pub fn run(&mut self) -> Result<(), BenchError> {
        self.send_circuit_line(".end")?;
        self.send_command("run")
    }

    /// Run-initialization callback: re-resolves every net for the new run.
    pub fn on_init<I: IntoIterator<Item = VectorInfo>>(&mut self, infos: I) {
        self.registry.resolve(infos);
    }

    /// Sample-batch callback.
    ///
    /// Evaluates every net, emits a snapshot if anything changed (or on every
    /// batch when `report.every_sample` is set), then gives the event handler
    /// its turn. Returns whether any net changed.
    pub fn on_sample(&mut self, samples: &[f64]) -> Result<bool, BenchError> {
        let changed = self.registry.evaluate(samples)?;
        self.batches += 1;
        trace!(batch = self.batches, changed, "sample batch");
        if changed || self.config.report.every_sample {
            self.sink.snapshot(&self.registry.snapshot())?;
        }
        if let Some(handler) = self.handler.as_mut() {
            if handler.handle_event(&mut self.registry, changed)? {
                self.sink.snapshot(&self.registry.snapshot())?;
            }
        }
        Ok(changed)
    }

    /// External source value request for the source named `source`.
    ///
    /// Sources are named `V<net>`; the leading `V` is dropped before the
    /// input scalar or input subnet is looked up.
    pub fn source_value(&self, source: &str) -> Result<f64, BenchError> {
        let net = source.strip_prefix(['V', 'v']).unwrap_or(source);
        self.registry
            .drive_value(net)
            .ok_or_else(|| BenchError::UnknownSource(source.to_string()))
    }

    /// Flushes the report sink.
    pub fn flush(&mut self) -> Result<(), BenchError> {
        self.sink.flush()
    }

    /// Consumes the session, returning the engine and report sink.
    pub fn into_parts(self) -> (E, R) {
        (self.engine, self.sink)
    }
}
