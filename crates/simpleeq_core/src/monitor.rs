//! Response Curve Monitor
//!
//! Editor-side companion to the audio path. A background thread polls the
//! parameter store's revision counter at a low fixed rate and, whenever it
//! moved, designs its own coefficients and publishes a fresh magnitude curve.
//!
//! ```text
//! ParameterStore ──revision──▶ monitor thread ──ResponseCurve──▶ Event::ResponseUpdated ──▶ UI
//! ```
//!
//! The monitor only reads the store. It never touches the processor's chains.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use simpleeq_dsp::{ResponseCurve, SettingsSource};
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::{EngineError, EngineResult};
use crate::message::{Command, Event};
use crate::params::ParameterStore;

/// Handle to the running monitor thread
pub struct ResponseMonitor {
    /// Channel for sending commands to the monitor thread
    command_sender: Sender<Command>,

    /// Channel for receiving events from the monitor thread
    event_receiver: Receiver<Event>,

    /// Handle to the monitor thread
    thread: Option<JoinHandle<()>>,

    /// Flag to signal shutdown
    shutdown_flag: Arc<AtomicBool>,

    config: MonitorConfig,
}

impl ResponseMonitor {
    /// Start polling `store` with the given configuration
    pub fn spawn(store: Arc<ParameterStore>, config: MonitorConfig) -> EngineResult<Self> {
        config.validate()?;

        let (command_sender, command_receiver) = bounded::<Command>(8);
        let (event_sender, event_receiver) = unbounded::<Event>();
        let shutdown_flag = Arc::new(AtomicBool::new(false));

        let shutdown_clone = Arc::clone(&shutdown_flag);
        let config_clone = config.clone();

        let thread = thread::Builder::new()
            .name("simpleeq-response".into())
            .spawn(move || {
                Self::monitor_thread_main(
                    store,
                    command_receiver,
                    event_sender,
                    shutdown_clone,
                    config_clone,
                );
            })
            .map_err(|e| EngineError::ThreadSpawn(e.to_string()))?;

        Ok(Self {
            command_sender,
            event_receiver,
            thread: Some(thread),
            shutdown_flag,
            config,
        })
    }

    /// Ask for a curve on the next tick regardless of the revision
    pub fn request_refresh(&self) {
        // Full queue means a refresh is already pending
        let _ = self.command_sender.try_send(Command::Refresh);
    }

    /// Get next event (non-blocking)
    pub fn poll_event(&self) -> Option<Event> {
        self.event_receiver.try_recv().ok()
    }

    /// Get next event, waiting at most `timeout`
    pub fn wait_event_timeout(&self, timeout: Duration) -> EngineResult<Event> {
        self.event_receiver
            .recv_timeout(timeout)
            .map_err(|_| EngineError::ChannelRecvError)
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some() && !self.shutdown_flag.load(Ordering::SeqCst)
    }

    /// Stop the thread and wait for it to exit
    pub fn shutdown(&mut self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        let _ = self.command_sender.try_send(Command::Shutdown);

        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Monitor thread main loop
    fn monitor_thread_main(
        store: Arc<ParameterStore>,
        command_receiver: Receiver<Command>,
        event_sender: Sender<Event>,
        shutdown_flag: Arc<AtomicBool>,
        config: MonitorConfig,
    ) {
        info!(
            "Response monitor started ({}Hz refresh, {} points)",
            config.refresh_hz, config.points
        );
        let _ = event_sender.send(Event::Started);

        let tick = config.tick_interval();
        let mut last_revision: Option<u64> = None;

        while !shutdown_flag.load(Ordering::SeqCst) {
            let force = match command_receiver.recv_timeout(tick) {
                Ok(Command::Refresh) => true,
                Ok(Command::Shutdown) => break,
                Err(RecvTimeoutError::Timeout) => false,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let revision = store.revision();
            if !force && last_revision == Some(revision) {
                continue;
            }
            last_revision = Some(revision);

            let event = match Self::render(&store, &config) {
                Ok(magnitudes_db) => {
                    debug!("Response curve refreshed at revision {}", revision);
                    Event::ResponseUpdated {
                        revision,
                        magnitudes_db,
                    }
                }
                Err(e) => {
                    warn!("Could not compute response curve: {}", e);
                    Event::error(e)
                }
            };

            if event_sender.send(event).is_err() {
                // UI side is gone
                break;
            }
        }

        let _ = event_sender.send(Event::Stopped);
        info!("Response monitor stopped");
    }

    fn render(store: &ParameterStore, config: &MonitorConfig) -> EngineResult<Vec<f32>> {
        let curve = ResponseCurve::new(store.chain_settings(), config.sample_rate as f32)?;
        let mut magnitudes_db = vec![0.0_f32; config.points];
        curve.render_db(&mut magnitudes_db, config.min_hz, config.max_hz);
        Ok(magnitudes_db)
    }
}

impl Drop for ResponseMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
