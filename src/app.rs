/// Adaptive refresh loop
///
/// Single-threaded: every device query is a blocking call made in turn, and
/// keyboard input is only looked at while waiting for the next cycle.

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use std::fs::File;
use std::io::{self, BufWriter};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::core::config::{SamplingConfig, SessionConfig};
use crate::core::error::MonitorError;
use crate::core::recorder::{log_columns, SampleRecorder};
use crate::core::sampler::ThroughputSampler;
use crate::core::snapshot::SnapshotSource;
use crate::screens::{DashboardView, MonitorScreen};
use crate::utils::format_clock;

/// Pause between seeding the baselines and the first displayed cycle
const FIRST_SAMPLE_PAUSE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    CollectingFirst,
    Running,
    Terminated,
    Aborted,
}

/// How a session ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// The user pressed the quit key
    Terminated,
    /// Ctrl+C
    Interrupted,
    /// A group could not be resolved or a poll failed
    Aborted(MonitorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Interrupt,
    Redraw,
    Ignore,
}

pub fn key_action(key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Interrupt,
        KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Redraw,
        _ => KeyAction::Ignore,
    }
}

/// Non-blocking keyboard access: wait at most `timeout` for one key press
pub trait KeySource {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>>;
}

/// Key presses from the controlling terminal
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }
}

/// Refresh period that only ever grows.
///
/// A cycle that takes longer than the period bumps it by a fixed increment
/// for the rest of the session.
#[derive(Debug, Clone)]
pub struct AdaptivePeriod {
    interval: Duration,
    increment: Duration,
}

impl AdaptivePeriod {
    pub fn new(interval: Duration, increment: Duration) -> Self {
        Self { interval, increment }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Account for a finished cycle and return how long to wait before the next
    pub fn settle(&mut self, loop_time: Duration) -> Duration {
        if loop_time > self.interval {
            self.interval += self.increment;
        }
        self.interval.saturating_sub(loop_time)
    }
}

pub struct App<B: Backend, K: KeySource> {
    screen: MonitorScreen<B>,
    keys: K,
    source: Box<dyn SnapshotSource>,
    specs: Vec<String>,
    samplers: Vec<ThroughputSampler>,
    session: SessionConfig,
    sampling: SamplingConfig,
    period: AdaptivePeriod,
    recorder: Option<SampleRecorder<BufWriter<File>>>,
    /// Interfaces that have columns in the sample log, fixed at the first cycle
    log_interfaces: Option<Vec<String>>,
    state: LoopState,
}

impl<B: Backend, K: KeySource> App<B, K> {
    pub fn new(
        screen: MonitorScreen<B>,
        keys: K,
        source: Box<dyn SnapshotSource>,
        specs: Vec<String>,
        session: SessionConfig,
        sampling: SamplingConfig,
        recorder: Option<SampleRecorder<BufWriter<File>>>,
    ) -> Self {
        let period = AdaptivePeriod::new(session.interval, sampling.interval_increment);
        Self {
            screen,
            keys,
            source,
            specs,
            samplers: Vec::new(),
            session,
            sampling,
            period,
            recorder,
            log_interfaces: None,
            state: LoopState::CollectingFirst,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Current refresh period, including any growth from slow cycles
    pub fn interval(&self) -> Duration {
        self.period.interval()
    }

    pub fn screen(&self) -> &MonitorScreen<B> {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut MonitorScreen<B> {
        &mut self.screen
    }

    pub fn run(&mut self) -> Result<SessionOutcome> {
        self.state = LoopState::CollectingFirst;
        self.screen.draw_banner(&Local::now())?;

        if let Err(err) = self.collect_first() {
            error!(error = %err, "startup collection failed");
            self.state = LoopState::Aborted;
            return Ok(SessionOutcome::Aborted(err));
        }

        self.state = LoopState::Running;
        info!(
            groups = self.samplers.len(),
            interval_secs = self.period.interval().as_secs_f64(),
            "monitoring started"
        );

        let outcome = match self.wait(FIRST_SAMPLE_PAUSE)? {
            Some(outcome) => outcome,
            None => loop {
                if let Some(outcome) = self.cycle()? {
                    break outcome;
                }
            },
        };

        self.state = match outcome {
            SessionOutcome::Aborted(_) => LoopState::Aborted,
            _ => LoopState::Terminated,
        };
        Ok(outcome)
    }

    /// Show a fatal error and block until any key is pressed
    pub fn acknowledge(&mut self, err: &MonitorError) -> Result<()> {
        let message = match err.failed_spec() {
            Some(spec) => format!("Wrong interface {}", spec),
            None => err.to_string(),
        };
        self.screen.draw_error(&message)?;
        loop {
            if let Some(key) = self.keys.poll_key(self.sampling.wait_slice)? {
                if key.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }

    fn collect_first(&mut self) -> Result<(), MonitorError> {
        for spec in &self.specs {
            let sampler = ThroughputSampler::new(spec, self.source.as_mut(), &self.sampling)?;
            self.samplers.push(sampler);
        }
        for sampler in &mut self.samplers {
            sampler.poll(self.source.as_mut())?;
        }
        Ok(())
    }

    fn cycle(&mut self) -> Result<Option<SessionOutcome>> {
        let loop_start = Instant::now();
        let started_at = Local::now();
        self.screen.draw_busy()?;

        let mut rows = Vec::new();
        let mut exec_time = Duration::ZERO;
        for sampler in &mut self.samplers {
            match sampler.poll(self.source.as_mut()) {
                Ok(result) => {
                    exec_time += result.exec_time;
                    rows.extend(result.metrics);
                }
                Err(err) => {
                    error!(error = %err, "poll failed, ending session");
                    return Ok(Some(SessionOutcome::Aborted(err)));
                }
            }
        }

        let view = DashboardView {
            rows,
            unit_label: self.sampling.unit_label.clone(),
            include_errors: self.session.include_error_columns,
            interval: self.period.interval(),
            last_update: started_at,
            exec_time,
        };

        if !self.screen.draw_dashboard(view.clone())? {
            debug!("terminal too small for interface table");
        }

        if let Some(recorder) = self.recorder.as_mut() {
            let samplers = &self.samplers;
            let columns = self.log_interfaces.get_or_insert_with(|| {
                samplers
                    .iter()
                    .flat_map(|s| s.interfaces().iter().cloned())
                    .collect()
            });
            if let Err(e) = write_sample(recorder, columns, &view) {
                warn!(error = %e, "failed to append to sample log");
            }
        }

        let loop_time = loop_start.elapsed();
        let previous = self.period.interval();
        let wait_time = self.period.settle(loop_time);
        if self.period.interval() > previous {
            warn!(
                loop_secs = loop_time.as_secs_f64(),
                interval_secs = self.period.interval().as_secs_f64(),
                "cycle overran refresh interval, interval increased"
            );
        }
        debug!(
            exec_ms = exec_time.as_millis() as u64,
            wait_ms = wait_time.as_millis() as u64,
            "cycle complete"
        );

        self.wait(wait_time)
    }

    /// Wait out `duration` in slices, reacting to keys between them.
    /// Input is checked at least once even when there is nothing to wait for.
    fn wait(&mut self, duration: Duration) -> Result<Option<SessionOutcome>> {
        let deadline = Instant::now() + duration;
        loop {
            let slice = deadline
                .saturating_duration_since(Instant::now())
                .min(self.sampling.wait_slice);

            if let Some(key) = self.keys.poll_key(slice)? {
                match key_action(&key) {
                    KeyAction::Quit => return Ok(Some(SessionOutcome::Terminated)),
                    KeyAction::Interrupt => return Ok(Some(SessionOutcome::Interrupted)),
                    KeyAction::Redraw => self.screen.repaint()?,
                    KeyAction::Ignore => {}
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }
}

/// Append one log row with a cell group per entry of `interfaces`.
/// Interfaces without metrics yet get empty cells; interfaces outside
/// `interfaces` are left out so every row matches the header.
fn write_sample(
    recorder: &mut SampleRecorder<BufWriter<File>>,
    interfaces: &[String],
    view: &DashboardView,
) -> io::Result<()> {
    if !recorder.header_written() {
        let names = interfaces.iter().map(String::as_str);
        recorder.write_header(&log_columns(names, view.include_errors))?;
    }

    let cells_per_interface = if view.include_errors { 4 } else { 2 };
    let mut row = vec![format_clock(&view.last_update)];
    for name in interfaces {
        match view.rows.iter().find(|m| &m.interface == name) {
            Some(m) => {
                row.push(m.in_tput.to_string());
                row.push(m.out_tput.to_string());
                if view.include_errors {
                    row.push(m.in_errors.to_string());
                    row.push(m.out_errors.to_string());
                }
            }
            None => row.extend(std::iter::repeat(String::new()).take(cells_per_interface)),
        }
    }

    let unlogged = view
        .rows
        .iter()
        .filter(|m| !interfaces.contains(&m.interface))
        .count();
    if unlogged > 0 {
        debug!(unlogged, "interfaces first seen after the log header are not logged");
    }

    recorder.write_row(&row)
}
