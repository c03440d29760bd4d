use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
};

use rand::{RngCore, rngs::OsRng};

use crate::{
    capture::{AudioFrame, CaptureError, CaptureEvent, CaptureSource},
    channel::{ChannelConnector, ChannelError, ChannelEvent, SessionChannel},
    codec,
    config::Config,
    log::log_sink::LogSink,
    playback::{PLAYBACK_SAMPLE_RATE, PlaybackScheduler, spawn_playback_worker},
    session::{
        constants::{CAPTURE_POLL, CAPTURE_QUEUE_FRAMES, CHANNEL_POLL},
        events::{SessionEvent, SessionNotice},
        session_state::SessionState,
        transcript_log::{Role, TranscriptEntry, TranscriptLog},
    },
    sink_debug, sink_error, sink_info, sink_trace, sink_warn,
};

/// Target language used when the caller passes an empty name and the
/// configuration has none.
const DEFAULT_TARGET_LANGUAGE: &str = "Sinhala";

/// Configuration for a [`LiveSession`].
#[derive(Debug, Clone, Default)]
pub struct LiveSessionConfig {
    /// Optional output-device override for the playback stream.
    pub output_device: Option<String>,
    /// Default translation target when `start` receives an empty name.
    pub default_target_language: Option<String>,
}

impl LiveSessionConfig {
    /// Reads `[Audio] output_device` and `[Session] target_language`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_device: config
                .get_non_empty("Audio", "output_device")
                .map(str::to_string),
            default_target_language: config
                .get_non_empty("Session", "target_language")
                .map(str::to_string),
        }
    }
}

/// Orchestrator of one live translation session.
///
/// Owns the capture source, the channel connector and, while a session is
/// active, the playback clock and the active-source set. The two pipeline
/// directions — capture→encode→send and receive→decode→schedule — are
/// multiplexed onto a single event-loop thread; ordering holds within each
/// flow, not between them.
///
/// Exactly one session runs at a time: `start` tears down any active
/// session before opening a new one, and every exit path (user stop,
/// engine close, fatal error) releases all resources and rests at
/// [`SessionState::Idle`].
pub struct LiveSession {
    logger: Arc<dyn LogSink>,
    cfg: LiveSessionConfig,
    capture: Arc<Mutex<Box<dyn CaptureSource>>>,
    connector: Arc<Mutex<Box<dyn ChannelConnector>>>,
    state: Arc<Mutex<SessionState>>,
    transcript: Arc<Mutex<TranscriptLog>>,
    run_flag: Arc<AtomicBool>,
    notice_tx: Sender<SessionNotice>,
    notice_rx: Receiver<SessionNotice>,
    loop_handle: Option<JoinHandle<()>>,
}

impl LiveSession {
    #[must_use]
    pub fn new(
        capture: Box<dyn CaptureSource>,
        connector: Box<dyn ChannelConnector>,
        logger: Arc<dyn LogSink>,
        cfg: LiveSessionConfig,
    ) -> Self {
        let (notice_tx, notice_rx) = mpsc::channel();
        Self {
            logger,
            cfg,
            capture: Arc::new(Mutex::new(capture)),
            connector: Arc::new(Mutex::new(connector)),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            transcript: Arc::new(Mutex::new(TranscriptLog::default())),
            run_flag: Arc::new(AtomicBool::new(false)),
            notice_tx,
            notice_rx,
            loop_handle: None,
        }
    }

    /// Starts a session translating into `target_language` (empty name:
    /// configured default). Any active session is torn down first.
    ///
    /// Opening the devices and the channel happens on the session's own
    /// event-loop thread; failures surface through [`Self::poll_notices`]
    /// and the state, which comes to rest at `Idle`.
    pub fn start(&mut self, target_language: &str) {
        self.stop();

        let target = if target_language.is_empty() {
            self.cfg
                .default_target_language
                .clone()
                .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string())
        } else {
            target_language.to_string()
        };

        // Fresh token per attempt; tags log lines so stale worker output
        // cannot be mistaken for the current session's.
        let session_id = OsRng.next_u64();

        set_state(&self.state, &self.notice_tx, SessionState::Connecting);
        self.run_flag.store(true, Ordering::SeqCst);

        let args = SessionLoopArgs {
            logger: self.logger.clone(),
            capture: Arc::clone(&self.capture),
            connector: Arc::clone(&self.connector),
            state: Arc::clone(&self.state),
            transcript: Arc::clone(&self.transcript),
            run_flag: Arc::clone(&self.run_flag),
            notice_tx: self.notice_tx.clone(),
            output_device: self.cfg.output_device.clone(),
            target_language: target,
            session_id,
        };

        self.loop_handle = thread::Builder::new()
            .name("babel-session".into())
            .spawn(move || run_session_loop(args))
            .ok();
    }

    /// Stops the session and releases every resource opened since the last
    /// start. Safe from any state: stopping twice, or without a prior
    /// start, is a no-op.
    pub fn stop(&mut self) {
        self.run_flag.store(false, Ordering::SeqCst);
        if let Some(handle) = self.loop_handle.take() {
            let _ = handle.join();
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.lock().map(|g| *g).unwrap_or(SessionState::Failed)
    }

    /// User-facing status string for the current state.
    #[must_use]
    pub fn status(&self) -> String {
        self.state().to_string()
    }

    /// Copies the retained transcript entries, oldest first.
    #[must_use]
    pub fn transcript_snapshot(&self) -> Vec<TranscriptEntry> {
        self.transcript
            .lock()
            .map(|g| g.snapshot())
            .unwrap_or_default()
    }

    /// Drains pending state-change and error notices.
    pub fn poll_notices(&self) -> Vec<SessionNotice> {
        let mut out = Vec::new();
        while let Ok(notice) = self.notice_rx.try_recv() {
            out.push(notice);
        }
        out
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn set_state(
    state: &Arc<Mutex<SessionState>>,
    notice_tx: &Sender<SessionNotice>,
    next: SessionState,
) {
    if let Ok(mut guard) = state.lock() {
        *guard = next;
    }
    let _ = notice_tx.send(SessionNotice::StateChanged(next));
}

struct SessionLoopArgs {
    logger: Arc<dyn LogSink>,
    capture: Arc<Mutex<Box<dyn CaptureSource>>>,
    connector: Arc<Mutex<Box<dyn ChannelConnector>>>,
    state: Arc<Mutex<SessionState>>,
    transcript: Arc<Mutex<TranscriptLog>>,
    run_flag: Arc<AtomicBool>,
    notice_tx: Sender<SessionNotice>,
    output_device: Option<String>,
    target_language: String,
    session_id: u64,
}

/// One session from Connecting to Idle: opens capture, the playback clock
/// and the channel, pumps both event flows through the state machine, and
/// performs the ordered release on every exit path.
fn run_session_loop(args: SessionLoopArgs) {
    let SessionLoopArgs {
        logger,
        capture,
        connector,
        state,
        transcript,
        run_flag,
        notice_tx,
        output_device,
        target_language,
        session_id,
    } = args;

    sink_info!(
        logger,
        "[Session:{:08x}] connecting (target language: {})",
        session_id,
        target_language
    );

    // Capture opens first. Frames produced before the channel confirms open
    // are dropped, not queued.
    let (cap_tx, cap_rx) = mpsc::sync_channel::<CaptureEvent>(CAPTURE_QUEUE_FRAMES);
    let capture_res = match capture.lock() {
        Ok(mut cap) => cap.start(cap_tx),
        Err(_) => Err(CaptureError::Runtime("capture lock poisoned".into())),
    };
    if let Err(e) = capture_res {
        if let Ok(mut cap) = capture.lock() {
            cap.stop();
        }
        fail_connecting(
            &logger,
            &state,
            &notice_tx,
            session_id,
            format!("capture open failed: {e}"),
        );
        return;
    }

    // Playback clock. The scheduler's cursor starts at the clock's origin.
    let scheduler = Arc::new(Mutex::new(PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE)));
    let playback_running = Arc::new(AtomicBool::new(true));
    let playback_handle = spawn_playback_worker(
        logger.clone(),
        output_device,
        Arc::clone(&scheduler),
        Arc::clone(&playback_running),
    );

    // Channel handshake. The Open confirmation arrives as an event.
    let (chan_tx, chan_rx) = mpsc::channel::<ChannelEvent>();
    let connect_res = match connector.lock() {
        Ok(mut conn) => conn.connect(&target_language, chan_tx),
        Err(_) => Err(ChannelError::Connect("connector lock poisoned".into())),
    };
    let channel = match connect_res {
        Ok(ch) => ch,
        Err(e) => {
            if let Ok(mut cap) = capture.lock() {
                cap.stop();
            }
            playback_running.store(false, Ordering::SeqCst);
            if let Some(handle) = playback_handle {
                let _ = handle.join();
            }
            fail_connecting(
                &logger,
                &state,
                &notice_tx,
                session_id,
                format!("channel connect failed: {e}"),
            );
            return;
        }
    };

    let mut core = SessionCore::new(
        logger.clone(),
        session_id,
        Arc::clone(&state),
        Arc::clone(&transcript),
        Arc::clone(&scheduler),
        channel,
        notice_tx.clone(),
    );

    // Closing is the default exit (user stop); fatal events override it.
    let mut exit_state = SessionState::Closing;

    while run_flag.load(Ordering::SeqCst) {
        // Outbound flow: capture order is send order.
        match cap_rx.recv_timeout(CAPTURE_POLL) {
            Ok(ev) => {
                if let LoopControl::Shutdown(s) = core.on_event(SessionEvent::Capture(ev)) {
                    exit_state = s;
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                core.fail("capture worker disconnected".into());
                exit_state = SessionState::Failed;
                break;
            }
        }

        // Inbound flow: arrival order is scheduling order.
        match chan_rx.recv_timeout(CHANNEL_POLL) {
            Ok(ev) => {
                if let LoopControl::Shutdown(s) = core.on_event(SessionEvent::Channel(ev)) {
                    exit_state = s;
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                core.fail("channel event stream disconnected".into());
                exit_state = SessionState::Failed;
                break;
            }
        }
    }

    // Ordered release, regardless of which step failed: capture, then the
    // playback clock, then the channel. Stale events die with the receivers
    // dropped at the end of this scope.
    if let Ok(mut cap) = capture.lock() {
        cap.stop();
        let dropped = cap.frames_dropped();
        if dropped > 0 {
            sink_info!(
                logger,
                "[Session:{:08x}] dropped {} frames under back-pressure",
                session_id,
                dropped
            );
        }
    }
    playback_running.store(false, Ordering::SeqCst);
    if let Some(handle) = playback_handle {
        let _ = handle.join();
    }
    core.log_summary();
    core.close_channel();

    if exit_state == SessionState::Failed {
        set_state(&state, &notice_tx, SessionState::Failed);
    } else {
        set_state(&state, &notice_tx, SessionState::Closing);
        set_state(&state, &notice_tx, SessionState::Closed);
    }
    set_state(&state, &notice_tx, SessionState::Idle);

    sink_info!(logger, "[Session:{:08x}] idle", session_id);
}

fn fail_connecting(
    logger: &Arc<dyn LogSink>,
    state: &Arc<Mutex<SessionState>>,
    notice_tx: &Sender<SessionNotice>,
    session_id: u64,
    msg: String,
) {
    sink_error!(logger, "[Session:{:08x}] {}", session_id, msg);
    let _ = notice_tx.send(SessionNotice::Error(msg));
    set_state(state, notice_tx, SessionState::Failed);
    set_state(state, notice_tx, SessionState::Idle);
}

/// Result of feeding one event through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    /// Leave the event loop and tear down, resting at the given state.
    Shutdown(SessionState),
}

/// The session state machine: consumes [`SessionEvent`]s one at a time and
/// mutates the session's shared pieces. All mutation of the scheduler's
/// cursor and active-source set funnels through here and the render path,
/// serialized by the scheduler mutex.
pub(crate) struct SessionCore {
    logger: Arc<dyn LogSink>,
    session_id: u64,
    state: Arc<Mutex<SessionState>>,
    transcript: Arc<Mutex<TranscriptLog>>,
    scheduler: Arc<Mutex<PlaybackScheduler>>,
    channel: Box<dyn SessionChannel>,
    notice_tx: Sender<SessionNotice>,
    /// Readiness gate on the send path: frames are dropped until the
    /// channel confirms open.
    channel_ready: bool,
    pre_open_dropped: u64,
    frames_sent: u64,
}

impl SessionCore {
    pub(crate) fn new(
        logger: Arc<dyn LogSink>,
        session_id: u64,
        state: Arc<Mutex<SessionState>>,
        transcript: Arc<Mutex<TranscriptLog>>,
        scheduler: Arc<Mutex<PlaybackScheduler>>,
        channel: Box<dyn SessionChannel>,
        notice_tx: Sender<SessionNotice>,
    ) -> Self {
        Self {
            logger,
            session_id,
            state,
            transcript,
            scheduler,
            channel,
            notice_tx,
            channel_ready: false,
            pre_open_dropped: 0,
            frames_sent: 0,
        }
    }

    pub(crate) fn on_event(&mut self, ev: SessionEvent) -> LoopControl {
        match ev {
            SessionEvent::Capture(CaptureEvent::Frame(frame)) => self.on_capture_frame(&frame),
            SessionEvent::Capture(CaptureEvent::Error(e)) => {
                self.fail(format!("capture failed: {e}"));
                LoopControl::Shutdown(SessionState::Failed)
            }
            SessionEvent::Channel(ev) => self.on_channel_event(ev),
        }
    }

    fn on_capture_frame(&mut self, frame: &AudioFrame) -> LoopControl {
        if !self.channel_ready {
            // No buffering before the channel confirms open: bounded memory
            // during a slow handshake.
            self.pre_open_dropped += 1;
            return LoopControl::Continue;
        }

        let chunk = codec::encode(&frame.samples);
        if let Err(e) = self.channel.send_audio(&chunk) {
            self.fail(format!("outbound send failed: {e}"));
            return LoopControl::Shutdown(SessionState::Failed);
        }
        self.frames_sent += 1;
        LoopControl::Continue
    }

    fn on_channel_event(&mut self, ev: ChannelEvent) -> LoopControl {
        match ev {
            ChannelEvent::Open => {
                self.channel_ready = true;
                if self.pre_open_dropped > 0 {
                    sink_debug!(
                        self.logger,
                        "[Session:{:08x}] dropped {} frames captured before channel open",
                        self.session_id,
                        self.pre_open_dropped
                    );
                }
                self.set_state(SessionState::Live);
                LoopControl::Continue
            }
            ChannelEvent::Audio { payload } => {
                match codec::decode(&payload) {
                    Ok(samples) => {
                        if let Ok(mut sched) = self.scheduler.lock() {
                            let _start = sched.schedule(samples);
                            sink_trace!(
                                self.logger,
                                "[Session:{:08x}] fragment scheduled at {:.3}s",
                                self.session_id,
                                _start
                            );
                        }
                    }
                    Err(e) => {
                        // The fragment is dropped; the session continues.
                        sink_warn!(
                            self.logger,
                            "[Session:{:08x}] dropped inbound fragment: {}",
                            self.session_id,
                            e
                        );
                    }
                }
                LoopControl::Continue
            }
            ChannelEvent::InputTranscript(text) => {
                self.push_transcript(Role::User, text);
                LoopControl::Continue
            }
            ChannelEvent::OutputTranscript(text) => {
                self.push_transcript(Role::Remote, text);
                LoopControl::Continue
            }
            ChannelEvent::Interrupted => {
                if let Ok(mut sched) = self.scheduler.lock() {
                    sched.interrupt();
                }
                sink_debug!(
                    self.logger,
                    "[Session:{:08x}] barge-in: pending audio discarded",
                    self.session_id
                );
                LoopControl::Continue
            }
            ChannelEvent::Error(e) => {
                self.fail(format!("channel error: {e}"));
                LoopControl::Shutdown(SessionState::Failed)
            }
            ChannelEvent::Closed => {
                sink_info!(
                    self.logger,
                    "[Session:{:08x}] channel closed by engine",
                    self.session_id
                );
                LoopControl::Shutdown(SessionState::Closing)
            }
        }
    }

    pub(crate) fn fail(&mut self, msg: String) {
        sink_error!(self.logger, "[Session:{:08x}] {}", self.session_id, msg);
        let _ = self.notice_tx.send(SessionNotice::Error(msg));
    }

    pub(crate) fn close_channel(&mut self) {
        self.channel.close();
    }

    pub(crate) fn log_summary(&self) {
        sink_debug!(
            self.logger,
            "[Session:{:08x}] sent {} frames ({} dropped pre-open)",
            self.session_id,
            self.frames_sent,
            self.pre_open_dropped
        );
    }

    fn set_state(&self, next: SessionState) {
        set_state(&self.state, &self.notice_tx, next);
    }

    fn push_transcript(&mut self, role: Role, text: String) {
        if let Ok(mut log) = self.transcript.lock() {
            log.push(role, text);
        }
    }

    #[cfg(test)]
    pub(crate) fn channel_ready(&self) -> bool {
        self.channel_ready
    }

    #[cfg(test)]
    pub(crate) fn pre_open_dropped(&self) -> u64 {
        self.pre_open_dropped
    }

    #[cfg(test)]
    pub(crate) fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}
