#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{
    Arc, Mutex,
    mpsc::{Sender, SyncSender},
};
use std::thread;
use std::time::{Duration, Instant};

use rustybabel::capture::{AudioFrame, CaptureEvent, CaptureResult, CaptureSource};
use rustybabel::channel::{
    ChannelConnector, ChannelError, ChannelEvent, ChannelResult, SessionChannel,
};
use rustybabel::codec::{self, EncodedChunk};
use rustybabel::log::NoopLogSink;
use rustybabel::session::{
    LiveSession, LiveSessionConfig, SessionNotice, SessionState,
};

const WAIT: Duration = Duration::from_secs(5);

fn wait_for(mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[derive(Default)]
struct FakeCaptureSource {
    tx: Arc<Mutex<Option<SyncSender<CaptureEvent>>>>,
    stopped: Arc<Mutex<bool>>,
}

impl CaptureSource for FakeCaptureSource {
    fn start(&mut self, tx: SyncSender<CaptureEvent>) -> CaptureResult<()> {
        *self.tx.lock().unwrap() = Some(tx);
        Ok(())
    }

    fn stop(&mut self) {
        self.tx.lock().unwrap().take();
        *self.stopped.lock().unwrap() = true;
    }
}

struct FakeChannel {
    sent: Arc<Mutex<Vec<EncodedChunk>>>,
    closed: Arc<Mutex<bool>>,
}

impl SessionChannel for FakeChannel {
    fn send_audio(&self, chunk: &EncodedChunk) -> ChannelResult<()> {
        self.sent.lock().unwrap().push(chunk.clone());
        Ok(())
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

#[derive(Default)]
struct FakeConnector {
    events: Arc<Mutex<Option<Sender<ChannelEvent>>>>,
    sent: Arc<Mutex<Vec<EncodedChunk>>>,
    closed: Arc<Mutex<bool>>,
    languages: Arc<Mutex<Vec<String>>>,
    fail_connect: bool,
}

impl ChannelConnector for FakeConnector {
    fn connect(
        &mut self,
        target_language: &str,
        events: Sender<ChannelEvent>,
    ) -> ChannelResult<Box<dyn SessionChannel>> {
        if self.fail_connect {
            return Err(ChannelError::Connect("refused".into()));
        }
        self.languages.lock().unwrap().push(target_language.to_string());
        *self.events.lock().unwrap() = Some(events);
        Ok(Box::new(FakeChannel {
            sent: Arc::clone(&self.sent),
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct Rig {
    session: LiveSession,
    cap_tx: Arc<Mutex<Option<SyncSender<CaptureEvent>>>>,
    cap_stopped: Arc<Mutex<bool>>,
    engine: Arc<Mutex<Option<Sender<ChannelEvent>>>>,
    sent: Arc<Mutex<Vec<EncodedChunk>>>,
    closed: Arc<Mutex<bool>>,
    languages: Arc<Mutex<Vec<String>>>,
}

fn rig(fail_connect: bool) -> Rig {
    let capture = FakeCaptureSource::default();
    let cap_tx = Arc::clone(&capture.tx);
    let cap_stopped = Arc::clone(&capture.stopped);

    let connector = FakeConnector {
        fail_connect,
        ..FakeConnector::default()
    };
    let engine = Arc::clone(&connector.events);
    let sent = Arc::clone(&connector.sent);
    let closed = Arc::clone(&connector.closed);
    let languages = Arc::clone(&connector.languages);

    let session = LiveSession::new(
        Box::new(capture),
        Box::new(connector),
        Arc::new(NoopLogSink),
        LiveSessionConfig::default(),
    );

    Rig {
        session,
        cap_tx,
        cap_stopped,
        engine,
        sent,
        closed,
        languages,
    }
}

impl Rig {
    fn engine_send(&self, ev: ChannelEvent) {
        let guard = self.engine.lock().unwrap();
        guard.as_ref().unwrap().send(ev).unwrap();
    }

    fn send_frame(&self, value: f32) {
        let tx = self.cap_tx.lock().unwrap().clone().unwrap();
        tx.send(CaptureEvent::Frame(AudioFrame {
            samples: vec![value; 16],
            sample_rate: 16_000,
            timestamp_ms: 0,
        }))
        .unwrap();
    }

    fn go_live(&mut self, language: &str) {
        // A previous session may have left its sender behind; the next
        // connect installs a fresh one.
        self.engine.lock().unwrap().take();
        self.session.start(language);
        assert!(
            wait_for(|| self.engine.lock().unwrap().is_some()),
            "channel never connected"
        );
        self.engine_send(ChannelEvent::Open);
        assert!(
            wait_for(|| self.session.state() == SessionState::Live),
            "session never went live"
        );
    }
}

#[test]
fn full_session_flow_sends_frames_in_order() {
    let mut r = rig(false);
    r.go_live("French");
    assert_eq!(r.languages.lock().unwrap().as_slice(), ["French"]);
    assert_eq!(r.session.status(), "Live: Speak now");

    for v in [0.1f32, 0.2, 0.3] {
        r.send_frame(v);
    }
    assert!(
        wait_for(|| r.sent.lock().unwrap().len() == 3),
        "frames never reached the channel"
    );
    {
        let sent = r.sent.lock().unwrap();
        for (i, v) in [0.1f32, 0.2, 0.3].into_iter().enumerate() {
            assert_eq!(sent[i], codec::encode(&vec![v; 16]), "send order is capture order");
        }
    }

    r.engine_send(ChannelEvent::OutputTranscript("bonjour".into()));
    assert!(wait_for(|| !r.session.transcript_snapshot().is_empty()));

    r.session.stop();
    assert_eq!(r.session.state(), SessionState::Idle);
    assert!(*r.cap_stopped.lock().unwrap(), "capture released");
    assert!(*r.closed.lock().unwrap(), "channel closed");

    let notices = r.session.poll_notices();
    assert!(notices.iter().any(|n| matches!(
        n,
        SessionNotice::StateChanged(SessionState::Closed)
    )));
}

#[test]
fn stop_without_start_is_a_noop() {
    let mut r = rig(false);
    r.session.stop();
    assert_eq!(r.session.state(), SessionState::Idle);
    r.session.stop();
    assert_eq!(r.session.state(), SessionState::Idle);
}

#[test]
fn empty_target_falls_back_to_the_default_language() {
    let mut r = rig(false);
    r.session.start("");
    assert!(wait_for(|| !r.languages.lock().unwrap().is_empty()));
    assert_eq!(r.languages.lock().unwrap()[0], "Sinhala");
    r.session.stop();
}

#[test]
fn connect_failure_rests_at_idle() {
    let mut r = rig(true);
    r.session.start("Japanese");

    assert!(
        wait_for(|| *r.cap_stopped.lock().unwrap()),
        "capture not released after failed connect"
    );
    assert!(wait_for(|| r.session.state() == SessionState::Idle));
    r.session.stop();

    let notices = r.session.poll_notices();
    assert!(notices.iter().any(|n| matches!(n, SessionNotice::Error(_))));
    assert!(notices.iter().any(|n| matches!(
        n,
        SessionNotice::StateChanged(SessionState::Failed)
    )));
}

#[test]
fn engine_error_fails_the_session() {
    let mut r = rig(false);
    r.go_live("German");

    r.engine_send(ChannelEvent::Error("engine overloaded".into()));
    assert!(wait_for(|| r.session.state() == SessionState::Idle));
    r.session.stop();

    assert!(*r.cap_stopped.lock().unwrap());
    assert!(*r.closed.lock().unwrap());
    let notices = r.session.poll_notices();
    assert!(notices.iter().any(|n| matches!(n, SessionNotice::Error(_))));
    assert!(notices.iter().any(|n| matches!(
        n,
        SessionNotice::StateChanged(SessionState::Failed)
    )));
}

#[test]
fn engine_close_winds_down_cleanly() {
    let mut r = rig(false);
    r.go_live("Spanish");

    r.engine_send(ChannelEvent::Closed);
    assert!(wait_for(|| r.session.state() == SessionState::Idle));
    r.session.stop();

    assert!(*r.closed.lock().unwrap());
    let notices = r.session.poll_notices();
    assert!(notices.iter().any(|n| matches!(
        n,
        SessionNotice::StateChanged(SessionState::Closing)
    )));
    assert!(notices.iter().any(|n| matches!(
        n,
        SessionNotice::StateChanged(SessionState::Closed)
    )));
}

#[test]
fn restart_tears_down_the_previous_session() {
    let mut r = rig(false);
    r.go_live("French");
    r.session.stop();
    assert_eq!(r.session.state(), SessionState::Idle);
    assert!(*r.cap_stopped.lock().unwrap());

    *r.cap_stopped.lock().unwrap() = false;
    r.go_live("Italian");
    assert_eq!(
        r.languages.lock().unwrap().as_slice(),
        ["French", "Italian"]
    );

    r.session.stop();
    assert_eq!(r.session.state(), SessionState::Idle);
    assert!(*r.cap_stopped.lock().unwrap());
}
