//! Event surface: wires the input decoder, the escape timer and resize
//! notifications to a [`Consumer`].

use super::device::{Device, TerminalSize};
use super::surface::{Coord, Surface};
use crate::error::{Result, TermError};
use std::io::{self, Read};
use std::thread;
use std::time::{Duration, Instant};
use term_input::{Decoder, Direction, InputEvent};
use tokio::sync::mpsc;

/// One read from the input source.
pub type InputChunk = io::Result<Vec<u8>>;

const READ_BUFFER: usize = 1024;

/// Read `reader` on a dedicated thread, forwarding each chunk.
///
/// Blocking reads never run on the runtime, so dropping the receiver lets
/// the process exit even while a read is still pending. The channel closes
/// on end of input or after the first read error.
pub fn spawn_reader<R>(reader: R) -> mpsc::Receiver<InputChunk>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    thread::spawn(move || {
        let mut reader = reader;
        let mut buffer = [0u8; READ_BUFFER];
        loop {
            let chunk = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(count) => Ok(buffer[..count].to_vec()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => Err(err),
            };
            let failed = chunk.is_err();
            if tx.blocking_send(chunk).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// Whether the session keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Receives terminal events in byte-arrival order.
pub trait Consumer<D: Device> {
    /// Called once before any input is processed.
    fn start(&mut self, _term: &mut Surface<D>) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    /// Every decoded event except arrows, which go to [`Consumer::arrow`].
    fn keypress(&mut self, term: &mut Surface<D>, event: &InputEvent) -> Result<Flow>;

    /// Arrow keys. Forwards to `keypress` unless overridden.
    fn arrow(&mut self, term: &mut Surface<D>, direction: Direction) -> Result<Flow> {
        self.keypress(term, &InputEvent::Arrow(direction))
    }

    /// The window changed size; `size` was queried after the notification.
    fn resize(&mut self, _term: &mut Surface<D>, _size: TerminalSize) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    /// Whether `InputEvent::Interrupt` should be delivered. When false, the
    /// session clears the screen and terminates instead.
    fn handles_interrupt(&self) -> bool {
        false
    }
}

/// One terminal session: the output surface plus its input decoder.
#[derive(Debug)]
pub struct Session<D: Device> {
    surface: Surface<D>,
    decoder: Decoder,
}

impl<D: Device> Session<D> {
    pub fn new(surface: Surface<D>, escape_timeout: Duration) -> Self {
        Self {
            surface,
            decoder: Decoder::new(escape_timeout),
        }
    }

    pub fn surface(&self) -> &Surface<D> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<D> {
        &mut self.surface
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Append raw input bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.decoder.feed(bytes);
    }

    /// Decode and deliver at most one event.
    ///
    /// Returns `Ok(None)` when the buffered input is exhausted.
    pub fn pump<C: Consumer<D>>(&mut self, consumer: &mut C) -> Result<Option<Flow>> {
        match self.decoder.next_event() {
            None => Ok(None),
            Some(Err(err)) => Err(err.into()),
            Some(Ok(event)) => self.dispatch(consumer, event).map(Some),
        }
    }

    /// Fire the escape timer if it is due, delivering `InputEvent::Escape`.
    pub fn expire_escape<C: Consumer<D>>(&mut self, now: Instant, consumer: &mut C) -> Result<Flow> {
        match self.decoder.expire_escape(now) {
            Some(event) => self.dispatch(consumer, event),
            None => Ok(Flow::Continue),
        }
    }

    /// Deliver a resize notification with a freshly queried size.
    pub fn notify_resize<C: Consumer<D>>(&mut self, consumer: &mut C) -> Result<Flow> {
        let size = self.surface.size()?;
        tracing::debug!(rows = size.rows, columns = size.columns, "resize");
        let flow = consumer.resize(&mut self.surface, size)?;
        self.surface.flush()?;
        Ok(flow)
    }

    /// Route one event to the consumer.
    pub fn dispatch<C: Consumer<D>>(&mut self, consumer: &mut C, event: InputEvent) -> Result<Flow> {
        tracing::debug!(?event, "input event");
        let flow = match event {
            InputEvent::Arrow(direction) => consumer.arrow(&mut self.surface, direction)?,
            event if event.terminates_if_unhandled() && !consumer.handles_interrupt() => {
                self.terminate_unhandled()?;
                return Err(TermError::UnhandledInterrupt);
            }
            event => consumer.keypress(&mut self.surface, &event)?,
        };
        self.surface.flush()?;
        Ok(flow)
    }

    fn terminate_unhandled(&mut self) -> Result<()> {
        tracing::warn!("interrupt with no handler, terminating");
        self.surface.clear()?;
        self.surface.move_to(Coord::ORIGIN)?;
        self.surface.write("terminated (^C)\r\n")?;
        self.surface.flush()?;
        Ok(())
    }

    /// Drive the session from `input` until the consumer quits, input ends,
    /// a termination signal arrives, or a fatal error occurs.
    ///
    /// Runs on the current task. Buffered input is decoded one event at a
    /// time with a yield in between, so the loop stays cooperative. Pair it
    /// with [`spawn_reader`] for blocking sources such as stdin.
    pub async fn run<C>(
        &mut self,
        mut input: mpsc::Receiver<InputChunk>,
        consumer: &mut C,
    ) -> Result<()>
    where
        C: Consumer<D>,
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut winch = signal(SignalKind::window_change())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let mut hangup = signal(SignalKind::hangup())?;

        if consumer.start(&mut self.surface)? == Flow::Quit {
            return Ok(());
        }
        self.surface.flush()?;

        loop {
            while let Some(flow) = self.pump(consumer)? {
                if flow == Flow::Quit {
                    return Ok(());
                }
                tokio::task::yield_now().await;
            }

            let deadline = self.decoder.escape_deadline();
            let wake = tokio::time::Instant::from_std(
                deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600)),
            );

            tokio::select! {
                chunk = input.recv() => {
                    let Some(chunk) = chunk else {
                        tracing::debug!("input closed");
                        return Ok(());
                    };
                    self.feed(&chunk?);
                }
                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    if self.expire_escape(wake.into_std(), consumer)? == Flow::Quit {
                        return Ok(());
                    }
                }
                _ = winch.recv() => {
                    if self.notify_resize(consumer)? == Flow::Quit {
                        return Ok(());
                    }
                }
                _ = terminate.recv() => {
                    tracing::debug!("SIGTERM");
                    return Ok(());
                }
                _ = hangup.recv() => {
                    tracing::debug!("SIGHUP");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::device::MemoryDevice;
    use crate::term::glyphs::GlyphSet;
    use term_input::Key;

    #[derive(Default)]
    struct Recorder {
        keys: Vec<InputEvent>,
        arrows: Vec<Direction>,
        sizes: Vec<TerminalSize>,
        handle_interrupt: bool,
        override_arrow: bool,
    }

    impl Consumer<MemoryDevice> for Recorder {
        fn keypress(&mut self, _term: &mut Surface<MemoryDevice>, event: &InputEvent) -> Result<Flow> {
            self.keys.push(event.clone());
            if *event == InputEvent::Key(Key(b'q')) {
                return Ok(Flow::Quit);
            }
            Ok(Flow::Continue)
        }

        fn arrow(&mut self, term: &mut Surface<MemoryDevice>, direction: Direction) -> Result<Flow> {
            if self.override_arrow {
                self.arrows.push(direction);
                Ok(Flow::Continue)
            } else {
                self.keypress(term, &InputEvent::Arrow(direction))
            }
        }

        fn resize(&mut self, _term: &mut Surface<MemoryDevice>, size: TerminalSize) -> Result<Flow> {
            self.sizes.push(size);
            Ok(Flow::Continue)
        }

        fn handles_interrupt(&self) -> bool {
            self.handle_interrupt
        }
    }

    fn session() -> Session<MemoryDevice> {
        Session::new(
            Surface::new(MemoryDevice::new(80, 24), GlyphSet::Ascii),
            Duration::from_millis(50),
        )
    }

    fn drain(session: &mut Session<MemoryDevice>, consumer: &mut Recorder) -> Result<Vec<Flow>> {
        let mut flows = Vec::new();
        while let Some(flow) = session.pump(consumer)? {
            flows.push(flow);
        }
        Ok(flows)
    }

    #[test]
    fn keys_reach_consumer_in_order() {
        let mut s = session();
        let mut r = Recorder::default();
        s.feed(b"ab\x1b[5;6R");
        drain(&mut s, &mut r).unwrap();
        assert_eq!(
            r.keys,
            vec![
                InputEvent::Key(Key(b'a')),
                InputEvent::Key(Key(b'b')),
                InputEvent::CursorPosition { row: 5, col: 6 },
            ]
        );
    }

    #[test]
    fn quit_flow_is_reported() {
        let mut s = session();
        let mut r = Recorder::default();
        s.feed(b"q");
        assert_eq!(drain(&mut s, &mut r).unwrap(), vec![Flow::Quit]);
    }

    #[test]
    fn arrows_fall_back_to_keypress() {
        let mut s = session();
        let mut r = Recorder::default();
        s.feed(b"\x1b[A");
        drain(&mut s, &mut r).unwrap();
        assert_eq!(r.keys, vec![InputEvent::Arrow(Direction::Up)]);
    }

    #[test]
    fn overridden_arrows_bypass_keypress() {
        let mut s = session();
        let mut r = Recorder {
            override_arrow: true,
            ..Recorder::default()
        };
        s.feed(b"\x1b[D\x1b[C");
        drain(&mut s, &mut r).unwrap();
        assert!(r.keys.is_empty());
        assert_eq!(r.arrows, vec![Direction::Left, Direction::Right]);
    }

    #[test]
    fn unhandled_interrupt_terminates() {
        let mut s = session();
        let mut r = Recorder::default();
        s.feed(&[0x03, b'x']);
        let err = drain(&mut s, &mut r).unwrap_err();
        assert!(matches!(err, TermError::UnhandledInterrupt));
        assert!(r.keys.is_empty());
        assert_eq!(
            s.surface_mut().device_mut().take_output(),
            "\x1b[2J\x1b[1;1fterminated (^C)\r\n"
        );
    }

    #[test]
    fn handled_interrupt_is_delivered() {
        let mut s = session();
        let mut r = Recorder {
            handle_interrupt: true,
            ..Recorder::default()
        };
        s.feed(&[0x03]);
        drain(&mut s, &mut r).unwrap();
        assert_eq!(r.keys, vec![InputEvent::Interrupt]);
    }

    #[test]
    fn protocol_error_is_fatal() {
        let mut s = session();
        let mut r = Recorder::default();
        s.feed(b"\x1b[Z");
        assert!(matches!(drain(&mut s, &mut r), Err(TermError::Protocol(_))));
        s.feed(b"a");
        assert!(matches!(drain(&mut s, &mut r), Err(TermError::Protocol(_))));
        assert!(r.keys.is_empty());
    }

    #[test]
    fn escape_timer_delivers_escape() {
        let mut s = session();
        let mut r = Recorder::default();
        s.feed(&[0x1b]);
        drain(&mut s, &mut r).unwrap();
        assert!(r.keys.is_empty());

        let deadline = s.decoder().escape_deadline().unwrap();
        s.expire_escape(deadline, &mut r).unwrap();
        assert_eq!(r.keys, vec![InputEvent::Escape]);
    }

    #[test]
    fn resize_reports_live_size() {
        let mut s = session();
        let mut r = Recorder::default();
        s.surface_mut().device_mut().size = TerminalSize { rows: 30, columns: 100 };
        s.notify_resize(&mut r).unwrap();
        assert_eq!(r.sizes, vec![TerminalSize { rows: 30, columns: 100 }]);
    }

    struct KeysOnly;

    impl Consumer<MemoryDevice> for KeysOnly {
        fn keypress(&mut self, _term: &mut Surface<MemoryDevice>, _event: &InputEvent) -> Result<Flow> {
            Ok(Flow::Quit)
        }
    }

    #[test]
    fn default_hooks_continue_and_write_nothing() {
        let mut s = session();
        let mut consumer = KeysOnly;
        assert_eq!(consumer.start(s.surface_mut()).unwrap(), Flow::Continue);
        assert_eq!(s.notify_resize(&mut consumer).unwrap(), Flow::Continue);
        assert!(!Consumer::<MemoryDevice>::handles_interrupt(&consumer));
        assert_eq!(s.surface_mut().device_mut().take_output(), "");
    }

    /// Feed `chunks` into a channel from a separate task, pausing `gap`
    /// after each one, then close it.
    fn scripted_input(chunks: Vec<Vec<u8>>, gap: Duration) -> mpsc::Receiver<InputChunk> {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(Ok(chunk)).await.is_err() {
                    return;
                }
                tokio::time::sleep(gap).await;
            }
        });
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn run_resolves_lone_escape_after_timeout() {
        let mut s = session();
        let mut r = Recorder::default();
        let input = scripted_input(vec![vec![0x1b]], Duration::from_millis(100));
        s.run(input, &mut r).await.unwrap();
        assert_eq!(r.keys, vec![InputEvent::Escape]);
    }

    #[tokio::test(start_paused = true)]
    async fn run_joins_escape_with_bytes_inside_window() {
        let mut s = session();
        let mut r = Recorder::default();
        let input = scripted_input(
            vec![vec![0x1b], b"[A".to_vec()],
            Duration::from_millis(10),
        );
        s.run(input, &mut r).await.unwrap();
        assert_eq!(r.keys, vec![InputEvent::Arrow(Direction::Up)]);
    }

    #[tokio::test(start_paused = true)]
    async fn run_delivers_chunks_in_order() {
        let mut s = session();
        let mut r = Recorder::default();
        let input = scripted_input(
            vec![b"ab".to_vec(), b"\x1b[".to_vec(), b"B".to_vec()],
            Duration::from_millis(1),
        );
        s.run(input, &mut r).await.unwrap();
        assert_eq!(
            r.keys,
            vec![
                InputEvent::Key(Key(b'a')),
                InputEvent::Key(Key(b'b')),
                InputEvent::Arrow(Direction::Down),
            ]
        );
    }

    #[tokio::test]
    async fn run_ends_when_input_closes() {
        let mut s = session();
        let mut r = Recorder::default();
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        s.run(rx, &mut r).await.unwrap();
        assert!(r.keys.is_empty());
    }

    #[tokio::test]
    async fn run_stops_at_quit_without_draining() {
        let mut s = session();
        let mut r = Recorder::default();
        let (tx, rx) = mpsc::channel(1);
        tx.send(Ok(b"xqy".to_vec())).await.unwrap();
        s.run(rx, &mut r).await.unwrap();
        assert_eq!(
            r.keys,
            vec![InputEvent::Key(Key(b'x')), InputEvent::Key(Key(b'q'))]
        );
        drop(tx);
    }

    #[tokio::test]
    async fn run_surfaces_read_errors() {
        let mut s = session();
        let mut r = Recorder::default();
        let (tx, rx) = mpsc::channel(1);
        tx.send(Err(io::Error::other("gone"))).await.unwrap();
        assert!(matches!(s.run(rx, &mut r).await, Err(TermError::Io(_))));
    }

    #[test]
    fn reader_thread_forwards_until_eof() {
        let mut rx = spawn_reader(io::Cursor::new(b"abc".to_vec()));
        let mut received = Vec::new();
        while let Some(chunk) = rx.blocking_recv() {
            received.extend(chunk.unwrap());
        }
        assert_eq!(received, b"abc");
    }

    #[test]
    fn reader_thread_stops_after_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("broken"))
            }
        }
        let mut rx = spawn_reader(Broken);
        assert!(rx.blocking_recv().unwrap().is_err());
        assert!(rx.blocking_recv().is_none());
    }
}
