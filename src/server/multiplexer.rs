//! Single-threaded readiness loop.
//!
//! The listening socket and every client socket are registered with one
//! `mio::Poll`. The thread parks in `poll` until something is ready, then
//! services each ready socket synchronously. Sockets that finish, fail or
//! go quiet are marked closed during the pass and compacted out afterwards,
//! so slot positions never shift while events are being handled.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Registry, Token, Waker};
use tracing::{debug, error, info, trace, warn};

use crate::config::ServerConfig;
use crate::http::connection::{Connection, ReadOutcome};
use crate::router::Router;

const LISTENER: Token = Token(0);
const WAKER: Token = Token(1);
const FIRST_CLIENT: usize = 2;

/// Stops a running [`Multiplexer`] from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    waker: Arc<Waker>,
    stop: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) -> io::Result<()> {
        self.stop.store(true, Ordering::SeqCst);
        self.waker.wake()
    }
}

struct Settings {
    read_timeout: Duration,
    buffer_capacity: usize,
}

struct Tracked {
    token: Token,
    conn: Connection,
}

pub struct Multiplexer {
    poll: Poll,
    events: Events,
    listener: TcpListener,
    tracked: Vec<Tracked>,
    next_token: usize,
    waker: Arc<Waker>,
    stop: Arc<AtomicBool>,
    settings: Settings,
    scratch: Vec<u8>,
}

impl Multiplexer {
    pub fn new(mut listener: TcpListener, cfg: &ServerConfig) -> io::Result<Self> {
        let poll = Poll::new()?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKER)?);

        Ok(Self {
            poll,
            events: Events::with_capacity(cfg.max_events.max(1)),
            listener,
            tracked: Vec::new(),
            next_token: FIRST_CLIENT,
            waker,
            stop: Arc::new(AtomicBool::new(false)),
            settings: Settings {
                read_timeout: cfg.read_timeout(),
                buffer_capacity: cfg.initial_buffer_capacity.max(1),
            },
            scratch: vec![0; cfg.read_chunk_size.max(1)],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            waker: Arc::clone(&self.waker),
            stop: Arc::clone(&self.stop),
        }
    }

    /// Client sockets currently tracked.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Runs until a [`ShutdownHandle`] fires. Only a failing `poll` ends the
    /// loop with an error; per-socket failures just drop that socket.
    pub fn run(&mut self, router: &Router) -> io::Result<()> {
        while !self.stop.load(Ordering::SeqCst) {
            self.turn(router)?;
        }

        info!(open = self.tracked_count(), "Multiplexer stopping");
        for slot in &mut self.tracked {
            slot.conn.close();
        }
        self.sweep();
        Ok(())
    }

    /// One poll cycle: wait, service ready sockets, expire idle ones,
    /// compact the tracked set.
    pub fn turn(&mut self, router: &Router) -> io::Result<()> {
        let timeout = self.next_timeout(Instant::now());
        if let Err(e) = self.poll.poll(&mut self.events, timeout) {
            if e.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(e);
        }

        let ready: Vec<(Token, bool, bool)> = self
            .events
            .iter()
            .map(|event| {
                let readable = event.is_readable() || event.is_read_closed() || event.is_error();
                (event.token(), readable, event.is_writable())
            })
            .collect();

        for (token, readable, writable) in ready {
            match token {
                LISTENER => self.accept_all(),
                WAKER => trace!("Woken"),
                token => self.service(token, readable, writable, router),
            }
        }

        self.expire_idle(router);
        self.sweep();
        Ok(())
    }

    fn next_timeout(&self, now: Instant) -> Option<Duration> {
        self.tracked
            .iter()
            .map(|slot| {
                self.settings
                    .read_timeout
                    .saturating_sub(slot.conn.idle_for(now))
            })
            .min()
    }

    fn accept_all(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((mut stream, peer)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;

                    if let Err(e) = self
                        .poll
                        .registry()
                        .register(&mut stream, token, Interest::READABLE)
                    {
                        warn!(peer = %peer, error = %e, "Unable to register connection");
                        continue;
                    }

                    info!("Accepted connection from {}", peer);
                    self.tracked.push(Tracked {
                        token,
                        conn: Connection::new(stream, peer, self.settings.buffer_capacity),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "Unable to accept connection");
                    break;
                }
            }
        }
    }

    fn service(&mut self, token: Token, readable: bool, writable: bool, router: &Router) {
        let Some(slot) = self.tracked.iter_mut().find(|s| s.token == token) else {
            return;
        };
        let registry = self.poll.registry();

        if slot.conn.is_reading() && readable {
            match slot.conn.receive(&mut self.scratch) {
                Ok(ReadOutcome::Complete) => {
                    respond(registry, slot, router, &self.settings);
                }
                Ok(ReadOutcome::Pending) => {
                    let progress = slot.conn.progress();
                    trace!(
                        peer = %slot.conn.peer(),
                        buffered = slot.conn.buffered(),
                        header_complete = progress.header_complete(),
                        body = progress.body_received(slot.conn.buffered()),
                        expected = progress.expected_body(),
                        "Waiting for more request data"
                    );
                }
                Ok(ReadOutcome::Closed) => {
                    debug!(peer = %slot.conn.peer(), "Client disconnected");
                    slot.conn.close();
                }
                Err(e) => {
                    warn!(peer = %slot.conn.peer(), error = %e, "Receive failed");
                    slot.conn.close();
                }
            }
        } else if writable {
            flush(slot);
        }
    }

    fn expire_idle(&mut self, router: &Router) {
        let now = Instant::now();
        let registry = self.poll.registry();

        for slot in &mut self.tracked {
            if slot.conn.is_closed() || slot.conn.idle_for(now) < self.settings.read_timeout {
                continue;
            }

            if !slot.conn.is_reading() {
                warn!(peer = %slot.conn.peer(), "Write stalled, dropping connection");
                slot.conn.close();
            } else if slot.conn.buffered() == 0 {
                debug!(peer = %slot.conn.peer(), "Idle connection timed out");
                slot.conn.close();
            } else {
                let progress = slot.conn.progress();
                debug!(
                    peer = %slot.conn.peer(),
                    buffered = slot.conn.buffered(),
                    body = progress.body_received(slot.conn.buffered()),
                    expected = progress.expected_body(),
                    "Read timed out, handling what arrived"
                );
                respond(registry, slot, router, &self.settings);
            }
        }
    }

    /// Drops every closed slot, deregistering its socket.
    fn sweep(&mut self) {
        let registry = self.poll.registry();
        self.tracked.retain_mut(|slot| {
            if !slot.conn.is_closed() {
                return true;
            }
            if let Err(e) = registry.deregister(slot.conn.stream_mut()) {
                debug!(peer = %slot.conn.peer(), error = %e, "Deregister failed");
            }
            trace!(peer = %slot.conn.peer(), "Closed connection");
            false
        });
    }
}

/// Parses the buffered request, routes it and starts writing the response.
fn respond(registry: &Registry, slot: &mut Tracked, router: &Router, settings: &Settings) {
    let conn = &mut slot.conn;

    let request = match conn.take_request() {
        Ok(request) => request,
        Err(e) => {
            warn!(peer = %conn.peer(), error = %e, "Malformed request, closing");
            conn.close();
            return;
        }
    };

    info!(
        peer = %conn.peer(),
        method = %request.method,
        path = %request.path,
        "Request"
    );

    let response = router.dispatch(&request);
    if let Err(e) = conn.start_response(&response, settings.buffer_capacity) {
        error!(peer = %conn.peer(), error = %e, "Unable to serialize response");
        conn.close();
        return;
    }

    if flush(slot) {
        return;
    }

    if let Err(e) = registry.reregister(slot.conn.stream_mut(), slot.token, Interest::WRITABLE) {
        warn!(peer = %slot.conn.peer(), error = %e, "Unable to wait for writability");
        slot.conn.close();
    }
}

/// Writes pending response bytes. Returns `true` when the slot is done.
fn flush(slot: &mut Tracked) -> bool {
    match slot.conn.flush() {
        Ok(done) => done,
        Err(e) => {
            warn!(peer = %slot.conn.peer(), error = %e, "Unable to send response");
            slot.conn.close();
            true
        }
    }
}

