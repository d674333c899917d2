//! IEC 60870-5-104 connection engine.
//!
//! A [`Connection`] owns one byte stream and runs four tasks on it:
//!
//! - reader: decodes APDUs and drives the state machine
//! - writer: the only path to the wire, fed by an unbounded channel
//! - supervisor: sleeps until the next t1/t2/t3 deadline
//! - dispatcher: delivers listener callbacks one at a time
//!
//! Sequence counters, timers and link state live behind one short-held
//! mutex. Frames are queued to the writer while that lock is held, so wire
//! order always matches sequence order.

use std::fmt;
use std::future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, oneshot, watch, Notify};
use tokio::time::Instant;
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::codec::{Apdu, Iec104Codec};
use crate::config::ConnectionSettings;
use crate::dispatch::{ConnectionEvent, ConnectionEventListener, Dispatcher};
use crate::error::{Iec104Error, Result, TimeoutKind};
use crate::sequence::SequenceState;
use crate::timer::{Timer, TimerManager};
use crate::types::{
    Apci, Asdu, AsduCodec, Cot, CustomTypeDecoder, TypeCode, UFunction, MAX_ASDU_LENGTH,
};

/// Identifier of a connection, unique per generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out increasing [`ConnectionId`]s, starting at 1.
#[derive(Debug)]
pub struct ConnectionIdGenerator {
    next: AtomicU64,
}

impl Default for ConnectionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionIdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> ConnectionId {
        ConnectionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Data transfer state of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// Only U-frames are allowed
    Stopped,
    /// Full I/S/U traffic
    Started,
}

/// Handle to a running connection. Cheap to clone.
///
/// The background tasks keep running until the connection closes, either
/// through [`Connection::close`], a protocol error or the peer going away.
/// Dropping every handle does not close the connection.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    id: ConnectionId,
    settings: ConnectionSettings,
    asdu_codec: AsduCodec,
    shared: Mutex<Shared>,
    outbound: mpsc::UnboundedSender<Apdu>,
    dispatcher: Dispatcher,
    /// Window space freed, link stopped or connection closed
    window: Notify,
    /// Timer table changed; wakes the supervisor
    timers_changed: Notify,
    shutdown: watch::Sender<bool>,
}

struct Shared {
    link: LinkState,
    closed: Option<Iec104Error>,
    seq: SequenceState,
    timers: TimerManager,
    /// Local STARTDT or STOPDT activation waiting for its confirmation
    handshake: Option<PendingHandshake>,
    /// Accepting side waiting for the peer's STARTDT act
    start_waiter: Option<oneshot::Sender<Result<()>>>,
    /// Peer's STARTDT act received before anyone waited for it
    start_requested: bool,
    /// Send instant of an unconfirmed TESTFR act
    test_sent: Option<Instant>,
    confirmations: Vec<PendingConfirmation>,
    next_confirmation: u64,
}

struct PendingHandshake {
    function: UFunction,
    sent: Instant,
    reply: oneshot::Sender<Result<()>>,
}

struct PendingConfirmation {
    id: u64,
    type_code: TypeCode,
    common_address: u16,
    address: Option<u32>,
    reply: oneshot::Sender<Asdu>,
}

impl PendingConfirmation {
    fn matches(&self, asdu: &Asdu) -> bool {
        matches!(asdu.cot, Cot::ActivationConfirm | Cot::DeactivationConfirm)
            && asdu.type_code == self.type_code
            && asdu.common_address == self.common_address
            && asdu.first_address() == self.address
    }
}

impl Connection {
    /// Wrap `io` into a connection in STOPPED state.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new<T>(io: T, settings: ConnectionSettings, id: ConnectionId) -> Result<Self>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        settings.validate()?;
        let asdu_codec = AsduCodec::new(&settings);
        Ok(Self::spawn(io, settings, id, asdu_codec))
    }

    /// Like [`Connection::new`] with a decoder for reserved and private type codes.
    pub fn with_custom_decoder<T>(
        io: T,
        settings: ConnectionSettings,
        id: ConnectionId,
        decoder: Arc<dyn CustomTypeDecoder>,
    ) -> Result<Self>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        settings.validate()?;
        let asdu_codec = AsduCodec::new(&settings).with_custom_decoder(decoder);
        Ok(Self::spawn(io, settings, id, asdu_codec))
    }

    fn spawn<T>(io: T, settings: ConnectionSettings, id: ConnectionId, asdu_codec: AsduCodec) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (read_half, write_half) = tokio::io::split(io);
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown, _) = watch::channel(false);

        let inner = Arc::new(Inner {
            id,
            shared: Mutex::new(Shared {
                link: LinkState::Stopped,
                closed: None,
                seq: SequenceState::new(settings.k, settings.w),
                timers: TimerManager::new(),
                handshake: None,
                start_waiter: None,
                start_requested: false,
                test_sent: None,
                confirmations: Vec::new(),
                next_confirmation: 0,
            }),
            settings,
            asdu_codec,
            outbound,
            dispatcher: Dispatcher::spawn(id),
            window: Notify::new(),
            timers_changed: Notify::new(),
            shutdown,
        });

        tokio::spawn(write_loop(
            inner.clone(),
            FramedWrite::new(write_half, Iec104Codec::new()),
            outbound_rx,
            inner.shutdown.subscribe(),
        ));
        tokio::spawn(read_loop(
            inner.clone(),
            FramedRead::new(read_half, Iec104Codec::new()),
            inner.shutdown.subscribe(),
        ));
        tokio::spawn(supervise(inner.clone(), inner.shutdown.subscribe()));

        tracing::debug!(connection = %id, "connection opened");
        Self { inner }
    }

    #[inline]
    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    #[inline]
    pub fn settings(&self) -> &ConnectionSettings {
        &self.inner.settings
    }

    pub fn is_closed(&self) -> bool {
        self.inner.shared.lock().closed.is_some()
    }

    pub fn is_data_transfer_started(&self) -> bool {
        let shared = self.inner.shared.lock();
        shared.closed.is_none() && shared.link == LinkState::Started
    }

    pub fn link_state(&self) -> LinkState {
        self.inner.shared.lock().link
    }

    /// Error that closed the connection, if closed.
    pub fn close_cause(&self) -> Option<Iec104Error> {
        self.inner.shared.lock().closed.clone()
    }

    /// Send STARTDT act and wait for its confirmation (initiating side).
    ///
    /// `listener` receives every event of this connection from now on.
    /// If no confirmation arrives within `timeout` the connection is closed
    /// with [`TimeoutKind::StartDt`].
    pub async fn start_data_transfer(
        &self,
        listener: Arc<dyn ConnectionEventListener>,
        timeout: Duration,
    ) -> Result<()> {
        let reply = {
            let mut shared = self.inner.shared.lock();
            self.inner.check_handshake_allowed(&shared)?;
            self.inner.dispatcher.register(listener);
            if shared.link == LinkState::Started {
                return Ok(());
            }
            self.inner.begin_handshake(&mut shared, UFunction::StartDtAct)
        };
        self.inner.await_handshake(reply, Some(timeout)).await
    }

    /// Wait for the peer's STARTDT act and confirm it (accepting side).
    ///
    /// An act that arrived before this call is confirmed immediately.
    pub async fn wait_for_start_dt(
        &self,
        listener: Arc<dyn ConnectionEventListener>,
        timeout: Duration,
    ) -> Result<()> {
        let reply = {
            let mut shared = self.inner.shared.lock();
            self.inner.check_handshake_allowed(&shared)?;
            if shared.start_waiter.is_some() {
                return Err(Iec104Error::protocol_static(
                    "already waiting for STARTDT act",
                ));
            }
            self.inner.dispatcher.register(listener);
            if shared.link == LinkState::Started {
                return Ok(());
            }
            if shared.start_requested {
                shared.start_requested = false;
                self.inner.confirm_start(&mut shared);
                return Ok(());
            }
            let (tx, rx) = oneshot::channel();
            shared.start_waiter = Some(tx);
            rx
        };
        self.inner.await_handshake(reply, Some(timeout)).await
    }

    /// Send STOPDT act and wait for its confirmation.
    ///
    /// The confirmation must arrive within t1.
    pub async fn stop_data_transfer(&self) -> Result<()> {
        let reply = {
            let mut shared = self.inner.shared.lock();
            self.inner.check_handshake_allowed(&shared)?;
            if shared.link == LinkState::Stopped {
                return Ok(());
            }
            self.inner.begin_handshake(&mut shared, UFunction::StopDtAct)
        };
        self.inner.await_handshake(reply, None).await
    }

    /// Send an ASDU as an I-frame.
    ///
    /// Returns once the frame is queued for the wire. Waits while k frames
    /// are unacknowledged. Fails with [`Iec104Error::NotStarted`] while data
    /// transfer is stopped, or with the close cause once closed.
    pub async fn send(&self, asdu: &Asdu) -> Result<()> {
        let payload = self.inner.asdu_codec.encode(asdu)?;
        if payload.len() > MAX_ASDU_LENGTH {
            return Err(Iec104Error::framing(format!(
                "ASDU of {} bytes exceeds {MAX_ASDU_LENGTH}",
                payload.len()
            )));
        }

        loop {
            let notified = self.inner.window.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut shared = self.inner.shared.lock();
                if let Some(cause) = &shared.closed {
                    return Err(cause.clone());
                }
                if shared.link != LinkState::Started {
                    return Err(Iec104Error::NotStarted);
                }
                if !shared.seq.window_full() {
                    self.inner.send_i_frame(&mut shared, payload);
                    return Ok(());
                }
                tracing::trace!(connection = %self.inner.id, "send window full");
            }

            notified.await;
        }
    }

    /// Send an ASDU and wait for its activation or deactivation confirmation.
    ///
    /// The confirmation is matched on type, common address and first object
    /// address and is returned here instead of going to the listener. If
    /// none arrives within the response timeout the result is
    /// [`Iec104Error::ResponseTimeout`] and the connection stays open.
    pub async fn send_and_confirm(&self, asdu: &Asdu) -> Result<Asdu> {
        let (tx, rx) = oneshot::channel();
        let id = {
            let mut shared = self.inner.shared.lock();
            let id = shared.next_confirmation;
            shared.next_confirmation += 1;
            shared.confirmations.push(PendingConfirmation {
                id,
                type_code: asdu.type_code,
                common_address: asdu.common_address,
                address: asdu.first_address(),
                reply: tx,
            });
            id
        };

        if let Err(err) = self.send(asdu).await {
            self.inner.forget_confirmation(id);
            return Err(err);
        }

        match tokio::time::timeout(self.inner.settings.response_timeout, rx).await {
            Ok(Ok(confirmation)) => Ok(confirmation),
            Ok(Err(_)) => Err(self.inner.close_cause()),
            Err(_) => {
                self.inner.forget_confirmation(id);
                tracing::debug!(connection = %self.inner.id, asdu = %asdu, "no confirmation received");
                Err(Iec104Error::ResponseTimeout)
            }
        }
    }

    /// Close the connection. Safe to call repeatedly and from any task.
    pub fn close(&self) {
        self.inner.close_with(Iec104Error::ConnectionClosed);
    }

    /// Resolve once the connection is closed, returning the cause.
    pub async fn closed(&self) -> Iec104Error {
        let mut shutdown = self.inner.shutdown.subscribe();
        let _ = shutdown.wait_for(|closed| *closed).await;
        self.inner.close_cause()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.shared.lock();
        f.debug_struct("Connection")
            .field("id", &self.inner.id)
            .field("link", &shared.link)
            .field("closed", &shared.closed)
            .finish()
    }
}

impl Inner {
    fn close_cause(&self) -> Iec104Error {
        self.shared
            .lock()
            .closed
            .clone()
            .unwrap_or(Iec104Error::ConnectionClosed)
    }

    fn check_handshake_allowed(&self, shared: &Shared) -> Result<()> {
        if let Some(cause) = &shared.closed {
            return Err(cause.clone());
        }
        if let Some(pending) = &shared.handshake {
            return Err(Iec104Error::ProtocolState(
                format!("{} still awaiting confirmation", pending.function).into(),
            ));
        }
        Ok(())
    }

    fn begin_handshake(
        &self,
        shared: &mut Shared,
        function: UFunction,
    ) -> oneshot::Receiver<Result<()>> {
        let (tx, rx) = oneshot::channel();
        shared.handshake = Some(PendingHandshake {
            function,
            sent: Instant::now(),
            reply: tx,
        });
        self.transmit(shared, Apdu::u_frame(function));
        if function == UFunction::StopDtAct {
            self.rearm_t1(shared);
        }
        rx
    }

    async fn await_handshake(
        &self,
        reply: oneshot::Receiver<Result<()>>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let Some(timeout) = timeout else {
            return reply.await.unwrap_or_else(|_| Err(self.close_cause()));
        };
        match tokio::time::timeout(timeout, reply).await {
            Ok(result) => result.unwrap_or_else(|_| Err(self.close_cause())),
            Err(_) => {
                let cause = Iec104Error::Timeout(TimeoutKind::StartDt);
                self.close_with(cause.clone());
                Err(self.close_cause())
            }
        }
    }

    fn forget_confirmation(&self, id: u64) {
        self.shared.lock().confirmations.retain(|p| p.id != id);
    }

    /// Queue a frame for the writer and restart the idle timer.
    fn transmit(&self, shared: &mut Shared, apdu: Apdu) {
        tracing::trace!(connection = %self.id, frame = %apdu, "send");
        if self.outbound.send(apdu).is_err() {
            return;
        }
        if shared.link == LinkState::Started {
            shared.timers.arm(Timer::T3, Instant::now() + self.settings.t3);
            self.timers_changed.notify_one();
        }
    }

    fn send_i_frame(&self, shared: &mut Shared, payload: bytes::Bytes) {
        let (ns, nr) = shared.seq.next_send(Instant::now());
        shared.timers.cancel(Timer::T2);
        self.transmit(shared, Apdu::i_frame(ns, nr, payload));
        self.rearm_t1(shared);
    }

    fn send_s_frame(&self, shared: &mut Shared) {
        let nr = shared.seq.ack_received();
        shared.timers.cancel(Timer::T2);
        self.transmit(shared, Apdu::s_frame(nr));
    }

    /// Arm t1 from the oldest outstanding acknowledgment, or cancel it.
    fn rearm_t1(&self, shared: &mut Shared) {
        let stop_sent = shared
            .handshake
            .as_ref()
            .filter(|h| h.function == UFunction::StopDtAct)
            .map(|h| h.sent);
        let oldest = [shared.seq.oldest_pending(), shared.test_sent, stop_sent]
            .into_iter()
            .flatten()
            .min();
        match oldest {
            Some(sent) => shared.timers.arm(Timer::T1, sent + self.settings.t1),
            None => shared.timers.cancel(Timer::T1),
        }
        self.timers_changed.notify_one();
    }

    fn enter_started(&self, shared: &mut Shared) {
        shared.link = LinkState::Started;
        shared
            .timers
            .arm(Timer::T3, Instant::now() + self.settings.t3);
        self.timers_changed.notify_one();
        tracing::debug!(connection = %self.id, "data transfer started");
        self.dispatcher
            .dispatch(ConnectionEvent::StateChanged(LinkState::Started));
    }

    fn enter_stopped(&self, shared: &mut Shared) {
        shared.link = LinkState::Stopped;
        shared.timers.cancel(Timer::T2);
        shared.timers.cancel(Timer::T3);
        self.timers_changed.notify_one();
        self.window.notify_waiters();
        tracing::debug!(connection = %self.id, "data transfer stopped");
        self.dispatcher
            .dispatch(ConnectionEvent::StateChanged(LinkState::Stopped));
    }

    fn confirm_start(&self, shared: &mut Shared) {
        self.transmit(shared, Apdu::u_frame(UFunction::StartDtCon));
        self.enter_started(shared);
    }

    fn apply_ack(&self, shared: &mut Shared, nr: u16) -> Result<()> {
        if shared.seq.acknowledge(nr)? > 0 {
            self.rearm_t1(shared);
            self.window.notify_waiters();
        }
        Ok(())
    }

    fn handle_apdu(&self, apdu: Apdu) -> Result<()> {
        let mut shared = self.shared.lock();
        if shared.closed.is_some() {
            return Ok(());
        }
        tracing::trace!(connection = %self.id, frame = %apdu, "recv");

        let now = Instant::now();
        if shared.link == LinkState::Started {
            shared.timers.arm(Timer::T3, now + self.settings.t3);
            self.timers_changed.notify_one();
        }

        let Apdu { apci, payload } = apdu;
        match apci {
            Apci::IFrame { send_seq, recv_seq } => {
                if shared.link != LinkState::Started {
                    return Err(Iec104Error::protocol_static(
                        "I-frame received while data transfer is stopped",
                    ));
                }
                self.apply_ack(&mut shared, recv_seq)?;
                let ack_due = shared.seq.receive(send_seq)?;
                let payload = payload
                    .ok_or_else(|| Iec104Error::framing_static("I-frame without ASDU"))?;
                let asdu = self.asdu_codec.decode(payload)?;

                if ack_due {
                    self.send_s_frame(&mut shared);
                } else if shared.timers.arm_if_idle(Timer::T2, now + self.settings.t2) {
                    self.timers_changed.notify_one();
                }

                match shared.confirmations.iter().position(|p| p.matches(&asdu)) {
                    Some(index) => {
                        let pending = shared.confirmations.remove(index);
                        let _ = pending.reply.send(asdu);
                    }
                    None => self.dispatcher.dispatch(ConnectionEvent::Asdu(asdu)),
                }
                Ok(())
            }
            Apci::SFrame { recv_seq } => {
                if shared.link != LinkState::Started {
                    return Err(Iec104Error::protocol_static(
                        "S-frame received while data transfer is stopped",
                    ));
                }
                self.apply_ack(&mut shared, recv_seq)
            }
            Apci::UFrame { function } => self.handle_u_frame(&mut shared, function),
        }
    }

    fn handle_u_frame(&self, shared: &mut Shared, function: UFunction) -> Result<()> {
        match function {
            UFunction::TestFrAct => {
                self.transmit(shared, Apdu::u_frame(UFunction::TestFrCon));
            }
            UFunction::TestFrCon => {
                if shared.test_sent.take().is_none() {
                    return Err(Iec104Error::protocol_static("unsolicited TESTFR con"));
                }
                self.rearm_t1(shared);
            }
            UFunction::StartDtAct => {
                if shared.link == LinkState::Started {
                    self.transmit(shared, Apdu::u_frame(UFunction::StartDtCon));
                } else if let Some(waiter) = shared.start_waiter.take() {
                    self.confirm_start(shared);
                    let _ = waiter.send(Ok(()));
                } else {
                    tracing::debug!(connection = %self.id, "STARTDT act queued until accepted");
                    shared.start_requested = true;
                }
            }
            UFunction::StartDtCon => match shared.handshake.take() {
                Some(pending) if pending.function == UFunction::StartDtAct => {
                    self.enter_started(shared);
                    let _ = pending.reply.send(Ok(()));
                }
                other => {
                    shared.handshake = other;
                    return Err(Iec104Error::protocol_static("unsolicited STARTDT con"));
                }
            },
            UFunction::StopDtAct => {
                if shared.seq.unacked_received() > 0 {
                    self.send_s_frame(shared);
                }
                self.transmit(shared, Apdu::u_frame(UFunction::StopDtCon));
                if shared.link == LinkState::Started {
                    self.enter_stopped(shared);
                }
            }
            UFunction::StopDtCon => match shared.handshake.take() {
                Some(pending) if pending.function == UFunction::StopDtAct => {
                    self.enter_stopped(shared);
                    self.rearm_t1(shared);
                    let _ = pending.reply.send(Ok(()));
                }
                other => {
                    shared.handshake = other;
                    return Err(Iec104Error::protocol_static("unsolicited STOPDT con"));
                }
            },
        }
        Ok(())
    }

    fn on_timers(&self, now: Instant) -> Result<()> {
        let mut shared = self.shared.lock();
        if shared.closed.is_some() {
            return Ok(());
        }
        for timer in shared.timers.take_expired(now) {
            match timer {
                Timer::T1 => return Err(Iec104Error::Timeout(TimeoutKind::T1)),
                Timer::T2 => {
                    if shared.seq.unacked_received() > 0 {
                        tracing::debug!(connection = %self.id, "t2 expired, acknowledging");
                        self.send_s_frame(&mut shared);
                    }
                }
                Timer::T3 => {
                    if shared.link == LinkState::Started && shared.test_sent.is_none() {
                        tracing::debug!(connection = %self.id, "t3 expired, testing link");
                        shared.test_sent = Some(now);
                        self.transmit(&mut shared, Apdu::u_frame(UFunction::TestFrAct));
                        self.rearm_t1(&mut shared);
                    }
                }
            }
        }
        Ok(())
    }

    fn close_with(&self, cause: Iec104Error) {
        {
            let mut shared = self.shared.lock();
            if shared.closed.is_some() {
                return;
            }
            if cause == Iec104Error::ConnectionClosed {
                tracing::debug!(connection = %self.id, "connection closed");
            } else {
                tracing::warn!(connection = %self.id, error = %cause, "connection closed");
            }

            shared.closed = Some(cause.clone());
            shared.timers.cancel_all();
            if let Some(pending) = shared.handshake.take() {
                let _ = pending.reply.send(Err(cause.clone()));
            }
            if let Some(waiter) = shared.start_waiter.take() {
                let _ = waiter.send(Err(cause.clone()));
            }
            shared.confirmations.clear();
            self.dispatcher.dispatch(ConnectionEvent::Closed(cause));
        }
        self.shutdown.send_replace(true);
        self.window.notify_waiters();
    }
}

async fn write_loop<T>(
    inner: Arc<Inner>,
    mut sink: FramedWrite<WriteHalf<T>, Iec104Codec>,
    mut outbound: mpsc::UnboundedReceiver<Apdu>,
    mut shutdown: watch::Receiver<bool>,
) where
    T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            apdu = outbound.recv() => {
                let Some(apdu) = apdu else { break };
                if let Err(err) = sink.send(apdu).await {
                    inner.close_with(err);
                    break;
                }
            }
        }
    }
    let _ = sink.close().await;
}

async fn read_loop<T>(
    inner: Arc<Inner>,
    mut stream: FramedRead<ReadHalf<T>, Iec104Codec>,
    mut shutdown: watch::Receiver<bool>,
) where
    T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    loop {
        let next = tokio::select! {
            _ = shutdown.changed() => break,
            next = stream.next() => next,
        };
        let result = match next {
            Some(Ok(apdu)) => inner.handle_apdu(apdu),
            Some(Err(err)) => Err(err),
            None => Err(Iec104Error::end_of_stream()),
        };
        if let Err(err) = result {
            inner.close_with(err);
            break;
        }
    }
}

async fn supervise(inner: Arc<Inner>, mut shutdown: watch::Receiver<bool>) {
    loop {
        let deadline = inner.shared.lock().timers.next_deadline();
        let sleep = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => future::pending().await,
            }
        };
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = inner.timers_changed.notified() => {}
            _ = sleep => {
                if let Err(err) = inner.on_timers(Instant::now()) {
                    inner.close_with(err);
                    break;
                }
            }
        }
    }
}
