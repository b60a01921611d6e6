//! Connection listener.
//!
//! Serves one inbound connection at a time. Each socket read is treated as
//! exactly one message and handed to the dispatcher before the next read.
//! Control events (refresh, shutdown) are handled in the same loop, so they
//! can interrupt a blocked accept or read without sharing the registry.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use padwatch_core::{Dispatcher, StatusSink};

use crate::control::{ControlEvent, ControlReceiver};

/// Only one pending connection is queued while another is being served.
const LISTEN_BACKLOG: i32 = 1;

enum State {
    Accepting,
    Serving { stream: TcpStream, peer: SocketAddr },
    Closed,
}

pub struct ConnectionListener<S> {
    listener: TcpListener,
    dispatcher: Dispatcher<S>,
    control: ControlReceiver,
    read_buffer: usize,
}

impl<S: StatusSink> ConnectionListener<S> {
    /// Bind the listening socket. Must be called inside a tokio runtime.
    pub fn bind(
        addr: SocketAddr,
        read_buffer: usize,
        sink: S,
        control: ControlReceiver,
    ) -> Result<Self> {
        let socket = make_listener_socket(addr)
            .with_context(|| format!("failed to create listener socket on {addr}"))?;
        let listener =
            TcpListener::from_std(socket).context("failed to convert to tokio TcpListener")?;

        Ok(Self {
            listener,
            dispatcher: Dispatcher::new(sink),
            control,
            read_buffer: read_buffer.max(1),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context("listener has no local address")
    }

    /// Accept and serve connections until shutdown is requested or the
    /// control channel closes. Returns the dispatcher with its final state.
    pub async fn run(mut self) -> Dispatcher<S> {
        let mut buf = vec![0u8; self.read_buffer];
        let mut state = State::Accepting;

        tracing::info!(addr = ?self.listener.local_addr().ok(), "listener starting");

        loop {
            state = match state {
                State::Accepting => self.accept().await,
                State::Serving { stream, peer } => self.serve(stream, peer, &mut buf).await,
                State::Closed => break,
            };
        }

        tracing::info!("listener stopped");
        self.dispatcher
    }

    async fn accept(&mut self) -> State {
        tracing::debug!("accepting connections");

        tokio::select! {
            event = self.control.recv() => {
                if self.on_control(event) {
                    return State::Closed;
                }
                State::Accepting
            }

            accepted = self.listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::info!(%peer, "connection accepted");
                    State::Serving { stream, peer }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    State::Accepting
                }
            }
        }
    }

    async fn serve(&mut self, mut stream: TcpStream, peer: SocketAddr, buf: &mut [u8]) -> State {
        tokio::select! {
            event = self.control.recv() => {
                if self.on_control(event) {
                    tracing::info!(%peer, "closing connection");
                    if let Err(e) = stream.shutdown().await {
                        tracing::debug!(error = %e, "connection shutdown failed");
                    }
                    return State::Closed;
                }
                State::Serving { stream, peer }
            }

            read = stream.read(buf) => match read {
                Ok(0) => {
                    tracing::info!(%peer, "peer detached");
                    State::Accepting
                }
                Ok(n) => {
                    let chunk = &buf[..n];
                    tracing::debug!(%peer, data = ?String::from_utf8_lossy(chunk), "got data");
                    self.dispatcher.process(chunk);
                    State::Serving { stream, peer }
                }
                Err(e) => {
                    tracing::warn!(%peer, error = %e, "read failed, dropping connection");
                    State::Accepting
                }
            }
        }
    }

    /// Handle one control event. Returns true when the listener should stop.
    fn on_control(&mut self, event: Option<ControlEvent>) -> bool {
        match event {
            Some(ControlEvent::Refresh) => {
                tracing::debug!("status refresh requested");
                self.dispatcher.refresh();
                false
            }
            Some(ControlEvent::Reserved) => {
                tracing::debug!("reserved control event, ignoring");
                false
            }
            Some(ControlEvent::Shutdown) => {
                tracing::info!("shutdown requested");
                true
            }
            None => {
                tracing::info!("control channel closed, shutting down");
                true
            }
        }
    }
}

fn make_listener_socket(addr: SocketAddr) -> Result<std::net::TcpListener> {
    let socket =
        Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP)).context("socket()")?;

    socket.set_reuse_address(true).context("SO_REUSEADDR")?;
    socket.set_nonblocking(true).context("set_nonblocking")?;
    socket.bind(&addr.into()).context("bind()")?;
    socket.listen(LISTEN_BACKLOG).context("listen()")?;

    Ok(socket.into())
}
