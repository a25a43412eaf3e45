//! Controller Connection
//!
//! Owns the TCP stream and reassembles response packets from it.

use std::io::{self, BufWriter, Read};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use bytes::BytesMut;

use crate::config::Config;
use crate::error::{CncError, Result};
use crate::protocol::{decode_response, frame_length, write_request, Request, Response};

/// Bytes requested from the socket per read
const READ_CHUNK: usize = 4096;

/// A TCP connection to one controller
#[derive(Debug)]
pub struct Connection {
    /// Read half; responses are reassembled in `buffer`
    reader: TcpStream,

    /// Write half (buffered so a packet leaves in one write)
    writer: BufWriter<TcpStream>,

    /// Received bytes not yet consumed by a decoded response
    buffer: BytesMut,

    /// Largest `total_length` accepted
    max_response_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Resolve and connect to the configured controller
    pub fn open(config: &Config) -> Result<Self> {
        let addr = config.addr();
        let mut last_err = None;

        for socket_addr in addr.to_socket_addrs()? {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&socket_addr, timeout),
                None => TcpStream::connect(socket_addr),
            };

            match attempt {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", socket_addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} did not resolve to any address", addr),
                )
            })
            .into())
    }

    /// Wrap an established stream
    ///
    /// Disables Nagle's algorithm and applies the configured timeouts.
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        let write_stream = stream.try_clone()?;

        Ok(Self {
            reader: stream,
            writer: BufWriter::new(write_stream),
            buffer: BytesMut::with_capacity(READ_CHUNK),
            max_response_size: config.max_response_size,
            peer_addr,
        })
    }

    /// Send one request
    pub fn send(&mut self, request_id: u16, request: &Request) -> Result<()> {
        tracing::trace!(
            "-> {} id={} func=0x{:04x} handle={} payload={}B",
            self.peer_addr,
            request_id,
            request.function_code,
            request.handle,
            request.payload.len()
        );
        write_request(&mut self.writer, request_id, request)
    }

    /// Receive exactly one response
    ///
    /// Blocks until a complete packet is buffered. Bytes that arrive after
    /// it stay buffered for the next call.
    pub fn receive(&mut self) -> Result<Response> {
        loop {
            if let Some(total_len) = frame_length(&self.buffer)? {
                if total_len > self.max_response_size {
                    return Err(CncError::Framing(format!(
                        "Response too large: {} bytes (max {})",
                        total_len, self.max_response_size
                    )));
                }

                if self.buffer.len() >= total_len {
                    let frame = self.buffer.split_to(total_len);
                    let response = decode_response(&frame)?;
                    tracing::trace!(
                        "<- {} id={} func=0x{:04x} code={} payload={}B",
                        self.peer_addr,
                        response.request_id(),
                        response.function_code(),
                        response.header.return_code,
                        response.payload.len()
                    );
                    return Ok(response);
                }
            }

            self.fill_buffer()?;
        }
    }

    /// Send a request and wait for its response
    pub fn round_trip(&mut self, request_id: u16, request: &Request) -> Result<Response> {
        self.send(request_id, request)?;
        self.receive()
    }

    fn fill_buffer(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "{} closed the connection with {} bytes pending",
                            self.peer_addr,
                            self.buffer.len()
                        ),
                    )
                    .into())
                }
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Number of received bytes not yet consumed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Tear the socket down
    pub fn shutdown(self) {
        if let Err(e) = self.reader.shutdown(Shutdown::Both) {
            // Already reset by the peer
            tracing::debug!("Shutdown of {} reported: {}", self.peer_addr, e);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
