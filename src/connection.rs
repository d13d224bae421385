use crate::config::DspConfig;
use crate::error::{DspError, Result};
use crate::protocol::{check_well_formed, encode_frame, trim_frame, Request, FRAME_DELIMITER};
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// A single-use TCP connection to a DSP
///
/// Opened for one request and dropped (closing the socket) when the
/// request finishes, whichever way it finishes.
struct Connection<'a> {
    address: &'a str,
    config: &'a DspConfig,
    stream: BufReader<TcpStream>,
}

impl<'a> Connection<'a> {
    /// Dial the device's control port
    async fn open(address: &'a str, config: &'a DspConfig) -> Result<Connection<'a>> {
        tracing::debug!("Connecting to {}:{}", address, config.port);

        let stream = match timeout(
            config.connect_timeout(),
            TcpStream::connect((address, config.port)),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::error!("Failed to connect to {}: {}", address, e);
                return Err(DspError::Connection {
                    address: address.to_string(),
                    source: e,
                });
            }
            Err(_) => {
                tracing::error!("Timed out connecting to {}", address);
                return Err(DspError::Timeout {
                    address: address.to_string(),
                });
            }
        };

        Ok(Self {
            address,
            config,
            stream: BufReader::new(stream),
        })
    }

    /// Read one frame, returning it without the delimiter
    async fn read_frame(&mut self) -> Result<Vec<u8>> {
        let mut frame = Vec::new();
        let limit = self.config.max_frame_len as u64 + 1;
        let mut limited = (&mut self.stream).take(limit);

        let read = match timeout(
            self.config.read_timeout(),
            limited.read_until(FRAME_DELIMITER, &mut frame),
        )
        .await
        {
            Ok(read) => read,
            Err(_) => {
                tracing::error!("Timed out waiting for a frame from {}", self.address);
                return Err(DspError::Timeout {
                    address: self.address.to_string(),
                });
            }
        };

        match read {
            Ok(_) if frame.last() == Some(&FRAME_DELIMITER) => {
                Ok(trim_frame(&frame).to_vec())
            }
            Ok(n) if n as u64 >= limit => {
                tracing::error!("Frame from {} exceeds {} bytes", self.address, self.config.max_frame_len);
                Err(DspError::protocol(
                    self.address,
                    format!("frame exceeds {} bytes", self.config.max_frame_len),
                    &frame[..frame.len().min(64)],
                ))
            }
            Ok(_) => {
                tracing::error!("Connection to {} closed mid-frame", self.address);
                Err(self.io_error(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before frame delimiter",
                )))
            }
            Err(e) => {
                tracing::error!("Read from {} failed: {}", self.address, e);
                Err(self.io_error(e))
            }
        }
    }

    /// Write an already delimited frame
    async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let stream = self.stream.get_mut();
        let written = match stream.write_all(frame).await {
            Ok(()) => stream.flush().await,
            Err(e) => Err(e),
        };

        written.map_err(|e| {
            tracing::error!("Write to {} failed: {}", self.address, e);
            self.io_error(e)
        })
    }

    fn io_error(&self, source: io::Error) -> DspError {
        DspError::Connection {
            address: self.address.to_string(),
            source,
        }
    }
}

/// Perform one request/response round trip against the device
///
/// Drains the status frame the device pushes on every new connection
/// before writing, so the next frame read is the reply to `request`.
/// Returns the reply with its delimiter stripped.
pub(crate) async fn send_command(
    address: &str,
    config: &DspConfig,
    cancel: Option<&CancellationToken>,
    request: &Request,
) -> Result<Vec<u8>> {
    tracing::info!("Sending a {} request to {}", request.method(), address);

    let frame = encode_frame(request).map_err(|e| {
        tracing::error!("Invalid request, could not encode: {}", e);
        DspError::Encoding {
            address: address.to_string(),
            source: e,
        }
    })?;

    let round_trip = exchange(address, config, &frame);
    let reply = match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::error!("Request to {} was cancelled", address);
                    Err(DspError::Cancelled { address: address.to_string() })
                }
                reply = round_trip => reply,
            }
        }
        None => round_trip.await,
    }?;

    tracing::info!("Done with request to {}", address);
    Ok(reply)
}

async fn exchange(address: &str, config: &DspConfig, frame: &[u8]) -> Result<Vec<u8>> {
    let mut connection = Connection::open(address, config).await?;

    let greeting = connection.read_frame().await?;
    check_well_formed(address, &greeting)?;

    tracing::debug!("Sending: {}", String::from_utf8_lossy(trim_frame(frame)));
    connection.write_frame(frame).await?;

    let reply = connection.read_frame().await?;
    tracing::debug!("Received: {}", String::from_utf8_lossy(&reply));
    Ok(reply)
}
