//! Socket transport with `Content-Length` framing.
//!
//! The Debug Adapter Protocol frames every message the same way the language
//! server protocol does:
//! ```text
//! Content-Length: <length>\r\n
//! \r\n
//! <payload>
//! ```

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use tracing::debug;
use varplot_config::AdapterEndpoint;

use crate::errors::TransportError;

const TRANSPORT_TARGET: &str = "varplot_dap::transport";

type BoxedReader = Box<dyn Read + Send>;
type BoxedWriter = Box<dyn Write + Send>;

/// Reads and writes framed messages over a byte stream.
pub struct FramedTransport {
    reader: BufReader<BoxedReader>,
    writer: BufWriter<BoxedWriter>,
}

impl FramedTransport {
    /// Wraps an arbitrary reader/writer pair.
    #[must_use]
    pub fn new(reader: impl Read + Send + 'static, writer: impl Write + Send + 'static) -> Self {
        Self {
            reader: BufReader::new(Box::new(reader)),
            writer: BufWriter::new(Box::new(writer)),
        }
    }

    /// Connects to a debug adapter listening on `endpoint`.
    ///
    /// A zero `read_timeout` disables the read deadline.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] when the socket cannot be opened
    /// or configured.
    pub fn connect(
        endpoint: &AdapterEndpoint,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let timeout = (!read_timeout.is_zero()).then_some(read_timeout);
        let connect_error = |source| TransportError::Connect {
            endpoint: endpoint.to_string(),
            source,
        };
        debug!(target: TRANSPORT_TARGET, %endpoint, "connecting to debug adapter");
        match endpoint {
            AdapterEndpoint::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port)).map_err(connect_error)?;
                stream.set_read_timeout(timeout).map_err(connect_error)?;
                stream.set_nodelay(true).map_err(connect_error)?;
                let reader = stream.try_clone().map_err(connect_error)?;
                Ok(Self::new(reader, stream))
            }
            #[cfg(unix)]
            AdapterEndpoint::Unix { path } => {
                let stream = std::os::unix::net::UnixStream::connect(path.as_std_path())
                    .map_err(connect_error)?;
                stream.set_read_timeout(timeout).map_err(connect_error)?;
                let reader = stream.try_clone().map_err(connect_error)?;
                Ok(Self::new(reader, stream))
            }
            #[cfg(not(unix))]
            AdapterEndpoint::Unix { .. } => Err(connect_error(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "unix sockets are not available on this platform",
            ))),
        }
    }

    /// Sends a framed message.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Io` if writing to the stream fails.
    pub fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        let header = format!("Content-Length: {}\r\n\r\n", message.len());
        self.writer.write_all(header.as_bytes())?;
        self.writer.write_all(message)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Receives a framed message (blocks until complete).
    ///
    /// # Errors
    ///
    /// Returns `TransportError::MissingContentLength` if no Content-Length header is found.
    /// Returns `TransportError::Io` if reading from the stream fails.
    pub fn receive(&mut self) -> Result<Vec<u8>, TransportError> {
        let content_length = self.read_headers()?;
        let mut content = vec![0u8; content_length];
        self.reader.read_exact(&mut content)?;
        Ok(content)
    }

    fn read_headers(&mut self) -> Result<usize, TransportError> {
        let mut content_length: Option<usize> = None;

        loop {
            let mut line = String::new();
            let bytes_read = self.reader.read_line(&mut line)?;
            if bytes_read == 0 {
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed while reading headers",
                )));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }

            if let Some((name, value)) = trimmed.split_once(':')
                && name.trim().eq_ignore_ascii_case("content-length")
            {
                content_length = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| TransportError::InvalidHeader)?,
                );
            }
        }

        content_length.ok_or(TransportError::MissingContentLength)
    }
}

impl std::fmt::Debug for FramedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedTransport")
            .field("buffered", &self.reader.buffer().len())
            .finish_non_exhaustive()
    }
}
