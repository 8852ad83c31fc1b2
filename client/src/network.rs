//! One-shot client for the drawing scoring service.

use log::debug;
use shared::{decode, write_frame, DrawingRequest, FrameError, GuessResult};
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("framing error: {0}")]
    Frame(#[from] FrameError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The service closed the connection without answering. This is how it
    /// reports any failure while handling the request.
    #[error("service closed the connection without a response")]
    NoResponse,

    #[error("failed to read drawing file: {0}")]
    Drawing(#[from] io::Error),
}

/// Map a framing failure caused by the peer going away to [`ClientError::NoResponse`].
fn closed_or(err: FrameError) -> ClientError {
    match err {
        FrameError::TruncatedHeader { received: 0 } => ClientError::NoResponse,
        FrameError::Io(ref e)
            if matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) =>
        {
            ClientError::NoResponse
        }
        other => other.into(),
    }
}

/// Send one request frame over `stream` and read the single response frame.
pub async fn exchange<T>(
    stream: &mut T,
    request: &DrawingRequest,
) -> Result<GuessResult, ClientError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let body = request.to_json()?;
    debug!(
        "Sending {} stroke events ({} bytes)",
        request.drawing.len(),
        body.len()
    );
    write_frame(stream, &body).await.map_err(closed_or)?;

    let response = decode(stream).await.map_err(closed_or)?;
    Ok(GuessResult::from_json(&response)?)
}

pub struct GuessClient {
    addr: String,
}

impl GuessClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Submit one drawing and wait for the verdict.
    pub async fn request(&self, request: &DrawingRequest) -> Result<GuessResult, ClientError> {
        let mut stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: self.addr.clone(),
                source,
            })?;
        debug!("Connected to {}", self.addr);

        exchange(&mut stream, request).await
    }
}
