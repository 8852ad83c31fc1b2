//! Server network layer: sequential TCP accept loop

use log::{debug, error, info, warn};
use shared::{decode, write_frame, GuessResult};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::error::ServiceError;
use crate::handler::handle_payload;
use crate::scorer::SimilarityScorer;

/// Scoring server owning the listener and the long-lived scorer.
///
/// Connections are served one at a time: accept, read one frame, score,
/// write one frame, close, and only then accept the next connection.
pub struct Server<S> {
    listener: TcpListener,
    scorer: S,
}

impl<S: SimilarityScorer> Server<S> {
    pub async fn bind<A: ToSocketAddrs>(addr: A, scorer: S) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);
        Ok(Server { listener, scorer })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Accept and serve connections until the task is dropped.
    pub async fn run(&self) -> io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => self.handle_connection(stream, peer).await,
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    /// Single failure boundary per connection.
    ///
    /// Errors are logged and the connection is closed without a response body.
    async fn handle_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        debug!("Connection from {}", peer);

        match self.serve(&mut stream).await {
            Ok(result) => info!(
                "Scored drawing from {}: predicted '{}', correct: {}, score: {}",
                peer, result.predicted_word, result.is_correct, result.score
            ),
            Err(e) => warn!(
                "Closing connection from {} after {} failure: {}",
                peer,
                e.kind(),
                e
            ),
        }
    }

    /// Read one request frame from `stream`, answer it and shut the write half.
    pub async fn serve<T>(&self, stream: &mut T) -> Result<GuessResult, ServiceError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let payload = decode(stream).await?;
        let (result, body) = handle_payload(&payload, &self.scorer)?;
        write_frame(stream, &body).await?;
        stream.shutdown().await?;
        Ok(result)
    }
}
