use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::io;

use async_trait::async_trait;
use futures_util::Stream as FuturesStream;
use libp2p::{PeerId, Stream as P2pStream};
use libp2p_stream::IncomingStreams as P2pIncomingStreams;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tokio_util::compat::{Compat, FuturesAsyncReadCompatExt};

use crate::stack::ProtocolStream;

#[derive(Debug)]
pub struct Stream {
    inner: Option<Compat<P2pStream>>,
    write_closed: bool,
}

impl Stream {
    #[must_use]
    pub fn new(stream: P2pStream) -> Self {
        Self {
            inner: Some(stream.compat()),
            write_closed: false,
        }
    }

    fn inner(&mut self) -> io::Result<&mut Compat<P2pStream>> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "stream is closed"))
    }
}

async fn with_deadline<T>(
    deadline: Instant,
    future: impl Future<Output = io::Result<T>> + Send,
) -> io::Result<T> {
    timeout_at(deadline, future).await.unwrap_or_else(|_| {
        Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "stream deadline exceeded",
        ))
    })
}

#[async_trait]
impl ProtocolStream for Stream {
    async fn write_all(&mut self, data: &[u8], deadline: Instant) -> io::Result<()> {
        if self.write_closed && self.inner.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write side already closed",
            ));
        }

        let inner = self.inner()?;

        with_deadline(deadline, async move {
            inner.write_all(data).await?;
            inner.flush().await
        })
        .await
    }

    async fn close_write(&mut self, deadline: Instant) -> io::Result<()> {
        if self.write_closed {
            return Ok(());
        }

        let inner = self.inner()?;

        with_deadline(deadline, inner.shutdown()).await?;

        self.write_closed = true;

        Ok(())
    }

    async fn read_to_end(&mut self, deadline: Instant, max_len: usize) -> io::Result<Vec<u8>> {
        let inner = self.inner()?;

        // One byte past the cap is enough to tell an oversized response apart.
        let limit = u64::try_from(max_len)
            .unwrap_or(u64::MAX)
            .saturating_add(1);

        let mut reader = inner.take(limit);
        let mut response = Vec::new();

        let _read = with_deadline(deadline, reader.read_to_end(&mut response)).await?;

        if response.len() > max_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("response exceeds {max_len} bytes"),
            ));
        }

        Ok(response)
    }

    async fn close(&mut self) -> io::Result<()> {
        self.write_closed = true;
        drop(self.inner.take());

        Ok(())
    }
}

/// Inbound streams for a protocol registered with
/// [`NetworkClient::accept`](crate::NetworkClient::accept).
pub struct IncomingStreams {
    inner: P2pIncomingStreams,
}

impl IncomingStreams {
    pub(crate) const fn new(inner: P2pIncomingStreams) -> Self {
        Self { inner }
    }
}

impl core::fmt::Debug for IncomingStreams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IncomingStreams").finish_non_exhaustive()
    }
}

impl FuturesStream for IncomingStreams {
    type Item = (PeerId, Stream);

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|item| item.map(|(peer_id, stream)| (peer_id, Stream::new(stream))))
    }
}
