//! ChunkSource - raw byte chunks from a feed
//!
//! A source hands out chunks of whatever size the transport delivers. An
//! empty chunk means the remote end closed; it is not an error.

use std::path::Path;

use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use crate::error::{IngestionError, Result};

/// Default maximum bytes per read
pub const DEFAULT_READ_SIZE: usize = 4096;

/// Raw chunk producer
#[trait_variant::make(ChunkSource: Send)]
pub trait LocalChunkSource {
    /// Human-readable origin (address or path), used in logs
    fn origin(&self) -> &str;

    /// Read the next chunk. An empty chunk signals the remote closed.
    async fn read_chunk(&mut self) -> std::io::Result<Bytes>;
}

/// Chunk source over any async byte reader
pub struct ReaderFeed<R> {
    origin: String,
    reader: R,
    read_size: usize,
}

/// Live SBS feed over TCP
pub type TcpFeed = ReaderFeed<TcpStream>;

/// Recorded SBS capture replayed from disk
pub type ReplayFeed = ReaderFeed<File>;

impl<R> ReaderFeed<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Wrap an existing reader
    pub fn new(origin: impl Into<String>, reader: R, read_size: usize) -> Self {
        Self {
            origin: origin.into(),
            reader,
            read_size: read_size.max(1),
        }
    }

    /// Give the underlying reader back
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl ReaderFeed<TcpStream> {
    /// Connect to an SBS feed. No retry: a failure here is fatal to startup.
    #[instrument(name = "tcp_feed_connect", skip(read_size))]
    pub async fn connect(host: &str, port: u16, read_size: usize) -> Result<Self> {
        let addr = format!("{host}:{port}");
        info!(addr = %addr, "Connecting to feed");

        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| IngestionError::Connect {
                addr: addr.clone(),
                source,
            })?;

        info!(addr = %addr, "Connected to feed");
        Ok(Self::new(addr, stream, read_size))
    }
}

impl ReaderFeed<File> {
    /// Open a recorded capture for replay
    #[instrument(name = "replay_feed_open", skip(read_size), fields(path = %path.display()))]
    pub async fn open(path: &Path, read_size: usize) -> Result<Self> {
        let file = File::open(path)
            .await
            .map_err(|source| IngestionError::OpenReplay {
                path: path.display().to_string(),
                source,
            })?;

        debug!(path = %path.display(), "Replay capture opened");
        Ok(Self::new(path.display().to_string(), file, read_size))
    }
}

impl<R> ChunkSource for ReaderFeed<R>
where
    R: AsyncRead + Unpin + Send,
{
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn read_chunk(&mut self) -> std::io::Result<Bytes> {
        let mut buf = BytesMut::zeroed(self.read_size);
        let n = self.reader.read(&mut buf).await?;
        buf.truncate(n);
        Ok(buf.freeze())
    }
}
