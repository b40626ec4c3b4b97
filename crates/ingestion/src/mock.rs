//! Scripted 数据源
//!
//! 用于无真实解码器环境的测试：按预设顺序返回数据块。

use std::collections::VecDeque;
use std::io;

use bytes::Bytes;
use tracing::trace;

use crate::source::ChunkSource;

#[derive(Debug)]
enum Step {
    Chunk(Bytes),
    Fail(io::ErrorKind),
}

/// What the feed does once the script is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Exhausted {
    /// Report remote close (empty chunk)
    #[default]
    Close,
    /// Block forever, like a silent but open connection
    Stall,
}

/// Scripted 数据源
///
/// 依次返回预设的数据块或 IO 错误，脚本耗尽后返回空块（远端关闭）。
#[derive(Debug, Default)]
pub struct ScriptedFeed {
    steps: VecDeque<Step>,
    exhausted: Exhausted,
    reads: usize,
}

impl ScriptedFeed {
    /// 创建空脚本
    pub fn new() -> Self {
        Self::default()
    }

    /// 从一组数据块创建
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        chunks.into_iter().fold(Self::new(), |feed, c| feed.chunk(c))
    }

    /// 追加一个数据块
    pub fn chunk(mut self, data: impl Into<Bytes>) -> Self {
        self.steps.push_back(Step::Chunk(data.into()));
        self
    }

    /// 追加一次读取失败
    pub fn fail(mut self, kind: io::ErrorKind) -> Self {
        self.steps.push_back(Step::Fail(kind));
        self
    }

    /// 脚本耗尽后永久阻塞（模拟静默连接）
    pub fn stall_when_exhausted(mut self) -> Self {
        self.exhausted = Exhausted::Stall;
        self
    }

    /// 已执行的读取次数
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl ChunkSource for ScriptedFeed {
    fn origin(&self) -> &str {
        "scripted"
    }

    async fn read_chunk(&mut self) -> io::Result<Bytes> {
        self.reads += 1;
        match self.steps.pop_front() {
            Some(Step::Chunk(data)) => {
                trace!(len = data.len(), "scripted chunk");
                Ok(data)
            }
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            None => match self.exhausted {
                Exhausted::Close => Ok(Bytes::new()),
                Exhausted::Stall => std::future::pending().await,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_order() {
        let mut feed = ScriptedFeed::new()
            .chunk("a")
            .fail(io::ErrorKind::ConnectionReset)
            .chunk("b");

        assert_eq!(&feed.read_chunk().await.unwrap()[..], b"a");
        assert_eq!(
            feed.read_chunk().await.unwrap_err().kind(),
            io::ErrorKind::ConnectionReset
        );
        assert_eq!(&feed.read_chunk().await.unwrap()[..], b"b");
        assert!(feed.read_chunk().await.unwrap().is_empty());
        assert_eq!(feed.reads(), 4);
    }

    #[tokio::test]
    async fn test_stall_when_exhausted() {
        let mut feed = ScriptedFeed::from_chunks(["x"]).stall_when_exhausted();
        assert_eq!(&feed.read_chunk().await.unwrap()[..], b"x");

        let stalled =
            tokio::time::timeout(std::time::Duration::from_millis(20), feed.read_chunk()).await;
        assert!(stalled.is_err());
    }
}
