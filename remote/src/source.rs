use futures::{Stream, StreamExt};
use protocol::LandmarkFrame;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::decoder::FrameDecoder;
use crate::error::Error;

pub type Reader = Box<dyn AsyncRead + Send + Unpin>;

/// Where the pose estimator's landmark frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    /// Recorded session.
    File(PathBuf),
    /// Estimator streaming over TCP, `tcp:HOST:PORT`.
    Tcp(String),
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Source::Stdin);
        }
        if let Some(addr) = s.strip_prefix("tcp:") {
            if addr.is_empty() {
                return Err(Error::InvalidSource(s.to_string()));
            }
            return Ok(Source::Tcp(addr.to_string()));
        }
        if s.is_empty() {
            return Err(Error::InvalidSource(s.to_string()));
        }
        Ok(Source::File(PathBuf::from(s)))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => write!(f, "-"),
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Tcp(addr) => write!(f, "tcp:{addr}"),
        }
    }
}

impl Source {
    pub async fn open(&self) -> Result<Reader, Error> {
        let reader: std::io::Result<Reader> = match self {
            Source::Stdin => Ok(Box::new(tokio::io::stdin())),
            Source::File(path) => tokio::fs::File::open(path)
                .await
                .map(|f| Box::new(f) as Reader),
            Source::Tcp(addr) => tokio::net::TcpStream::connect(addr)
                .await
                .map(|s| Box::new(s) as Reader),
        };
        reader.map_err(|err| Error::MissingInputDevice {
            input: self.to_string(),
            err,
        })
    }
}

/// Landmark frames read from `reader`. A record that does not decode is
/// reported as [`Error::Decode`] and the stream continues with the next one.
pub fn frames<R>(reader: R) -> impl Stream<Item = Result<LandmarkFrame, Error>>
where
    R: AsyncRead + Unpin,
{
    FramedRead::new(reader, FrameDecoder::default()).map(|packet| {
        let packet = packet?;
        Ok(minicbor::decode::<LandmarkFrame>(&packet)?)
    })
}
