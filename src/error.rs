use core::fmt::Debug;
use core::fmt::Display;
use std::path::PathBuf;

pub enum Error {
    CaptureNotFound(PathBuf),
    PCap(pcap::Error),
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::PCap(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::CaptureNotFound(path) => {
                write!(f, "Capture file not found: {}", path.display())
            }
            Error::PCap(e) => write!(f, "PCap error: {e:?}"),
        }
    }
}

impl From<pcap::Error> for Error {
    fn from(e: pcap::Error) -> Self {
        Error::PCap(e)
    }
}
