//! Packet headers.

use super::error::PcapError;
use super::ffi;

const USEC_PER_SEC: i64 = 1_000_000;

/// Per-packet metadata: capture timestamp, captured length and length on
/// the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PacketHeader {
    pub ts_sec: i64,
    pub ts_usec: i64,
    pub caplen: u32,
    pub len: u32,
}

impl PacketHeader {
    pub fn new(ts_sec: i64, ts_usec: i64, caplen: u32, len: u32) -> Self {
        PacketHeader {
            ts_sec,
            ts_usec,
            caplen,
            len,
        }
    }

    /// Timestamp as (seconds, microseconds).
    pub fn ts(&self) -> (i64, i64) {
        (self.ts_sec, self.ts_usec)
    }

    /// Bytes actually captured.
    pub fn caplen(&self) -> u32 {
        self.caplen
    }

    /// Length of the packet on the wire.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<&ffi::pcap_pkthdr> for PacketHeader {
    fn from(h: &ffi::pcap_pkthdr) -> Self {
        PacketHeader {
            ts_sec: i64::from(h.ts.tv_sec),
            ts_usec: i64::from(h.ts.tv_usec),
            caplen: h.caplen,
            len: h.len,
        }
    }
}

impl TryFrom<&PacketHeader> for ffi::pcap_pkthdr {
    type Error = PcapError;

    fn try_from(h: &PacketHeader) -> Result<Self, Self::Error> {
        if !(0..USEC_PER_SEC).contains(&h.ts_usec) {
            return Err(PcapError::InvalidHeader);
        }
        let tv_sec = ffi::time_t::try_from(h.ts_sec).map_err(|_| PcapError::InvalidHeader)?;
        let tv_usec = ffi::suseconds_t::try_from(h.ts_usec).map_err(|_| PcapError::InvalidHeader)?;

        Ok(ffi::pcap_pkthdr {
            ts: ffi::timeval { tv_sec, tv_usec },
            caplen: h.caplen,
            len: h.len,
        })
    }
}
