//! Savefile writer.

use std::ptr::NonNull;

use super::error::PcapError;
use super::ffi;
use super::pkthdr::PacketHeader;

/// Writes packets to a savefile opened with [`Reader::dump_open`].
/// The file is closed on drop.
///
/// [`Reader::dump_open`]: super::Reader::dump_open
#[derive(Debug)]
pub struct Dumper {
    handle: NonNull<ffi::pcap_dumper_t>,
}

// A dumper is only a FILE* plus header state; it is not tied to the thread
// that opened it.
unsafe impl Send for Dumper {}

impl Dumper {
    pub(crate) fn new(handle: NonNull<ffi::pcap_dumper_t>) -> Self {
        Dumper { handle }
    }

    /// Append one packet.
    ///
    /// `data` must hold at least `header.caplen` bytes.
    pub fn dump(&mut self, header: &PacketHeader, data: &[u8]) -> Result<(), PcapError> {
        if (data.len() as u64) < u64::from(header.caplen) {
            return Err(PcapError::InvalidHeader);
        }
        let native = ffi::pcap_pkthdr::try_from(header)?;

        // SAFETY: handle is open; data covers caplen bytes
        unsafe {
            ffi::pcap_dump(self.handle.as_ptr().cast(), &native, data.as_ptr());
        }
        Ok(())
    }

    /// Flush buffered packets to disk.
    pub fn flush(&mut self) -> Result<(), PcapError> {
        // SAFETY: handle is open
        if unsafe { ffi::pcap_dump_flush(self.handle.as_ptr()) } != 0 {
            return Err(PcapError::Pcap("failed to flush savefile".to_string()));
        }
        Ok(())
    }
}

impl Drop for Dumper {
    fn drop(&mut self) {
        // SAFETY: opened by pcap_dump_open, closed once
        unsafe { ffi::pcap_dump_close(self.handle.as_ptr()) };
    }
}
