//! Capture errors.

use std::ffi::NulError;

use thiserror::Error;

/// Errors reported by the capture binding.
#[derive(Debug, Error)]
pub enum PcapError {
    /// Message reported by libpcap
    #[error("{0}")]
    Pcap(String),

    #[error("No valid interfaces to open")]
    NoDevices,

    /// A live capture's read timeout expired with no packet
    #[error("timeout expired while waiting for packets")]
    Timeout,

    /// The packet loop was stopped by the callback
    #[error("packet loop interrupted")]
    Interrupted,

    /// A header field does not fit the native `pcap_pkthdr`, the
    /// microseconds are out of range, or the packet is shorter than `caplen`
    #[error("invalid packet header")]
    InvalidHeader,

    #[error("argument contains an interior NUL byte")]
    Nul(#[from] NulError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_messages() {
        assert_eq!(PcapError::NoDevices.to_string(), "No valid interfaces to open");
        assert_eq!(
            PcapError::Pcap("eth9: No such device exists".to_string()).to_string(),
            "eth9: No such device exists"
        );

        let nul = CString::new("eth\0").unwrap_err();
        assert!(matches!(PcapError::from(nul), PcapError::Nul(_)));
    }
}
