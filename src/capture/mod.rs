//! Packet capture through libpcap.
//!
//! The header, link-type and error types are always available. Opening
//! devices and savefiles, compiling filters and writing dumps need the
//! `capture` feature, which links the system libpcap (wpcap on Windows).

pub mod bpf;
mod error;
mod ffi;
mod linktype;
mod pkthdr;

#[cfg(feature = "capture")]
mod device;
#[cfg(feature = "capture")]
mod dumper;
#[cfg(feature = "capture")]
mod reader;

pub use bpf::BpfInstruction;
pub use error::PcapError;
pub use linktype::Linktype;
pub use pkthdr::PacketHeader;

#[cfg(feature = "capture")]
pub use bpf::{compile, BpfProgram};
#[cfg(feature = "capture")]
pub use device::{findalldevs, lookupdev, Device};
#[cfg(feature = "capture")]
pub use dumper::Dumper;
#[cfg(feature = "capture")]
pub use reader::{open_live, open_offline, Reader};

/// Version string of the linked libpcap.
#[cfg(feature = "capture")]
pub fn lib_version() -> String {
    // SAFETY: returns a static string
    unsafe { ffi::message(ffi::pcap_lib_version()) }
}

#[cfg(all(test, feature = "capture"))]
mod tests {
    use super::*;
    use std::ops::ControlFlow;
    use tempfile::TempDir;

    fn ethernet_frame(ethertype: u16) -> Vec<u8> {
        let mut frame = vec![0u8; 60];
        frame[12..14].copy_from_slice(&ethertype.to_be_bytes());
        frame
    }

    /// Write frames through the dumper of a handle opened on an empty file.
    fn write_savefile(dir: &TempDir, frames: &[Vec<u8>]) -> std::path::PathBuf {
        let path = dir.path().join("sample.pcap");

        let seed = dir.path().join("seed.pcap");
        std::fs::write(&seed, empty_savefile()).unwrap();
        let mut reader = open_offline(&seed).unwrap();

        let mut dumper = reader.dump_open(&path).unwrap();
        for (i, frame) in frames.iter().enumerate() {
            let header = PacketHeader::new(1_000 + i as i64, 0, frame.len() as u32, frame.len() as u32);
            dumper.dump(&header, frame).unwrap();
        }
        dumper.flush().unwrap();
        path
    }

    /// Global header of an empty Ethernet savefile (little endian).
    fn empty_savefile() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0xa1b2c3d4u32.to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&4u16.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&65535u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf
    }

    #[test]
    fn test_offline_next_packet() {
        let dir = TempDir::new().unwrap();
        let path = write_savefile(&dir, &[ethernet_frame(0x0800), ethernet_frame(0x86dd)]);

        let mut reader = open_offline(&path).unwrap();
        assert_eq!(reader.datalink(), Linktype::EN10MB);
        assert_eq!(reader.net(), std::net::Ipv4Addr::UNSPECIFIED);

        let (header, packet) = reader.next_packet().unwrap().unwrap();
        assert_eq!(header.ts_sec, 1_000);
        assert_eq!(header.caplen(), 60);
        assert_eq!(packet.len(), 60);

        assert!(reader.next_packet().unwrap().is_some());
        assert!(reader.next_packet().unwrap().is_none());
    }

    #[test]
    fn test_filter_and_dispatch() {
        let dir = TempDir::new().unwrap();
        let frames = [ethernet_frame(0x0800), ethernet_frame(0x86dd), ethernet_frame(0x0800)];
        let path = write_savefile(&dir, &frames);

        let mut reader = open_offline(&path).unwrap();
        reader.set_filter("ip").unwrap();

        let mut seen = Vec::new();
        reader
            .run_loop(0, |header, _| {
                seen.push(header.ts_sec);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(seen, vec![1_000, 1_002]);
    }

    #[test]
    fn test_break_interrupts_loop() {
        let dir = TempDir::new().unwrap();
        let path = write_savefile(&dir, &[ethernet_frame(0x0800), ethernet_frame(0x0800)]);

        let mut reader = open_offline(&path).unwrap();
        let mut count = 0;
        let err = reader
            .run_loop(0, |_, _| {
                count += 1;
                ControlFlow::Break(())
            })
            .unwrap_err();

        assert!(matches!(err, PcapError::Interrupted));
        assert_eq!(count, 1);
    }

    #[test]
    fn test_open_offline_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = open_offline(dir.path().join("missing.pcap")).unwrap_err();
        assert!(matches!(err, PcapError::Pcap(_)));
    }
}
