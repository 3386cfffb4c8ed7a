//! Device lookup.

use std::ptr;

use super::error::PcapError;
use super::ffi;

/// A capture device as reported by `pcap_findalldevs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub description: Option<String>,
}

/// Name of the default capture device.
pub fn lookupdev() -> Result<String, PcapError> {
    let mut errbuf = ffi::errbuf();

    // SAFETY: errbuf is PCAP_ERRBUF_SIZE bytes
    let dev = unsafe { ffi::pcap_lookupdev(errbuf.as_mut_ptr()) };
    if dev.is_null() {
        return Err(PcapError::Pcap(unsafe { ffi::message(errbuf.as_ptr()) }));
    }

    Ok(unsafe { ffi::message(dev) })
}

/// Every device that can be opened for live capture.
///
/// An empty list is reported as [`PcapError::NoDevices`].
pub fn findalldevs() -> Result<Vec<Device>, PcapError> {
    let mut errbuf = ffi::errbuf();
    let mut head: *mut ffi::pcap_if_t = ptr::null_mut();

    // SAFETY: out-pointer and errbuf are valid
    let status = unsafe { ffi::pcap_findalldevs(&mut head, errbuf.as_mut_ptr()) };
    if status != 0 {
        return Err(PcapError::Pcap(unsafe { ffi::message(errbuf.as_ptr()) }));
    }
    if head.is_null() {
        return Err(PcapError::NoDevices);
    }

    let mut devices = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: cursor walks the list libpcap returned; freed below
        let dev = unsafe { &*cursor };
        devices.push(Device {
            name: unsafe { ffi::message(dev.name) },
            description: (!dev.description.is_null())
                .then(|| unsafe { ffi::message(dev.description) }),
        });
        cursor = dev.next;
    }

    unsafe { ffi::pcap_freealldevs(head) };

    tracing::debug!("Found {} capture devices", devices.len());
    Ok(devices)
}
