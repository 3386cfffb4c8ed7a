//! Capture handles.
//!
//! A [`Reader`] wraps one `pcap_t`, opened either on a live interface or on
//! a savefile. Packets are read one at a time with [`Reader::next_packet`]
//! or pushed to a callback with [`Reader::dispatch`] / [`Reader::run_loop`].

use std::any::Any;
use std::ffi::CString;
use std::net::Ipv4Addr;
use std::ops::ControlFlow;
use std::os::raw::{c_int, c_uchar};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::ptr::{self, NonNull};
use std::slice;

use super::bpf::BpfProgram;
use super::dumper::Dumper;
use super::error::PcapError;
use super::ffi;
use super::linktype::Linktype;
use super::pkthdr::PacketHeader;

/// An open capture handle. Closed on drop.
#[derive(Debug)]
pub struct Reader {
    handle: NonNull<ffi::pcap_t>,
    net: u32,
    mask: u32,
}

// libpcap handles may move between threads but must not be used from two
// threads at once; `&mut self` on every read enforces that.
unsafe impl Send for Reader {}

/// Open a network interface for live capture.
///
/// The interface's network and netmask are looked up first; when that fails
/// (no IPv4 address, for instance) both are 0.
pub fn open_live(device: &str, snaplen: i32, promisc: bool, to_ms: i32) -> Result<Reader, PcapError> {
    let c_device = CString::new(device)?;
    let mut errbuf = ffi::errbuf();

    let mut net: u32 = 0;
    let mut mask: u32 = 0;
    // SAFETY: all out-pointers are valid
    let status =
        unsafe { ffi::pcap_lookupnet(c_device.as_ptr(), &mut net, &mut mask, errbuf.as_mut_ptr()) };
    if status != 0 {
        tracing::debug!("No network for {}: {}", device, unsafe {
            ffi::message(errbuf.as_ptr())
        });
        net = 0;
        mask = 0;
    }

    let mut errbuf = ffi::errbuf();
    // SAFETY: device and errbuf are valid for the call
    let handle = unsafe {
        ffi::pcap_open_live(
            c_device.as_ptr(),
            snaplen,
            c_int::from(promisc),
            to_ms,
            errbuf.as_mut_ptr(),
        )
    };
    let Some(handle) = NonNull::new(handle) else {
        return Err(PcapError::Pcap(unsafe { ffi::message(errbuf.as_ptr()) }));
    };

    #[cfg(pcapy_win32)]
    unsafe {
        ffi::pcap_setmintocopy(handle.as_ptr(), 0);
    }

    tracing::debug!("Opened {} (snaplen {}, promisc {})", device, snaplen, promisc);
    Ok(Reader { handle, net, mask })
}

/// Open a savefile for reading.
pub fn open_offline(path: impl AsRef<Path>) -> Result<Reader, PcapError> {
    let path = path.as_ref();
    let c_path = CString::new(path.to_string_lossy().into_owned())?;
    let mut errbuf = ffi::errbuf();

    // SAFETY: path and errbuf are valid for the call
    let handle = unsafe { ffi::pcap_open_offline(c_path.as_ptr(), errbuf.as_mut_ptr()) };
    let Some(handle) = NonNull::new(handle) else {
        return Err(PcapError::Pcap(unsafe { ffi::message(errbuf.as_ptr()) }));
    };

    Ok(Reader {
        handle,
        net: 0,
        mask: 0,
    })
}

struct CallbackState<'a, F> {
    callback: &'a mut F,
    handle: *mut ffi::pcap_t,
    stopped: bool,
    panic: Option<Box<dyn Any + Send>>,
}

unsafe extern "C" fn trampoline<F>(
    user: *mut c_uchar,
    header: *const ffi::pcap_pkthdr,
    data: *const c_uchar,
) where
    F: FnMut(&PacketHeader, &[u8]) -> ControlFlow<()>,
{
    // SAFETY: user is the CallbackState passed to pcap_dispatch/pcap_loop
    let state = unsafe { &mut *(user as *mut CallbackState<'_, F>) };
    if state.stopped {
        return;
    }

    // SAFETY: libpcap hands out a valid header and caplen bytes of data
    let (header, packet) = unsafe {
        let header = &*header;
        (
            PacketHeader::from(header),
            slice::from_raw_parts(data, header.caplen as usize),
        )
    };

    let callback = &mut *state.callback;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(&header, packet)));

    match outcome {
        Ok(ControlFlow::Continue(())) => {}
        Ok(ControlFlow::Break(())) => {
            state.stopped = true;
            unsafe { ffi::pcap_breakloop(state.handle) };
        }
        Err(payload) => {
            state.stopped = true;
            state.panic = Some(payload);
            unsafe { ffi::pcap_breakloop(state.handle) };
        }
    }
}

type LoopFn =
    unsafe extern "C" fn(*mut ffi::pcap_t, c_int, ffi::pcap_handler, *mut c_uchar) -> c_int;

impl Reader {
    fn as_ptr(&self) -> *mut ffi::pcap_t {
        self.handle.as_ptr()
    }

    fn last_error(&self) -> PcapError {
        // SAFETY: handle is live
        PcapError::Pcap(unsafe { ffi::geterr(self.as_ptr()) })
    }

    /// Read the next packet.
    ///
    /// Returns `Ok(None)` at the end of a savefile and
    /// [`PcapError::Timeout`] when a live read timed out. The packet data
    /// borrows the handle's buffer until the next read.
    pub fn next_packet(&mut self) -> Result<Option<(PacketHeader, &[u8])>, PcapError> {
        let mut header: *mut ffi::pcap_pkthdr = ptr::null_mut();
        let mut data: *const c_uchar = ptr::null();

        // SAFETY: handle is live and out-pointers are valid
        let status = unsafe { ffi::pcap_next_ex(self.as_ptr(), &mut header, &mut data) };
        match status {
            1 => {
                // SAFETY: on success both pointers are set and valid until
                // the next call on this handle
                let (header, packet) = unsafe {
                    let header = &*header;
                    (
                        PacketHeader::from(header),
                        slice::from_raw_parts(data, header.caplen as usize),
                    )
                };
                Ok(Some((header, packet)))
            }
            0 => Err(PcapError::Timeout),
            ffi::PCAP_ERROR_BREAK => Ok(None),
            _ => Err(self.last_error()),
        }
    }

    /// Process up to `cnt` packets from one buffer (`cnt` <= 0 means all
    /// available). Returns how many packets were processed.
    pub fn dispatch<F>(&mut self, cnt: i32, mut callback: F) -> Result<usize, PcapError>
    where
        F: FnMut(&PacketHeader, &[u8]) -> ControlFlow<()>,
    {
        let n = self.drive(ffi::pcap_dispatch, cnt, &mut callback)?;
        Ok(n as usize)
    }

    /// Process packets until `cnt` have been seen (`cnt` <= 0 means forever
    /// on a live capture, or until the end of a savefile).
    pub fn run_loop<F>(&mut self, cnt: i32, mut callback: F) -> Result<(), PcapError>
    where
        F: FnMut(&PacketHeader, &[u8]) -> ControlFlow<()>,
    {
        self.drive(ffi::pcap_loop, cnt, &mut callback)?;
        Ok(())
    }

    fn drive<F>(&mut self, run: LoopFn, cnt: i32, callback: &mut F) -> Result<c_int, PcapError>
    where
        F: FnMut(&PacketHeader, &[u8]) -> ControlFlow<()>,
    {
        let mut state = CallbackState {
            callback,
            handle: self.as_ptr(),
            stopped: false,
            panic: None,
        };

        // SAFETY: state outlives the call; the trampoline matches F
        let status = unsafe {
            run(
                self.as_ptr(),
                cnt,
                Some(trampoline::<F>),
                &mut state as *mut CallbackState<'_, F> as *mut c_uchar,
            )
        };

        if let Some(payload) = state.panic.take() {
            panic::resume_unwind(payload);
        }
        if state.stopped || status == ffi::PCAP_ERROR_BREAK {
            return Err(PcapError::Interrupted);
        }
        if status < 0 {
            return Err(self.last_error());
        }
        Ok(status)
    }

    /// Compile `filter` (optimized, against this handle's netmask) and
    /// install it.
    pub fn set_filter(&mut self, filter: &str) -> Result<(), PcapError> {
        let mut program = BpfProgram::compile_on(self.as_ptr(), filter, true, self.mask)?;

        // SAFETY: handle and program are live; libpcap copies the program
        if unsafe { ffi::pcap_setfilter(self.as_ptr(), program.as_mut_ptr()) } != 0 {
            return Err(self.last_error());
        }
        tracing::debug!("Installed filter `{}`", filter);
        Ok(())
    }

    /// Network address of the capture interface (0.0.0.0 if unknown).
    pub fn net(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.net.to_ne_bytes())
    }

    /// Netmask of the capture interface (0.0.0.0 if unknown).
    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask.to_ne_bytes())
    }

    /// Link-layer header type.
    pub fn datalink(&self) -> Linktype {
        // SAFETY: handle is live
        Linktype(unsafe { ffi::pcap_datalink(self.as_ptr()) })
    }

    pub fn set_nonblock(&mut self, nonblock: bool) -> Result<(), PcapError> {
        let mut errbuf = ffi::errbuf();
        // SAFETY: handle is live and errbuf is valid
        let status = unsafe {
            ffi::pcap_setnonblock(self.as_ptr(), c_int::from(nonblock), errbuf.as_mut_ptr())
        };
        if status < 0 {
            return Err(PcapError::Pcap(unsafe { ffi::message(errbuf.as_ptr()) }));
        }
        Ok(())
    }

    pub fn nonblock(&self) -> Result<bool, PcapError> {
        let mut errbuf = ffi::errbuf();
        // SAFETY: handle is live and errbuf is valid
        let status = unsafe { ffi::pcap_getnonblock(self.as_ptr(), errbuf.as_mut_ptr()) };
        if status < 0 {
            return Err(PcapError::Pcap(unsafe { ffi::message(errbuf.as_ptr()) }));
        }
        Ok(status != 0)
    }

    /// Open a savefile with this handle's link type and snapshot length.
    pub fn dump_open(&mut self, path: impl AsRef<Path>) -> Result<Dumper, PcapError> {
        let c_path = CString::new(path.as_ref().to_string_lossy().into_owned())?;

        // SAFETY: handle is live and path is NUL-terminated
        let dumper = unsafe { ffi::pcap_dump_open(self.as_ptr(), c_path.as_ptr()) };
        match NonNull::new(dumper) {
            Some(dumper) => Ok(Dumper::new(dumper)),
            None => Err(self.last_error()),
        }
    }

    /// Inject a raw packet on the capture interface.
    pub fn send_packet(&mut self, packet: &[u8]) -> Result<(), PcapError> {
        let Ok(len) = c_int::try_from(packet.len()) else {
            return Err(PcapError::Pcap(format!(
                "packet of {} bytes is too large to send",
                packet.len()
            )));
        };

        // SAFETY: handle is live and packet is len bytes
        if unsafe { ffi::pcap_sendpacket(self.as_ptr(), packet.as_ptr(), len) } != 0 {
            return Err(self.last_error());
        }
        Ok(())
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        // SAFETY: opened by pcap_open_*, closed once
        unsafe { ffi::pcap_close(self.as_ptr()) };
    }
}
