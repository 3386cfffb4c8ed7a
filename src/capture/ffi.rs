//! Raw libpcap declarations.
//!
//! Struct layouts are always compiled so headers can be converted without
//! the library; the functions are only declared with the `capture` feature,
//! where `build.rs` links libpcap (or wpcap).

#![allow(non_camel_case_types, dead_code)]

use std::os::raw::{c_char, c_long, c_uchar, c_uint, c_ushort};

#[cfg(feature = "capture")]
use std::os::raw::c_int;

pub const PCAP_ERRBUF_SIZE: usize = 256;

/// Returned by `pcap_loop`/`pcap_dispatch` after `pcap_breakloop`, and by
/// `pcap_next_ex` at the end of a savefile.
pub const PCAP_ERROR_BREAK: i32 = -2;

pub type bpf_u_int32 = u32;

pub type time_t = c_long;

#[cfg(target_os = "macos")]
pub type suseconds_t = i32;
#[cfg(not(target_os = "macos"))]
pub type suseconds_t = c_long;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct timeval {
    pub tv_sec: time_t,
    pub tv_usec: suseconds_t,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct pcap_pkthdr {
    pub ts: timeval,
    pub caplen: bpf_u_int32,
    pub len: bpf_u_int32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct bpf_insn {
    pub code: c_ushort,
    pub jt: c_uchar,
    pub jf: c_uchar,
    pub k: bpf_u_int32,
}

#[repr(C)]
#[derive(Debug)]
pub struct bpf_program {
    pub bf_len: c_uint,
    pub bf_insns: *mut bpf_insn,
}

#[repr(C)]
pub struct pcap_if_t {
    pub next: *mut pcap_if_t,
    pub name: *mut c_char,
    pub description: *mut c_char,
    pub addresses: *mut pcap_addr_t,
    pub flags: bpf_u_int32,
}

/// Opaque; addresses are not read.
#[repr(C)]
pub struct pcap_addr_t {
    _private: [u8; 0],
}

#[repr(C)]
pub struct pcap_t {
    _private: [u8; 0],
}

#[repr(C)]
pub struct pcap_dumper_t {
    _private: [u8; 0],
}

pub type pcap_handler =
    Option<unsafe extern "C" fn(user: *mut c_uchar, h: *const pcap_pkthdr, bytes: *const c_uchar)>;

#[cfg(feature = "capture")]
extern "C" {
    pub fn pcap_lookupdev(errbuf: *mut c_char) -> *mut c_char;
    pub fn pcap_findalldevs(alldevs: *mut *mut pcap_if_t, errbuf: *mut c_char) -> c_int;
    pub fn pcap_freealldevs(alldevs: *mut pcap_if_t);
    pub fn pcap_lookupnet(
        device: *const c_char,
        net: *mut bpf_u_int32,
        mask: *mut bpf_u_int32,
        errbuf: *mut c_char,
    ) -> c_int;

    pub fn pcap_open_live(
        device: *const c_char,
        snaplen: c_int,
        promisc: c_int,
        to_ms: c_int,
        errbuf: *mut c_char,
    ) -> *mut pcap_t;
    pub fn pcap_open_offline(fname: *const c_char, errbuf: *mut c_char) -> *mut pcap_t;
    pub fn pcap_open_dead(linktype: c_int, snaplen: c_int) -> *mut pcap_t;
    pub fn pcap_close(p: *mut pcap_t);
    pub fn pcap_geterr(p: *mut pcap_t) -> *mut c_char;

    pub fn pcap_compile(
        p: *mut pcap_t,
        fp: *mut bpf_program,
        s: *const c_char,
        optimize: c_int,
        netmask: bpf_u_int32,
    ) -> c_int;
    pub fn pcap_setfilter(p: *mut pcap_t, fp: *mut bpf_program) -> c_int;
    pub fn pcap_freecode(fp: *mut bpf_program);
    pub fn bpf_filter(
        pc: *const bpf_insn,
        pkt: *const c_uchar,
        wirelen: c_uint,
        buflen: c_uint,
    ) -> c_uint;

    pub fn pcap_next_ex(
        p: *mut pcap_t,
        h: *mut *mut pcap_pkthdr,
        data: *mut *const c_uchar,
    ) -> c_int;
    pub fn pcap_dispatch(p: *mut pcap_t, cnt: c_int, callback: pcap_handler, user: *mut c_uchar) -> c_int;
    pub fn pcap_loop(p: *mut pcap_t, cnt: c_int, callback: pcap_handler, user: *mut c_uchar) -> c_int;
    pub fn pcap_breakloop(p: *mut pcap_t);

    pub fn pcap_datalink(p: *mut pcap_t) -> c_int;
    pub fn pcap_setnonblock(p: *mut pcap_t, nonblock: c_int, errbuf: *mut c_char) -> c_int;
    pub fn pcap_getnonblock(p: *mut pcap_t, errbuf: *mut c_char) -> c_int;
    pub fn pcap_sendpacket(p: *mut pcap_t, buf: *const c_uchar, size: c_int) -> c_int;

    pub fn pcap_dump_open(p: *mut pcap_t, fname: *const c_char) -> *mut pcap_dumper_t;
    pub fn pcap_dump(user: *mut c_uchar, h: *const pcap_pkthdr, sp: *const c_uchar);
    pub fn pcap_dump_flush(p: *mut pcap_dumper_t) -> c_int;
    pub fn pcap_dump_close(p: *mut pcap_dumper_t);

    pub fn pcap_lib_version() -> *const c_char;
}

#[cfg(all(feature = "capture", pcapy_win32))]
extern "C" {
    pub fn pcap_setmintocopy(p: *mut pcap_t, size: c_int) -> c_int;
}

/// Zeroed error buffer.
#[cfg(feature = "capture")]
pub fn errbuf() -> [c_char; PCAP_ERRBUF_SIZE] {
    [0; PCAP_ERRBUF_SIZE]
}

/// Read a NUL-terminated message written by libpcap.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
#[cfg(feature = "capture")]
pub unsafe fn message(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::from("unknown libpcap error");
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract
    unsafe { std::ffi::CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned()
}

/// Last error recorded on a handle.
///
/// # Safety
///
/// `p` must be a live handle.
#[cfg(feature = "capture")]
pub unsafe fn geterr(p: *mut pcap_t) -> String {
    unsafe { message(pcap_geterr(p)) }
}
