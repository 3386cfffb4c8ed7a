//! Compiled BPF filter programs.

use std::fmt;

use super::ffi;

#[cfg(feature = "capture")]
use std::ffi::CString;

#[cfg(feature = "capture")]
use super::error::PcapError;
#[cfg(feature = "capture")]
use super::linktype::Linktype;

/// One BPF instruction.
pub type BpfInstruction = ffi::bpf_insn;

impl fmt::Display for ffi::bpf_insn {
    /// Formats like `tcpdump -dd`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ 0x{:x}, {}, {}, 0x{:08x} }}",
            self.code, self.jt, self.jf, self.k
        )
    }
}

/// A filter compiled by libpcap. Freed on drop.
#[cfg(feature = "capture")]
#[derive(Debug)]
pub struct BpfProgram {
    program: ffi::bpf_program,
}

// The instruction buffer is owned by the program and never shared.
#[cfg(feature = "capture")]
unsafe impl Send for BpfProgram {}

#[cfg(feature = "capture")]
impl BpfProgram {
    /// Compile `filter` against an open handle.
    ///
    /// On failure the handle's error message is read before returning, so
    /// callers may close the handle afterwards.
    pub(crate) fn compile_on(
        handle: *mut ffi::pcap_t,
        filter: &str,
        optimize: bool,
        netmask: u32,
    ) -> Result<Self, PcapError> {
        let filter = CString::new(filter)?;
        let mut program = ffi::bpf_program {
            bf_len: 0,
            bf_insns: std::ptr::null_mut(),
        };

        // SAFETY: handle is live for the duration of the call
        let status = unsafe {
            ffi::pcap_compile(
                handle,
                &mut program,
                filter.as_ptr(),
                i32::from(optimize),
                netmask,
            )
        };
        if status != 0 {
            return Err(PcapError::Pcap(unsafe { ffi::geterr(handle) }));
        }

        Ok(BpfProgram { program })
    }

    /// The compiled instructions.
    pub fn instructions(&self) -> &[BpfInstruction] {
        if self.program.bf_insns.is_null() {
            return &[];
        }
        // SAFETY: libpcap allocated bf_len instructions
        unsafe {
            std::slice::from_raw_parts(self.program.bf_insns, self.program.bf_len as usize)
        }
    }

    /// Run the program over a packet.
    ///
    /// Returns the number of bytes to keep; 0 means the packet is rejected.
    pub fn filter(&self, packet: &[u8]) -> u32 {
        if self.program.bf_insns.is_null() {
            return 0;
        }
        let Ok(len) = u32::try_from(packet.len()) else {
            return 0;
        };
        // SAFETY: the program is valid and the packet buffer is len bytes
        unsafe { ffi::bpf_filter(self.program.bf_insns, packet.as_ptr(), len, len) }
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut ffi::bpf_program {
        &mut self.program
    }
}

#[cfg(feature = "capture")]
impl Drop for BpfProgram {
    fn drop(&mut self) {
        // SAFETY: the program came from pcap_compile
        unsafe { ffi::pcap_freecode(&mut self.program) };
    }
}

/// Compile a filter without a capture device.
///
/// `netmask` is the IPv4 netmask of the capture network in the byte order
/// libpcap uses (0 if unknown).
#[cfg(feature = "capture")]
pub fn compile(
    linktype: Linktype,
    snaplen: i32,
    filter: &str,
    optimize: bool,
    netmask: u32,
) -> Result<BpfProgram, PcapError> {
    // SAFETY: plain constructor
    let dead = unsafe { ffi::pcap_open_dead(linktype.0, snaplen) };
    if dead.is_null() {
        return Err(PcapError::Pcap(format!(
            "cannot open a dead handle for {}",
            linktype
        )));
    }

    let result = BpfProgram::compile_on(dead, filter, optimize, netmask);

    // SAFETY: opened above; any error message was already copied
    unsafe { ffi::pcap_close(dead) };

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_display() {
        let insn = BpfInstruction {
            code: 0x28,
            jt: 0,
            jf: 0,
            k: 12,
        };
        assert_eq!(insn.to_string(), "{ 0x28, 0, 0, 0x0000000c }");
    }

    #[cfg(feature = "capture")]
    #[test]
    fn test_compile_ip_filter() {
        let program = compile(Linktype::EN10MB, 65535, "ip", true, 0).unwrap();
        assert!(!program.instructions().is_empty());

        // Ethernet frame with type 0x0800
        let mut frame = vec![0u8; 34];
        frame[12] = 0x08;
        frame[13] = 0x00;
        assert_ne!(program.filter(&frame), 0);

        frame[12] = 0x86;
        frame[13] = 0xdd;
        assert_eq!(program.filter(&frame), 0);
    }

    #[cfg(feature = "capture")]
    #[test]
    fn test_compile_error_message() {
        let err = compile(Linktype::EN10MB, 65535, "not a filter (", true, 0).unwrap_err();
        assert!(matches!(err, PcapError::Pcap(ref msg) if !msg.is_empty()));
    }
}
