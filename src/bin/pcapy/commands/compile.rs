//! `pcapy compile` command

use anyhow::{Context, Result};

use crate::cli::CompileArgs;
use pcapy::capture::{compile, Linktype};

pub fn execute(args: CompileArgs) -> Result<()> {
    let linktype = Linktype(args.linktype);
    let netmask = u32::from_ne_bytes(args.netmask.octets());

    let program = compile(linktype, args.snaplen, &args.filter, !args.no_optimize, netmask)
        .with_context(|| format!("failed to compile `{}` for {}", args.filter, linktype))?;

    for insn in program.instructions() {
        println!("{},", insn);
    }

    Ok(())
}
