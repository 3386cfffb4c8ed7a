//! `pcapy live` command

use std::ops::ControlFlow;

use anyhow::{Context, Result};

use crate::cli::{LiveArgs, PacketArgs};
use pcapy::capture::{lookupdev, open_live, Dumper, PacketHeader, PcapError, Reader};

pub fn execute(args: LiveArgs) -> Result<()> {
    let device = match args.device {
        Some(device) => device,
        None => lookupdev().context("no capture device given and none found")?,
    };

    let mut reader = open_live(&device, args.snaplen, args.promisc, args.timeout_ms)
        .with_context(|| format!("failed to open {}", device))?;

    eprintln!(
        "   Capturing on {} ({}, net {} mask {})",
        device,
        reader.datalink(),
        reader.net(),
        reader.mask()
    );

    let mut dumper = prepare(&mut reader, &args.packets)?;
    let limit = args.packets.count;
    let mut seen = 0usize;
    let mut failure: Option<PcapError> = None;

    while limit.map_or(true, |l| seen < l) {
        // -1 drains whatever one read returns
        let cnt = limit.map_or(-1, |l| i32::try_from(l - seen).unwrap_or(i32::MAX));

        let result = reader.dispatch(cnt, |header, packet| {
            println!("{}", describe(header, packet));
            if let Some(dumper) = dumper.as_mut() {
                if let Err(e) = dumper.dump(header, packet) {
                    failure = Some(e);
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        });

        if let Some(e) = failure.take() {
            return Err(e.into());
        }
        match result {
            Ok(n) => seen += n,
            Err(PcapError::Interrupted) => break,
            Err(e) => return Err(e.into()),
        }
    }

    finish(dumper, seen)
}

/// Install the filter and open the output savefile, if requested.
pub(crate) fn prepare(reader: &mut Reader, args: &PacketArgs) -> Result<Option<Dumper>> {
    if let Some(filter) = &args.filter {
        reader
            .set_filter(filter)
            .with_context(|| format!("invalid filter `{}`", filter))?;
    }

    match &args.write {
        Some(path) => {
            let dumper = reader
                .dump_open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Some(dumper))
        }
        None => Ok(None),
    }
}

pub(crate) fn finish(dumper: Option<Dumper>, seen: usize) -> Result<()> {
    if let Some(mut dumper) = dumper {
        dumper.flush()?;
    }
    tracing::debug!("{} packets", seen);
    Ok(())
}

/// One summary line per packet: timestamp, lengths and the first bytes.
pub(crate) fn describe(header: &PacketHeader, packet: &[u8]) -> String {
    let preview: Vec<String> = packet.iter().take(16).map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}.{:06} caplen {} len {}  {}",
        header.ts_sec,
        header.ts_usec,
        header.caplen,
        header.len,
        preview.join(" ")
    )
}
