//! `pcapy read` command

use anyhow::{Context, Result};

use crate::cli::ReadArgs;
use pcapy::capture::open_offline;

use super::live::{describe, finish, prepare};

pub fn execute(args: ReadArgs) -> Result<()> {
    let mut reader = open_offline(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let mut dumper = prepare(&mut reader, &args.packets)?;
    let limit = args.packets.count.unwrap_or(usize::MAX);
    let mut seen = 0usize;

    while seen < limit {
        let Some((header, packet)) = reader.next_packet()? else {
            break;
        };

        println!("{}", describe(&header, packet));
        if let Some(dumper) = dumper.as_mut() {
            dumper.dump(&header, packet)?;
        }
        seen += 1;
    }

    finish(dumper, seen)
}
