//! `pcapy devices` command

use anyhow::Result;

use crate::cli::DevicesArgs;
use pcapy::capture::{findalldevs, lib_version, lookupdev};

pub fn execute(args: DevicesArgs) -> Result<()> {
    tracing::debug!("Using {}", lib_version());

    if args.default {
        println!("{}", lookupdev()?);
        return Ok(());
    }

    for device in findalldevs()? {
        match device.description {
            Some(description) => println!("{:<16} {}", device.name, description),
            None => println!("{}", device.name),
        }
    }

    Ok(())
}
