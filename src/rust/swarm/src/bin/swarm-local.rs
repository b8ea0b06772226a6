use anyhow::Result;
use clap::Parser;

use swarm::cli::LocalArgs;
use swarm::local::LocalEngine;

fn main() -> Result<()> {
    let args = LocalArgs::parse();
    let config = args.common.setup()?;

    if args.daemon {
        log::warn!("no scheduling loop available, running a single pass");
    }

    let engine = LocalEngine::new(config)?;
    println!("{}", engine.render_table()?);
    for dimension in engine.summary()? {
        println!("{}: {}", dimension.dimension, dimension.fingerprint);
    }
    Ok(())
}
