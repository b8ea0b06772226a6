use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use std::time::Duration;

use swarm::cli::InvokeArgs;
use swarm::{open_resource_agent, AgentError, ReturnCode};

fn main() -> Result<()> {
    let args = InvokeArgs::parse();
    let config = args.common.setup()?;

    let agent = open_resource_agent(args.resource_name(), &args.ra, &config)?;
    let params: BTreeMap<String, String> = args.params.iter().cloned().collect();
    let meta: BTreeMap<String, String> = args.meta.iter().cloned().collect();
    let timeout = args.timeout.map(Duration::from_secs);

    let rc = match agent.invoke(&args.method, &params, &meta, timeout) {
        Ok(rc) => rc,
        Err(err @ AgentError::Timeout { .. }) => {
            log::error!("{}", err);
            ReturnCode::ErrGeneric
        }
        Err(err) => return Err(err.into()),
    };

    println!("{}", rc);
    std::process::exit(rc.code())
}
