//! Command-line options shared by the swarm binaries.

use anyhow::Result;
use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::SwarmConfig;
use crate::logging::{self, LogTarget};

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Configuration file for the local swarm installation
    #[arg(long, default_value = "swarm.toml")]
    pub config: PathBuf,

    /// Location for logging: a file path, or `-`/`stderr`; syslog when omitted
    #[arg(long, num_args = 0..=1, default_missing_value = "-")]
    pub log: Option<String>,

    /// 0 = errors only, 1 = warnings, 2 = info, 3 = debug
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub verbosity: u8,
}

impl CommonArgs {
    /// Start logging, then load the configuration.
    pub fn setup(&self) -> Result<SwarmConfig> {
        logging::init(self.verbosity, &LogTarget::from_arg(self.log.as_deref()))?;
        SwarmConfig::load_from_file(&self.config)
    }
}

/// Options of `swarm-local`.
#[derive(Debug, Parser)]
#[command(name = "swarm-local", about = "Swarm local resource engine")]
pub struct LocalArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Run as a daemon
    #[arg(long)]
    pub daemon: bool,
}

/// Options of `ra-invoke`.
#[derive(Debug, Parser)]
#[command(name = "ra-invoke", about = "Invoke a method on a resource agent.")]
pub struct InvokeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Resource agent, e.g. `ocf:heartbeat:IPaddr2` or `lsb:sshd`
    pub ra: String,

    /// Method to invoke
    pub method: String,

    /// Name of the resource; defaults to the last `:` segment of the agent
    #[arg(long)]
    pub name: Option<String>,

    /// Resource parameter, `KEY=VALUE`
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Meta attribute, `KEY=VALUE`
    #[arg(long = "meta", value_parser = parse_key_value)]
    pub meta: Vec<(String, String)>,

    /// Timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl InvokeArgs {
    pub fn resource_name(&self) -> &str {
        match &self.name {
            Some(name) => name.as_str(),
            None => self.ra.rsplit(':').next().unwrap_or(&self.ra),
        }
    }
}

fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{arg}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_defaults() {
        let args = LocalArgs::try_parse_from(["swarm-local"]).unwrap();
        assert_eq!(args.common.config, PathBuf::from("swarm.toml"));
        assert_eq!(args.common.log, None);
        assert_eq!(args.common.verbosity, 1);
        assert!(!args.daemon);
    }

    #[test]
    fn test_local_flags() {
        let args = LocalArgs::try_parse_from([
            "swarm-local",
            "--config",
            "/etc/swarm.toml",
            "--log",
            "--verbosity",
            "3",
            "--daemon",
        ])
        .unwrap();
        assert_eq!(args.common.config, PathBuf::from("/etc/swarm.toml"));
        assert_eq!(args.common.log.as_deref(), Some("-"));
        assert_eq!(args.common.verbosity, 3);
        assert!(args.daemon);
    }

    #[test]
    fn test_verbosity_range() {
        assert!(LocalArgs::try_parse_from(["swarm-local", "--verbosity", "4"]).is_err());
    }

    #[test]
    fn test_invoke_args() {
        let args = InvokeArgs::try_parse_from([
            "ra-invoke",
            "ocf:heartbeat:IPaddr2",
            "monitor",
            "--param",
            "ip=10.0.0.1",
            "--meta",
            "op-timeout=20",
            "--timeout",
            "5",
        ])
        .unwrap();
        assert_eq!(args.resource_name(), "IPaddr2");
        assert_eq!(args.method, "monitor");
        assert_eq!(args.params, vec![("ip".to_string(), "10.0.0.1".to_string())]);
        assert_eq!(args.meta, vec![("op-timeout".to_string(), "20".to_string())]);
        assert_eq!(args.timeout, Some(5));

        let named =
            InvokeArgs::try_parse_from(["ra-invoke", "lsb:sshd", "status", "--name", "ssh"])
                .unwrap();
        assert_eq!(named.resource_name(), "ssh");
    }

    #[test]
    fn test_bad_key_value() {
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
    }
}
