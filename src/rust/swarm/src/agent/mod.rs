//! Resource agents: adapters around external OCF and LSB scripts.
//!
//! Agents are opened from a location string such as `ocf:heartbeat:IPaddr2`
//! or `lsb:sshd`; the prefix selects the resource class.

pub mod metadata;
mod process;

pub use metadata::{ActionSpec, AgentMetadata, ParameterSpec};

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::SwarmConfig;

/// OCF return codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ReturnCode {
    Success = 0,
    ErrGeneric = 1,
    ErrArgs = 2,
    ErrUnimplemented = 3,
    ErrPerm = 4,
    ErrInstalled = 5,
    ErrConfigured = 6,
    NotRunning = 7,
    RunningMaster = 8,
    FailedMaster = 9,
}

impl ReturnCode {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => ReturnCode::Success,
            1 => ReturnCode::ErrGeneric,
            2 => ReturnCode::ErrArgs,
            3 => ReturnCode::ErrUnimplemented,
            4 => ReturnCode::ErrPerm,
            5 => ReturnCode::ErrInstalled,
            6 => ReturnCode::ErrConfigured,
            7 => ReturnCode::NotRunning,
            8 => ReturnCode::RunningMaster,
            9 => ReturnCode::FailedMaster,
            _ => return None,
        })
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an LSB init script's exit status for `op`.
    ///
    /// `status` has its own convention: 1 to 3 mean the service is stopped,
    /// 4 means its state is unknown. Other actions share codes 0 to 7 with
    /// OCF.
    pub fn from_lsb(op: &str, code: i32) -> Option<Self> {
        match (op, code) {
            ("status", 0) => Some(ReturnCode::Success),
            ("status", 1..=3) => Some(ReturnCode::NotRunning),
            ("status", _) => None,
            (_, 0..=7) => Self::from_code(code),
            _ => None,
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.code(), self)
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unknown resource class `{class}` for {resloc}")]
    UnknownResourceClass { class: String, resloc: String },
    #[error("resource agent location `{0}` names no agent type")]
    MissingType(String),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid meta-data from {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: quick_xml::de::DeError,
    },
    #[error("operation {op} on {name} timed out after {after:?}")]
    Timeout {
        name: String,
        op: String,
        after: Duration,
    },
}

/// Resource class named by the prefix of an agent location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Ocf,
    Lsb,
}

impl FromStr for ResourceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ocf" => Ok(ResourceClass::Ocf),
            "lsb" => Ok(ResourceClass::Lsb),
            other => Err(other.to_string()),
        }
    }
}

/// How an agent is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentKind {
    /// Script at `path`, below the OCF `root`
    Ocf {
        root: PathBuf,
        path: PathBuf,
        agent_type: String,
    },
    /// `command <service> <op>`
    Lsb { command: String, service: String },
}

/// Deadline for an OCF agent's `meta-data` call.
pub const META_DATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Actions every LSB init script is expected to provide.
const LSB_ACTIONS: [&str; 4] = ["start", "stop", "restart", "status"];

#[derive(Debug, Clone)]
pub struct ResourceAgent {
    name: String,
    resloc: String,
    kind: AgentKind,
    metadata: AgentMetadata,
}

/// Open a resource agent from its location string.
///
/// OCF agents are asked for their `meta-data` right away; a non-zero exit
/// leaves the agent with no declared parameters or actions.
pub fn open_resource_agent(
    name: &str,
    resloc: &str,
    config: &SwarmConfig,
) -> Result<ResourceAgent, AgentError> {
    let mut segments = resloc.split(':');
    let class = segments.next().unwrap_or_default();
    let class = ResourceClass::from_str(class).map_err(|class| {
        log::error!("Unknown resource class {} for {}", class, resloc);
        AgentError::UnknownResourceClass {
            class,
            resloc: resloc.to_string(),
        }
    })?;
    let rest: Vec<&str> = segments.collect();

    match class {
        ResourceClass::Ocf => {
            let agent_type = match rest.last() {
                Some(agent_type) if !agent_type.is_empty() => agent_type.to_string(),
                _ => return Err(AgentError::MissingType(resloc.to_string())),
            };
            let root = config.ocf_root();
            let path = rest
                .iter()
                .fold(root.join("resource.d"), |path, segment| path.join(segment));
            ResourceAgent::open_ocf(name, resloc, root, path, agent_type)
        }
        ResourceClass::Lsb => {
            let service = rest.join(":");
            if service.is_empty() {
                return Err(AgentError::MissingType(resloc.to_string()));
            }
            Ok(ResourceAgent::lsb(name, resloc, &config.paths.lsb_service, &service))
        }
    }
}

impl ResourceAgent {
    fn open_ocf(
        name: &str,
        resloc: &str,
        root: PathBuf,
        path: PathBuf,
        agent_type: String,
    ) -> Result<Self, AgentError> {
        let mut agent = Self {
            name: name.to_string(),
            resloc: resloc.to_string(),
            kind: AgentKind::Ocf {
                root,
                path,
                agent_type,
            },
            metadata: AgentMetadata::default(),
        };

        let env = agent.ocf_environment(&BTreeMap::new(), &BTreeMap::new());
        let path = agent.program().to_path_buf();
        let (outcome, stdout) =
            process::run_captured(&path, &["meta-data"], &env, META_DATA_TIMEOUT)?;
        match outcome {
            process::Outcome::Exited(0) => {
                agent.metadata = metadata::parse_metadata(&stdout)
                    .map_err(|source| AgentError::Metadata { path, source })?;
            }
            process::Outcome::TimedOut(after) => {
                log::error!("meta-data for {} did not finish in {:?}", resloc, after);
                return Err(AgentError::Timeout {
                    name: agent.name,
                    op: "meta-data".to_string(),
                    after,
                });
            }
            other => log::warn!(
                "meta-data for {} ended with {:?}; no parameters or actions declared",
                resloc,
                other
            ),
        }
        Ok(agent)
    }

    fn lsb(name: &str, resloc: &str, command: &str, service: &str) -> Self {
        let actions = LSB_ACTIONS
            .iter()
            .map(|action| (action.to_string(), ActionSpec::named(action)))
            .collect();
        Self {
            name: name.to_string(),
            resloc: resloc.to_string(),
            kind: AgentKind::Lsb {
                command: command.to_string(),
                service: service.to_string(),
            },
            metadata: AgentMetadata {
                parameters: BTreeMap::new(),
                actions,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resloc(&self) -> &str {
        &self.resloc
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn class(&self) -> ResourceClass {
        match self.kind {
            AgentKind::Ocf { .. } => ResourceClass::Ocf,
            AgentKind::Lsb { .. } => ResourceClass::Lsb,
        }
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParameterSpec> {
        &self.metadata.parameters
    }

    pub fn allowed_actions(&self) -> &BTreeMap<String, ActionSpec> {
        &self.metadata.actions
    }

    fn program(&self) -> &Path {
        match &self.kind {
            AgentKind::Ocf { path, .. } => path,
            AgentKind::Lsb { command, .. } => Path::new(command),
        }
    }

    /// Invoke `op` on the agent.
    ///
    /// Operations the agent does not advertise, parameters it does not
    /// declare, and unusable declared timeouts are answered with an OCF code
    /// without running anything. Declared defaults fill in missing parameters.
    pub fn invoke(
        &self,
        op: &str,
        params: &BTreeMap<String, String>,
        meta: &BTreeMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<ReturnCode, AgentError> {
        let Some(action) = self.metadata.actions.get(op) else {
            log::error!("Operation {} not implemented by resource {}", op, self.name);
            return Ok(ReturnCode::ErrUnimplemented);
        };

        let timeout = match (timeout, &action.timeout) {
            (Some(timeout), _) => Some(timeout),
            (None, Some(declared)) => match parse_timeout(declared) {
                Some(timeout) => Some(timeout),
                None => {
                    log::error!(
                        "Invalid timeout specified for operation {} by resource {}",
                        op,
                        self.name
                    );
                    return Ok(ReturnCode::ErrGeneric);
                }
            },
            (None, None) => None,
        };

        let declared = &self.metadata.parameters;
        if let Some(unknown) = params.keys().find(|key| !declared.contains_key(*key)) {
            log::error!("Parameter {} not supported by resource {}", unknown, self.name);
            return Ok(ReturnCode::ErrArgs);
        }
        let mut resolved = params.clone();
        for (name, spec) in declared {
            if let (false, Some(default)) = (resolved.contains_key(name), &spec.default) {
                resolved.insert(name.clone(), default.clone());
            }
        }

        log::debug!("invoking {} on {} ({})", op, self.name, self.resloc);
        let status = match &self.kind {
            AgentKind::Ocf { path, .. } => {
                let env = self.ocf_environment(&resolved, meta);
                process::run(path, &[op], &env, timeout)
            }
            AgentKind::Lsb { command, service } => {
                process::run(Path::new(command), &[service.as_str(), op], &[], timeout)
            }
        }?;

        match status {
            process::Outcome::Exited(code) => {
                let mapped = match self.kind {
                    AgentKind::Ocf { .. } => ReturnCode::from_code(code),
                    AgentKind::Lsb { .. } => ReturnCode::from_lsb(op, code),
                };
                Ok(mapped.unwrap_or_else(|| {
                    log::warn!("{} {} returned unknown code {}", self.name, op, code);
                    ReturnCode::ErrGeneric
                }))
            }
            process::Outcome::Signalled => {
                log::warn!("{} {} was terminated by a signal", self.name, op);
                Ok(ReturnCode::ErrGeneric)
            }
            process::Outcome::TimedOut(after) => Err(AgentError::Timeout {
                name: self.name.clone(),
                op: op.to_string(),
                after,
            }),
        }
    }

    /// Environment variables an OCF agent receives on top of the inherited
    /// environment. Empty for LSB agents.
    pub fn ocf_environment(
        &self,
        params: &BTreeMap<String, String>,
        meta: &BTreeMap<String, String>,
    ) -> Vec<(String, String)> {
        let AgentKind::Ocf {
            root, agent_type, ..
        } = &self.kind
        else {
            return Vec::new();
        };

        let mut env = Vec::with_capacity(params.len() + meta.len() + 5);
        for (key, value) in params {
            env.push((format!("OCF_RESKEY_{key}"), value.clone()));
        }
        for (key, value) in meta {
            env.push((
                format!("OCF_RESKEY_CRM_meta_{}", key.replace('-', "_")),
                value.clone(),
            ));
        }
        env.push(("OCF_RA_VERSION_MAJOR".to_string(), "1".to_string()));
        env.push(("OCF_RA_VERSION_MINOR".to_string(), "0".to_string()));
        env.push(("OCF_ROOT".to_string(), root.display().to_string()));
        env.push(("OCF_RESOURCE_INSTANCE".to_string(), self.name.clone()));
        env.push(("OCF_RESOURCE_TYPE".to_string(), agent_type.clone()));
        env
    }
}

/// Parse an action timeout: whole seconds, optionally suffixed with `s`.
fn parse_timeout(declared: &str) -> Option<Duration> {
    let trimmed = declared.trim();
    let digits = trimmed.strip_suffix('s').unwrap_or(trimmed);
    digits.parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ocf_agent_with(metadata: AgentMetadata) -> ResourceAgent {
        ResourceAgent {
            name: "vip".to_string(),
            resloc: "ocf:heartbeat:IPaddr2".to_string(),
            kind: AgentKind::Ocf {
                root: PathBuf::from("/usr/lib/ocf"),
                path: PathBuf::from("/usr/lib/ocf/resource.d/heartbeat/IPaddr2"),
                agent_type: "IPaddr2".to_string(),
            },
            metadata,
        }
    }

    #[test]
    fn test_return_codes() {
        for code in 0..=9 {
            assert_eq!(ReturnCode::from_code(code).unwrap().code(), code);
        }
        assert_eq!(ReturnCode::from_code(10), None);
        assert_eq!(ReturnCode::from_code(-1), None);
        assert_eq!(ReturnCode::NotRunning.code(), 7);
        assert_eq!(ReturnCode::FailedMaster.to_string(), "9 (FailedMaster)");
    }

    #[test]
    fn test_lsb_status_codes() {
        assert_eq!(ReturnCode::from_lsb("status", 0), Some(ReturnCode::Success));
        for code in 1..=3 {
            assert_eq!(
                ReturnCode::from_lsb("status", code),
                Some(ReturnCode::NotRunning)
            );
        }
        assert_eq!(ReturnCode::from_lsb("status", 4), None);
        assert_eq!(ReturnCode::from_lsb("start", 3), Some(ReturnCode::ErrUnimplemented));
        assert_eq!(ReturnCode::from_lsb("stop", 7), Some(ReturnCode::NotRunning));
        assert_eq!(ReturnCode::from_lsb("restart", 8), None);
    }

    #[test]
    fn test_resource_class_prefix() {
        assert_eq!("ocf".parse::<ResourceClass>(), Ok(ResourceClass::Ocf));
        assert_eq!("lsb".parse::<ResourceClass>(), Ok(ResourceClass::Lsb));
        assert_eq!(
            "systemd".parse::<ResourceClass>(),
            Err("systemd".to_string())
        );
    }

    #[test]
    fn test_unknown_resource_class() {
        let err = open_resource_agent("x", "stonith:fence_ipmi", &SwarmConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::UnknownResourceClass { ref class, .. } if class == "stonith"
        ));
    }

    #[test]
    fn test_missing_type() {
        let config = SwarmConfig::default();
        assert!(matches!(
            open_resource_agent("x", "ocf", &config),
            Err(AgentError::MissingType(_))
        ));
        assert!(matches!(
            open_resource_agent("x", "lsb:", &config),
            Err(AgentError::MissingType(_))
        ));
    }

    #[test]
    fn test_open_lsb() {
        let agent = open_resource_agent("ssh", "lsb:sshd", &SwarmConfig::default()).unwrap();
        assert_eq!(agent.class(), ResourceClass::Lsb);
        assert_eq!(agent.name(), "ssh");
        assert_eq!(
            agent.kind(),
            &AgentKind::Lsb {
                command: "service".to_string(),
                service: "sshd".to_string()
            }
        );
        assert!(agent.allowed_actions().contains_key("status"));
        assert!(agent.parameters().is_empty());
        assert!(agent.ocf_environment(&params(&[("a", "b")]), &BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_unimplemented_operation() {
        let agent = ocf_agent_with(AgentMetadata::default());
        let rc = agent
            .invoke("start", &BTreeMap::new(), &BTreeMap::new(), None)
            .unwrap();
        assert_eq!(rc, ReturnCode::ErrUnimplemented);
    }

    #[test]
    fn test_invalid_declared_timeout() {
        let mut metadata = AgentMetadata::default();
        let mut start = ActionSpec::named("start");
        start.timeout = Some("soon".to_string());
        metadata.actions.insert("start".to_string(), start);

        let agent = ocf_agent_with(metadata);
        let rc = agent
            .invoke("start", &BTreeMap::new(), &BTreeMap::new(), None)
            .unwrap();
        assert_eq!(rc, ReturnCode::ErrGeneric);
    }

    #[test]
    fn test_undeclared_parameter() {
        let mut metadata = AgentMetadata::default();
        metadata
            .actions
            .insert("start".to_string(), ActionSpec::named("start"));

        let agent = ocf_agent_with(metadata);
        let rc = agent
            .invoke("start", &params(&[("bogus", "1")]), &BTreeMap::new(), None)
            .unwrap();
        assert_eq!(rc, ReturnCode::ErrArgs);
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("20"), Some(Duration::from_secs(20)));
        assert_eq!(parse_timeout("20s"), Some(Duration::from_secs(20)));
        assert_eq!(parse_timeout(" 5s "), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("1m"), None);
        assert_eq!(parse_timeout(""), None);
    }

    #[test]
    fn test_ocf_environment() {
        let agent = ocf_agent_with(AgentMetadata::default());
        let env = agent.ocf_environment(
            &params(&[("ip", "10.0.0.1")]),
            &params(&[("op-timeout", "20000")]),
        );
        let env: BTreeMap<String, String> = env.into_iter().collect();

        assert_eq!(env["OCF_RESKEY_ip"], "10.0.0.1");
        assert_eq!(env["OCF_RESKEY_CRM_meta_op_timeout"], "20000");
        assert_eq!(env["OCF_RA_VERSION_MAJOR"], "1");
        assert_eq!(env["OCF_RA_VERSION_MINOR"], "0");
        assert_eq!(env["OCF_ROOT"], "/usr/lib/ocf");
        assert_eq!(env["OCF_RESOURCE_INSTANCE"], "vip");
        assert_eq!(env["OCF_RESOURCE_TYPE"], "IPaddr2");
    }
}
