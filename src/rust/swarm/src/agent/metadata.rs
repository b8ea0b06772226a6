//! OCF `meta-data` XML parsing.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A parameter an OCF agent accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub unique: bool,
    pub required: bool,
    pub shortdesc: String,
    pub longdesc: String,
    /// Declared content type; `string` when the agent does not say
    pub content_type: String,
    pub default: Option<String>,
}

/// An action an agent advertises.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionSpec {
    pub name: String,
    pub timeout: Option<String>,
    pub interval: Option<String>,
    pub depth: Option<String>,
    pub role: Option<String>,
}

impl ActionSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Parsed `meta-data` output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentMetadata {
    pub parameters: BTreeMap<String, ParameterSpec>,
    pub actions: BTreeMap<String, ActionSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "resource-agent")]
struct ResourceAgentXml {
    #[serde(default)]
    parameters: ParametersXml,
    #[serde(default)]
    actions: ActionsXml,
}

#[derive(Debug, Default, Deserialize)]
struct ParametersXml {
    #[serde(rename = "parameter", default)]
    parameters: Vec<ParameterXml>,
}

#[derive(Debug, Deserialize)]
struct ParameterXml {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@unique", default)]
    unique: u8,
    #[serde(rename = "@required", default)]
    required: u8,
    shortdesc: Option<TextXml>,
    longdesc: Option<TextXml>,
    content: Option<ContentXml>,
}

#[derive(Debug, Deserialize)]
struct TextXml {
    #[serde(rename = "$text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ContentXml {
    #[serde(rename = "@type")]
    content_type: Option<String>,
    #[serde(rename = "@default")]
    default: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionsXml {
    #[serde(rename = "action", default)]
    actions: Vec<ActionXml>,
}

#[derive(Debug, Deserialize)]
struct ActionXml {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@timeout")]
    timeout: Option<String>,
    #[serde(rename = "@interval")]
    interval: Option<String>,
    #[serde(rename = "@depth")]
    depth: Option<String>,
    #[serde(rename = "@role")]
    role: Option<String>,
}

/// Parse the XML an OCF agent prints for `meta-data`.
pub fn parse_metadata(xml: &str) -> Result<AgentMetadata, quick_xml::de::DeError> {
    let parsed: ResourceAgentXml = quick_xml::de::from_str(xml)?;

    let parameters = parsed
        .parameters
        .parameters
        .into_iter()
        .map(|p| {
            let (content_type, default) = match p.content {
                Some(content) => (content.content_type, content.default),
                None => (None, None),
            };
            let spec = ParameterSpec {
                name: p.name.clone(),
                unique: p.unique != 0,
                required: p.required != 0,
                shortdesc: p.shortdesc.map(|d| d.text).unwrap_or_default(),
                longdesc: p.longdesc.map(|d| d.text).unwrap_or_default(),
                content_type: content_type.unwrap_or_else(|| "string".to_string()),
                default,
            };
            (p.name, spec)
        })
        .collect();

    let actions = parsed
        .actions
        .actions
        .into_iter()
        .map(|a| {
            let spec = ActionSpec {
                name: a.name.clone(),
                timeout: a.timeout,
                interval: a.interval,
                depth: a.depth,
                role: a.role,
            };
            (a.name, spec)
        })
        .collect();

    Ok(AgentMetadata {
        parameters,
        actions,
    })
}
