/// Classification of user-supplied interface names into query groups
///
/// The device only accepts a comma-separated list of interfaces of one kind per
/// `show interface` command, so base ports, fex ports and port-channels are
/// queried separately.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::core::error::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Base,
    Fex,
    PortChannel,
}

impl GroupKind {
    pub fn label(&self) -> &'static str {
        match self {
            GroupKind::Base => "base interfaces",
            GroupKind::Fex => "fex interfaces",
            GroupKind::PortChannel => "port-channels",
        }
    }
}

fn base_re() -> &'static Regex {
    static BASE_RE: OnceLock<Regex> = OnceLock::new();
    BASE_RE.get_or_init(|| Regex::new(r"(?i)^(?:e|eth)(\d)/(\d{1,3})(?:-(\d{1,3}))?$").unwrap())
}

fn fex_re() -> &'static Regex {
    static FEX_RE: OnceLock<Regex> = OnceLock::new();
    FEX_RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:e|eth)(\d{3})/(\d)/(\d{1,3})(?:-(\d{1,3}))?$").unwrap()
    })
}

fn po_re() -> &'static Regex {
    static PO_RE: OnceLock<Regex> = OnceLock::new();
    PO_RE.get_or_init(|| Regex::new(r"(?i)^(?:po|port-channel)(\d{1,4})$").unwrap())
}

/// Which group a single token belongs to, if any
pub fn classify_token(token: &str) -> Option<GroupKind> {
    if base_re().is_match(token) {
        Some(GroupKind::Base)
    } else if fex_re().is_match(token) {
        Some(GroupKind::Fex)
    } else if po_re().is_match(token) {
        Some(GroupKind::PortChannel)
    } else {
        None
    }
}

/// Interface tokens sorted into their groups, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceGroups {
    pub base: Vec<String>,
    pub fex: Vec<String>,
    pub port_channels: Vec<String>,
}

impl InterfaceGroups {
    /// Split every argument on commas and sort the pieces into groups.
    /// Any token that matches no group fails the whole set.
    pub fn classify<I, S>(args: I) -> Result<Self, MonitorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut groups = Self::default();
        let mut unknown = Vec::new();

        for arg in args {
            for token in arg.as_ref().split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                match classify_token(token) {
                    Some(GroupKind::Base) => groups.base.push(token.to_string()),
                    Some(GroupKind::Fex) => groups.fex.push(token.to_string()),
                    Some(GroupKind::PortChannel) => groups.port_channels.push(token.to_string()),
                    None => unknown.push(token.to_string()),
                }
            }
        }

        if !unknown.is_empty() {
            return Err(MonitorError::UnknownInterface { specs: unknown });
        }
        Ok(groups)
    }

    /// Device query strings for the non-empty groups, in display order
    pub fn specs(&self) -> Vec<(GroupKind, String)> {
        [
            (GroupKind::Base, &self.base),
            (GroupKind::Fex, &self.fex),
            (GroupKind::PortChannel, &self.port_channels),
        ]
        .into_iter()
        .filter(|(_, tokens)| !tokens.is_empty())
        .map(|(kind, tokens)| (kind, tokens.join(",")))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.fex.is_empty() && self.port_channels.is_empty()
    }
}

/// Expand a comma-separated group spec into full interface names
/// (`e1/1-3` becomes `Ethernet1/1`, `Ethernet1/2`, `Ethernet1/3`).
/// Unrecognised tokens are skipped.
pub fn expand_spec(spec: &str) -> Vec<String> {
    let mut names = Vec::new();
    for token in spec.split(',').map(str::trim) {
        if let Some(caps) = fex_re().captures(token) {
            let prefix = format!("Ethernet{}/{}/", &caps[1], &caps[2]);
            push_range(&mut names, &prefix, &caps, 3);
        } else if let Some(caps) = base_re().captures(token) {
            let prefix = format!("Ethernet{}/", &caps[1]);
            push_range(&mut names, &prefix, &caps, 2);
        } else if let Some(caps) = po_re().captures(token) {
            if let Ok(n) = caps[1].parse::<u32>() {
                names.push(format!("port-channel{}", n));
            }
        }
    }
    names
}

fn push_range(names: &mut Vec<String>, prefix: &str, caps: &Captures, start_group: usize) {
    let Ok(start) = caps[start_group].parse::<u32>() else {
        return;
    };
    let end = caps
        .get(start_group + 1)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(start);
    for port in start..=end {
        names.push(format!("{}{}", prefix, port));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tokens() {
        assert_eq!(classify_token("e1/1"), Some(GroupKind::Base));
        assert_eq!(classify_token("ETH2/2-4"), Some(GroupKind::Base));
        assert_eq!(classify_token("e101/1/25-40"), Some(GroupKind::Fex));
        assert_eq!(classify_token("eth104/1/5"), Some(GroupKind::Fex));
        assert_eq!(classify_token("po1"), Some(GroupKind::PortChannel));
        assert_eq!(classify_token("Port-Channel1024"), Some(GroupKind::PortChannel));
        assert_eq!(classify_token("e1/1-"), None);
        assert_eq!(classify_token("gi0/1"), None);
        assert_eq!(classify_token("po12345"), None);
    }

    #[test]
    fn test_classify_groups_and_specs() {
        let groups =
            InterfaceGroups::classify(["e1/1", "e101/1/25-40,po1", "po3", "eth2/2-4"]).unwrap();
        assert_eq!(groups.base, vec!["e1/1", "eth2/2-4"]);
        assert_eq!(groups.fex, vec!["e101/1/25-40"]);
        assert_eq!(groups.port_channels, vec!["po1", "po3"]);

        let specs = groups.specs();
        assert_eq!(
            specs,
            vec![
                (GroupKind::Base, "e1/1,eth2/2-4".to_string()),
                (GroupKind::Fex, "e101/1/25-40".to_string()),
                (GroupKind::PortChannel, "po1,po3".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_groups_are_skipped() {
        let groups = InterfaceGroups::classify(["po7"]).unwrap();
        assert_eq!(groups.specs(), vec![(GroupKind::PortChannel, "po7".to_string())]);
        assert!(!groups.is_empty());
    }

    #[test]
    fn test_unknown_tokens_are_collected() {
        let err = InterfaceGroups::classify(["e1/1,bogus", "x9"]).unwrap_err();
        match err {
            MonitorError::UnknownInterface { specs } => assert_eq!(specs, vec!["bogus", "x9"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_expand_spec() {
        assert_eq!(
            expand_spec("e1/1-3,po10"),
            vec!["Ethernet1/1", "Ethernet1/2", "Ethernet1/3", "port-channel10"]
        );
        assert_eq!(expand_spec("eth101/1/7"), vec!["Ethernet101/1/7"]);
        assert!(expand_spec("nonsense").is_empty());
    }
}
