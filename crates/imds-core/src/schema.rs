//! Cloud-init wire schema.
//!
//! Field names are the contract consumed by guest agents and are identical
//! in JSON and YAML output. Interface maps are `BTreeMap`s so documents
//! render in a stable order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Metadata ─────────────────────────────────────────────────────────

/// Instance metadata served at `/meta-data`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    pub instance_id: String,
    pub hostname: String,
    pub local_hostname: String,
    pub availability_zone: String,
    pub region: String,
    pub local_ipv4: String,
    pub local_ipv6: String,
    pub public_ipv4: String,
    pub public_ipv6: String,
    pub public_keys: Vec<String>,
    pub security_groups: Vec<String>,
    pub placement: Placement,
    pub network: Network,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Placement {
    pub host_id: String,
    pub availability_zone: String,
    pub region: String,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Network {
    pub interfaces: Interfaces,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interfaces {
    /// Per-interface details keyed by interface name.
    pub macs: BTreeMap<String, Mac>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Mac {
    pub device_number: String,
    pub local_hostname: String,
    pub local_ipv4: String,
    pub local_ipv6: String,
    pub public_ipv4: String,
    pub public_ipv6: String,
    pub mac: String,
}

// ── User data ────────────────────────────────────────────────────────

/// `#cloud-config` user data served at `/user-data`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserData {
    pub hostname: String,
    pub manage_etc_hosts: bool,
    pub users: Vec<User>,
    pub packages: Vec<String>,
    pub package_update: bool,
    pub package_upgrade: bool,
    pub write_files: Vec<WriteFile>,
    pub runcmd: Vec<String>,
    pub final_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub sudo: String,
    pub shell: String,
    pub ssh_authorized_keys: Vec<String>,
    pub groups: Vec<String>,
}

/// A file cloud-init writes on first boot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteFile {
    pub path: String,
    pub content: String,
    /// Octal mode string such as `0644`; empty keeps the default.
    pub permissions: String,
}

// ── Network config ───────────────────────────────────────────────────

/// Netplan-style version 2 network configuration served at `/network-config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub version: u32,
    pub ethernets: BTreeMap<String, Ethernet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ethernet {
    pub version: u32,
    #[serde(rename = "match")]
    pub match_rule: Match,
    pub wakeonlan: bool,
    pub dhcp4: bool,
    pub addresses: Vec<String>,
    pub gateway4: String,
    pub gateway6: String,
    pub nameservers: Nameservers,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Match {
    pub macaddress: String,
    pub driver: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Nameservers {
    pub search: Vec<String>,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    pub to: String,
    pub via: String,
    pub metric: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn metadata_uses_kebab_case_wire_names() {
        let mut metadata = Metadata::default();
        metadata.network.interfaces.macs.insert("eth0".to_owned(), Mac::default());
        let value = serde_json::to_value(&metadata).unwrap();

        let mut expected = vec![
            "availability-zone", "hostname", "instance-id", "local-hostname", "local-ipv4",
            "local-ipv6", "network", "placement", "public-ipv4", "public-ipv6", "public-keys",
            "region", "security-groups",
        ];
        expected.sort_unstable();
        assert_eq!(keys(&value), expected);
        assert_eq!(
            keys(&value["placement"]),
            vec!["availability-zone", "host-id", "project", "region"]
        );
        assert_eq!(
            keys(&value["network"]["interfaces"]["macs"]["eth0"]),
            vec![
                "device-number", "local-hostname", "local-ipv4", "local-ipv6", "mac",
                "public-ipv4", "public-ipv6",
            ]
        );
    }

    #[test]
    fn user_data_uses_snake_case_wire_names() {
        let user_data = UserData {
            users: vec![User::default()],
            write_files: vec![WriteFile::default()],
            ..UserData::default()
        };
        let value = serde_json::to_value(&user_data).unwrap();
        assert_eq!(
            keys(&value),
            vec![
                "final_message", "hostname", "manage_etc_hosts", "package_update",
                "package_upgrade", "packages", "runcmd", "users", "write_files",
            ]
        );
        assert_eq!(
            keys(&value["users"][0]),
            vec!["groups", "name", "shell", "ssh_authorized_keys", "sudo"]
        );
        assert_eq!(keys(&value["write_files"][0]), vec!["content", "path", "permissions"]);
    }

    #[test]
    fn ethernet_match_keeps_reserved_word_key() {
        let ethernet = Ethernet {
            routes: vec![Route::default()],
            ..Ethernet::default()
        };
        let value = serde_json::to_value(&ethernet).unwrap();
        assert_eq!(
            keys(&value),
            vec![
                "addresses", "dhcp4", "gateway4", "gateway6", "match", "nameservers", "routes",
                "version", "wakeonlan",
            ]
        );
        assert_eq!(keys(&value["match"]), vec!["driver", "macaddress", "name"]);
        assert_eq!(keys(&value["nameservers"]), vec!["addresses", "search"]);
        assert_eq!(keys(&value["routes"][0]), vec!["metric", "to", "via"]);
    }
}
