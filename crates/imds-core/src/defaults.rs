//! Static documents served until per-instance data is wired in.
//!
//! Every request gets a freshly built value; nothing here is cached.

use std::collections::BTreeMap;

use crate::schema::{
    Ethernet, Interfaces, Mac, Match, Metadata, Nameservers, Network, NetworkConfig, Placement,
    Route, User, UserData, WriteFile,
};

const HOSTNAME: &str = "example-host";
const LOCAL_HOSTNAME: &str = "example-local-host";
const SSH_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAABIwAAAQEArD1...";
const MAC_ADDRESS: &str = "00:11:22:33:44:55";

/// Instance metadata for `/meta-data`.
#[must_use]
pub fn metadata() -> Metadata {
    let eth0 = Mac {
        device_number: "0".to_owned(),
        local_hostname: LOCAL_HOSTNAME.to_owned(),
        local_ipv4: "192.168.1.1".to_owned(),
        local_ipv6: "fe80::1".to_owned(),
        public_ipv4: "203.0.113.1".to_owned(),
        public_ipv6: "2001:db8::1".to_owned(),
        mac: MAC_ADDRESS.to_owned(),
    };

    Metadata {
        instance_id: "1234567890".to_owned(),
        hostname: HOSTNAME.to_owned(),
        local_hostname: LOCAL_HOSTNAME.to_owned(),
        availability_zone: "us-west-1a".to_owned(),
        region: "us-west-1".to_owned(),
        local_ipv4: "192.168.1.1".to_owned(),
        local_ipv6: "fe80::1".to_owned(),
        public_ipv4: "203.0.113.1".to_owned(),
        public_ipv6: "2001:db8::1".to_owned(),
        public_keys: vec![SSH_KEY.to_owned()],
        security_groups: vec!["sg-12345678".to_owned(), "sg-87654321".to_owned()],
        placement: Placement {
            host_id: "host-123456".to_owned(),
            availability_zone: "us-west-1a".to_owned(),
            region: "us-west-1".to_owned(),
            project: "example-project".to_owned(),
        },
        network: Network {
            interfaces: Interfaces {
                macs: BTreeMap::from([("eth0".to_owned(), eth0)]),
            },
        },
    }
}

/// Cloud-config user data for `/user-data`.
#[must_use]
pub fn user_data() -> UserData {
    UserData {
        hostname: HOSTNAME.to_owned(),
        manage_etc_hosts: true,
        users: vec![User {
            name: "example-user".to_owned(),
            sudo: "ALL=(ALL) NOPASSWD:ALL".to_owned(),
            shell: "/bin/bash".to_owned(),
            ssh_authorized_keys: vec![SSH_KEY.to_owned()],
            groups: vec!["sudo".to_owned(), "docker".to_owned()],
        }],
        packages: vec!["curl".to_owned(), "git".to_owned()],
        package_update: true,
        package_upgrade: true,
        write_files: vec![WriteFile {
            path: "/etc/hosts".to_owned(),
            content: "127.0.0.1 example-host".to_owned(),
            permissions: String::new(),
        }],
        runcmd: vec!["echo 'Hello, World!'".to_owned()],
        final_message: "User data applied successfully.".to_owned(),
    }
}

/// Version 2 network configuration for `/network-config`.
#[must_use]
pub fn network_config() -> NetworkConfig {
    let eth0 = Ethernet {
        version: 0,
        match_rule: Match {
            macaddress: MAC_ADDRESS.to_owned(),
            driver: String::new(),
            name: "eth0".to_owned(),
        },
        wakeonlan: true,
        dhcp4: true,
        addresses: vec!["192.168.1.2/24".to_owned()],
        gateway4: "192.168.1.1".to_owned(),
        gateway6: "fe80::1".to_owned(),
        nameservers: Nameservers {
            search: vec!["example.com".to_owned()],
            addresses: vec!["8.8.8.8".to_owned()],
        },
        routes: vec![Route {
            to: "192.0.2.0/24".to_owned(),
            via: "11.0.0.1".to_owned(),
            metric: 3,
        }],
    };

    NetworkConfig {
        version: 2,
        ethernets: BTreeMap::from([("eth0".to_owned(), eth0)]),
    }
}
