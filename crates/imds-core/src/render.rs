//! Rendering of served documents into response bodies.
//!
//! JSON and YAML go through the same `Serialize` impls, so both formats
//! carry identical field names. User data additionally has a shell-script
//! form for guests that request `text/x-shellscript`.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::RenderError;
use crate::negotiate::WireFormat;
use crate::schema::{Metadata, NetworkConfig, UserData};

/// A rendered response body and the `Content-Type` it must be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// A document that can be served to instances.
pub trait ServedDocument: Serialize {
    /// Name used in error messages and logs.
    const KIND: &'static str;

    /// The shell-script form, if the document has one.
    fn to_script(&self) -> Option<String> {
        None
    }
}

impl ServedDocument for Metadata {
    const KIND: &'static str = "meta-data";
}

impl ServedDocument for NetworkConfig {
    const KIND: &'static str = "network-config";
}

impl ServedDocument for serde_json::Value {
    const KIND: &'static str = "vendor-data";
}

impl ServedDocument for UserData {
    const KIND: &'static str = "user-data";

    fn to_script(&self) -> Option<String> {
        Some(user_data_script(self))
    }
}

/// Render `document` in `format`.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization fails or the document has no
/// shell-script form.
pub fn render<D: ServedDocument>(document: &D, format: WireFormat) -> Result<Rendered, RenderError> {
    let body = match format {
        WireFormat::Json => serde_json::to_vec(document)?,
        WireFormat::Yaml => serde_yaml::to_string(document)?.into_bytes(),
        WireFormat::Script => document
            .to_script()
            .ok_or(RenderError::NoScriptForm { document: D::KIND })?
            .into_bytes(),
    };

    Ok(Rendered {
        content_type: format.content_type(),
        body,
    })
}

/// Quote `s` for a POSIX shell, leaving simple words bare.
fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_owned();
    }
    if s.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | ',' | '=' | '@')
    }) {
        return s.to_owned();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

// `writeln!` into a `String` cannot fail; results are discarded below.
fn user_data_script(user_data: &UserData) -> String {
    let mut out = String::from("#!/bin/sh\n# Generated from cloud-config user data.\nset -eu\n");

    if !user_data.hostname.is_empty() {
        let hostname = shell_quote(&user_data.hostname);
        let _ = writeln!(out, "\nhostname {hostname}");
        let _ = writeln!(out, "printf '%s\\n' {hostname} > /etc/hostname");
        if user_data.manage_etc_hosts {
            let entry = shell_quote(&format!("127.0.1.1 {}", user_data.hostname));
            let _ = writeln!(out, "printf '%s\\n' {entry} >> /etc/hosts");
        }
    }

    if user_data.package_update || user_data.package_upgrade || !user_data.packages.is_empty() {
        out.push('\n');
    }
    if user_data.package_update {
        out.push_str("apt-get update\n");
    }
    if user_data.package_upgrade {
        out.push_str("apt-get -y upgrade\n");
    }
    if !user_data.packages.is_empty() {
        let packages: Vec<String> = user_data.packages.iter().map(|p| shell_quote(p)).collect();
        let _ = writeln!(out, "apt-get install -y {}", packages.join(" "));
    }

    for user in &user_data.users {
        let name = shell_quote(&user.name);
        let mut useradd = String::from("useradd --create-home");
        if !user.shell.is_empty() {
            let _ = write!(useradd, " --shell {}", shell_quote(&user.shell));
        }
        if !user.groups.is_empty() {
            let _ = write!(useradd, " --groups {}", shell_quote(&user.groups.join(",")));
        }
        let _ = writeln!(out, "\n{useradd} {name} || true");

        if !user.ssh_authorized_keys.is_empty() {
            let _ = writeln!(out, "home=$(getent passwd {name} | cut -d: -f6)");
            out.push_str("install -d -m 0700 \"$home/.ssh\"\n");
            for key in &user.ssh_authorized_keys {
                let _ = writeln!(
                    out,
                    "printf '%s\\n' {} >> \"$home/.ssh/authorized_keys\"",
                    shell_quote(key)
                );
            }
            out.push_str("chmod 0600 \"$home/.ssh/authorized_keys\"\n");
            let _ = writeln!(out, "chown -R {name} \"$home/.ssh\"");
        }

        if !user.sudo.is_empty() {
            let sudoers = shell_quote(&format!("/etc/sudoers.d/90-imds-{}", user.name));
            let rule = shell_quote(&format!("{} {}", user.name, user.sudo));
            let _ = writeln!(out, "printf '%s\\n' {rule} > {sudoers}");
            let _ = writeln!(out, "chmod 0440 {sudoers}");
        }
    }

    for file in &user_data.write_files {
        let path = shell_quote(&file.path);
        let _ = writeln!(out, "\nmkdir -p \"$(dirname {path})\"");
        let _ = writeln!(out, "printf '%s' {} > {path}", shell_quote(&file.content));
        if !file.permissions.is_empty() {
            let _ = writeln!(out, "chmod {} {path}", shell_quote(&file.permissions));
        }
    }

    if !user_data.runcmd.is_empty() {
        out.push('\n');
        for command in &user_data.runcmd {
            out.push_str(command);
            out.push('\n');
        }
    }

    if !user_data.final_message.is_empty() {
        let _ = writeln!(out, "\nprintf '%s\\n' {}", shell_quote(&user_data.final_message));
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::defaults;

    #[test]
    fn json_and_yaml_share_field_names() {
        let metadata = defaults::metadata();
        let json = render(&metadata, WireFormat::Json).unwrap();
        let yaml = render(&metadata, WireFormat::Yaml).unwrap();

        assert_eq!(json.content_type, "application/json");
        assert_eq!(yaml.content_type, "application/yaml");

        let from_json: serde_json::Value = serde_json::from_slice(&json.body).unwrap();
        let from_yaml: serde_json::Value = serde_yaml::from_slice(&yaml.body).unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json["availability-zone"], "us-west-1a");
        assert_eq!(from_json["placement"]["host-id"], "host-123456");
    }

    #[test]
    fn yaml_network_config_roundtrips() {
        let config = defaults::network_config();
        let yaml = render(&config, WireFormat::Yaml).unwrap();
        let text = String::from_utf8(yaml.body).unwrap();

        assert!(text.contains("ethernets:"));
        assert!(text.contains("00:11:22:33:44:55"));
        let parsed: NetworkConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn vendor_payload_renders_as_given() {
        let payload = json!({"k": "v", "n": [1, 2]});
        let rendered = render(&payload, WireFormat::Json).unwrap();
        assert_eq!(rendered.body, br#"{"k":"v","n":[1,2]}"#.to_vec());
    }

    #[test]
    fn script_form_only_for_user_data() {
        let err = render(&defaults::metadata(), WireFormat::Script).unwrap_err();
        assert!(matches!(err, RenderError::NoScriptForm { document: "meta-data" }));

        let rendered = render(&defaults::user_data(), WireFormat::Script).unwrap();
        assert_eq!(rendered.content_type, "text/x-shellscript");
        assert!(rendered.body.starts_with(b"#!/bin/sh\n"));
    }

    #[test]
    fn user_data_script_covers_every_section() {
        let script = defaults::user_data().to_script().unwrap();

        assert!(script.contains("hostname example-host\n"));
        assert!(script.contains("printf '%s\\n' '127.0.1.1 example-host' >> /etc/hosts\n"));
        assert!(script.contains("apt-get update\n"));
        assert!(script.contains("apt-get -y upgrade\n"));
        assert!(script.contains("apt-get install -y curl git\n"));
        assert!(script.contains(
            "useradd --create-home --shell /bin/bash --groups sudo,docker example-user || true\n"
        ));
        assert!(script.contains("'example-user ALL=(ALL) NOPASSWD:ALL'"));
        assert!(script.contains("printf '%s' '127.0.0.1 example-host' > /etc/hosts\n"));
        assert!(script.contains("\necho 'Hello, World!'\n"));
        assert!(script.ends_with("printf '%s\\n' 'User data applied successfully.'\n"));
    }

    #[test]
    fn script_omits_empty_sections() {
        let script = UserData::default().to_script().unwrap();
        assert_eq!(script, "#!/bin/sh\n# Generated from cloud-config user data.\nset -eu\n");
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("plain-word_1.0"), "plain-word_1.0");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote("$(reboot)"), "'$(reboot)'");
    }
}
