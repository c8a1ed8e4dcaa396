use serde_json::{json, Value};

use crate::cli::utils::{output_value, print_json};
use crate::cli::OutputFormat;
use crate::permissions::{self, Permission, Role, ROLE_HIERARCHY};

/// `unconf roles`: the matrix from highest role down
pub fn list(output_format: OutputFormat) -> anyhow::Result<()> {
    permissions::validate()?;

    match output_format {
        OutputFormat::Json => {
            let roles: Vec<Value> = ROLE_HIERARCHY
                .iter()
                .rev()
                .map(|role| {
                    json!({
                        "role": role,
                        "label": role.label(),
                        "permissions": permissions::get_permissions_for_role(*role),
                    })
                })
                .collect();
            print_json(&json!({ "roles": roles }))
        }
        OutputFormat::Text => {
            for role in ROLE_HIERARCHY.iter().rev() {
                let perms: Vec<&str> = permissions::get_permissions_for_role(*role)
                    .iter()
                    .map(Permission::as_str)
                    .collect();
                println!("{:<11} {:<10} {}", role.label(), role.as_str(), perms.join(", "));
            }
            Ok(())
        }
    }
}

/// `unconf can <role> <permission>`
pub fn can(role: &str, permission: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    permissions::validate()?;
    let role: Role = role.parse()?;
    let permission: Permission = permission.parse()?;

    let allowed = permissions::can_role_perform(role, permission);
    let text = format!(
        "{} {} {}",
        role.label(),
        if allowed { "can" } else { "cannot" },
        permission
    );
    output_value(output_format, "allowed", json!(allowed), &text)
}
