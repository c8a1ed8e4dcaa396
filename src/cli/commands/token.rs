use serde_json::json;

use crate::auth::generate_invite_token;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

/// `unconf token`: a fresh invite token, as the server would mint it
pub fn generate(output_format: OutputFormat) -> anyhow::Result<()> {
    let token = generate_invite_token();
    output_value(output_format, "token", json!(token), &token)
}
