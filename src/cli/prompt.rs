//! Interactive prompts with a non-interactive fallback

use crate::error::{GhmError, GhmResult};
use std::io::IsTerminal;

/// Whether both stdin and stdout are attached to a terminal
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Ask a yes/no question, answering `default` when nobody can be asked
pub async fn confirm(message: &str, default: bool) -> GhmResult<bool> {
    if !is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on terminal input
    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| GhmError::Prompt(e.to_string()))?
    .map_err(|e| GhmError::Prompt(e.to_string()))
}
