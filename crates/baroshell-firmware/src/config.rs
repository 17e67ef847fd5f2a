//! Build-time configuration
//!
//! `build.rs` forwards values from `.env` (or the environment) so they can be
//! changed without touching the source.

use baroshell_core::config::{Config, DEFAULT_PROMPT};

/// Shell prompt, overridden by `BAROSHELL_PROMPT` at build time.
pub const PROMPT: &str = match option_env!("BAROSHELL_PROMPT") {
    Some(prompt) => prompt,
    None => DEFAULT_PROMPT,
};

pub fn firmware_config() -> Config<'static> {
    Config::with_prompt(PROMPT)
}
