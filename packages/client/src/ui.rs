//! UI utilities for the client.

use std::io::Write;

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(name: &str) {
    print!("{}> ", name);
    std::io::stdout().flush().ok();
}

/// Print `text` and put the prompt back.
pub fn show(text: &str, name: &str) {
    print!("{}", text);
    redisplay_prompt(name);
}
