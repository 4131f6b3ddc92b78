use colored::Colorize;

use crate::context::{SessionContext, KNOWN_KEYS};
use crate::error::Result;
use crate::settings::session_path;

pub fn show() -> Result<()> {
    let ctx = SessionContext::load(&session_path())?;
    let mut empty = true;
    for (key, value) in ctx.entries() {
        println!("{key:<12} {value}");
        empty = false;
    }
    if empty {
        println!("Session is empty.");
    }
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        println!(
            "{}",
            format!("Warning: '{key}' is not a known key ({})", KNOWN_KEYS.join(", ")).yellow()
        );
    }
    let mut ctx = SessionContext::load(&session_path())?;
    ctx.set(key, value)?;
    println!("{key} = {value}");
    Ok(())
}

pub fn unset(key: &str) -> Result<()> {
    let mut ctx = SessionContext::load(&session_path())?;
    match ctx.remove(key)? {
        Some(_) => println!("Removed {key}"),
        None => println!("{key} was not set"),
    }
    Ok(())
}

pub fn clear() -> Result<()> {
    let mut ctx = SessionContext::load(&session_path())?;
    ctx.clear()?;
    println!("Session cleared.");
    Ok(())
}
