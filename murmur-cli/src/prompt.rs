use crate::{Commands, RoomArgs};
use anyhow::{Context, Result};
use dialoguer::{Input, Password, Select};
use murmur_core::RoomName;
use murmur_session::JoinRequest;

/// Use `given` if it is set, ask otherwise.
pub fn value(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}

pub fn password(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(password) => Ok(password),
        None => Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .context("Failed to read password"),
    }
}

pub fn choose_mode() -> Result<Commands> {
    let choice = Select::new()
        .with_prompt("What do you want to do?")
        .items(&["Host a room", "Join a room"])
        .default(0)
        .interact()
        .context("Failed to read choice")?;

    Ok(match choice {
        0 => Commands::Host(RoomArgs::default()),
        _ => Commands::Join(RoomArgs::default()),
    })
}

/// Everything needed to enter a room, asked for before anything is started.
pub fn join_request(args: RoomArgs) -> Result<JoinRequest> {
    Ok(JoinRequest {
        room: RoomName::from(value(args.room, "Room name")?),
        password: password(args.password, "Room password")?,
        username: value(args.username, "Your name")?,
    })
}
