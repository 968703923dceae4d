//! Line-based command loop for playing without a MIDI controller.

use std::io::BufRead;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use keysynth::{
    io::{ChannelFilter, VirtualKeyboard},
    synth::SynthHandle,
    Waveform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Waveform(Waveform),
    Press(char),
    Release(char),
    Status,
    Panic,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0} <key>")]
    MissingKey(&'static str),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();

        match verb.as_str() {
            "press" => Ok(Command::Press(parse_key(parts.next(), "press")?)),
            "release" => Ok(Command::Release(parse_key(parts.next(), "release")?)),
            "status" => Ok(Command::Status),
            "panic" => Ok(Command::Panic),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => other
                .parse::<Waveform>()
                .map(Command::Waveform)
                .map_err(|_| CommandError::Unknown(line.trim().to_string())),
        }
    }
}

fn parse_key(arg: Option<&str>, verb: &'static str) -> Result<char, CommandError> {
    let arg = arg.ok_or(CommandError::MissingKey(verb))?;
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) => Ok(key.to_ascii_lowercase()),
        _ => Err(CommandError::InvalidKey(arg.to_string())),
    }
}

pub fn print_help() {
    println!("Keyboard controls:");
    println!("  a w s e d f t g y h u j k  - notes C4 through C5");
    println!();
    println!("Commands:");
    println!("  press <key>    - press a note key (e.g. 'press a')");
    println!("  release <key>  - release a note key");
    println!("  sine | square | saw  - switch waveform for new notes");
    println!("  status         - show active voice count");
    println!("  panic          - release every note");
    println!("  quit           - exit");
}

/// Read commands from `input` until `quit` or end of input.
pub fn run(handle: &SynthHandle, input: impl BufRead) -> EyreResult<()> {
    let mut keyboard = VirtualKeyboard::new();

    for line in input.lines() {
        let line = line.wrap_err("failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(command, handle, &mut keyboard),
            Err(err) => println!("{err}"),
        }
    }

    for event in keyboard.release_all() {
        let _ = handle.send_midi(event, ChannelFilter::Omni);
    }
    Ok(())
}

fn execute(command: Command, handle: &SynthHandle, keyboard: &mut VirtualKeyboard) {
    match command {
        Command::Waveform(waveform) => {
            if handle.set_waveform(waveform).is_ok() {
                println!("Switched to {waveform} waveform");
            }
        }
        Command::Press(key) => match keyboard.press(key) {
            Some(event) => {
                if handle.send_midi(event, ChannelFilter::Omni).is_ok() {
                    println!("Note {key} pressed");
                }
            }
            None => println!("Invalid key: {key}"),
        },
        Command::Release(key) => match keyboard.release(key) {
            Some(event) => {
                if handle.send_midi(event, ChannelFilter::Omni).is_ok() {
                    println!("Note {key} released");
                }
            }
            None => println!("Invalid key or key not pressed: {key}"),
        },
        Command::Status => println!("{} active voices", handle.active_voices()),
        Command::Panic => {
            let _ = keyboard.release_all();
            if handle.all_notes_off().is_ok() {
                println!("All notes released");
            }
        }
        Command::Help => print_help(),
        Command::Quit => {}
    }
}
