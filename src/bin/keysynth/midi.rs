use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use midir::{MidiInput, MidiInputConnection};

use keysynth::{
    io::{ChannelFilter, MidiEvent},
    synth::SynthHandle,
};

/// Open MIDI input. Dropping it closes the port and stops midir's thread.
pub struct MidiConnection {
    _connection: MidiInputConnection<()>,
}

/// Connect to `port` (or the first port) and forward note events to `handle`.
///
/// Returns `None` if no port can be opened; typed commands still work.
pub fn connect(
    handle: SynthHandle,
    port: Option<&str>,
    filter: ChannelFilter,
) -> Option<MidiConnection> {
    match try_connect(handle, port, filter) {
        Ok(connection) => Some(connection),
        Err(err) => {
            tracing::warn!("MIDI input unavailable, keyboard commands only: {err:#}");
            None
        }
    }
}

fn try_connect(
    handle: SynthHandle,
    wanted: Option<&str>,
    filter: ChannelFilter,
) -> EyreResult<MidiConnection> {
    let midi_in = MidiInput::new("keysynth").wrap_err("failed to initialise MIDI input")?;

    let ports = midi_in.ports();
    let port = match wanted {
        Some(name) => ports
            .iter()
            .find(|port| midi_in.port_name(port).is_ok_and(|n| n == name))
            .ok_or_else(|| eyre!("MIDI port '{name}' not found"))?,
        None => ports.first().ok_or_else(|| eyre!("no MIDI input ports found"))?,
    };
    let port_name = midi_in
        .port_name(port)
        .wrap_err("failed to read MIDI port name")?;

    let connection = midi_in
        .connect(
            port,
            "keysynth-input",
            move |_stamp, message, _| {
                if let Some(event) = MidiEvent::from_bytes(message) {
                    // queue-full is already logged by the handle
                    let _ = handle.send_midi(event, filter);
                }
            },
            (),
        )
        .map_err(|err| eyre!("failed to connect to MIDI port '{port_name}': {err}"))?;

    tracing::info!(port = %port_name, ?filter, "MIDI input connected");

    Ok(MidiConnection {
        _connection: connection,
    })
}
