//! Maps concrete device input to abstract commands. The sequencer only ever
//! sees `start()` and `react()`.

use lightsout_core::TrialPhase;

/// Keys the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    React,
    Quit,
}

pub fn command_for_key(key: Key) -> Option<Command> {
    match key {
        Key::Enter => Some(Command::React),
        Key::Space => Some(Command::Start),
        Key::Escape => Some(Command::Quit),
        Key::Other => None,
    }
}

/// A tap presses whichever button is on screen: the react button while a
/// trial is running, otherwise start / restart / try again.
pub fn command_for_tap(phase: TrialPhase) -> Command {
    if phase.accepts_reaction() {
        Command::React
    } else {
        Command::Start
    }
}
