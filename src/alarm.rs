use std::{
    io::{self, Write},
    path::Path,
    process::{Command, Stdio},
};

const SOUND_CANDIDATES: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Audible end-of-interval signal.
///
/// Ringing is best-effort: callers are expected to discard the error.
pub trait Alarm {
    fn ring(&mut self) -> io::Result<()>;
}

/// Plays a desktop sound through `paplay`/`aplay`, falling back to the
/// terminal bell when no sound file is installed.
pub struct SystemAlarm;

impl Alarm for SystemAlarm {
    fn ring(&mut self) -> io::Result<()> {
        match SOUND_CANDIDATES.iter().find(|(_, file)| Path::new(file).exists()) {
            Some(&(player, file)) => {
                let mut child = Command::new(player)
                    .arg(file)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()?;
                // Reap the player off the UI thread.
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
                Ok(())
            }
            None => {
                let mut stdout = io::stdout();
                stdout.write_all(b"\x07")?;
                stdout.flush()
            }
        }
    }
}

pub struct SilentAlarm;

impl Alarm for SilentAlarm {
    fn ring(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn from_flag(no_sound: bool) -> Box<dyn Alarm> {
    if no_sound {
        Box::new(SilentAlarm)
    } else {
        Box::new(SystemAlarm)
    }
}
