//! Desktop delivery of completion side effects

use std::path::PathBuf;

use tokio::{process::Command, runtime::Handle, sync::broadcast};
use tracing::{debug, info, warn};

use super::completion::{CompletionActions, CompletionNotice};
use crate::{
    error::ActionError,
    state::{settings::DEFAULT_SOUND, TimerEvent, TimerSnapshot},
};

#[cfg(not(target_os = "macos"))]
const FREEDESKTOP_COMPLETE: &str = "/usr/share/sounds/freedesktop/stereo/complete.oga";

/// Plays sounds and shows notifications on the local desktop; flashes are
/// handed to whatever presentation layer is subscribed to timer events
pub struct SystemActions {
    events: broadcast::Sender<TimerEvent>,
}

impl SystemActions {
    pub fn new(events: broadcast::Sender<TimerEvent>) -> Self {
        Self { events }
    }
}

impl CompletionActions for SystemActions {
    fn play_sound(&self, sound_name: &str) -> Result<(), ActionError> {
        let handle = runtime()?;
        let (program, args) = sound_command(sound_name)?;
        debug!("Playing completion sound with {} {:?}", program, args);

        let _guard = handle.enter();
        let mut child = Command::new(program)
            .args(&args)
            .spawn()
            .map_err(|source| ActionError::Spawn { program: program.to_string(), source })?;

        // Reap the player in the background; nobody waits on the chime.
        handle.spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => warn!("{} exited with {}", program, status),
                Err(e) => warn!("Failed to wait on {}: {}", program, e),
                _ => {}
            }
        });
        Ok(())
    }

    fn notify(&self, notice: &CompletionNotice) -> Result<(), ActionError> {
        let handle = runtime()?;
        let mut notification = notify_rust::Notification::new();
        notification.summary(&notice.title).appname("desk-timer");

        #[cfg(target_os = "macos")]
        notification.subtitle(&notice.subtitle).body(&notice.body);
        #[cfg(not(target_os = "macos"))]
        notification.body(&format!("{}\n{}", notice.subtitle, notice.body));

        // Delivery talks to the desktop bus and may block briefly.
        handle.spawn_blocking(move || {
            if let Err(e) = notification.show() {
                warn!("Failed to deliver notification: {}", e);
            }
        });
        Ok(())
    }

    fn flash(&self, timer: &TimerSnapshot) -> Result<(), ActionError> {
        match self.events.send(TimerEvent::Flash { id: timer.id }) {
            Ok(receivers) => {
                info!("Flash requested for timer {} ({} subscribers)", timer.id, receivers);
                Ok(())
            }
            Err(_) => Err(ActionError::Unavailable("flash overlay subscriber".to_string())),
        }
    }
}

fn runtime() -> Result<Handle, ActionError> {
    Handle::try_current().map_err(|_| ActionError::Unavailable("async runtime".to_string()))
}

/// Resolve the player command for a named system sound
#[cfg(target_os = "macos")]
fn sound_command(sound_name: &str) -> Result<(&'static str, Vec<String>), ActionError> {
    let path = [sound_name, DEFAULT_SOUND]
        .iter()
        .map(|name| PathBuf::from(format!("/System/Library/Sounds/{}.aiff", name)))
        .find(|path| path.exists());

    match path {
        Some(path) => Ok(("afplay", vec![path.display().to_string()])),
        None => Ok(("osascript", vec!["-e".to_string(), "beep".to_string()])),
    }
}

/// Resolve the player command for a named system sound
///
/// Outside macOS the named sounds do not exist, so every name maps to the
/// freedesktop completion chime.
#[cfg(not(target_os = "macos"))]
fn sound_command(sound_name: &str) -> Result<(&'static str, Vec<String>), ActionError> {
    let path = PathBuf::from(FREEDESKTOP_COMPLETE);
    if !path.exists() {
        return Err(ActionError::Unavailable(format!("sound '{}'", sound_name)));
    }
    if sound_name != DEFAULT_SOUND {
        debug!("Sound '{}' has no local equivalent, using default chime", sound_name);
    }
    Ok(("paplay", vec![path.display().to_string()]))
}
