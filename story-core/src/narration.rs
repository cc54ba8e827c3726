//! Read-aloud narration.
//!
//! The storybook only talks to a [`Narrator`]: it asks for an utterance to be
//! spoken and cancels it again. Completion comes back separately as the
//! utterance id, so the controller can ignore completions it no longer cares
//! about.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

/// Identifies one request to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

/// Voice settings for an utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.1,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub params: SpeechParams,
}

/// A speech capability.
///
/// `speak` replaces whatever is currently being spoken and returns whether
/// speech actually started. Implementations report natural completion of an
/// utterance out of band; a cancelled or unstarted utterance is never reported.
pub trait Narrator {
    fn is_available(&self) -> bool;

    fn speak(&mut self, utterance: Utterance) -> bool;

    fn cancel(&mut self);
}

impl<N: Narrator + ?Sized> Narrator for Box<N> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn speak(&mut self, utterance: Utterance) -> bool {
        (**self).speak(utterance)
    }

    fn cancel(&mut self) {
        (**self).cancel();
    }
}

/// A narrator for environments without speech. Never speaks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _utterance: Utterance) -> bool {
        false
    }

    fn cancel(&mut self) {}
}

/// Words per minute at rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Narrates by running an espeak-compatible program, one process per utterance.
///
/// Finished utterance ids are sent on the channel given at construction.
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct CommandNarrator {
    program: String,
    available: bool,
    finished: mpsc::UnboundedSender<UtteranceId>,
    current: Option<oneshot::Sender<()>>,
}

impl CommandNarrator {
    /// The program is looked up once here; a program that cannot be found
    /// makes the narrator unavailable.
    pub fn new(program: impl Into<String>, finished: mpsc::UnboundedSender<UtteranceId>) -> Self {
        let program = program.into();
        let available = resolve_program(&program).is_some();
        if !available {
            tracing::warn!(program = %program, "Speech program not found, narration disabled");
        }
        Self {
            program,
            available,
            finished,
            current: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for an utterance.
    pub fn args(utterance: &Utterance) -> Vec<String> {
        let params = utterance.params;
        let words_per_minute = (BASE_WORDS_PER_MINUTE * params.rate).round() as u32;
        let pitch = (50.0 * params.pitch).round().clamp(0.0, 99.0) as u32;
        let amplitude = (100.0 * params.volume).round().clamp(0.0, 200.0) as u32;

        vec![
            "-s".to_string(),
            words_per_minute.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            utterance.text.clone(),
        ]
    }
}

impl Narrator for CommandNarrator {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&mut self, utterance: Utterance) -> bool {
        self.cancel();
        if !self.available {
            return false;
        }

        let mut child = match Command::new(&self.program)
            .args(Self::args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program = %self.program, error = %e, "Failed to start speech program");
                return false;
            }
        };

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.current = Some(cancel_tx);

        let finished = self.finished.clone();
        let id = utterance.id;
        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    if let Err(e) = status {
                        tracing::warn!(error = %e, "Speech program failed");
                    }
                    let _ = finished.send(id);
                }
                _ = cancel_rx => {
                    let _ = child.kill().await;
                }
            }
        });
        true
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.current.take() {
            let _ = cancel.send(());
        }
    }
}

/// Finds an executable file for `program`, searching `PATH` unless it
/// already names a path.
fn resolve_program(program: &str) -> Option<PathBuf> {
    let program = program.trim();
    if program.is_empty() {
        return None;
    }
    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

impl Drop for CommandNarrator {
    fn drop(&mut self) {
        self.cancel();
    }
}
