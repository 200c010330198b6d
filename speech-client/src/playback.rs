//! Detached audio playback
//!
//! One audio output context per process, created lazily on a dedicated
//! thread and never torn down mid-session. Playback is fire-and-forget:
//! callers hand over a decoded buffer and immediately get control back;
//! output failures are logged and never reach the caller awaiting a
//! duration.

use std::sync::{OnceLock, mpsc};

use log::{debug, warn};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

use crate::backend::SpeechAudio;

static PLAYBACK: OnceLock<Option<mpsc::Sender<SpeechAudio>>> = OnceLock::new();

/// Queue a decoded buffer on the process-wide output and return
/// immediately. Dropped silently when no output device exists.
pub fn play(audio: SpeechAudio) {
    if let Some(tx) = sender() {
        // A closed channel means the output device went away after probing;
        // the caller already has its duration, so the buffer is dropped.
        let _ = tx.send(audio);
    }
}

fn sender() -> Option<&'static mpsc::Sender<SpeechAudio>> {
    PLAYBACK.get_or_init(spawn_output_thread).as_ref()
}

fn spawn_output_thread() -> Option<mpsc::Sender<SpeechAudio>> {
    let (tx, rx) = mpsc::channel::<SpeechAudio>();

    let spawned = std::thread::Builder::new()
        .name("speech-playback".to_string())
        .spawn(move || {
            // The stream handle must live on this thread for the whole
            // session; dropping it would silence every queued buffer.
            let (_stream, handle) = match OutputStream::try_default() {
                Ok(output) => output,
                Err(e) => {
                    warn!("No audio output device, playback disabled: {e}");
                    return;
                }
            };

            while let Ok(audio) = rx.recv() {
                let buffer =
                    SamplesBuffer::new(audio.channels, audio.sample_rate, audio.samples);
                match Sink::try_new(&handle) {
                    Ok(sink) => {
                        sink.append(buffer);
                        // Keep playing after the sink handle goes away
                        sink.detach();
                    }
                    Err(e) => warn!("Failed to start playback: {e}"),
                }
            }

            debug!("Playback channel closed");
        });

    match spawned {
        Ok(_) => Some(tx),
        Err(e) => {
            warn!("Failed to start playback thread: {e}");
            None
        }
    }
}
