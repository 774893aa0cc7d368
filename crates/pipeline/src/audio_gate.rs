//! Audio admission policy
//!
//! Recorded speech is admitted only when it has a positive, finite duration
//! no longer than the configured ceiling. Rejected audio never reaches speech
//! recognition; there is no truncate-and-continue.

use std::io::Cursor;

use loan_assist_config::constants::audio::MAX_DURATION_SECS;
use loan_assist_core::{AudioClip, Error};

/// Why a clip was turned away
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectionReason {
    AudioTooLong { duration_secs: f64, max_secs: f64 },
    EmptyAudio,
}

impl From<RejectionReason> for Error {
    fn from(reason: RejectionReason) -> Self {
        match reason {
            RejectionReason::AudioTooLong {
                duration_secs,
                max_secs,
            } => Error::AudioTooLong {
                duration_secs,
                max_secs,
            },
            RejectionReason::EmptyAudio => Error::EmptyAudio,
        }
    }
}

/// A clip that passed the gate.
///
/// Only [`AudioGate`] constructs this, so speech recognition cannot be
/// handed audio that was never checked.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittedAudio {
    clip: AudioClip,
}

impl AdmittedAudio {
    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }

    pub fn duration_secs(&self) -> f64 {
        self.clip.duration_secs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Accepted(AdmittedAudio),
    Rejected(RejectionReason),
}

impl Admission {
    pub fn into_result(self) -> Result<AdmittedAudio, RejectionReason> {
        match self {
            Admission::Accepted(audio) => Ok(audio),
            Admission::Rejected(reason) => Err(reason),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AudioGate {
    max_duration_secs: f64,
}

impl Default for AudioGate {
    fn default() -> Self {
        Self::new(MAX_DURATION_SECS)
    }
}

impl AudioGate {
    pub fn new(max_duration_secs: f64) -> Self {
        Self { max_duration_secs }
    }

    pub fn max_duration_secs(&self) -> f64 {
        self.max_duration_secs
    }

    /// Admit raw audio bytes.
    ///
    /// The duration comes from the WAV header when it can be read. A declared
    /// duration is cross-checked against the header and the larger value wins;
    /// with neither, the clip counts as empty.
    pub fn admit(&self, bytes: Vec<u8>, declared_secs: Option<f64>) -> Admission {
        if bytes.is_empty() {
            return Admission::Rejected(RejectionReason::EmptyAudio);
        }

        let measured = measure_wav_duration(&bytes);
        let duration = match (declared_secs, measured) {
            (Some(declared), Some(measured)) => {
                if (declared - measured).abs() > 0.5 {
                    tracing::debug!(declared, measured, "Declared audio duration disagrees with header");
                }
                declared.max(measured)
            }
            (Some(declared), None) => declared,
            (None, Some(measured)) => measured,
            (None, None) => {
                tracing::debug!(bytes = bytes.len(), "Audio duration could not be determined");
                return Admission::Rejected(RejectionReason::EmptyAudio);
            }
        };

        self.check(AudioClip::new(bytes, duration))
    }

    /// Apply the policy to a clip whose duration is already known
    pub fn check(&self, clip: AudioClip) -> Admission {
        let duration = clip.duration_secs;

        if clip.is_empty() || !duration.is_finite() || duration <= 0.0 {
            tracing::debug!(duration, "Rejected empty audio");
            return Admission::Rejected(RejectionReason::EmptyAudio);
        }

        if duration > self.max_duration_secs {
            tracing::info!(
                duration,
                max = self.max_duration_secs,
                "Rejected audio over the duration ceiling"
            );
            return Admission::Rejected(RejectionReason::AudioTooLong {
                duration_secs: duration,
                max_secs: self.max_duration_secs,
            });
        }

        Admission::Accepted(AdmittedAudio { clip })
    }
}

/// Duration of a WAV payload in seconds, read from its header
pub fn measure_wav_duration(bytes: &[u8]) -> Option<f64> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as f64 / spec.sample_rate as f64)
}
