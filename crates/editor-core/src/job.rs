use serde::Serialize;
use uuid::Uuid;

use crate::backend::ComposeResult;

/// Progress milestone once every photo has a remote reference.
pub const UPLOAD_CHECKPOINT: u8 = 40;
/// Per-tick advance of the cosmetic simulation in synthetic mode.
pub const SIM_TICK_STEP: u8 = 10;
/// The simulation never reaches 100; the final jump is reserved for
/// the real completion event.
pub const SIM_TICK_CEILING: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobPhase {
    Idle,
    Uploading,
    Requesting,
    Succeeded,
    Failed,
}

impl JobPhase {
    pub fn is_active(self) -> bool {
        matches!(self, JobPhase::Uploading | JobPhase::Requesting)
    }
}

/// Lifecycle of one generation attempt. `progress` is monotonically
/// non-decreasing within a job; only `Start` resets it.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationJob {
    pub job_id: Option<Uuid>,
    pub phase: JobPhase,
    pub progress: u8,
    pub result: Option<ComposeResult>,
    pub error: Option<String>,
    pub started_at: Option<u64>,
    pub updated_at: u64,
}

#[derive(Debug, Clone)]
pub enum JobEvent {
    Start { job_id: Uuid },
    UploadsComplete,
    SimTick,
    Done { result: ComposeResult },
    Error { message: String },
}

fn now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Default for GenerationJob {
    fn default() -> Self {
        Self {
            job_id: None,
            phase: JobPhase::Idle,
            progress: 0,
            result: None,
            error: None,
            started_at: None,
            updated_at: now(),
        }
    }
}

impl GenerationJob {
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn apply(&mut self, event: JobEvent) {
        self.updated_at = now();

        match event {
            JobEvent::Start { job_id } => {
                self.job_id = Some(job_id);
                self.phase = JobPhase::Uploading;
                self.progress = 0;
                self.result = None;
                self.error = None;
                self.started_at = Some(self.updated_at);
            }

            JobEvent::UploadsComplete => {
                self.phase = JobPhase::Requesting;
                self.progress = self.progress.max(UPLOAD_CHECKPOINT);
            }

            // Cosmetic only; capped so the real completion owns 100.
            JobEvent::SimTick => {
                if self.phase == JobPhase::Requesting {
                    self.progress = self
                        .progress
                        .max(self.progress.saturating_add(SIM_TICK_STEP).min(SIM_TICK_CEILING));
                }
            }

            JobEvent::Done { result } => {
                self.phase = JobPhase::Succeeded;
                self.progress = 100;
                self.result = Some(result);
                self.error = None;
            }

            // Progress stays frozen at its last value.
            JobEvent::Error { message } => {
                self.phase = JobPhase::Failed;
                self.error = Some(message);
            }
        }
    }
}
