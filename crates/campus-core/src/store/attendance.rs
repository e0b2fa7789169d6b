use crate::api::StoreResult;
use crate::models::{AttendanceRegistration, AttendanceStatus, RegisterAttendanceRequest};

/// One submission of an RSVP response, kept so a failed one can be retried
/// with the same target and notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceAttempt {
    pub event_id: String,
    pub target: AttendanceStatus,
    pub notes: Option<String>,
    /// Unique per submission within one machine, retries included
    pub seq: u64,
}

impl AttendanceAttempt {
    pub fn to_request(&self) -> RegisterAttendanceRequest {
        RegisterAttendanceRequest {
            event_id: self.event_id.clone(),
            status: self.target,
            notes: self.notes.clone(),
        }
    }
}

/// A failed submission, shown next to the RSVP actions with a retry control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpFailure {
    pub attempt: AttendanceAttempt,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RsvpRejected {
    #[error("attendance already answered ({0})")]
    AlreadyAnswered(AttendanceStatus),
    #[error("a response is already being submitted")]
    Submitting,
    #[error("the event has already taken place")]
    EventPassed,
    #[error("pending is not a response")]
    NotAResponse,
    #[error("there is no failed submission to retry")]
    NothingToRetry,
    #[error("event details are not loaded yet")]
    NotReady,
}

/// Per-event RSVP state for the current user.
///
/// `pending` moves at most once to `confirmed`, `declined` or `maybe`; all
/// three are terminal. While a submission is in flight every request is
/// rejected rather than queued. A failed submission leaves the status at
/// `pending` and records the attempt for [`AttendanceMachine::retry`].
#[derive(Debug, Clone)]
pub struct AttendanceMachine {
    event_id: String,
    status: AttendanceStatus,
    submitting: Option<AttendanceAttempt>,
    failure: Option<RsvpFailure>,
    event_passed: bool,
    next_seq: u64,
}

impl AttendanceMachine {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            status: AttendanceStatus::Pending,
            submitting: None,
            failure: None,
            event_passed: false,
            next_seq: 0,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn status(&self) -> AttendanceStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }

    pub fn failure(&self) -> Option<&RsvpFailure> {
        self.failure.as_ref()
    }

    pub fn is_event_passed(&self) -> bool {
        self.event_passed
    }

    /// Disable every RSVP action. There is no way back: the check happens once.
    pub fn lock_past_event(&mut self) {
        self.event_passed = true;
    }

    /// Whether any RSVP action could currently be triggered.
    pub fn can_respond(&self) -> bool {
        self.guard().is_ok()
    }

    /// Adopt the answer the server already has on record.
    pub fn apply_registration(&mut self, registration: &AttendanceRegistration) {
        if registration.event_id != self.event_id || self.submitting.is_some() {
            return;
        }
        if self.status == AttendanceStatus::Pending && registration.status.is_response() {
            self.status = registration.status;
            self.failure = None;
        }
    }

    pub fn request_confirm(&mut self) -> Result<AttendanceAttempt, RsvpRejected> {
        self.begin(AttendanceStatus::Confirmed, None)
    }

    /// Notes are trimmed and dropped when empty.
    pub fn request_decline_or_maybe(
        &mut self,
        target: AttendanceStatus,
        notes: Option<&str>,
    ) -> Result<AttendanceAttempt, RsvpRejected> {
        if !target.accepts_notes() {
            return Err(RsvpRejected::NotAResponse);
        }
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self.begin(target, notes)
    }

    /// Dispatch to the right request for `target`.
    pub fn request(
        &mut self,
        target: AttendanceStatus,
        notes: Option<&str>,
    ) -> Result<AttendanceAttempt, RsvpRejected> {
        match target {
            AttendanceStatus::Confirmed => self.request_confirm(),
            AttendanceStatus::Pending => Err(RsvpRejected::NotAResponse),
            _ => self.request_decline_or_maybe(target, notes),
        }
    }

    /// Re-submit the last failed attempt with its original target and notes.
    pub fn retry(&mut self) -> Result<AttendanceAttempt, RsvpRejected> {
        self.guard()?;
        let failure = self.failure.take().ok_or(RsvpRejected::NothingToRetry)?;
        let attempt = AttendanceAttempt {
            seq: self.bump_seq(),
            ..failure.attempt
        };
        self.submitting = Some(attempt.clone());
        Ok(attempt)
    }

    /// Apply the store's answer to an attempt. Answers for an attempt that is
    /// not the one in flight are ignored. Returns true when the status changed.
    pub fn complete(&mut self, attempt: &AttendanceAttempt, result: &StoreResult<()>) -> bool {
        if self.submitting.as_ref() != Some(attempt) {
            tracing::debug!(event_id = %self.event_id, "ignoring answer for a stale attendance attempt");
            return false;
        }
        self.submitting = None;
        match result {
            Ok(()) => {
                self.status = attempt.target;
                self.failure = None;
                true
            }
            Err(err) => {
                tracing::warn!(
                    event_id = %self.event_id,
                    response = %attempt.target,
                    error = %err,
                    "attendance submission failed"
                );
                self.failure = Some(RsvpFailure {
                    attempt: attempt.clone(),
                    message: err.user_message().to_string(),
                });
                false
            }
        }
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn guard(&self) -> Result<(), RsvpRejected> {
        if self.event_passed {
            return Err(RsvpRejected::EventPassed);
        }
        if self.status.is_response() {
            return Err(RsvpRejected::AlreadyAnswered(self.status));
        }
        if self.submitting.is_some() {
            return Err(RsvpRejected::Submitting);
        }
        Ok(())
    }

    fn begin(
        &mut self,
        target: AttendanceStatus,
        notes: Option<String>,
    ) -> Result<AttendanceAttempt, RsvpRejected> {
        if let Err(rejected) = self.guard() {
            tracing::debug!(event_id = %self.event_id, response = %target, %rejected, "rsvp request rejected");
            return Err(rejected);
        }
        let attempt = AttendanceAttempt {
            event_id: self.event_id.clone(),
            target,
            notes: if target.accepts_notes() { notes } else { None },
            seq: self.bump_seq(),
        };
        self.failure = None;
        self.submitting = Some(attempt.clone());
        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StoreError;

    fn failed() -> StoreResult<()> {
        Err(StoreError::Rejected("nope".to_string()))
    }

    #[test]
    fn test_confirm_then_nothing_else_changes_status() {
        let mut m = AttendanceMachine::new("e1");
        let attempt = m.request_confirm().unwrap();
        assert!(m.is_submitting());
        assert!(m.complete(&attempt, &Ok(())));
        assert_eq!(m.status(), AttendanceStatus::Confirmed);

        assert_eq!(
            m.request_decline_or_maybe(AttendanceStatus::Maybe, None),
            Err(RsvpRejected::AlreadyAnswered(AttendanceStatus::Confirmed))
        );
        assert_eq!(
            m.request_confirm(),
            Err(RsvpRejected::AlreadyAnswered(AttendanceStatus::Confirmed))
        );
        assert_eq!(m.status(), AttendanceStatus::Confirmed);
    }

    #[test]
    fn test_submitting_rejects_instead_of_queueing() {
        let mut m = AttendanceMachine::new("e1");
        let first = m.request_confirm().unwrap();
        assert_eq!(
            m.request_decline_or_maybe(AttendanceStatus::Declined, Some("x")),
            Err(RsvpRejected::Submitting)
        );
        assert_eq!(m.retry(), Err(RsvpRejected::Submitting));
        m.complete(&first, &Ok(()));
        assert_eq!(m.status(), AttendanceStatus::Confirmed);
    }

    #[test]
    fn test_failure_keeps_pending_and_retry_repeats_target() {
        let mut m = AttendanceMachine::new("e1");
        let attempt = m
            .request_decline_or_maybe(AttendanceStatus::Maybe, Some("  llego tarde  "))
            .unwrap();
        assert_eq!(attempt.notes.as_deref(), Some("llego tarde"));

        assert!(!m.complete(&attempt, &failed()));
        assert_eq!(m.status(), AttendanceStatus::Pending);
        assert!(!m.is_submitting());
        assert_eq!(m.failure().unwrap().attempt, attempt);

        let again = m.retry().unwrap();
        assert_eq!(again.target, attempt.target);
        assert_eq!(again.notes, attempt.notes);
        assert_ne!(again.seq, attempt.seq);
        assert!(m.failure().is_none());
        m.complete(&again, &Ok(()));
        assert_eq!(m.status(), AttendanceStatus::Maybe);
    }

    #[test]
    fn test_retry_without_failure_is_rejected() {
        let mut m = AttendanceMachine::new("e1");
        assert_eq!(m.retry(), Err(RsvpRejected::NothingToRetry));
        assert!(!m.is_submitting());
    }

    #[test]
    fn test_user_may_pick_another_response_after_failure() {
        let mut m = AttendanceMachine::new("e1");
        let attempt = m.request_confirm().unwrap();
        m.complete(&attempt, &failed());

        let other = m
            .request_decline_or_maybe(AttendanceStatus::Declined, Some(""))
            .unwrap();
        assert_eq!(other.notes, None);
        assert!(m.failure().is_none());
        m.complete(&other, &Ok(()));
        assert_eq!(m.status(), AttendanceStatus::Declined);
    }

    #[test]
    fn test_past_event_blocks_everything() {
        let mut m = AttendanceMachine::new("e1");
        m.lock_past_event();
        assert!(!m.can_respond());
        assert_eq!(m.request_confirm(), Err(RsvpRejected::EventPassed));
        assert_eq!(
            m.request(AttendanceStatus::Maybe, None),
            Err(RsvpRejected::EventPassed)
        );
        assert_eq!(m.status(), AttendanceStatus::Pending);
    }

    #[test]
    fn test_stale_answer_is_ignored() {
        let mut m = AttendanceMachine::new("e1");
        let stale = AttendanceAttempt {
            event_id: "e1".to_string(),
            target: AttendanceStatus::Declined,
            notes: None,
            seq: 99,
        };
        let live = m.request_confirm().unwrap();
        assert!(!m.complete(&stale, &Ok(())));
        assert!(m.is_submitting());
        assert!(m.complete(&live, &Ok(())));
    }

    #[test]
    fn test_late_answer_for_identical_earlier_attempt_is_ignored() {
        let mut m = AttendanceMachine::new("e1");
        let first = m.request_confirm().unwrap();
        m.complete(&first, &failed());
        let retry = m.retry().unwrap();

        // Same event, target and notes as the retry, but an older submission.
        assert!(!m.complete(&first, &Ok(())));
        assert!(m.is_submitting());
        assert_eq!(m.status(), AttendanceStatus::Pending);
        assert!(m.complete(&retry, &Ok(())));
        assert_eq!(m.status(), AttendanceStatus::Confirmed);
    }

    #[test]
    fn test_server_registration_seeds_status() {
        let mut m = AttendanceMachine::new("e1");
        m.apply_registration(&AttendanceRegistration {
            event_id: "e1".to_string(),
            status: AttendanceStatus::Declined,
            notes: None,
        });
        assert_eq!(m.status(), AttendanceStatus::Declined);
        assert!(!m.can_respond());
    }

    #[test]
    fn test_confirm_request_carries_no_notes() {
        let mut m = AttendanceMachine::new("e1");
        let attempt = m.request(AttendanceStatus::Confirmed, Some("ignored")).unwrap();
        assert_eq!(attempt.notes, None);
        assert_eq!(attempt.to_request().status, AttendanceStatus::Confirmed);
    }
}
