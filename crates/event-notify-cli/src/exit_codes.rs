//! Process exit codes of the `event-notify` binary.

use event_notify::{NotifyError, ProcessOutcome};

pub const SUCCESS: i32 = 0;
pub const VALIDATION_FAILED: i32 = 1; // A precondition gate failed
pub const INTERNAL_ERROR: i32 = 2; // Unreadable input or setup failure

// Codes 3..=6 come from `NotifyError::exit_code`.

/// Exit code for a pipeline outcome.
pub fn for_outcome(outcome: &ProcessOutcome) -> i32 {
    outcome.error().map_or(SUCCESS, NotifyError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_codes() {
        assert_eq!(for_outcome(&ProcessOutcome::Processed), SUCCESS);
        assert_eq!(
            for_outcome(&ProcessOutcome::Failed {
                error: NotifyError::UnsupportedTopic {
                    topic: "ITEM_SOLD".to_string()
                }
            }),
            1
        );
        assert_eq!(
            for_outcome(&ProcessOutcome::Failed {
                error: NotifyError::Network {
                    message: "timeout".to_string()
                }
            }),
            5
        );
    }

    #[test]
    fn auth_failure_does_not_collide_with_setup_failure() {
        let code = for_outcome(&ProcessOutcome::Failed {
            error: NotifyError::Unauthorized {
                message: "credentials rejected".to_string(),
            },
        });
        assert_ne!(code, INTERNAL_ERROR);
        assert_ne!(code, VALIDATION_FAILED);
    }
}
