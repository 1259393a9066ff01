//! Status transition guards
//!
//! Every status-changing write goes through [`ensure_transition`]. A status
//! moving to itself is not a transition and is rejected like any other
//! undefined move.

use thiserror::Error;

use crate::domain::emails::EmailStatus;
use crate::domain::offers::OfferStatus;
use crate::domain::support::TicketStatus;
use crate::domain::tasks::TaskStatus;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{entity} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

/// A status enum with a fixed successor relation.
pub trait StatusMachine: Copy + PartialEq + 'static {
    const ENTITY: &'static str;

    fn label(self) -> &'static str;

    fn successors(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

pub fn ensure_transition<S: StatusMachine>(from: S, to: S) -> Result<(), TransitionError> {
    if from.successors().contains(&to) {
        Ok(())
    } else {
        Err(TransitionError {
            entity: S::ENTITY,
            from: from.label(),
            to: to.label(),
        })
    }
}

impl StatusMachine for OfferStatus {
    const ENTITY: &'static str = "Offer";

    fn label(self) -> &'static str {
        self.as_str()
    }

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Sent, Self::Expired],
            Self::Sent => &[Self::Accepted, Self::Rejected, Self::Expired],
            Self::Accepted | Self::Rejected | Self::Expired => &[],
        }
    }
}

impl StatusMachine for TicketStatus {
    const ENTITY: &'static str = "Support ticket";

    fn label(self) -> &'static str {
        self.as_str()
    }

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress, Self::Resolved],
            Self::InProgress => &[Self::Resolved],
            Self::Resolved => &[],
        }
    }
}

impl StatusMachine for TaskStatus {
    const ENTITY: &'static str = "Task";

    fn label(self) -> &'static str {
        self.as_str()
    }

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Completed],
            Self::Completed => &[Self::Pending],
        }
    }
}

impl StatusMachine for EmailStatus {
    const ENTITY: &'static str = "Email";

    fn label(self) -> &'static str {
        self.as_str()
    }

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Draft | Self::Failed => &[Self::Sent, Self::Failed],
            Self::Sent => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_happy_path() {
        assert!(ensure_transition(OfferStatus::Draft, OfferStatus::Sent).is_ok());
        assert!(ensure_transition(OfferStatus::Sent, OfferStatus::Accepted).is_ok());
        assert!(ensure_transition(OfferStatus::Sent, OfferStatus::Rejected).is_ok());
        assert!(ensure_transition(OfferStatus::Draft, OfferStatus::Expired).is_ok());
        assert!(ensure_transition(OfferStatus::Sent, OfferStatus::Expired).is_ok());
    }

    #[test]
    fn offer_cannot_skip_sending_or_leave_terminal_states() {
        assert!(ensure_transition(OfferStatus::Draft, OfferStatus::Accepted).is_err());
        for terminal in [
            OfferStatus::Accepted,
            OfferStatus::Rejected,
            OfferStatus::Expired,
        ] {
            assert!(terminal.is_terminal());
            for to in OfferStatus::ALL {
                assert!(ensure_transition(terminal, to).is_err());
            }
        }
    }

    #[test]
    fn sending_twice_is_rejected() {
        let err = ensure_transition(OfferStatus::Sent, OfferStatus::Sent).unwrap_err();
        assert_eq!(err.to_string(), "Offer cannot move from sent to sent");
    }

    #[test]
    fn tickets_only_move_forward() {
        assert!(ensure_transition(TicketStatus::Open, TicketStatus::InProgress).is_ok());
        assert!(ensure_transition(TicketStatus::Open, TicketStatus::Resolved).is_ok());
        assert!(ensure_transition(TicketStatus::InProgress, TicketStatus::Resolved).is_ok());
        assert!(ensure_transition(TicketStatus::InProgress, TicketStatus::Open).is_err());
        for to in TicketStatus::ALL {
            assert!(ensure_transition(TicketStatus::Resolved, to).is_err());
        }
    }

    #[test]
    fn tasks_toggle() {
        assert!(ensure_transition(TaskStatus::Pending, TaskStatus::Completed).is_ok());
        assert!(ensure_transition(TaskStatus::Completed, TaskStatus::Pending).is_ok());
        assert!(ensure_transition(TaskStatus::Pending, TaskStatus::Pending).is_err());
    }

    #[test]
    fn failed_email_can_be_retried_but_sent_is_final() {
        assert!(ensure_transition(EmailStatus::Failed, EmailStatus::Sent).is_ok());
        assert!(ensure_transition(EmailStatus::Failed, EmailStatus::Failed).is_ok());
        assert!(ensure_transition(EmailStatus::Sent, EmailStatus::Failed).is_err());
    }
}
