use crate::error::{OfferError, RequestError};
use crate::types::enums::{OfferStatus, RequestStatus};
use crate::types::ids::UserId;
use crate::types::io::{CreateRequestInput, RegisterUserInput, SubmitOfferInput};

pub fn validate_request_status_transition(
    from: RequestStatus,
    to: RequestStatus,
) -> Result<(), RequestError> {
    use RequestStatus::{Cancelled, Completed, InProgress, Open};

    if from == to {
        return Ok(());
    }

    let valid = match (from, to) {
        (Open, InProgress) => true,
        (InProgress, Completed) => true,
        (Open, Cancelled) => true,
        (InProgress, Cancelled) => true,
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(RequestError::InvalidTransition { from, to })
    }
}

pub fn validate_offer_status_transition(
    from: OfferStatus,
    to: OfferStatus,
) -> Result<(), OfferError> {
    use OfferStatus::{Accepted, Pending, Rejected};

    if from == to {
        return Ok(());
    }

    let valid = matches!((from, to), (Pending, Accepted) | (Pending, Rejected));

    if valid {
        Ok(())
    } else {
        Err(OfferError::InvalidTransition { from, to })
    }
}

pub fn validate_create_request(input: &CreateRequestInput) -> Result<(), RequestError> {
    if input.title.trim().is_empty() {
        return Err(RequestError::InvalidInput {
            message: "title must not be empty".to_string(),
        });
    }
    if input.description.trim().is_empty() {
        return Err(RequestError::InvalidInput {
            message: "description must not be empty".to_string(),
        });
    }
    if input.budget < 0 {
        return Err(RequestError::InvalidInput {
            message: "budget must be non-negative".to_string(),
        });
    }
    Ok(())
}

pub fn validate_submit_offer(input: &SubmitOfferInput, owner_id: &UserId) -> Result<(), OfferError> {
    if input.amount < 0 {
        return Err(OfferError::InvalidInput {
            message: "amount must be non-negative".to_string(),
        });
    }
    if input.message.trim().is_empty() {
        return Err(OfferError::InvalidInput {
            message: "message must not be empty".to_string(),
        });
    }
    if &input.bidder_id == owner_id {
        return Err(OfferError::InvalidInput {
            message: "cannot bid on your own request".to_string(),
        });
    }
    Ok(())
}

pub fn validate_register_user(input: &RegisterUserInput) -> Result<(), crate::error::UserError> {
    if input.name.trim().is_empty() {
        return Err(crate::error::UserError::InvalidInput {
            message: "name must not be empty".to_string(),
        });
    }
    let email = input.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(crate::error::UserError::InvalidInput {
            message: "email must be a valid address".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_transitions_follow_the_state_machine() {
        use RequestStatus::{Cancelled, Completed, InProgress, Open};

        assert!(validate_request_status_transition(Open, InProgress).is_ok());
        assert!(validate_request_status_transition(InProgress, Completed).is_ok());
        assert!(validate_request_status_transition(Open, Cancelled).is_ok());
        assert!(validate_request_status_transition(InProgress, Cancelled).is_ok());

        assert!(validate_request_status_transition(Open, Completed).is_err());
        assert!(validate_request_status_transition(Completed, Open).is_err());
        assert!(validate_request_status_transition(Completed, Cancelled).is_err());
        assert!(validate_request_status_transition(Cancelled, InProgress).is_err());
        assert!(validate_request_status_transition(InProgress, Open).is_err());
    }

    #[test]
    fn offer_transitions_only_leave_pending() {
        use OfferStatus::{Accepted, Pending, Rejected};

        assert!(validate_offer_status_transition(Pending, Accepted).is_ok());
        assert!(validate_offer_status_transition(Pending, Rejected).is_ok());
        assert!(validate_offer_status_transition(Accepted, Rejected).is_err());
        assert!(validate_offer_status_transition(Rejected, Accepted).is_err());
        assert!(validate_offer_status_transition(Accepted, Pending).is_err());
    }

    #[test]
    fn self_bid_is_rejected() {
        let owner = UserId::generate();
        let input = SubmitOfferInput {
            bidder_id: owner.clone(),
            amount: 10,
            message: "I can help".to_string(),
        };
        assert!(matches!(
            validate_submit_offer(&input, &owner),
            Err(OfferError::InvalidInput { .. })
        ));
    }

    #[test]
    fn negative_budget_is_rejected() {
        let input = CreateRequestInput {
            owner_id: UserId::generate(),
            title: "Calc tutoring".to_string(),
            description: "Need help before finals".to_string(),
            category: crate::types::Category::Tutoring,
            budget: -1,
            location: None,
            is_remote: true,
            deadline: chrono::Utc::now(),
            tags: Vec::new(),
        };
        assert!(matches!(
            validate_create_request(&input),
            Err(RequestError::InvalidInput { .. })
        ));
    }
}
