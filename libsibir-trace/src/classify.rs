use crate::types::PresenceState;

/// What a single existence check produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Status(u16),
    /// The request could not be completed (timeout, DNS, TLS, refused).
    NoResponse,
}

impl CheckOutcome {
    pub fn raw_status(&self) -> u16 {
        match self {
            CheckOutcome::Status(code) => *code,
            CheckOutcome::NoResponse => 0,
        }
    }
}

pub fn classify(outcome: CheckOutcome) -> PresenceState {
    match outcome {
        CheckOutcome::NoResponse => PresenceState::Unknown { code: 0 },
        CheckOutcome::Status(200) => PresenceState::Found,
        CheckOutcome::Status(404) => PresenceState::NotFound,
        CheckOutcome::Status(code) => PresenceState::Unknown { code },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_found() {
        assert_eq!(classify(CheckOutcome::Status(200)), PresenceState::Found);
    }

    #[test]
    fn not_found_is_not_found() {
        assert_eq!(classify(CheckOutcome::Status(404)), PresenceState::NotFound);
    }

    #[test]
    fn no_response_is_unknown_with_zero() {
        let state = classify(CheckOutcome::NoResponse);
        assert_eq!(state, PresenceState::Unknown { code: 0 });
        assert!(state.is_no_response());
    }

    #[test]
    fn other_codes_carry_the_literal_code() {
        for code in [301, 302, 401, 403, 429, 500, 503] {
            assert_eq!(
                classify(CheckOutcome::Status(code)),
                PresenceState::Unknown { code }
            );
        }
    }

    #[test]
    fn zero_status_is_still_unknown() {
        assert_eq!(classify(CheckOutcome::Status(0)), PresenceState::Unknown { code: 0 });
    }
}
