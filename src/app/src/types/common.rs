use serde::{Deserialize, Serialize};

/// In-flight state of an operator-initiated request.
///
/// Replaces the ad-hoc `saveLoading`/`sendLoading` flags: a second submission
/// while a request is `InFlight` is rejected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}
