use serde::{Deserialize, Serialize};

use crate::types::NetworkMode;

/// One awaited step of the startup sequence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BootstrapStep {
    SyncTime,
    DeviceInfo,
    LightParam,
    CamParam,
    CaptureParam,
    UploadParam,
    DataReport,
    CellularParam,
    CellularStatus,
    WifiList,
    WifiParam,
}

impl BootstrapStep {
    pub const FIRST: Self = Self::SyncTime;

    /// Step that follows `self`, `None` when the chain is done.
    ///
    /// The network mode reported by `DeviceInfo` picks the branch after `DataReport`.
    pub fn next(self, mode: NetworkMode) -> Option<Self> {
        match self {
            Self::SyncTime => Some(Self::DeviceInfo),
            Self::DeviceInfo => Some(Self::LightParam),
            Self::LightParam => Some(Self::CamParam),
            Self::CamParam => Some(Self::CaptureParam),
            Self::CaptureParam => Some(Self::UploadParam),
            Self::UploadParam => Some(Self::DataReport),
            Self::DataReport => match mode {
                NetworkMode::Cellular => Some(Self::CellularParam),
                NetworkMode::Wlan => Some(Self::WifiList),
            },
            Self::CellularParam => Some(Self::CellularStatus),
            Self::WifiList => Some(Self::WifiParam),
            Self::CellularStatus | Self::WifiParam => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BootstrapPhase {
    #[default]
    NotStarted,
    Running {
        step: BootstrapStep,
    },
    Completed,
    Failed {
        step: BootstrapStep,
        error: String,
    },
}

/// Progress of the startup sequence. Only ever moves forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapState {
    pub phase: BootstrapPhase,
    pub completed: Vec<BootstrapStep>,
    pub time_zone: String,
    pub timestamp: u64,
}

impl BootstrapState {
    pub fn current_step(&self) -> Option<BootstrapStep> {
        match self.phase {
            BootstrapPhase::Running { step } => Some(step),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(mode: NetworkMode) -> Vec<BootstrapStep> {
        std::iter::successors(Some(BootstrapStep::FIRST), |step| step.next(mode)).collect()
    }

    #[test]
    fn wlan_chain_order() {
        use BootstrapStep::*;
        assert_eq!(
            chain(NetworkMode::Wlan),
            vec![
                SyncTime,
                DeviceInfo,
                LightParam,
                CamParam,
                CaptureParam,
                UploadParam,
                DataReport,
                WifiList,
                WifiParam
            ]
        );
    }

    #[test]
    fn cellular_chain_ends_with_status() {
        let steps = chain(NetworkMode::Cellular);
        assert_eq!(
            &steps[steps.len() - 2..],
            &[BootstrapStep::CellularParam, BootstrapStep::CellularStatus]
        );
        assert!(!steps.contains(&BootstrapStep::WifiList));
    }
}
