//! Translation keys of every text the core hands to the shell.
//!
//! The shell resolves them with its i18n tables; unknown keys are shown verbatim.

pub const NETWORK_ERROR: &str = "networkError";
pub const SAVE_SUCCESS: &str = "common.saveSuccess";
pub const SLEEP_MODE_TIPS: &str = "sleepModeTips";
pub const INVALID_SETTINGS: &str = "common.invalidSettings";

pub const CELLULAR_SAVE_TIPS: &str = "cell.saveTip";

pub const WLAN_CONNECT_FAILED: &str = "wlan.connectFailTips";

pub const FILE_EMPTY: &str = "mqtt.fileEmpty";
pub const FILE_TOO_LARGE: &str = "mqtt.fileTooLarge";
pub const FILE_BAD_EXTENSION: &str = "mqtt.fileBadExtension";
pub const FILE_READ_FAILED: &str = "mqtt.fileReadFailed";
pub const UPLOAD_SUCCESS: &str = "mqtt.uploadSuccess";
pub const UPLOAD_FAILED: &str = "mqtt.uploadFailed";
pub const DELETE_CONFIRM: &str = "mqtt.deleteConfirm";
pub const DELETE_FAILED: &str = "mqtt.deleteFailed";
pub const MQTT_INVALID_CONFIG: &str = "mqtt.invalidConfig";

pub const BOOTSTRAP_FAILED: &str = "initFailed";
