pub mod entities;

pub use entities::{
    CenterSettings, CompanySetting, SettingKey, SettingValueType, StoredSetting,
    UpdateSettingRequest,
};
