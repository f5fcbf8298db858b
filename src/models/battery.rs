use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatteryStatus {
    Unknown,
    Charging,
    Discharging,
    NotCharging,
    Full,
}

impl BatteryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BatteryStatus::Unknown     => "UNKNOWN",
            BatteryStatus::Charging    => "CHARGING",
            BatteryStatus::Discharging => "DISCHARGING",
            BatteryStatus::NotCharging => "NOT_CHARGING",
            BatteryStatus::Full        => "FULL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatteryHealth {
    Unknown,
    Good,
    Overheat,
    Dead,
    OverVoltage,
    UnspecifiedFailure,
    Cold,
}

impl BatteryHealth {
    pub fn label(&self) -> &'static str {
        match self {
            BatteryHealth::Unknown            => "UNKNOWN",
            BatteryHealth::Good               => "GOOD",
            BatteryHealth::Overheat           => "OVERHEAT",
            BatteryHealth::Dead               => "DEAD",
            BatteryHealth::OverVoltage        => "OVER_VOLTAGE",
            BatteryHealth::UnspecifiedFailure => "UNSPECIFIED_FAILURE",
            BatteryHealth::Cold               => "COLD",
        }
    }
}

/// Charger and battery state as last computed by the battery monitor.
/// Units follow the power_supply class: µA, µV, µAh, tenths of °C.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryInfo {
    pub charger_ac_online:       bool,
    pub charger_usb_online:      bool,
    pub charger_wireless_online: bool,
    pub max_charging_current:    i32,
    pub max_charging_voltage:    i32,
    pub battery_present:         bool,
    pub battery_level:           i32,   // percent
    pub battery_voltage:         i32,   // mV
    pub battery_temperature:     i32,
    pub battery_current:         i32,
    pub battery_current_average: i32,
    pub battery_cycle_count:     i32,
    pub battery_full_charge:     i32,
    pub battery_charge_counter:  i32,
    pub energy_counter:          i64,   // nWh
    pub battery_status:          BatteryStatus,
    pub battery_health:          BatteryHealth,
    pub battery_technology:      String,
}

impl BatteryInfo {
    pub fn charger_online(&self) -> bool {
        self.charger_ac_online || self.charger_usb_online || self.charger_wireless_online
    }
}

impl Default for BatteryInfo {
    fn default() -> Self {
        Self {
            charger_ac_online:       false,
            charger_usb_online:      false,
            charger_wireless_online: false,
            max_charging_current:    0,
            max_charging_voltage:    0,
            battery_present:         false,
            battery_level:           0,
            battery_voltage:         0,
            battery_temperature:     0,
            battery_current:         0,
            battery_current_average: 0,
            battery_cycle_count:     0,
            battery_full_charge:     0,
            battery_charge_counter:  0,
            energy_counter:          0,
            battery_status:          BatteryStatus::Unknown,
            battery_health:          BatteryHealth::Unknown,
            battery_technology:      String::new(),
        }
    }
}
