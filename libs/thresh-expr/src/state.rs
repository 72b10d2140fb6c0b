//! Alarm state and severity

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of an alarm or of one of its sub-alarms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmState {
    /// Not enough data to decide
    #[default]
    #[serde(alias = "undetermined")]
    Undetermined,
    #[serde(alias = "ok")]
    Ok,
    #[serde(alias = "alarm")]
    Alarm,
}

impl AlarmState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmState::Undetermined => "UNDETERMINED",
            AlarmState::Ok => "OK",
            AlarmState::Alarm => "ALARM",
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AlarmState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNDETERMINED" => Ok(AlarmState::Undetermined),
            "OK" => Ok(AlarmState::Ok),
            "ALARM" => Ok(AlarmState::Alarm),
            _ => Err(format!(
                "Invalid alarm state: '{}'. Valid values: UNDETERMINED, OK, ALARM",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmSeverity {
    #[default]
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
    #[serde(alias = "critical")]
    Critical,
}

impl AlarmSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSeverity::Low => "LOW",
            AlarmSeverity::Medium => "MEDIUM",
            AlarmSeverity::High => "HIGH",
            AlarmSeverity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AlarmSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(AlarmSeverity::Low),
            "MEDIUM" => Ok(AlarmSeverity::Medium),
            "HIGH" => Ok(AlarmSeverity::High),
            "CRITICAL" => Ok(AlarmSeverity::Critical),
            _ => Err(format!(
                "Invalid alarm severity: '{}'. Valid values: LOW, MEDIUM, HIGH, CRITICAL",
                s
            )),
        }
    }
}
