//! Wire types matching the backend's JSON bodies
//!
//! Field names and value formats follow the backend exactly; the dashboard
//! consumes some of these strings verbatim (battery, usage time).

use serde::{Deserialize, Serialize};
use snapcheck_util::{format_usage_time, sql_timestamp, UserId};

use crate::{AppUsageRecord, DeviceSnapshot, LocationStatus, NetworkType, PlanInfo};

/// Generic response envelope: `{success, message?, data?}`.
///
/// Transport and parse failures never produce an envelope; they are
/// normalized by the client into typed errors instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// `POST /auth/login` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login` response; token and user ride at the top level,
/// not inside `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

/// Authenticated user as returned by login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `POST /activity/heartbeat` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub user_id: UserId,
}

/// `POST /device/sync` request body.
///
/// All values are pre-formatted strings; the backend stores them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSyncRequest {
    pub user_id: UserId,
    pub device_model: String,
    pub unique_id: String,
    /// `"87%"`
    pub battery: String,
    /// `"ON"` or `"OFF"`
    pub wifi_status: String,
    /// `"GPS"` or `"OFF"`
    pub location_status: String,
    /// `YYYY-MM-DD HH:MM:SS`, UTC
    pub device_timestamp: String,
}

impl DeviceSyncRequest {
    /// Build the wire body from a snapshot. Pure: the same snapshot always
    /// produces the same body.
    pub fn from_snapshot(user_id: UserId, snapshot: &DeviceSnapshot) -> Self {
        Self {
            user_id,
            device_model: snapshot.device_model.clone(),
            unique_id: snapshot.unique_id.clone(),
            battery: format!("{}%", snapshot.battery_percent),
            wifi_status: match snapshot.network {
                NetworkType::Wifi => "ON".to_string(),
                NetworkType::Other => "OFF".to_string(),
            },
            location_status: match snapshot.location {
                LocationStatus::Gps => "GPS".to_string(),
                LocationStatus::Off => "OFF".to_string(),
            },
            device_timestamp: sql_timestamp(&snapshot.captured_at),
        }
    }
}

/// `POST /device/sync` success `data`
pub type DeviceSyncData = PlanInfo;

/// One entry of `appsList` in `POST /apps/sync`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUsageEntry {
    pub app_name: String,
    pub package_name: String,
    /// Dashboard-side icon lookup URL derived from the package
    pub app_icon: String,
    pub usage_minutes: u64,
    /// `"2 hrs 5 min"` or `"45 min"`
    pub usage_time: String,
}

impl AppUsageEntry {
    pub fn from_record(record: &AppUsageRecord) -> Self {
        Self {
            app_name: record.app_name.clone(),
            package_name: record.package.as_str().to_string(),
            app_icon: format!("https://unavatar.io/google-play/{}", record.package),
            usage_minutes: record.usage_minutes,
            usage_time: format_usage_time(record.usage_minutes),
        }
    }
}

/// `POST /apps/sync` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSyncRequest {
    pub user_id: UserId,
    pub apps_list: Vec<AppUsageEntry>,
}

impl UsageSyncRequest {
    pub fn new(user_id: UserId, records: &[AppUsageRecord]) -> Self {
        Self {
            user_id,
            apps_list: records.iter().map(AppUsageEntry::from_record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use snapcheck_util::PackageId;

    fn sample_snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            device_model: "Pixel 7".into(),
            unique_id: "a1b2c3d4".into(),
            battery_percent: 87,
            network: NetworkType::Wifi,
            location: LocationStatus::Gps,
            captured_at: chrono::Utc.with_ymd_and_hms(2015, 10, 19, 9, 59, 33).unwrap(),
        }
    }

    #[test]
    fn device_sync_wire_shape() {
        let req = DeviceSyncRequest::from_snapshot(UserId::new("u1"), &sample_snapshot());
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["userId"], "u1");
        assert_eq!(json["deviceModel"], "Pixel 7");
        assert_eq!(json["uniqueId"], "a1b2c3d4");
        assert_eq!(json["battery"], "87%");
        assert_eq!(json["wifiStatus"], "ON");
        assert_eq!(json["locationStatus"], "GPS");
        assert_eq!(json["deviceTimestamp"], "2015-10-19 09:59:33");
    }

    #[test]
    fn device_sync_is_idempotent() {
        let snapshot = sample_snapshot();
        let a = DeviceSyncRequest::from_snapshot(UserId::new("u1"), &snapshot);
        let b = DeviceSyncRequest::from_snapshot(UserId::new("u1"), &snapshot);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn offline_snapshot_maps_to_off() {
        let snapshot = DeviceSnapshot {
            network: NetworkType::Other,
            location: LocationStatus::Off,
            ..sample_snapshot()
        };
        let req = DeviceSyncRequest::from_snapshot(UserId::new("u1"), &snapshot);
        assert_eq!(req.wifi_status, "OFF");
        assert_eq!(req.location_status, "OFF");
    }

    #[test]
    fn usage_entry_derives_icon_and_display_time() {
        let record = AppUsageRecord {
            app_name: "WhatsApp".into(),
            package: PackageId::new("com.whatsapp"),
            usage_minutes: 125,
        };
        let entry = AppUsageEntry::from_record(&record);

        assert_eq!(entry.app_icon, "https://unavatar.io/google-play/com.whatsapp");
        assert_eq!(entry.usage_time, "2 hrs 5 min");

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["packageName"], "com.whatsapp");
        assert_eq!(json["usageMinutes"], 125);
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let parsed: ApiEnvelope<PlanInfo> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(parsed.success);
        assert!(parsed.message.is_none());
        assert!(parsed.data.is_none());

        let parsed: ApiEnvelope<PlanInfo> = serde_json::from_str(
            r#"{"success":false,"message":"Database error"}"#,
        )
        .unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.message.as_deref(), Some("Database error"));
    }

    #[test]
    fn plan_info_wire_names() {
        let parsed: PlanInfo = serde_json::from_str(
            r#"{"deviceModel":"Pixel 7","plan":"Premium - 12 Months","daysLeft":214}"#,
        )
        .unwrap();
        assert_eq!(parsed.plan, "Premium - 12 Months");
        assert_eq!(parsed.days_left, 214);
    }
}
