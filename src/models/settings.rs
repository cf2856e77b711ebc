//! Account settings.
//!
//! `LawyerAccount` holds system-wide configuration that only an administrator
//! may change (billing, retention, access control, webhooks).
//! `UserPreferences` is scoped to one user within one account and never
//! affects billing or webhooks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN_ROLE")]
    Admin,
    #[serde(rename = "USER_ROLE")]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyIso {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "COP")]
    Cop,
    #[serde(rename = "MXN")]
    Mxn,
    #[serde(rename = "ARS")]
    Ars,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    Hourly,
    FlatFee,
    Contingency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetentionPolicy {
    SoftDelete,
    HardDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEvent {
    #[serde(rename = "case.created")]
    CaseCreated,
    #[serde(rename = "case.won")]
    CaseWon,
    #[serde(rename = "case.closed")]
    CaseClosed,
    #[serde(rename = "payment.received")]
    PaymentReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannel {
    Email,
    InApp,
    Sms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneEvent {
    HearingScheduled,
    DocumentFiled,
    DeadlineApproaching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskRoutingQueue {
    PersonalCalendar,
    SharedQueue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExternalCalendarProvider {
    Google,
    Microsoft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub export: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlEntry {
    pub user_id: String,
    pub user_name: String,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRule {
    pub id: String,
    /// e.g. "IVA", "Retención en la Fuente"
    pub name: String,
    pub percentage: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfig {
    #[serde(rename = "type")]
    pub billing_type: BillingType,
    pub currency: CurrencyIso,
    #[serde(default)]
    pub base_rate: Option<f64>,
    #[serde(default)]
    pub contingency_pct: Option<f64>,
    #[serde(default)]
    pub applied_taxes: Vec<TaxRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRetention {
    pub policy: RetentionPolicy,
    #[serde(default)]
    pub ttl_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub id: String,
    pub url: String,
    pub event: WebhookEvent,
    /// Used to sign outgoing payloads
    pub secret: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawyerAccount {
    pub id: String,
    pub organization_id: String,
    pub full_name: String,
    /// Bar registration number
    pub professional_id: String,
    pub billing_config: BillingConfig,
    pub data_retention: DataRetention,
    #[serde(default)]
    pub access_control_list: Vec<AccessControlEntry>,
    #[serde(default)]
    pub webhooks: Vec<WebhookConfig>,
    #[serde(default)]
    pub updated_at: String,
    /// Id of the administrator who made the last change
    #[serde(default)]
    pub updated_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub event: MilestoneEvent,
    pub channels: Vec<NotificationChannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSyncPreferences {
    pub enabled: bool,
    #[serde(default)]
    pub provider: Option<ExternalCalendarProvider>,
    #[serde(default)]
    pub sync_interval_hours: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiCustomization {
    pub alias: String,
    /// "#RRGGBB"
    pub color_tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub user_id: String,
    pub account_id: String,
    pub ui_customization: UiCustomization,
    #[serde(default)]
    pub notification_matrix: Vec<NotificationPreference>,
    pub workflow_auto_assignment: TaskRoutingQueue,
    pub external_sync: ExternalSyncPreferences,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserPreferences {
    /// Store key: one preferences row per user per account
    pub fn key(user_id: &str, account_id: &str) -> String {
        format!("{}:{}", user_id, account_id)
    }
}

/// Authenticated user as seen by the services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
