//! Account settings and personal preferences.
//!
//! Account changes require an administrator; preferences may be saved by any
//! user and only touch that user's row.

use crate::error::{validation_error, DespachoResult, Error};
use crate::models::settings::{BillingType, RetentionPolicy};
use crate::models::{CurrentUser, LawyerAccount, UserPreferences};
use crate::store::{timestamp_now, Store, Table};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Allowed external calendar sync intervals, in hours
pub const SYNC_INTERVALS: [u32; 3] = [1, 4, 24];

pub struct SettingsService {
    store: Arc<dyn Store>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn account(&self, id: &str) -> DespachoResult<LawyerAccount> {
        self.store
            .get_as(Table::Accounts, id)
            .await?
            .ok_or_else(|| Error::NotFound {
                table: Table::Accounts.name(),
                id: id.to_string(),
            })
    }

    /// Validate and store an account, stamping who changed it and when
    pub async fn save_account(&self, user: &CurrentUser, mut account: LawyerAccount) -> DespachoResult<LawyerAccount> {
        if !user.is_admin() {
            warn!("User {} tried to change account {}", user.id, account.id);
            return Err(Error::Forbidden(
                "Solo un administrador puede modificar la cuenta".to_string(),
            ));
        }
        validate_account(&account)?;

        account.updated_at = timestamp_now();
        account.updated_by = user.id.clone();

        self.store.upsert_as(Table::Accounts, &account.id, &account).await?;
        info!("Account {} updated by {}", account.id, user.id);
        Ok(account)
    }

    pub async fn preferences(&self, user_id: &str, account_id: &str) -> DespachoResult<UserPreferences> {
        let key = UserPreferences::key(user_id, account_id);
        let preferences = self.store.get_as(Table::Preferences, &key).await?;
        preferences.ok_or(Error::NotFound {
            table: Table::Preferences.name(),
            id: key,
        })
    }

    /// Store preferences for `user`. Users may only write their own.
    pub async fn save_preferences(
        &self,
        user: &CurrentUser,
        mut preferences: UserPreferences,
    ) -> DespachoResult<UserPreferences> {
        if preferences.user_id != user.id && !user.is_admin() {
            return Err(Error::Forbidden(
                "No puede modificar las preferencias de otro usuario".to_string(),
            ));
        }
        validate_preferences(&preferences)?;

        let key = UserPreferences::key(&preferences.user_id, &preferences.account_id);
        let now = timestamp_now();
        if preferences.created_at.is_empty() {
            preferences.created_at = now.clone();
        }
        preferences.updated_at = now;

        self.store.upsert_as(Table::Preferences, &key, &preferences).await?;
        info!("Preferences {} saved", key);
        Ok(preferences)
    }
}

fn check_percentage(value: f64, what: &str) -> DespachoResult<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(validation_error(&format!("{} debe estar entre 0 y 100", what)))
    }
}

pub fn validate_account(account: &LawyerAccount) -> DespachoResult<()> {
    if account.full_name.trim().is_empty() || account.professional_id.trim().is_empty() {
        return Err(validation_error("Nombre y matrícula profesional son obligatorios"));
    }

    if account.data_retention.policy == RetentionPolicy::HardDelete
        && !account.data_retention.ttl_days.is_some_and(|days| days > 0)
    {
        return Err(validation_error(
            "El borrado definitivo requiere un plazo de retención en días",
        ));
    }

    let billing = &account.billing_config;
    if billing.billing_type == BillingType::Contingency && billing.contingency_pct.is_none() {
        return Err(validation_error("La cuota litis requiere un porcentaje"));
    }
    if let Some(pct) = billing.contingency_pct {
        check_percentage(pct, "El porcentaje de cuota litis")?;
    }
    if let Some(rate) = billing.base_rate {
        if rate < 0.0 {
            return Err(validation_error("La tarifa base no puede ser negativa"));
        }
    }
    for tax in &billing.applied_taxes {
        check_percentage(tax.percentage, &format!("El impuesto {}", tax.name))?;
    }

    for hook in &account.webhooks {
        let url = Url::parse(&hook.url)
            .map_err(|_| validation_error(&format!("URL de webhook inválida: {}", hook.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(validation_error(&format!("URL de webhook inválida: {}", hook.url)));
        }
    }

    Ok(())
}

/// "#RRGGBB"
fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn validate_preferences(preferences: &UserPreferences) -> DespachoResult<()> {
    if !is_hex_color(&preferences.ui_customization.color_tag) {
        return Err(validation_error("El color debe tener el formato #RRGGBB"));
    }

    let sync = &preferences.external_sync;
    if sync.enabled {
        if sync.provider.is_none() {
            return Err(validation_error("Seleccione un proveedor de calendario"));
        }
        match sync.sync_interval_hours {
            Some(hours) if SYNC_INTERVALS.contains(&hours) => {}
            _ => {
                return Err(validation_error(
                    "El intervalo de sincronización debe ser 1, 4 o 24 horas",
                ))
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{
        BillingConfig, CurrencyIso, DataRetention, ExternalCalendarProvider, ExternalSyncPreferences,
        TaskRoutingQueue, TaxRule, UiCustomization, WebhookConfig, WebhookEvent,
    };
    use crate::models::Role;
    use crate::store::InMemoryStore;

    fn admin() -> CurrentUser {
        CurrentUser {
            id: "u-admin".to_string(),
            name: "Dr. Moreno".to_string(),
            role: Role::Admin,
        }
    }

    fn assistant() -> CurrentUser {
        CurrentUser {
            id: "u-2".to_string(),
            name: "Asistente".to_string(),
            role: Role::User,
        }
    }

    fn account() -> LawyerAccount {
        LawyerAccount {
            id: "acc-1".to_string(),
            organization_id: "org-1".to_string(),
            full_name: "Estudio Moreno".to_string(),
            professional_id: "17-2010-123".to_string(),
            billing_config: BillingConfig {
                billing_type: BillingType::Hourly,
                currency: CurrencyIso::Usd,
                base_rate: Some(120.0),
                contingency_pct: None,
                applied_taxes: vec![TaxRule {
                    id: "iva".to_string(),
                    name: "IVA".to_string(),
                    percentage: 15.0,
                    is_active: true,
                }],
            },
            data_retention: DataRetention {
                policy: RetentionPolicy::SoftDelete,
                ttl_days: None,
            },
            access_control_list: Vec::new(),
            webhooks: Vec::new(),
            updated_at: String::new(),
            updated_by: String::new(),
        }
    }

    fn preferences(user_id: &str) -> UserPreferences {
        UserPreferences {
            user_id: user_id.to_string(),
            account_id: "acc-1".to_string(),
            ui_customization: UiCustomization {
                alias: "Mi despacho".to_string(),
                color_tag: "#1A2B3C".to_string(),
            },
            notification_matrix: Vec::new(),
            workflow_auto_assignment: TaskRoutingQueue::PersonalCalendar,
            external_sync: ExternalSyncPreferences {
                enabled: false,
                provider: None,
                sync_interval_hours: None,
            },
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_admin_saves_account_and_stamps_audit_fields() {
        let service = SettingsService::new(Arc::new(InMemoryStore::new()));

        let saved = service.save_account(&admin(), account()).await.unwrap();
        assert_eq!(saved.updated_by, "u-admin");
        assert!(!saved.updated_at.is_empty());

        let loaded = service.account("acc-1").await.unwrap();
        assert_eq!(loaded, saved);

        // Saving again replaces the row
        let mut changed = loaded.clone();
        changed.full_name = "Estudio Moreno & Asociados".to_string();
        service.save_account(&admin(), changed).await.unwrap();
        assert_eq!(service.account("acc-1").await.unwrap().full_name, "Estudio Moreno & Asociados");
    }

    #[tokio::test]
    async fn test_regular_user_cannot_save_account() {
        let service = SettingsService::new(Arc::new(InMemoryStore::new()));
        let err = service.save_account(&assistant(), account()).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert!(matches!(service.account("acc-1").await, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_account_validation() {
        let mut hard = account();
        hard.data_retention = DataRetention {
            policy: RetentionPolicy::HardDelete,
            ttl_days: Some(0),
        };
        assert!(validate_account(&hard).is_err());
        hard.data_retention.ttl_days = Some(30);
        assert!(validate_account(&hard).is_ok());

        let mut contingency = account();
        contingency.billing_config.billing_type = BillingType::Contingency;
        assert!(validate_account(&contingency).is_err());
        contingency.billing_config.contingency_pct = Some(130.0);
        assert!(validate_account(&contingency).is_err());
        contingency.billing_config.contingency_pct = Some(30.0);
        assert!(validate_account(&contingency).is_ok());

        let mut taxed = account();
        taxed.billing_config.applied_taxes[0].percentage = -1.0;
        assert!(validate_account(&taxed).is_err());

        let mut hooked = account();
        hooked.webhooks.push(WebhookConfig {
            id: "w1".to_string(),
            url: "no es una url".to_string(),
            event: WebhookEvent::CaseWon,
            secret: "s".to_string(),
            is_active: true,
        });
        assert!(validate_account(&hooked).is_err());
        hooked.webhooks[0].url = "https://hooks.example.com/despacho".to_string();
        assert!(validate_account(&hooked).is_ok());
    }

    #[tokio::test]
    async fn test_preferences_round_trip_per_user() {
        let service = SettingsService::new(Arc::new(InMemoryStore::new()));

        let saved = service
            .save_preferences(&assistant(), preferences("u-2"))
            .await
            .unwrap();
        assert!(!saved.created_at.is_empty());

        let loaded = service.preferences("u-2", "acc-1").await.unwrap();
        assert_eq!(loaded.ui_customization.alias, "Mi despacho");
        assert!(service.preferences("u-admin", "acc-1").await.is_err());

        // Not someone else's
        let err = service
            .save_preferences(&assistant(), preferences("u-admin"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn test_preferences_validation() {
        let mut prefs = preferences("u-2");
        prefs.ui_customization.color_tag = "azul".to_string();
        assert!(validate_preferences(&prefs).is_err());

        let mut prefs = preferences("u-2");
        prefs.external_sync.enabled = true;
        assert!(validate_preferences(&prefs).is_err());
        prefs.external_sync.provider = Some(ExternalCalendarProvider::Google);
        prefs.external_sync.sync_interval_hours = Some(2);
        assert!(validate_preferences(&prefs).is_err());
        prefs.external_sync.sync_interval_hours = Some(4);
        assert!(validate_preferences(&prefs).is_ok());
    }
}
