use super::{SeaOrmStorage, now_ts};
use crate::entity::company_settings::{ActiveModel, Column, Entity as CompanySettings};
use crate::errors::{CrmError, Result};
use crate::models::settings::StoredSetting;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use std::collections::HashMap;

impl SeaOrmStorage {
    pub async fn get_company_settings_impl(
        &self,
        company_id: i64,
    ) -> Result<HashMap<String, StoredSetting>> {
        let rows = CompanySettings::find()
            .filter(Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("load settings", e))?;

        Ok(rows
            .into_iter()
            .map(|m| {
                (
                    m.key.clone(),
                    StoredSetting {
                        key: m.key,
                        value: m.value,
                        updated_at: m.updated_at,
                        updated_by: m.updated_by,
                    },
                )
            })
            .collect())
    }

    /// 按 (company_id, key) 插入或覆盖
    pub async fn upsert_company_setting_impl(
        &self,
        company_id: i64,
        key: &str,
        value: String,
        value_type: &str,
        user_id: Option<i64>,
    ) -> Result<StoredSetting> {
        let now = now_ts();
        let model = ActiveModel {
            company_id: Set(company_id),
            key: Set(key.to_string()),
            value: Set(value.clone()),
            value_type: Set(value_type.to_string()),
            updated_at: Set(now),
            updated_by: Set(user_id),
        };

        CompanySettings::insert(model)
            .on_conflict(
                OnConflict::columns([Column::CompanyId, Column::Key])
                    .update_columns([
                        Column::Value,
                        Column::ValueType,
                        Column::UpdatedAt,
                        Column::UpdatedBy,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| CrmError::from_db("save setting", e))?;

        Ok(StoredSetting {
            key: key.to_string(),
            value,
            updated_at: now,
            updated_by: user_id,
        })
    }
}
