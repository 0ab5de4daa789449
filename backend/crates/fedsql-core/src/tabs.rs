//! Per-tenant editor tabs.

use std::collections::BTreeMap;

use dashmap::DashMap;
use fedsql_commons::TenantId;

use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Default)]
pub struct TabStore {
    tabs: DashMap<TenantId, BTreeMap<String, String>>,
}

impl TabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tabs of `tenant`; empty for tenants never seen.
    pub fn get(&self, tenant: &TenantId) -> BTreeMap<String, String> {
        self.tabs
            .get(tenant)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn set(&self, tenant: &TenantId, name: impl Into<String>, text: impl Into<String>) {
        self.tabs
            .entry(tenant.clone())
            .or_default()
            .insert(name.into(), text.into());
    }

    /// Upsert every key of a JSON object. Values must be strings; nothing is
    /// written when any value is not.
    pub fn set_all(&self, tenant: &TenantId, body: &serde_json::Value) -> GatewayResult<()> {
        let map = body
            .as_object()
            .ok_or_else(|| GatewayError::Validation("Tabs body must be a JSON object".to_string()))?;
        let mut entries = Vec::with_capacity(map.len());
        for (name, value) in map {
            let text = value.as_str().ok_or_else(|| {
                GatewayError::Validation(format!("Tab '{}' must be a string", name))
            })?;
            entries.push((name.clone(), text.to_string()));
        }

        let mut tabs = self.tabs.entry(tenant.clone()).or_default();
        tabs.extend(entries);
        Ok(())
    }
}
