use crate::config::TenantEntry;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Display marker used for every field of the sentinel profile.
pub const UNKNOWN_TENANT_NAME: &str = "Inconnue";
pub const UNKNOWN_TENANT_FIELD: &str = "inconnue";

/// One configured company, selected by room-name prefix and immutable for
/// the duration of a call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantProfile {
    pub name: String,
    pub address: String,
    pub hours: String,
    /// Number the admin notification SMS is sent to.
    pub admin_number: Option<String>,
    /// Caller id used for outbound SMS, overrides the account default.
    pub outbound_number: Option<String>,
    pub website_url: Option<String>,
    /// Tenant-specific addendum appended verbatim to the instruction document.
    pub tool_addendum: Option<String>,
}

static UNKNOWN_PROFILE: Lazy<Arc<TenantProfile>> = Lazy::new(|| {
    Arc::new(TenantProfile {
        name: UNKNOWN_TENANT_NAME.to_string(),
        address: UNKNOWN_TENANT_FIELD.to_string(),
        hours: UNKNOWN_TENANT_FIELD.to_string(),
        admin_number: None,
        outbound_number: None,
        website_url: None,
        tool_addendum: None,
    })
});

impl TenantProfile {
    pub fn unknown() -> Arc<TenantProfile> {
        UNKNOWN_PROFILE.clone()
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_TENANT_NAME
    }
}

impl From<&TenantEntry> for TenantProfile {
    fn from(entry: &TenantEntry) -> Self {
        Self {
            name: entry.name.clone(),
            address: entry.address.clone(),
            hours: entry.hours.clone(),
            admin_number: entry.admin_number.clone(),
            outbound_number: entry.outbound_number.clone(),
            website_url: entry.website_url.clone(),
            tool_addendum: entry.tool_addendum.clone(),
        }
    }
}

/// Ordered (prefix, profile) pairs. Resolution is a case-sensitive prefix
/// match against the room name, first match wins; rooms matching no prefix
/// resolve to the sentinel profile, never to an absence of result.
pub struct TenantDirectory {
    entries: Vec<(String, Arc<TenantProfile>)>,
}

impl TenantDirectory {
    pub fn new(entries: &[TenantEntry]) -> Self {
        let entries = entries
            .iter()
            .map(|entry| (entry.prefix.clone(), Arc::new(TenantProfile::from(entry))))
            .collect();
        Self { entries }
    }

    pub fn resolve(&self, room: &str) -> Arc<TenantProfile> {
        for (prefix, profile) in &self.entries {
            if room.starts_with(prefix.as_str()) {
                return profile.clone();
            }
        }
        TenantProfile::unknown()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(prefix: &str, name: &str) -> TenantEntry {
        TenantEntry {
            prefix: prefix.to_string(),
            name: name.to_string(),
            address: "123 rue Principale".to_string(),
            hours: "9h à 17h".to_string(),
            admin_number: Some("+15145550100".to_string()),
            outbound_number: None,
            website_url: None,
            tool_addendum: None,
        }
    }

    #[test]
    fn resolves_by_prefix_first_match_wins() {
        let directory = TenantDirectory::new(&[
            entry("telnek", "Telnek"),
            entry("tel", "Telco Generic"),
        ]);

        assert_eq!(directory.resolve("telnek-abc123").name, "Telnek");
        assert_eq!(directory.resolve("telus-xyz").name, "Telco Generic");
    }

    #[test]
    fn unmatched_room_resolves_to_sentinel() {
        let directory = TenantDirectory::new(&[entry("telnek", "Telnek")]);

        let profile = directory.resolve("unknown-xyz");
        assert_eq!(profile.name, UNKNOWN_TENANT_NAME);
        assert_eq!(profile.address, UNKNOWN_TENANT_FIELD);
        assert_eq!(profile.hours, UNKNOWN_TENANT_FIELD);
        assert!(profile.admin_number.is_none());
        assert!(profile.is_unknown());
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let directory = TenantDirectory::new(&[entry("telnek", "Telnek")]);

        assert!(directory.resolve("Telnek-abc").is_unknown());
        assert!(!directory.resolve("telnek-abc").is_unknown());
    }

    #[test]
    fn resolution_is_total_and_deterministic() {
        let directory = TenantDirectory::new(&[entry("telnek", "Telnek")]);

        for room in ["", "x", "telnek", "telnek-abc", "_+15145551234_r"] {
            let first = directory.resolve(room);
            let second = directory.resolve(room);
            assert_eq!(first, second);
        }
    }
}
