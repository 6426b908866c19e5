use serde::{Deserialize, Serialize};

/// Instance id used when a reporting client does not supply one.
pub const DEFAULT_INSTANCE_ID: &str = "default";

/// One reporting agent session.
///
/// Presence in the registry means the session has reported at least
/// once; absence means "never reported", which is distinct from
/// `is_active == false` (reported and now waiting for input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    /// Display label, defaults to the id.
    pub name: String,
    /// Opaque tag identifying the reporting client type. Informational
    /// only; never drives any decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// `true` while working, `false` while waiting for input.
    pub is_active: bool,
    /// Epoch milliseconds of the last state-affecting call.
    pub last_activity: u64,
}

impl Instance {
    pub fn new(
        id: impl Into<String>,
        name: Option<String>,
        source: Option<String>,
        is_active: bool,
        now: u64,
    ) -> Self {
        let id = id.into();
        Self {
            name: name.unwrap_or_else(|| id.clone()),
            id,
            source,
            is_active,
            last_activity: now,
        }
    }

    /// Whether the session is waiting for input.
    pub fn needs_attention(&self) -> bool {
        !self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_id() {
        let inst = Instance::new("backend", None, None, true, 100);
        assert_eq!(inst.name, "backend");
        assert_eq!(inst.last_activity, 100);
        assert!(!inst.needs_attention());
    }

    #[test]
    fn explicit_name_kept() {
        let inst = Instance::new("a", Some("API refactor".to_string()), None, false, 0);
        assert_eq!(inst.name, "API refactor");
        assert!(inst.needs_attention());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let inst = Instance::new("a", None, Some("cli-hook".to_string()), true, 42);
        let json = serde_json::to_value(&inst).unwrap();
        assert_eq!(json["isActive"], true);
        assert_eq!(json["lastActivity"], 42);
        assert_eq!(json["source"], "cli-hook");
    }

    #[test]
    fn missing_source_omitted() {
        let inst = Instance::new("a", None, None, true, 0);
        let json = serde_json::to_string(&inst).unwrap();
        assert!(!json.contains("source"));
    }
}
