use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{ClassMapCombination, CombinationId};

/// A partial-update field: absent from the body, or present (possibly `null`).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
}

fn present<'de, D, T>(deserializer: D) -> Result<Patch<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Patch::Set)
}

/// Body of `POST /session_state`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionStateRequest {
    #[serde(
        default,
        alias = "selected_combination_id",
        deserialize_with = "present"
    )]
    pub combination_id: Patch<Option<CombinationId>>,
    #[serde(default)]
    pub step_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ActionOutcome {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartMacroRequest {
    pub script_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInfo {
    pub name: String,
    pub size: u64,
    pub modified: String,
    pub class_name: Option<String>,
    pub map_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptsResponse {
    pub success: bool,
    pub scripts: Vec<ScriptInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub message: String,
    pub version: String,
    pub status: String,
    pub script_directory: String,
    pub images_directory: String,
    pub mouse_enabled: bool,
    pub keyboard_enabled: bool,
    pub dry_run: bool,
    pub class_map_combinations: Vec<ClassMapCombination>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_combination_is_kept() {
        let req: SessionStateRequest =
            serde_json::from_str(r#"{"step_size": 0.5}"#).expect("json");
        assert_eq!(req.combination_id, Patch::Keep);
        assert_eq!(req.step_size, Some(0.5));
    }

    #[test]
    fn null_combination_clears_selection() {
        let req: SessionStateRequest =
            serde_json::from_str(r#"{"combination_id": null}"#).expect("json");
        assert_eq!(req.combination_id, Patch::Set(None));
    }

    #[test]
    fn legacy_field_name_and_unknown_fields_are_accepted() {
        let req: SessionStateRequest = serde_json::from_str(
            r#"{"selected_combination_id": "drk_bottom_deck_passage_3", "invalid": "data"}"#,
        )
        .expect("json");
        assert_eq!(
            req.combination_id,
            Patch::Set(Some(CombinationId::new("drk_bottom_deck_passage_3")))
        );
        assert_eq!(req.step_size, None);
    }
}
