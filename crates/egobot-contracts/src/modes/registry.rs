use indexmap::IndexMap;

use crate::prompts::{action, safety, social, spatial};

pub const FULL_ANALYSIS_MODES: &[&str] = &["social", "spatial", "safety", "planning"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSpec {
    pub name: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

#[derive(Debug, Clone)]
pub struct ModeRegistry {
    modes: IndexMap<String, ModeSpec>,
}

impl Default for ModeRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ModeRegistry {
    pub fn new(modes: Option<IndexMap<String, ModeSpec>>) -> Self {
        Self {
            modes: modes.unwrap_or_else(default_modes),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModeSpec> {
        self.modes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modes.contains_key(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModeSpec> {
        self.modes.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.modes.keys().cloned().collect()
    }
}

fn default_modes() -> IndexMap<String, ModeSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str, system_prompt: &str, user_prompt: &str| {
        map.insert(
            name.to_string(),
            ModeSpec {
                name: name.to_string(),
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
            },
        );
    };

    insert("social", social::SYSTEM_PROMPT, social::SOCIAL_INTENT_PROMPT);
    insert(
        "handover",
        social::SYSTEM_PROMPT,
        social::HANDOVER_DETECTION_PROMPT,
    );
    insert("spatial", spatial::SYSTEM_PROMPT, spatial::SCENE_LAYOUT_PROMPT);
    insert(
        "trajectory",
        spatial::SYSTEM_PROMPT,
        spatial::TRAJECTORY_PREDICTION_PROMPT,
    );
    insert("safety", safety::SYSTEM_PROMPT, safety::SAFETY_ASSESSMENT_PROMPT);
    insert(
        "thrown_object",
        safety::SYSTEM_PROMPT,
        safety::THROWN_OBJECT_SAFETY_PROMPT,
    );
    insert("planning", action::SYSTEM_PROMPT, action::NEXT_ACTION_PROMPT);
    insert(
        "engagement",
        social::SYSTEM_PROMPT,
        social::ENGAGEMENT_LEVEL_PROMPT,
    );
    insert(
        "distance",
        spatial::SYSTEM_PROMPT,
        spatial::DISTANCE_ESTIMATION_PROMPT,
    );

    map
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{ModeRegistry, ModeSpec, FULL_ANALYSIS_MODES};
    use crate::prompts::safety;

    #[test]
    fn default_registry_lists_modes_in_registration_order() {
        let registry = ModeRegistry::default();
        assert_eq!(
            registry.names(),
            vec![
                "social",
                "handover",
                "spatial",
                "trajectory",
                "safety",
                "thrown_object",
                "planning",
                "engagement",
                "distance",
            ]
        );
    }

    #[test]
    fn full_analysis_modes_are_all_registered() {
        let registry = ModeRegistry::default();
        for mode in FULL_ANALYSIS_MODES {
            assert!(registry.contains(mode), "missing {mode}");
        }
        assert!(!registry.contains("full"));
    }

    #[test]
    fn modes_share_system_prompts_by_domain() {
        let registry = ModeRegistry::default();
        let safety_mode = registry.get("safety").unwrap();
        let thrown = registry.get("thrown_object").unwrap();
        assert_eq!(safety_mode.system_prompt, safety::SYSTEM_PROMPT);
        assert_eq!(thrown.system_prompt, safety_mode.system_prompt);
        assert_ne!(thrown.user_prompt, safety_mode.user_prompt);
    }

    #[test]
    fn custom_registry_replaces_defaults() {
        let mut modes = IndexMap::new();
        modes.insert(
            "probe".to_string(),
            ModeSpec {
                name: "probe".to_string(),
                system_prompt: "sys".to_string(),
                user_prompt: "user".to_string(),
            },
        );
        let registry = ModeRegistry::new(Some(modes));
        assert_eq!(registry.names(), vec!["probe"]);
        assert!(registry.get("social").is_none());
        assert_eq!(registry.list().count(), 1);
    }
}
