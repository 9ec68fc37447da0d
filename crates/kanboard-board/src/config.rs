//! Board behaviour switches

use serde::{Deserialize, Serialize};

/// What deactivating a team does while it still has active projects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamDeactivationPolicy {
    /// Refuse with a conflict and leave the team untouched
    #[default]
    Refuse,
    /// Deactivate anyway and report that child projects keep working
    Warn,
}

/// A workflow stage seeded into every new team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultStage {
    pub name: &'static str,
    pub color: &'static str,
    pub position: i32,
}

pub const DEFAULT_STAGES: [DefaultStage; 4] = [
    DefaultStage {
        name: "A Fazer",
        color: "#6c757d",
        position: 1,
    },
    DefaultStage {
        name: "Em Andamento",
        color: "#007bff",
        position: 2,
    },
    DefaultStage {
        name: "Em Revisão",
        color: "#ffc107",
        position: 3,
    },
    DefaultStage {
        name: "Concluído",
        color: "#28a745",
        position: 4,
    },
];

/// Stage name counted as "done" by the dashboard
pub const DONE_STAGE_NAME: &str = "Concluído";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Seed [`DEFAULT_STAGES`] when a team is created
    pub seed_default_stages: bool,
    pub team_deactivation_policy: TeamDeactivationPolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            seed_default_stages: true,
            team_deactivation_policy: TeamDeactivationPolicy::default(),
        }
    }
}
