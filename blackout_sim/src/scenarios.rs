//! Built-in deterministic scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Three files rationing one device-to-teleporter link
    SharedLink,

    /// Standard satellite quota and storage ceilings
    StandardStorage,

    /// Teleport mid-upload strips the sender's copy
    TeleportLoss,

    /// Device reaches a hidden satellite through a relay
    RelayChain,

    /// Moving device walking over slopes
    SlopeWalk,

    /// Satellite orbits out of sight mid-transfer
    LinkBreak,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::SharedLink,
            ScenarioId::StandardStorage,
            ScenarioId::TeleportLoss,
            ScenarioId::RelayChain,
            ScenarioId::SlopeWalk,
            ScenarioId::LinkBreak,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::SharedLink => "shared_link",
            ScenarioId::StandardStorage => "standard_storage",
            ScenarioId::TeleportLoss => "teleport_loss",
            ScenarioId::RelayChain => "relay_chain",
            ScenarioId::SlopeWalk => "slope_walk",
            ScenarioId::LinkBreak => "link_break",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::SharedLink => "3 files on one link to a teleporting satellite, 5 bytes each per tick",
            ScenarioId::StandardStorage => "Standard satellite rejects a second concurrent file and a fourth stored file",
            ScenarioId::TeleportLoss => "Satellite teleports from 180 to 0 mid-upload; source loses every 't'",
            ScenarioId::RelayChain => "Handheld uploads to a standard satellite it can only see through a relay",
            ScenarioId::SlopeWalk => "Moving laptop crosses rising and falling slopes",
            ScenarioId::LinkBreak => "Standard satellite leaves the sky before a slow upload finishes",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared_link" | "sharedlink" => Ok(ScenarioId::SharedLink),
            "standard_storage" | "standardstorage" => Ok(ScenarioId::StandardStorage),
            "teleport_loss" | "teleportloss" => Ok(ScenarioId::TeleportLoss),
            "relay_chain" | "relaychain" => Ok(ScenarioId::RelayChain),
            "slope_walk" | "slopewalk" => Ok(ScenarioId::SlopeWalk),
            "link_break" | "linkbreak" => Ok(ScenarioId::LinkBreak),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
