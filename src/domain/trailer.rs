use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailerType {
    Flatbed,
    Lowbed,
    Tautliner,
    SideTipper,
    Refrigerated,
    Tanker,
    Container,
    Other,
}

impl TrailerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailerType::Flatbed => "flatbed",
            TrailerType::Lowbed => "lowbed",
            TrailerType::Tautliner => "tautliner",
            TrailerType::SideTipper => "side_tipper",
            TrailerType::Refrigerated => "refrigerated",
            TrailerType::Tanker => "tanker",
            TrailerType::Container => "container",
            TrailerType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "flatbed" => Ok(TrailerType::Flatbed),
            "lowbed" => Ok(TrailerType::Lowbed),
            "tautliner" => Ok(TrailerType::Tautliner),
            "side_tipper" => Ok(TrailerType::SideTipper),
            "refrigerated" => Ok(TrailerType::Refrigerated),
            "tanker" => Ok(TrailerType::Tanker),
            "container" => Ok(TrailerType::Container),
            "other" => Ok(TrailerType::Other),
            unknown => Err(DomainError::UnknownTrailerType(unknown.to_string())),
        }
    }
}

impl fmt::Display for TrailerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
