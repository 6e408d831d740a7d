//! Mesh variant selector (sex x side)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visual sex of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Which arm the mesh models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(Error::UnknownMesh(s.to_string())),
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(Side::Left),
            "right" | "r" => Ok(Side::Right),
            _ => Err(Error::UnknownMesh(s.to_string())),
        }
    }
}

/// One of the four precomputed mesh/UV/lookup sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshVariant {
    pub sex: Sex,
    pub side: Side,
}

impl MeshVariant {
    pub const ALL: [MeshVariant; 4] = [
        MeshVariant::new(Sex::Male, Side::Left),
        MeshVariant::new(Sex::Male, Side::Right),
        MeshVariant::new(Sex::Female, Side::Left),
        MeshVariant::new(Sex::Female, Side::Right),
    ];

    pub const fn new(sex: Sex, side: Side) -> Self {
        Self { sex, side }
    }

    /// Build a variant from separate sex and side names
    pub fn from_parts(sex: &str, side: &str) -> Result<Self> {
        let unknown = || Error::UnknownMesh(format!("{} {}", sex, side));
        let sex = sex.parse::<Sex>().map_err(|_| unknown())?;
        let side = side.parse::<Side>().map_err(|_| unknown())?;
        Ok(Self::new(sex, side))
    }

    /// File stem used for on-disk artifacts, e.g. `male_right`
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.sex.as_str(), self.side.as_str())
    }
}

impl fmt::Display for MeshVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sex = match self.sex {
            Sex::Male => "Male",
            Sex::Female => "Female",
        };
        let side = match self.side {
            Side::Left => "Left",
            Side::Right => "Right",
        };
        write!(f, "{} {} Arm", sex, side)
    }
}

impl FromStr for MeshVariant {
    type Err = Error;

    /// Accepts `male_right`, `female-left`, `Male Right Arm` and similar spellings
    fn from_str(s: &str) -> Result<Self> {
        let unknown = || Error::UnknownMesh(s.to_string());
        let lowered = s.to_lowercase();
        let mut tokens: Vec<&str> = lowered
            .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.last() == Some(&"arm") {
            tokens.pop();
        }

        match tokens.as_slice() {
            [sex, side] => {
                let sex = sex.parse::<Sex>().map_err(|_| unknown())?;
                let side = side.parse::<Side>().map_err(|_| unknown())?;
                Ok(Self::new(sex, side))
            }
            _ => Err(unknown()),
        }
    }
}
