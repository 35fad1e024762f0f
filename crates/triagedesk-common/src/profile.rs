//! Clinical department a patient is routed to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Internal medicine; also the catch-all.
    #[default]
    Therapy,
    /// Trauma / surgery.
    Trauma,
    Neuro,
    Peds,
}

impl Profile {
    pub const ALL: [Profile; 4] = [Profile::Therapy, Profile::Trauma, Profile::Neuro, Profile::Peds];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Therapy => "therapy",
            Profile::Trauma  => "trauma",
            Profile::Neuro   => "neuro",
            Profile::Peds    => "peds",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Profile::Therapy => "Internal medicine",
            Profile::Trauma  => "Trauma / Surgery",
            Profile::Neuro   => "Neurology",
            Profile::Peds    => "Pediatrics",
        }
    }

    /// Map a department name used by the remote classifier.
    /// Returns `None` for labels with no internal counterpart (e.g. "other").
    pub fn from_remote_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "therapy" | "internal" | "internal_medicine" => Some(Profile::Therapy),
            "trauma" | "surgery"                         => Some(Profile::Trauma),
            "neuro" | "neurology"                        => Some(Profile::Neuro),
            "peds" | "pediatrics" | "paediatrics"        => Some(Profile::Peds),
            _                                            => None,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| format!("unknown profile: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_label_mapping() {
        assert_eq!(Profile::from_remote_label("surgery"), Some(Profile::Trauma));
        assert_eq!(Profile::from_remote_label(" Pediatrics "), Some(Profile::Peds));
        assert_eq!(Profile::from_remote_label("therapy"), Some(Profile::Therapy));
        assert_eq!(Profile::from_remote_label("other"), None);
    }

    #[test]
    fn test_from_str_roundtrips_wire_names() {
        for p in Profile::ALL {
            assert_eq!(p.as_str().parse::<Profile>().unwrap(), p);
        }
        assert!("all".parse::<Profile>().is_err());
    }
}
