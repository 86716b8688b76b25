//! Core data types shared by drivers and the locator engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element state a caller can wait for
///
/// - Attached: present in the DOM
/// - Detached: absent from the DOM
/// - Visible: attached and rendered with a non-empty box
/// - Hidden: detached, or attached but not rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    Attached,
    Detached,
    Hidden,
    Visible,
}

impl ElementState {
    /// Get state name as string
    pub fn name(&self) -> &'static str {
        match self {
            ElementState::Attached => "attached",
            ElementState::Detached => "detached",
            ElementState::Hidden => "hidden",
            ElementState::Visible => "visible",
        }
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attached" => Ok(ElementState::Attached),
            "detached" => Ok(ElementState::Detached),
            "hidden" => Ok(ElementState::Hidden),
            "visible" => Ok(ElementState::Visible),
            other => Err(format!("unknown element state '{}'", other)),
        }
    }
}

/// Native addressing capabilities advertised by a search context
///
/// Contexts that lack a capability are still usable: the locator engine
/// falls back to an equivalent low-level selector string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub test_id: bool,
    pub role: bool,
    pub label: bool,
    pub placeholder: bool,
    pub text: bool,
}

impl Capabilities {
    /// Every native addressing mode is available (pages and frames)
    pub const fn native() -> Self {
        Self {
            test_id: true,
            role: true,
            label: true,
            placeholder: true,
            text: true,
        }
    }

    /// Only raw selector strings are understood
    pub const fn selector_only() -> Self {
        Self {
            test_id: false,
            role: false,
            label: false,
            placeholder: false,
            text: false,
        }
    }

    pub fn supports_test_id_addressing(&self) -> bool {
        self.test_id
    }

    pub fn supports_role_addressing(&self) -> bool {
        self.role
    }

    pub fn supports_label_addressing(&self) -> bool {
        self.label
    }

    pub fn supports_placeholder_addressing(&self) -> bool {
        self.placeholder
    }

    pub fn supports_text_addressing(&self) -> bool {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_state_parses_case_insensitively() {
        assert_eq!("Visible".parse::<ElementState>(), Ok(ElementState::Visible));
        assert_eq!(" detached ".parse::<ElementState>(), Ok(ElementState::Detached));
        assert!("shown".parse::<ElementState>().is_err());
    }

    #[test]
    fn element_state_serializes_lowercase() {
        assert_eq!(ElementState::Hidden.to_string(), "hidden");
        assert_eq!(ElementState::Attached.name(), "attached");
    }

    #[test]
    fn capability_presets() {
        assert!(Capabilities::native().supports_role_addressing());
        assert!(!Capabilities::selector_only().supports_text_addressing());
        assert_eq!(Capabilities::default(), Capabilities::selector_only());
    }
}
