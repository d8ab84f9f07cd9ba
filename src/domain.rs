//! Domain types for user-activity signals.

/// Kind of user-activity signal the watchdog listens for.
///
/// The vocabulary is fixed; anything else on the wire is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
    /// Session start. Emitters send it once when they come up; the daemon
    /// also counts its own startup as one.
    Load,
}

impl ActivityKind {
    /// Every kind that qualifies as user activity.
    pub const ALL: [Self; 6] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::KeyPress,
        Self::Scroll,
        Self::TouchStart,
        Self::Load,
    ];

    /// Get the kind's wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerDown => "pointer-down",
            Self::PointerMove => "pointer-move",
            Self::KeyPress => "key-press",
            Self::Scroll => "scroll",
            Self::TouchStart => "touch-start",
            Self::Load => "load",
        }
    }

    /// Look up a kind by its wire name.
    ///
    /// Names outside the fixed set return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for kind in ActivityKind::ALL {
            assert_eq!(ActivityKind::from_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert_eq!(ActivityKind::from_name("visibility-change"), None);
        assert_eq!(ActivityKind::from_name("mousedown"), None);
        assert_eq!(ActivityKind::from_name(""), None);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!(ActivityKind::from_name("KeyPress"), None);
        assert_eq!(ActivityKind::from_name("POINTER-DOWN"), None);
    }
}
