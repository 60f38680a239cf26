//! Host input vocabulary: keys and build-menu requests.

use crate::modules::ModuleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Toggle simulation pause. Only honoured in debug mode.
    Pause,
    /// Toggle the debug overlay.
    Debug,
}

/// An open build menu for one slot. The session stays paused until the host
/// confirms a kind or cancels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMenu {
    pub x: usize,
    pub y: usize,
    /// Kinds that can currently be built there, in menu order. Never empty.
    pub options: Vec<ModuleKind>,
}

impl BuildMenu {
    pub fn offers(&self, kind: ModuleKind) -> bool {
        self.options.contains(&kind)
    }

    /// Menu labels, "1: Hull" style, for hosts that draw a plain list.
    pub fn labels(&self) -> Vec<String> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, kind)| format!("{}: {}", i + 1, kind.name()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_labels() {
        let menu = BuildMenu {
            x: 3,
            y: 0,
            options: vec![ModuleKind::Hull, ModuleKind::FinSail],
        };
        assert_eq!(menu.labels(), vec!["1: Hull", "2: Fin Sail"]);
        assert!(menu.offers(ModuleKind::FinSail));
        assert!(!menu.offers(ModuleKind::Castle));
    }
}
