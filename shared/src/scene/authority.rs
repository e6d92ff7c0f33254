/// Whether this peer decides authoritative world state for a Scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Authority {
    /// No network session; the local peer owns everything.
    #[default]
    Local,
    /// Networked, but the roster has not elected a master yet.
    Undecided,
    /// Elected master of the session.
    Master,
    /// Replicates the master's state.
    Slave,
}

impl Authority {
    pub fn is_authoritative(&self) -> bool {
        matches!(self, Authority::Local | Authority::Master)
    }

    pub fn is_networked(&self) -> bool {
        !matches!(self, Authority::Local)
    }
}
