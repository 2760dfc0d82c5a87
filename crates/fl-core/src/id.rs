use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a demand point. Unique among demands for the whole session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandId(pub u64);

/// Identifier of a facility. Unique among facilities for the whole session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub u64);

impl fmt::Debug for DemandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "demand#{}", self.0)
    }
}

impl fmt::Display for DemandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "demand#{}", self.0)
    }
}

impl fmt::Debug for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "facility#{}", self.0)
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "facility#{}", self.0)
    }
}

/// Hands out point ids from two monotonically increasing counters.
///
/// Ids are never derived from collection length and never reused, so deleting
/// a point and placing a new one cannot produce a duplicate. The counters
/// stop at `u64::MAX` instead of wrapping.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_demand: u64,
    next_facility: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_demand(&mut self) -> DemandId {
        let id = DemandId(self.next_demand);
        self.next_demand = self.next_demand.saturating_add(1);
        id
    }

    pub fn next_facility(&mut self) -> FacilityId {
        let id = FacilityId(self.next_facility);
        self.next_facility = self.next_facility.saturating_add(1);
        id
    }

    /// The ids the next calls would hand out, without consuming them.
    pub fn peek(&self) -> (DemandId, FacilityId) {
        (DemandId(self.next_demand), FacilityId(self.next_facility))
    }

    /// Advance past ids that arrived from elsewhere (e.g. a server echo).
    pub fn observe_demand(&mut self, id: DemandId) {
        self.next_demand = self.next_demand.max(id.0.saturating_add(1));
    }

    pub fn observe_facility(&mut self, id: FacilityId) {
        self.next_facility = self.next_facility.max(id.0.saturating_add(1));
    }
}
