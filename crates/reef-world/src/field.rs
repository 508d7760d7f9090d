//! Bounded 2D field: the single source of truth for what occupies where.

use crate::organism::{DeathCause, Organism};
use crate::species::Species;
use reef_core::{Location, OrganismId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A rectangular grid holding at most one organism per cell.
///
/// The field also owns the organism records. A record outlives its cell: once
/// an organism dies it is cleared from the grid but stays queryable (and keeps
/// answering `is_alive() == false`) until [`Field::purge_dead`] drops it.
#[derive(Debug, Clone)]
pub struct Field {
    depth: usize,
    width: usize,
    cells: Vec<Option<OrganismId>>,
    organisms: HashMap<OrganismId, Organism>,
}

impl Field {
    pub fn new(depth: usize, width: usize) -> Self {
        assert!(depth > 0 && width > 0, "field must have at least one cell");
        Self {
            depth,
            width,
            cells: vec![None; depth * width],
            organisms: HashMap::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, location: Location) -> bool {
        location.row < self.depth && location.col < self.width
    }

    fn index(&self, location: Location) -> usize {
        assert!(
            self.contains(location),
            "location {} outside {}x{} field",
            location,
            self.depth,
            self.width
        );
        location.row * self.width + location.col
    }

    /// Register a new organism at `location` and return its id.
    ///
    /// Panics if the cell is taken: movers must vacate through
    /// [`Field::relocate`], never by placing over someone.
    pub fn place(&mut self, mut organism: Organism, location: Location) -> OrganismId {
        let index = self.index(location);
        assert!(organism.is_alive(), "cannot place dead organism {}", organism.id());
        if let Some(occupant) = self.cells[index] {
            panic!("cell {} already holds organism {}", location, occupant);
        }

        let id = organism.id();
        assert!(
            !self.organisms.contains_key(&id),
            "organism {} is already registered",
            id
        );

        organism.location = location;
        self.cells[index] = Some(id);
        self.organisms.insert(id, organism);
        id
    }

    /// Drop whatever reference the cell holds. Does not kill the occupant.
    pub fn clear(&mut self, location: Location) {
        let index = self.index(location);
        self.cells[index] = None;
    }

    /// Empty every cell and forget every organism
    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.organisms.clear();
    }

    pub fn get_object_at(&self, location: Location) -> Option<&Organism> {
        self.occupant_at(location)
            .and_then(|id| self.organisms.get(&id))
    }

    pub fn occupant_at(&self, location: Location) -> Option<OrganismId> {
        self.cells[self.index(location)]
    }

    pub fn is_free(&self, location: Location) -> bool {
        self.occupant_at(location).is_none()
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(&id)
    }

    pub fn organism_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.organisms.get_mut(&id)
    }

    pub(crate) fn expect_organism(&self, id: OrganismId) -> &Organism {
        self.organisms
            .get(&id)
            .unwrap_or_else(|| panic!("unknown organism {}", id))
    }

    pub(crate) fn expect_organism_mut(&mut self, id: OrganismId) -> &mut Organism {
        self.organisms
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown organism {}", id))
    }

    /// Move a live organism to a free cell
    pub fn relocate(&mut self, id: OrganismId, to: Location) {
        let to_index = self.index(to);
        let from = {
            let organism = self.expect_organism(id);
            assert!(organism.is_alive(), "dead organism {} cannot move", id);
            organism.location()
        };
        if let Some(occupant) = self.cells[to_index] {
            panic!("cell {} already holds organism {}", to, occupant);
        }

        let from_index = self.index(from);
        if self.cells[from_index] == Some(id) {
            self.cells[from_index] = None;
        }
        self.cells[to_index] = Some(id);
        self.expect_organism_mut(id).location = to;
    }

    /// Kill an organism and vacate its cell. Calling it again is a no-op.
    pub fn set_dead(&mut self, id: OrganismId, cause: DeathCause) {
        let organism = self.expect_organism_mut(id);
        if !organism.mark_dead(cause) {
            return;
        }

        let location = organism.location();
        let index = self.index(location);
        if self.cells[index] == Some(id) {
            self.cells[index] = None;
        }
    }

    /// In-bounds neighbours of `location`.
    ///
    /// Order is row-major over the 3x3 window with the centre skipped, i.e.
    /// NW, N, NE, W, E, SW, S, SE. The order is fixed (never shuffled) because
    /// foraging and mate search stop at the first match.
    pub fn adjacent_locations(&self, location: Location) -> Vec<Location> {
        assert!(self.contains(location), "location {} outside field", location);

        let mut adjacent = Vec::with_capacity(8);
        for drow in -1..=1 {
            for dcol in -1..=1 {
                if drow == 0 && dcol == 0 {
                    continue;
                }
                if let Some(next) = location.offset(drow, dcol) {
                    if self.contains(next) {
                        adjacent.push(next);
                    }
                }
            }
        }
        adjacent
    }

    /// Unoccupied neighbours, in adjacency order
    pub fn free_adjacent_locations(&self, location: Location) -> Vec<Location> {
        self.adjacent_locations(location)
            .into_iter()
            .filter(|&loc| self.is_free(loc))
            .collect()
    }

    /// First unoccupied neighbour, if any
    pub fn free_adjacent_location(&self, location: Location) -> Option<Location> {
        self.adjacent_locations(location)
            .into_iter()
            .find(|&loc| self.is_free(loc))
    }

    /// Ids of every occupant, row-major
    pub fn live_organisms(&self) -> Vec<OrganismId> {
        self.cells.iter().flatten().copied().collect()
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Drop the records of dead organisms, returning them
    pub fn purge_dead(&mut self) -> Vec<Organism> {
        let dead: Vec<OrganismId> = self
            .organisms
            .iter()
            .filter(|(_, org)| !org.is_alive())
            .map(|(id, _)| *id)
            .collect();

        dead.into_iter()
            .filter_map(|id| self.organisms.remove(&id))
            .collect()
    }

    /// Head count of live occupants per species
    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for id in self.cells.iter().flatten() {
            if let Some(organism) = self.organisms.get(id) {
                *census.counts.entry(organism.species()).or_insert(0) += 1;
            }
        }
        census
    }
}

/// Live organisms per species
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub counts: BTreeMap<Species, usize>,
}

impl Census {
    pub fn count(&self, species: Species) -> usize {
        self.counts.get(&species).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of species with at least one live member
    pub fn species_alive(&self) -> usize {
        self.counts.values().filter(|&&n| n > 0).count()
    }
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Species::ALL
            .iter()
            .map(|s| format!("{}: {}", s, self.count(*s)))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
