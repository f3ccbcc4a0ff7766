//! The body table: an arena of bodies built once before the first frame.

use std::collections::HashMap;
use std::path::Path;

use crate::body::{BodyId, CelestialBody};
use crate::descriptor::{BodyDescriptor, DEFAULT_BODY_TABLE_RON};
use crate::error::BodyTableError;

/// Collects descriptors and builds a [`BodyTable`] in two phases.
///
/// Phase one assigns sequential ids in declaration order. Phase two resolves
/// parent names against the complete table and derives a parents-first
/// evaluation order, so a moon may be declared before its planet.
#[derive(Debug, Default)]
pub struct BodyTableBuilder {
    descriptors: Vec<BodyDescriptor>,
}

impl BodyTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a RON list of descriptors.
    pub fn from_ron_str(source: &str) -> Result<Self, BodyTableError> {
        let descriptors: Vec<BodyDescriptor> =
            ron::from_str(source).map_err(BodyTableError::Parse)?;
        Ok(Self { descriptors })
    }

    /// Add one descriptor.
    pub fn push(&mut self, descriptor: BodyDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Add one descriptor, builder style.
    pub fn with(mut self, descriptor: BodyDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Validate and build the table.
    ///
    /// # Errors
    ///
    /// Fails on an empty table, a duplicated name, or an invalid numeric field.
    /// A parent name that matches no body is not an error: it is logged and the
    /// body is treated as orbiting the origin. Parent cycles are broken the
    /// same way.
    pub fn build(self) -> Result<BodyTable, BodyTableError> {
        if self.descriptors.is_empty() {
            return Err(BodyTableError::Empty);
        }

        // Phase 1: ids and the name index.
        let mut name_index = HashMap::with_capacity(self.descriptors.len());
        for (i, desc) in self.descriptors.iter().enumerate() {
            desc.validate()?;
            if name_index.insert(desc.name.clone(), BodyId(i as u32)).is_some() {
                return Err(BodyTableError::DuplicateName(desc.name.clone()));
            }
        }

        // Phase 2: parents, resolved against the complete index.
        let mut bodies: Vec<CelestialBody> = self
            .descriptors
            .iter()
            .enumerate()
            .map(|(i, desc)| {
                let parent = desc.parent.as_deref().and_then(|name| {
                    let resolved = name_index.get(name).copied();
                    if resolved.is_none() {
                        log::warn!(
                            "Body '{}' references unknown parent '{}'; orbiting the origin instead",
                            desc.name,
                            name
                        );
                    }
                    resolved
                });
                CelestialBody::new(BodyId(i as u32), desc, parent)
            })
            .collect();

        while let Some(idx) = find_cycle(&bodies) {
            log::warn!(
                "Parent cycle through body '{}'; detaching it from its parent",
                bodies[idx].name
            );
            bodies[idx].parent = None;
        }

        let order = evaluation_order(&bodies);
        log::debug!("Built body table with {} bodies", bodies.len());

        Ok(BodyTable {
            bodies,
            name_index,
            order,
        })
    }
}

/// Returns the index of a body that lies on a parent cycle, if any.
fn find_cycle(bodies: &[CelestialBody]) -> Option<usize> {
    let mut seen = vec![false; bodies.len()];
    for start in 0..bodies.len() {
        seen.iter_mut().for_each(|s| *s = false);
        let mut current = start;
        seen[current] = true;
        while let Some(parent) = bodies[current].parent {
            let next = parent.index();
            if seen[next] {
                return Some(next);
            }
            seen[next] = true;
            current = next;
        }
    }
    None
}

/// Body ids sorted by hierarchy depth, then by id.
fn evaluation_order(bodies: &[CelestialBody]) -> Vec<BodyId> {
    let depth = |index: usize| {
        let mut d = 0usize;
        let mut current = bodies[index].parent;
        while let Some(parent) = current {
            d += 1;
            current = bodies[parent.index()].parent;
        }
        d
    };
    let mut order: Vec<(usize, BodyId)> =
        (0..bodies.len()).map(|i| (depth(i), bodies[i].id)).collect();
    order.sort_unstable();
    order.into_iter().map(|(_, id)| id).collect()
}

/// Immutable arena of bodies, indexed by [`BodyId`].
#[derive(Debug, Clone)]
pub struct BodyTable {
    bodies: Vec<CelestialBody>,
    name_index: HashMap<String, BodyId>,
    order: Vec<BodyId>,
}

impl BodyTable {
    /// The built-in Solar System.
    pub fn builtin() -> Result<Self, BodyTableError> {
        BodyTableBuilder::from_ron_str(DEFAULT_BODY_TABLE_RON)?.build()
    }

    /// Parse and build a table from RON source.
    pub fn from_ron_str(source: &str) -> Result<Self, BodyTableError> {
        BodyTableBuilder::from_ron_str(source)?.build()
    }

    /// Load a table from a RON file.
    pub fn load(path: &Path) -> Result<Self, BodyTableError> {
        let source = std::fs::read_to_string(path).map_err(BodyTableError::Read)?;
        let table = Self::from_ron_str(&source)?;
        log::info!("Loaded {} bodies from {}", table.len(), path.display());
        Ok(table)
    }

    /// Look up a body by name, logging and returning the sentinel on a miss.
    pub fn lookup(&self, name: &str) -> &CelestialBody {
        match self.try_lookup(name) {
            Some(body) => body,
            None => {
                log::warn!("No body named '{name}' in the body table");
                CelestialBody::undefined()
            }
        }
    }

    pub fn try_lookup(&self, name: &str) -> Option<&CelestialBody> {
        self.name_index.get(name).map(|id| &self.bodies[id.index()])
    }

    /// Look up a body by id, logging and returning the sentinel on a miss.
    pub fn get(&self, id: BodyId) -> &CelestialBody {
        match self.try_get(id) {
            Some(body) => body,
            None => {
                log::warn!("No body with id {id} in the body table");
                CelestialBody::undefined()
            }
        }
    }

    pub fn try_get(&self, id: BodyId) -> Option<&CelestialBody> {
        self.bodies.get(id.index())
    }

    /// Ids in an order where every parent precedes its children.
    pub fn evaluation_order(&self) -> &[BodyId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CelestialBody> {
        self.bodies.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.iter().map(|b| b.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun() -> BodyDescriptor {
        BodyDescriptor::new("Sun", 5.0, 0.0, 0.0)
    }

    #[test]
    fn test_sequential_ids() {
        let table = BodyTableBuilder::new()
            .with(sun())
            .with(BodyDescriptor::new("Earth", 1.0, 22.0, 365.26))
            .with(BodyDescriptor::new("Mars", 0.5, 28.0, 687.0))
            .build()
            .unwrap();

        let ids: Vec<u32> = table.ids().map(|id| id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(table.lookup("Mars").id, BodyId(2));
    }

    #[test]
    fn test_child_declared_before_parent() {
        let table = BodyTableBuilder::new()
            .with(BodyDescriptor::new("Moon", 0.3, 2.0, 27.3).with_parent("Earth"))
            .with(BodyDescriptor::new("Earth", 1.0, 22.0, 365.26))
            .build()
            .unwrap();

        let moon = table.lookup("Moon");
        assert_eq!(moon.parent, Some(BodyId(1)));
        assert_eq!(table.evaluation_order(), &[BodyId(1), BodyId(0)]);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let table = BodyTableBuilder::new()
            .with(BodyDescriptor::new("Lost", 0.3, 2.0, 10.0).with_parent("Nowhere"))
            .build()
            .unwrap();
        assert!(table.lookup("Lost").is_root());
    }

    #[test]
    fn test_parent_cycle_is_broken() {
        let table = BodyTableBuilder::new()
            .with(BodyDescriptor::new("A", 1.0, 2.0, 10.0).with_parent("B"))
            .with(BodyDescriptor::new("B", 1.0, 2.0, 10.0).with_parent("A"))
            .with(BodyDescriptor::new("C", 1.0, 2.0, 10.0).with_parent("C"))
            .build()
            .unwrap();

        assert_eq!(table.evaluation_order().len(), 3);
        assert!(table.lookup("C").is_root());
        assert!(table.lookup("A").is_root() || table.lookup("B").is_root());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = BodyTableBuilder::new().with(sun()).with(sun()).build();
        match result {
            Err(BodyTableError::DuplicateName(name)) => assert_eq!(name, "Sun"),
            other => panic!("Expected DuplicateName, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            BodyTableBuilder::new().build(),
            Err(BodyTableError::Empty)
        ));
    }

    #[test]
    fn test_lookup_miss_returns_sentinel() {
        let table = BodyTableBuilder::new().with(sun()).build().unwrap();
        assert!(table.lookup("Vulcan").is_undefined());
        assert!(table.try_lookup("Vulcan").is_none());
        assert!(table.get(BodyId(99)).is_undefined());
        assert!(table.get(BodyId::UNDEFINED).is_undefined());
    }

    #[test]
    fn test_builtin_table_order_is_parents_first() {
        let table = BodyTable::builtin().unwrap();
        let order = table.evaluation_order();
        assert_eq!(order.len(), table.len());

        let position = |id: BodyId| order.iter().position(|&o| o == id).unwrap();
        for body in table.iter() {
            if let Some(parent) = body.parent {
                assert!(position(parent) < position(body.id), "{} before parent", body.name);
            }
        }
        assert_eq!(table.lookup("Moon").parent, Some(table.lookup("Earth").id));
        let jupiter = Some(table.lookup("Jupiter").id);
        assert_eq!(table.iter().filter(|b| b.parent == jupiter).count(), 4);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bodies.ron");
        let source = r#"[
            (name: "Sun", radius: 5.0, distance: 0.0),
            (name: "Rock", radius: 0.1, distance: 3.0, orbital_period_days: 2.0),
        ]"#;
        std::fs::write(&path, source).unwrap();

        let table = BodyTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("Rock").orbital_period_days, 2.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            BodyTable::load(&dir.path().join("absent.ron")),
            Err(BodyTableError::Read(_))
        ));
    }

    #[test]
    fn test_invalid_ron() {
        assert!(matches!(
            BodyTable::from_ron_str("[(name: 5)]"),
            Err(BodyTableError::Parse(_))
        ));
    }
}
