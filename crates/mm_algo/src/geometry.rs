//! Boundary geometry: an id-keyed index over legacy-unit boundaries, and the
//! polygon union that produces a merged constituency's boundary.

use std::collections::BTreeMap;

use geo::BooleanOps;
use geo_types::MultiPolygon;
use tracing::warn;

/// Legacy-unit id → boundary, merged from one or more keyed collections.
#[derive(Clone, Debug, Default)]
pub struct GeometryIndex {
    by_id: BTreeMap<String, MultiPolygon<f64>>,
}

impl GeometryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one boundary. A later insert for the same id replaces the earlier one.
    pub fn insert(&mut self, id: impl Into<String>, geometry: MultiPolygon<f64>) {
        let id = id.into();
        if self.by_id.insert(id.clone(), geometry).is_some() {
            warn!(%id, "boundary id appears in more than one collection; later one wins");
        }
    }

    /// Merge a whole collection (e.g. one file keyed by one id property).
    pub fn insert_collection<I>(&mut self, features: I)
    where
        I: IntoIterator<Item = (String, MultiPolygon<f64>)>,
    {
        for (id, geometry) in features {
            self.insert(id, geometry);
        }
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&MultiPolygon<f64>> {
        self.by_id.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Polygonal union of `parts`. An empty input yields an empty multipolygon.
pub fn union_boundaries<'a, I>(parts: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    parts
        .into_iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, part| acc.union(part))
}
