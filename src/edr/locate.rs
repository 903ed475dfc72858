use crate::types::area::AreaSample;
use crate::types::geo::{normalize_lng, LngLat};
use haversine::{distance, Location as HaversineLocation, Units};
use ordered_float::OrderedFloat;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

const CANDIDATES: usize = 8;

/// Spatial index over a set of visible samples, used to find what is under the
/// cursor. Points are keyed `[lat, lng]` with longitudes on 0..360 so samples
/// and cursor positions compare on the same convention.
#[derive(Debug, Clone)]
pub struct SampleLocator {
    rtree: RTree<IndexedPoint>,
}

impl SampleLocator {
    pub fn new(samples: &[&AreaSample]) -> Self {
        let points = samples
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                GeomWithData::new(
                    [sample.position.lat, normalize_lng(sample.position.lng)],
                    index,
                )
            })
            .collect();
        Self {
            rtree: RTree::bulk_load(points),
        }
    }

    /// Index of the sample closest to `cursor` by great-circle distance, if one
    /// lies within `max_distance_km`.
    pub fn nearest(&self, cursor: LngLat, max_distance_km: f64) -> Option<usize> {
        let lng = normalize_lng(cursor.lng);

        // Degree-space order is close to great-circle order at map scales, so a
        // handful of candidates is enough to re-rank. The cursor is also looked
        // up one world to either side so samples across the 0/360 seam are seen.
        [lng - 360.0, lng, lng + 360.0]
            .into_iter()
            .flat_map(|lng| {
                self.rtree
                    .nearest_neighbor_iter(&[cursor.lat, lng])
                    .take(CANDIDATES)
            })
            .map(|point| {
                let [lat, lng] = *point.geom();
                let km = distance(
                    HaversineLocation {
                        latitude: cursor.lat,
                        longitude: cursor.lng,
                    },
                    HaversineLocation {
                        latitude: lat,
                        longitude: lng,
                    },
                    Units::Kilometers,
                );
                (point.data, km)
            })
            .filter(|(_, km)| *km <= max_distance_km)
            .min_by_key(|(_, km)| OrderedFloat(*km))
            .map(|(index, _)| index)
    }
}
