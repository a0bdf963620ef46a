use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};

#[derive(Debug, Clone)]
pub struct BoundingBox {
    pub idx: usize, // Index of corresponding MultiPolygon in shapes
    pub bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Geometries represents a collection of non-overlapping MultiPolygons with a bounding-box index.
#[derive(Debug, Clone)]
pub struct Geometries {
    pub shapes: Vec<MultiPolygon<f64>>,
    pub rtree: RTree<BoundingBox>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons
    pub fn new(polygons: Vec<MultiPolygon<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(polygons.iter().enumerate()
                .map(|(i, poly)| BoundingBox { idx: i, bbox: poly.bounding_rect().unwrap() })
                    .collect()),
            shapes: polygons,
        }
    }

    /// Find the shape whose interior contains `point`, if any.
    ///
    /// Bounding boxes narrow the candidates; the exact containment test
    /// decides. Points on a shared boundary belong to neither side.
    pub fn locate(&self, point: Point<f64>) -> Option<usize> {
        let probe = AABB::from_point([point.x(), point.y()]);
        self.rtree
            .locate_in_envelope_intersecting(&probe)
            .map(|bb| bb.idx)
            .find(|&idx| self.shapes[idx].contains(&point))
    }

    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, MultiPolygon, Point, Polygon};

    use super::Geometries;

    fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + side, y0),
                (x0 + side, y0 + side),
                (x0, y0 + side),
                (x0, y0),
            ]),
            vec![],
        )])
    }

    #[test]
    fn locates_containing_shape() {
        let geoms = Geometries::new(vec![square(0.0, 0.0, 4.0), square(10.0, 0.0, 4.0)]);
        assert_eq!(geoms.locate(Point::new(1.0, 1.0)), Some(0));
        assert_eq!(geoms.locate(Point::new(11.5, 3.0)), Some(1));
    }

    #[test]
    fn misses_points_outside_every_shape() {
        let geoms = Geometries::new(vec![square(0.0, 0.0, 4.0)]);
        assert_eq!(geoms.locate(Point::new(7.0, 7.0)), None);
        // inside the bounding box gap between the shapes counts as a miss too
        let geoms = Geometries::new(vec![square(0.0, 0.0, 4.0), square(10.0, 0.0, 4.0)]);
        assert_eq!(geoms.locate(Point::new(6.0, 2.0)), None);
    }
}
