/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use seamless_common::algorithms::is_clockwise_order;
use seamless_common::structures::{BoundingBox, Point2D};
use std::f64;
use std::fmt;

/// A single shapefile record. Only planar (x, y) coordinates are held; the
/// z and measure values of Z and M shapes are dropped on read.
#[derive(Clone, Debug)]
pub struct ShapefileGeometry {
    pub shape_type: ShapeType,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub num_parts: i32,
    pub num_points: i32,
    pub parts: Vec<i32>,
    pub points: Vec<Point2D>,
}

impl ShapefileGeometry {
    /// ShapefileGeometry constructor method.
    pub fn new(shape_type: ShapeType) -> ShapefileGeometry {
        ShapefileGeometry {
            shape_type,
            ..Default::default()
        }
    }

    fn expand_extent(&mut self, p: &Point2D) {
        self.x_min = self.x_min.min(p.x);
        self.x_max = self.x_max.max(p.x);
        self.y_min = self.y_min.min(p.y);
        self.y_max = self.y_max.max(p.y);
    }

    /// Adds a single Point2D to the ShapefileGeometry's points array.
    pub fn add_point(&mut self, p: Point2D) {
        self.points.push(p);
        self.num_points += 1;
        self.expand_extent(&p);
    }

    /// Adds a part of Point2Ds to the ShapefileGeometry.
    pub fn add_part(&mut self, points: &[Point2D]) {
        self.parts.push(self.points.len() as i32);
        self.num_parts += 1i32;
        for p in points {
            self.points.push(*p);
            self.expand_extent(p);
        }
        self.num_points += points.len() as i32;
    }

    /// The vertices of one part, or an empty slice for an invalid part number.
    pub fn part_points(&self, part_num: usize) -> &[Point2D] {
        if part_num >= self.parts.len() {
            return &[];
        }
        let start = (self.parts[part_num].max(0) as usize).min(self.points.len());
        let end = if part_num + 1 < self.parts.len() {
            (self.parts[part_num + 1].max(0) as usize).min(self.points.len())
        } else {
            self.points.len()
        };
        if end < start {
            return &[];
        }
        &self.points[start..end]
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.x_min, self.x_max, self.y_min, self.y_max)
    }

    /// Returns the length of the record content in bytes, shape type included.
    pub fn get_length(&self) -> i32 {
        let ret = 4i32; // shape type
        ret + match self.shape_type.base_shape_type() {
            ShapeType::Point => 16i32,
            ShapeType::MultiPoint => 36i32 + self.num_points * 16i32,
            ShapeType::PolyLine | ShapeType::Polygon => {
                40i32 + self.num_parts * 4i32 + self.num_points * 16i32
            }
            _ => 0i32,
        }
    }

    /// Checks whether or not a part in a polygon is a hole. Shapefile outer
    /// rings are clockwise, so holes are the counter-clockwise rings.
    pub fn is_hole(&self, part_num: i32) -> bool {
        if self.shape_type.base_shape_type() != ShapeType::Polygon {
            return false;
        }
        if part_num < 0 || part_num > self.num_parts - 1 {
            return false;
        }
        let ring = self.part_points(part_num as usize);
        ring.len() >= 3 && !is_clockwise_order(ring)
    }
}

impl Default for ShapefileGeometry {
    fn default() -> ShapefileGeometry {
        ShapefileGeometry {
            shape_type: ShapeType::Null,
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
            num_parts: 0i32,
            num_points: 0i32,
            parts: vec![],
            points: vec![],
        }
    }
}

impl fmt::Display for ShapefileGeometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "shape_type: {}, extent: ({}, {}) - ({}, {}), num_parts: {}, num_points: {}",
            self.shape_type,
            self.x_min,
            self.y_min,
            self.x_max,
            self.y_max,
            self.num_parts,
            self.num_points
        )
    }
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ShapeType {
    #[default]
    Null = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
}

impl ShapeType {
    /// Returns None for codes not defined by the shapefile format.
    pub fn from_int(value: i32) -> Option<ShapeType> {
        Some(match value {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            _ => return None,
        })
    }

    pub fn to_int(&self) -> i32 {
        *self as i32
    }

    pub fn base_shape_type(&self) -> ShapeType {
        match self {
            ShapeType::Null => ShapeType::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
                ShapeType::PolyLine
            }
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeType::MultiPoint
            }
        }
    }

    pub fn has_z(&self) -> bool {
        matches!(
            self,
            ShapeType::PointZ | ShapeType::PolyLineZ | ShapeType::PolygonZ | ShapeType::MultiPointZ
        )
    }

    pub fn has_m(&self) -> bool {
        matches!(
            self,
            ShapeType::PointM | ShapeType::PolyLineM | ShapeType::PolygonM | ShapeType::MultiPointM
        )
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let printable = match *self {
            ShapeType::Null => "Null",
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "PolyLine",
            ShapeType::Polygon => "Polygon",
            ShapeType::MultiPoint => "MultiPoint",
            ShapeType::PointZ => "PointZ",
            ShapeType::PolyLineZ => "PolyLineZ",
            ShapeType::PolygonZ => "PolygonZ",
            ShapeType::MultiPointZ => "MultiPointZ",
            ShapeType::PointM => "PointM",
            ShapeType::PolyLineM => "PolyLineM",
            ShapeType::PolygonM => "PolygonM",
            ShapeType::MultiPointM => "MultiPointM",
        };
        write!(f, "{}", printable)
    }
}

#[cfg(test)]
mod test {
    use super::{ShapeType, ShapefileGeometry};
    use seamless_common::structures::Point2D;

    #[test]
    fn test_parts_and_holes() {
        let mut sfg = ShapefileGeometry::new(ShapeType::Polygon);
        // clockwise exterior
        sfg.add_part(&[
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 10.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(0.0, 0.0),
        ]);
        // counter-clockwise hole
        sfg.add_part(&[
            Point2D::new(2.0, 2.0),
            Point2D::new(4.0, 2.0),
            Point2D::new(4.0, 4.0),
            Point2D::new(2.0, 2.0),
        ]);
        assert_eq!(sfg.num_parts, 2);
        assert_eq!(sfg.part_points(1).len(), 4);
        assert!(!sfg.is_hole(0));
        assert!(sfg.is_hole(1));
        assert!(sfg.part_points(2).is_empty());
        assert_eq!(sfg.get_length(), 4 + 40 + 2 * 4 + 9 * 16);
        assert_eq!(sfg.x_max, 10.0);
    }

    #[test]
    fn test_shape_type_codes() {
        assert_eq!(ShapeType::from_int(15), Some(ShapeType::PolygonZ));
        assert_eq!(ShapeType::PolygonZ.base_shape_type(), ShapeType::Polygon);
        assert_eq!(ShapeType::PolygonM.to_int(), 25);
        assert!(ShapeType::from_int(2).is_none());
    }
}
