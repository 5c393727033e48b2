/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! Conversion between Shapefiles and feature collections.

use super::error::{CoverageError, CoverageResult};
use super::feature::{Feature, FeatureCollection};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use log::warn;
use seamless_common::algorithms::{is_clockwise_order, point_in_poly};
use seamless_common::structures::Point2D;
use seamless_vector::*;
use std::io::Error;

/// Builds a feature collection from a polygon Shapefile. Z and M values
/// are ignored. Records with null geometry and deleted records are skipped.
/// Keys are not assigned here.
pub fn from_shapefile(sf: &Shapefile) -> CoverageResult<FeatureCollection> {
    if sf.header.shape_type.base_shape_type() != ShapeType::Polygon {
        return Err(CoverageError::input(
            &sf.file_name,
            format!(
                "expected a polygon layer, found {}",
                sf.header.shape_type
            ),
        ));
    }
    if sf.num_records == 0 {
        return Err(CoverageError::input(&sf.file_name, "the layer is empty"));
    }

    let mut fc = FeatureCollection::new(sf.attributes.fields.clone(), &sf.projection);
    let mut skipped = 0usize;
    for (i, record) in sf.records.iter().enumerate() {
        if sf.attributes.is_deleted.get(i).copied().unwrap_or(false) {
            continue;
        }
        let geometry = record_to_multipolygon(record);
        if geometry.0.is_empty() {
            skipped += 1;
            continue;
        }
        fc.push(Feature::new(
            0,
            geometry,
            sf.attributes.get_record(i).to_vec(),
        ));
    }
    if skipped > 0 {
        warn!(
            "{}: {} record(s) without polygon geometry were skipped",
            sf.get_short_filename(),
            skipped
        );
    }
    if fc.is_empty() {
        return Err(CoverageError::input(
            &sf.file_name,
            "the layer contains no polygon geometry",
        ));
    }
    Ok(fc)
}

/// Groups the rings of a polygon record into polygons. Every hole is given
/// to the first shell that contains its first vertex.
pub fn record_to_multipolygon(record: &ShapefileGeometry) -> MultiPolygon<f64> {
    if record.shape_type.base_shape_type() != ShapeType::Polygon {
        return MultiPolygon::new(vec![]);
    }
    let mut shells: Vec<(Vec<Point2D>, Vec<Vec<Point2D>>)> = vec![];
    let mut holes: Vec<Vec<Point2D>> = vec![];
    for part in 0..record.num_parts.max(0) {
        let ring = record.part_points(part as usize);
        if ring.len() < 4 {
            continue;
        }
        if record.is_hole(part) {
            holes.push(ring.to_vec());
        } else {
            shells.push((ring.to_vec(), vec![]));
        }
    }
    for hole in holes {
        let target = shells
            .iter()
            .position(|(shell, _)| point_in_poly(&hole[0], shell))
            .or_else(|| shells.len().checked_sub(1));
        match target {
            Some(t) => shells[t].1.push(hole),
            // a hole with no shell is read as a shell
            None => shells.push((hole, vec![])),
        }
    }
    MultiPolygon::new(
        shells
            .into_iter()
            .map(|(shell, holes)| {
                Polygon::new(
                    to_linestring(&shell),
                    holes.iter().map(|h| to_linestring(h)).collect(),
                )
            })
            .collect(),
    )
}

/// Polygon record with clockwise shells and counter-clockwise holes.
pub fn multipolygon_to_record(geom: &MultiPolygon<f64>) -> ShapefileGeometry {
    let mut sfg = ShapefileGeometry::new(ShapeType::Polygon);
    for poly in &geom.0 {
        let shell = to_points(poly.exterior());
        if shell.len() < 4 {
            continue;
        }
        sfg.add_part(&oriented(shell, true));
        for hole in poly.interiors() {
            let h = to_points(hole);
            if h.len() >= 4 {
                sfg.add_part(&oriented(h, false));
            }
        }
    }
    if sfg.num_parts == 0 {
        return ShapefileGeometry::new(ShapeType::Null);
    }
    sfg
}

/// Creates a polygon Shapefile from a collection. When keys are assigned
/// the key field is written first, as a 64-bit integer.
pub fn to_shapefile(fc: &FeatureCollection, file_name: &str) -> Result<Shapefile, Error> {
    let mut output = Shapefile::new(file_name, ShapeType::Polygon)?;
    output.projection = fc.projection.clone();
    let keyed = fc.has_keys();
    if keyed {
        output
            .attributes
            .add_field(&AttributeField::new(&fc.key_field, FieldDataType::Int, 12u8, 0u8));
    }
    for field in &fc.fields {
        output.attributes.add_field(field);
    }
    for f in &fc.features {
        output.add_record(multipolygon_to_record(&f.geometry))?;
        let mut rec = Vec::with_capacity(f.attributes.len() + 1);
        if keyed {
            rec.push(FieldData::Int64(f.key));
        }
        rec.extend(f.attributes.iter().cloned());
        output.attributes.add_record(rec, false);
    }
    Ok(output)
}

/// Creates a polygon Shapefile of bare polygons, numbered from 1 in an
/// `FID` field.
pub fn polygons_to_shapefile(
    polys: &[Polygon<f64>],
    file_name: &str,
    projection: &str,
) -> Result<Shapefile, Error> {
    let mut output = Shapefile::new(file_name, ShapeType::Polygon)?;
    output.projection = projection.to_string();
    output
        .attributes
        .add_field(&AttributeField::new("FID", FieldDataType::Int, 10u8, 0u8));
    for (i, p) in polys.iter().enumerate() {
        output.add_record(multipolygon_to_record(&MultiPolygon::new(vec![p.clone()])))?;
        output
            .attributes
            .add_record(vec![FieldData::Int(i as i32 + 1)], false);
    }
    Ok(output)
}

/// Creates a point Shapefile numbered from 1 in an `FID` field.
pub fn points_to_shapefile(
    points: &[Coord<f64>],
    file_name: &str,
    projection: &str,
) -> Result<Shapefile, Error> {
    let mut output = Shapefile::new(file_name, ShapeType::Point)?;
    output.projection = projection.to_string();
    output
        .attributes
        .add_field(&AttributeField::new("FID", FieldDataType::Int, 10u8, 0u8));
    for (i, c) in points.iter().enumerate() {
        output.add_point_record(c.x, c.y)?;
        output
            .attributes
            .add_record(vec![FieldData::Int(i as i32 + 1)], false);
    }
    Ok(output)
}

fn to_linestring(points: &[Point2D]) -> LineString<f64> {
    LineString::new(points.iter().map(|p| Coord { x: p.x, y: p.y }).collect())
}

fn to_points(ring: &LineString<f64>) -> Vec<Point2D> {
    let mut pts: Vec<Point2D> = ring.0.iter().map(|c| Point2D::new(c.x, c.y)).collect();
    if pts.len() > 1 && pts.first() != pts.last() {
        pts.push(pts[0]);
    }
    pts
}

fn oriented(mut ring: Vec<Point2D>, clockwise: bool) -> Vec<Point2D> {
    if is_clockwise_order(&ring) != clockwise {
        ring.reverse();
    }
    ring
}

#[cfg(test)]
mod test {
    use super::{from_shapefile, multipolygon_to_record, record_to_multipolygon, to_shapefile};
    use crate::coverage::feature::{Feature, FeatureCollection};
    use geo::{polygon, Area, LineString, MultiPolygon, Polygon};
    use seamless_vector::*;

    fn donut() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(0., 0.), (10., 0.), (10., 10.), (0., 10.), (0., 0.)]),
            vec![LineString::from(vec![
                (4., 4.),
                (6., 4.),
                (6., 6.),
                (4., 6.),
                (4., 4.),
            ])],
        )])
    }

    #[test]
    fn test_ring_orientation_on_write() {
        let rec = multipolygon_to_record(&donut());
        assert_eq!(rec.num_parts, 2);
        assert!(!rec.is_hole(0));
        assert!(rec.is_hole(1));
        let back = record_to_multipolygon(&rec);
        assert_eq!(back.0.len(), 1);
        assert_eq!(back.0[0].interiors().len(), 1);
        assert!((back.unsigned_area() - 96.0).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        let mut sf = Shapefile::new("lines.shp", ShapeType::PolyLine).unwrap();
        assert!(from_shapefile(&sf).is_err());
        sf = Shapefile::new("empty.shp", ShapeType::Polygon).unwrap();
        assert!(from_shapefile(&sf).is_err());
    }

    #[test]
    fn test_key_field_written_first() {
        let mut fc = FeatureCollection::new(
            vec![AttributeField::new("NAME", FieldDataType::Text, 10, 0)],
            "",
        );
        fc.key_field = "OID_ORIG".to_string();
        fc.push(Feature::new(
            42,
            MultiPolygon::new(vec![polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)]]),
            vec![FieldData::Text("a".to_string())],
        ));
        let sf = to_shapefile(&fc, "out.shp").unwrap();
        assert_eq!(sf.attributes.fields[0].name, "OID_ORIG");
        assert_eq!(sf.attributes.get_value(0, 0), FieldData::Int64(42));
        assert_eq!(sf.num_records, 1);
    }
}
