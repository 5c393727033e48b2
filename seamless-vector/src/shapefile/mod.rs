/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT

Notes: The logic behind working with the ESRI Shapefile format.
*/

pub mod attributes;
pub mod geometry;

use self::attributes::*;
use self::geometry::*;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use chrono::prelude::*;
use seamless_common::structures::Point2D;
use seamless_common::utils::{ByteOrderReader, Endianness};
use std::f64;
use std::fmt;
use std::fs;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufWriter, Cursor, Error, ErrorKind};
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct ShapefileHeader {
    file_code: i32,            // BigEndian; value is 9994
    pub file_length: i32,      // BigEndian
    pub version: i32,          // LittleEndian
    pub shape_type: ShapeType, // LittleEndian
    pub x_min: f64,            // LittleEndian
    pub y_min: f64,            // LittleEndian
    pub x_max: f64,            // LittleEndian
    pub y_max: f64,            // LittleEndian
}

impl fmt::Display for ShapefileHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "file_code: {}\nfile_length: {}\nversion: {}\nshape_type: {}\nx_min: {}\nx_max: {}\ny_min: {}\ny_max: {}",
            self.file_code,
            self.file_length,
            self.version,
            self.shape_type,
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max
        )
    }
}

/// `Shapefile` is an in-memory ESRI Shapefile.
///
/// Examples:
///
/// ```ignore
/// // Read a Shapefile from a file.
/// let input = Shapefile::read(&input_file)?;
///
/// // Create a new output Shapefile
/// let mut output = Shapefile::initialize_using_file(&output_file, &input, ShapeType::Polygon, true)?;
///
/// // add attributes
/// let fid = AttributeField::new("FID", FieldDataType::Int, 6u8, 0u8);
/// output.attributes.add_field(&fid);
/// ```
#[derive(Default, Clone, Debug)]
pub struct Shapefile {
    pub file_name: String,
    pub file_mode: String,
    pub header: ShapefileHeader,
    pub num_records: usize,
    pub records: Vec<ShapefileGeometry>,
    pub attributes: ShapefileAttributes,
    pub projection: String,
}

fn with_shp_extension(file_name: &str) -> String {
    if Path::new(file_name).extension().is_some() {
        file_name.to_string()
    } else {
        // likely no extension provided; default to .shp
        format!("{}.shp", file_name)
    }
}

fn sibling_file(file_name: &str, extension: &str) -> String {
    Path::new(file_name)
        .with_extension(extension)
        .to_string_lossy()
        .to_string()
}

impl Shapefile {
    pub fn read(file_name: &str) -> Result<Shapefile, Error> {
        let mut sf = Shapefile {
            file_name: file_name.to_string(),
            file_mode: "r".to_string(),
            ..Default::default()
        };
        sf.read_file()?;
        Ok(sf)
    }

    pub fn new(file_name: &str, file_type: ShapeType) -> Result<Shapefile, Error> {
        let mut sf = Shapefile {
            file_name: with_shp_extension(file_name),
            file_mode: "w".to_string(),
            ..Default::default()
        };
        sf.header.shape_type = file_type;
        Ok(sf)
    }

    pub fn initialize_using_file(
        file_name: &str,
        other: &Shapefile,
        shape_type: ShapeType,
        copy_fields: bool,
    ) -> Result<Shapefile, Error> {
        let mut sf = Shapefile {
            file_name: with_shp_extension(file_name),
            file_mode: "w".to_string(),
            projection: other.projection.clone(),
            ..Default::default()
        };
        sf.header.shape_type = shape_type;
        if copy_fields {
            for field in &other.attributes.fields {
                sf.attributes.add_field(field);
            }
        }
        Ok(sf)
    }

    /// Returns the filename, in shortened form (e.g. file.shp becomes file).
    pub fn get_short_filename(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Returns the ShapefileGeometry for a specified index, starting at zero.
    pub fn get_record(&self, index: usize) -> Option<&ShapefileGeometry> {
        self.records.get(index)
    }

    /// Adds a new ShapefileGeometry.
    pub fn add_record(&mut self, geometry: ShapefileGeometry) -> Result<(), Error> {
        if self.file_mode == "r" {
            return Err(Error::new(
                ErrorKind::Other,
                "The file was opened in read-only mode.",
            ));
        }
        if geometry.shape_type != self.header.shape_type && geometry.shape_type != ShapeType::Null
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Attempt to add a ShapefileGeometry record of the wrong ShapeType.",
            ));
        }
        self.records.push(geometry);
        self.num_records += 1;
        Ok(())
    }

    /// Adds a new Point record.
    pub fn add_point_record(&mut self, x: f64, y: f64) -> Result<(), Error> {
        let mut sfg = ShapefileGeometry::new(ShapeType::Point);
        sfg.add_point(Point2D::new(x, y));
        self.add_record(sfg)
    }

    fn read_file(&mut self) -> Result<(), Error> {
        ///////////////////////////////
        // First read the geometries //
        ///////////////////////////////
        let buffer = fs::read(&self.file_name)?;
        let file_size = buffer.len();
        if file_size < 100 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{} is too short to be a shapefile.", self.file_name),
            ));
        }

        // Note: the shapefile format uses mixed endianness, so the reader's
        // byte order is switched frequently.
        let mut bor = ByteOrderReader::new(Cursor::new(buffer), Endianness::BigEndian)?;
        self.header.file_code = bor.read_i32()?;
        if self.header.file_code != 9994 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{} is not a shapefile (bad file code).", self.file_name),
            ));
        }
        bor.seek(24)?;
        self.header.file_length = bor.read_i32()?;

        // the rest of the header is in LittleEndian format
        bor.set_byte_order(Endianness::LittleEndian);
        self.header.version = bor.read_i32()?;
        let st = bor.read_i32()?;
        self.header.shape_type = ShapeType::from_int(st).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Unrecognized ShapeType {}.", st),
            )
        })?;

        // bounding box; the z and m ranges are not retained
        self.header.x_min = bor.read_f64()?;
        self.header.y_min = bor.read_f64()?;
        self.header.x_max = bor.read_f64()?;
        self.header.y_max = bor.read_f64()?;

        bor.seek(100)?;
        while bor.pos() + 8 <= file_size {
            bor.set_byte_order(Endianness::BigEndian);
            bor.inc_pos(4)?; // We don't really need the record number
            let content_length = bor.read_i32()?.max(0) as usize * 2; // in bytes
            let content_start = bor.pos();
            bor.set_byte_order(Endianness::LittleEndian);
            let shape_type = ShapeType::from_int(bor.read_i32()?).ok_or_else(|| {
                Error::new(ErrorKind::InvalidData, "Unrecognized record ShapeType.")
            })?;

            let sfg = match shape_type.base_shape_type() {
                ShapeType::Null => ShapefileGeometry::new(ShapeType::Null),

                ShapeType::Point => {
                    let mut sfg = ShapefileGeometry::new(ShapeType::Point);
                    let x = bor.read_f64()?;
                    let y = bor.read_f64()?;
                    sfg.add_point(Point2D::new(x, y));
                    sfg
                }

                ShapeType::PolyLine | ShapeType::Polygon => {
                    let mut sfg = ShapefileGeometry {
                        shape_type: shape_type.base_shape_type(),
                        x_min: bor.read_f64()?,
                        y_min: bor.read_f64()?,
                        x_max: bor.read_f64()?,
                        y_max: bor.read_f64()?,
                        num_parts: bor.read_i32()?,
                        num_points: bor.read_i32()?,
                        ..Default::default()
                    };
                    for _ in 0..sfg.num_parts {
                        sfg.parts.push(bor.read_i32()?);
                    }
                    for _ in 0..sfg.num_points {
                        let x = bor.read_f64()?;
                        let y = bor.read_f64()?;
                        sfg.points.push(Point2D::new(x, y));
                    }
                    sfg
                }

                _ => {
                    // MultiPoint
                    let mut sfg = ShapefileGeometry {
                        shape_type: ShapeType::MultiPoint,
                        x_min: bor.read_f64()?,
                        y_min: bor.read_f64()?,
                        x_max: bor.read_f64()?,
                        y_max: bor.read_f64()?,
                        num_points: bor.read_i32()?,
                        ..Default::default()
                    };
                    for _ in 0..sfg.num_points {
                        let x = bor.read_f64()?;
                        let y = bor.read_f64()?;
                        sfg.points.push(Point2D::new(x, y));
                    }
                    sfg
                }
            };
            self.records.push(sfg);

            // skip any z and m data
            bor.seek(content_start + content_length)?;
        }

        self.num_records = self.records.len();

        //////////////////////////////
        // Read the projection file //
        //////////////////////////////
        if let Ok(prj) = fs::read_to_string(sibling_file(&self.file_name, "prj")) {
            self.projection = prj;
        }

        ///////////////////////////////
        // Read the attributes table //
        ///////////////////////////////
        let dbf_file = sibling_file(&self.file_name, "dbf");
        let buffer = fs::read(&dbf_file)?;
        self.read_dbf(buffer)
    }

    fn read_dbf(&mut self, buffer: Vec<u8>) -> Result<(), Error> {
        let mut bor = ByteOrderReader::new(Cursor::new(buffer), Endianness::LittleEndian)?;
        self.attributes.header.version = bor.read_u8()?;
        self.attributes.header.year = 1900u32 + bor.read_u8()? as u32;
        self.attributes.header.month = bor.read_u8()?;
        self.attributes.header.day = bor.read_u8()?;
        let num_records = bor.read_u32()?;
        self.attributes.header.bytes_in_header = bor.read_u16()?;
        self.attributes.header.bytes_in_record = bor.read_u16()?;

        // the field descriptors start at byte 32
        bor.seek(32)?;
        self.attributes.fields = vec![];
        while bor.pos() + 32 <= bor.len() && bor.peek_u8()? != 0x0d {
            let name = bor.read_utf8(11)?.replace(char::from(0), "");
            let field_type = char::from(bor.read_u8()?);
            bor.inc_pos(4)?;
            let field_length = bor.read_u8()?;
            let decimal_count = bor.read_u8()?;
            // reserved bytes, work area id, set fields flag and index flag
            bor.inc_pos(14)?;
            self.attributes.add_field(&AttributeField {
                name: name.trim().to_string(),
                field_type,
                field_length,
                decimal_count,
            });
        }

        bor.seek(self.attributes.header.bytes_in_header as usize)?;
        let fields = self.attributes.fields.clone();
        for _ in 0..num_records {
            let deleted = bor.read_u8()? == 0x2A;
            let mut r: Vec<FieldData> = Vec::with_capacity(fields.len());
            for field in &fields {
                let str_rep = bor
                    .read_utf8(field.field_length as usize)?
                    .replace(char::from(0), "")
                    .trim()
                    .to_string();
                r.push(parse_field_value(field, &str_rep));
            }
            self.attributes.add_record(r, deleted);
        }
        Ok(())
    }

    pub fn write(&mut self) -> Result<(), Error> {
        if self.file_mode == "r" {
            return Err(Error::new(
                ErrorKind::Other,
                "The file was opened in read-only mode.",
            ));
        }
        match self.header.shape_type {
            ShapeType::Null
            | ShapeType::Point
            | ShapeType::MultiPoint
            | ShapeType::PolyLine
            | ShapeType::Polygon => {}
            st => {
                return Err(Error::new(
                    ErrorKind::Unsupported,
                    format!("Writing {} shapefiles is not supported.", st),
                ))
            }
        }

        self.num_records = self.records.len(); // make sure they are the same.
        if self.num_records != self.attributes.get_num_records() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                "The number of geometries and attribute records differ.",
            ));
        }

        /////////////////////////////////////////
        // Write the geometry data (.shp file) //
        /////////////////////////////////////////
        let mut size = 100i32; // initialized to the size of the file header
        for rec in &self.records {
            size += 8 + rec.get_length();
        }
        self.calculate_extent();

        let mut writer = BufWriter::new(File::create(&self.file_name)?);
        self.write_main_header(&mut writer, size / 2)?;
        for (i, rec) in self.records.iter().enumerate() {
            writer.write_i32::<BigEndian>(i as i32 + 1i32)?; // Record number
            writer.write_i32::<BigEndian>(rec.get_length() / 2)?; // Content length in 16-bit words
            writer.write_i32::<LittleEndian>(rec.shape_type.to_int())?;
            match rec.shape_type {
                ShapeType::Point => {
                    let p = rec.points.first().copied().unwrap_or_default();
                    writer.write_f64::<LittleEndian>(p.x)?;
                    writer.write_f64::<LittleEndian>(p.y)?;
                }
                ShapeType::PolyLine | ShapeType::Polygon | ShapeType::MultiPoint => {
                    writer.write_f64::<LittleEndian>(rec.x_min)?;
                    writer.write_f64::<LittleEndian>(rec.y_min)?;
                    writer.write_f64::<LittleEndian>(rec.x_max)?;
                    writer.write_f64::<LittleEndian>(rec.y_max)?;
                    if rec.shape_type != ShapeType::MultiPoint {
                        writer.write_i32::<LittleEndian>(rec.num_parts)?;
                    }
                    writer.write_i32::<LittleEndian>(rec.num_points)?;
                    if rec.shape_type != ShapeType::MultiPoint {
                        for part in &rec.parts {
                            writer.write_i32::<LittleEndian>(*part)?;
                        }
                    }
                    for pt in &rec.points {
                        writer.write_f64::<LittleEndian>(pt.x)?;
                        writer.write_f64::<LittleEndian>(pt.y)?;
                    }
                }
                _ => {}
            }
        }
        writer.flush()?;

        /////////////////////////////////
        // Write the index file (.shx) //
        /////////////////////////////////
        let mut writer = BufWriter::new(File::create(sibling_file(&self.file_name, "shx"))?);
        let file_length = (100 + 8 * self.num_records) as i32 / 2i32; // in 16-bit words
        self.write_main_header(&mut writer, file_length)?;
        let mut pos = 100i32;
        for rec in &self.records {
            writer.write_i32::<BigEndian>(pos / 2)?; // Offset in 16-bit words
            writer.write_i32::<BigEndian>(rec.get_length() / 2)?;
            pos += 8 + rec.get_length();
        }
        writer.flush()?;

        ///////////////////////////////
        // Write the projection file //
        ///////////////////////////////
        if !self.projection.is_empty() {
            fs::write(sibling_file(&self.file_name, "prj"), self.projection.as_bytes())?;
        }

        ///////////////////////////////
        // Write the attributes file //
        ///////////////////////////////
        let mut writer = BufWriter::new(File::create(sibling_file(&self.file_name, "dbf"))?);
        self.write_dbf(&mut writer)?;
        writer.flush()
    }

    fn write_main_header<W: Write>(&self, writer: &mut W, file_length: i32) -> Result<(), Error> {
        // magic number
        writer.write_i32::<BigEndian>(9994i32)?;
        // unused header bytes
        for _ in 0..5 {
            writer.write_i32::<BigEndian>(0i32)?;
        }
        writer.write_i32::<BigEndian>(file_length)?;
        writer.write_i32::<LittleEndian>(1000i32)?;
        writer.write_i32::<LittleEndian>(self.header.shape_type.to_int())?;
        writer.write_f64::<LittleEndian>(self.header.x_min)?;
        writer.write_f64::<LittleEndian>(self.header.y_min)?;
        writer.write_f64::<LittleEndian>(self.header.x_max)?;
        writer.write_f64::<LittleEndian>(self.header.y_max)?;
        // z and m ranges
        for _ in 0..4 {
            writer.write_f64::<LittleEndian>(0f64)?;
        }
        Ok(())
    }

    fn write_dbf<W: Write>(&mut self, writer: &mut W) -> Result<(), Error> {
        let num_fields = self.attributes.fields.len();
        let num_records = self.attributes.get_num_records();
        self.attributes.header.version = 3;
        writer.write_u8(3u8)?;
        let now = Local::now();
        writer.write_u8((now.year() - 1900).clamp(0, 255) as u8)?;
        writer.write_u8(now.month() as u8)?;
        writer.write_u8(now.day() as u8)?;
        writer.write_u32::<LittleEndian>(num_records as u32)?;
        let header_size = 32u16 + num_fields as u16 * 32u16 + 1u16;
        self.attributes.header.bytes_in_header = header_size;
        writer.write_u16::<LittleEndian>(header_size)?;
        let bytes_in_record = 1u16
            + self
                .attributes
                .fields
                .iter()
                .map(|f| f.field_length as u16)
                .sum::<u16>();
        self.attributes.header.bytes_in_record = bytes_in_record;
        writer.write_u16::<LittleEndian>(bytes_in_record)?;
        // reserved or unused bytes
        writer.write_all(&[0u8; 20])?;

        // Field descriptor array
        for field in &self.attributes.fields {
            let mut name: Vec<u8> = field.name.bytes().take(10).collect();
            name.resize(11, 0u8);
            writer.write_all(&name)?;
            writer.write_u8(field.field_type as u8)?;
            writer.write_all(&[0u8; 4])?;
            writer.write_u8(field.field_length)?;
            writer.write_u8(field.decimal_count)?;
            writer.write_all(&[0u8; 14])?;
        }
        writer.write_u8(0x0D)?; // terminator byte

        for i in 0..num_records {
            if self.attributes.is_deleted.get(i).copied().unwrap_or(false) {
                writer.write_u8(0x2A)?;
            } else {
                writer.write_u8(0x20)?;
            }
            let rec = self.attributes.get_record(i);
            for (j, field) in self.attributes.fields.iter().enumerate() {
                let value = rec.get(j).unwrap_or(&FieldData::Null);
                writer.write_all(&format_field_value(field, value))?;
            }
        }
        writer.write_u8(0x1A)?; // file terminator byte
        Ok(())
    }

    fn calculate_extent(&mut self) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for rec in &self.records {
            for p in &rec.points {
                x_min = x_min.min(p.x);
                x_max = x_max.max(p.x);
                y_min = y_min.min(p.y);
                y_max = y_max.max(p.y);
            }
        }
        if x_min > x_max {
            // no coordinates at all
            x_min = 0f64;
            x_max = 0f64;
            y_min = 0f64;
            y_max = 0f64;
        }
        self.header.x_min = x_min;
        self.header.x_max = x_max;
        self.header.y_min = y_min;
        self.header.y_max = y_max;
    }
}

fn parse_field_value(field: &AttributeField, str_rep: &str) -> FieldData {
    if str_rep.replace(['*', '?', ' '], "").is_empty() {
        return FieldData::Null;
    }
    match field.get_data_type() {
        FieldDataType::Int => match str_rep.parse::<i32>() {
            Ok(v) => FieldData::Int(v),
            Err(_) => match str_rep.parse::<i64>() {
                Ok(v) => FieldData::Int64(v),
                Err(_) => str_rep
                    .parse::<f64>()
                    .map(FieldData::Real)
                    .unwrap_or(FieldData::Null),
            },
        },
        FieldDataType::Real => str_rep
            .parse::<f64>()
            .map(FieldData::Real)
            .unwrap_or(FieldData::Null),
        FieldDataType::Date => {
            if str_rep.len() == 8 && str_rep.is_ascii() {
                FieldData::Date(DateData {
                    year: str_rep[0..4].parse::<u16>().unwrap_or(0),
                    month: str_rep[4..6].parse::<u8>().unwrap_or(0),
                    day: str_rep[6..8].parse::<u8>().unwrap_or(0),
                })
            } else {
                FieldData::Null
            }
        }
        FieldDataType::Bool => {
            FieldData::Bool(matches!(str_rep.chars().next(), Some('T' | 't' | 'Y' | 'y')))
        }
        FieldDataType::Text => FieldData::Text(str_rep.to_string()),
    }
}

/// Renders a value into exactly `field_length` bytes. Numbers are right
/// aligned and text is left aligned; over-long values are truncated.
fn format_field_value(field: &AttributeField, value: &FieldData) -> Vec<u8> {
    let fl = field.field_length as usize;
    let numeric = matches!(field.field_type, 'N' | 'F' | 'I' | 'O');
    let s = match value {
        FieldData::Null => String::new(),
        FieldData::Real(v) if numeric => format!("{:.*}", field.decimal_count as usize, v),
        FieldData::Int(v) if numeric && field.decimal_count > 0 => {
            format!("{:.*}", field.decimal_count as usize, *v as f64)
        }
        FieldData::Int64(v) if numeric && field.decimal_count > 0 => {
            format!("{:.*}", field.decimal_count as usize, *v as f64)
        }
        FieldData::Bool(v) => {
            if *v {
                "T".to_string()
            } else {
                "F".to_string()
            }
        }
        other => other.get_as_string(),
    };
    let mut bytes: Vec<u8> = if s.len() > fl {
        let mut end = fl;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        s.as_bytes()[..end].to_vec()
    } else {
        s.into_bytes()
    };
    let pad = fl - bytes.len();
    if numeric {
        let mut out = vec![b' '; pad];
        out.append(&mut bytes);
        out
    } else {
        bytes.extend(std::iter::repeat(b' ').take(pad));
        bytes
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::env;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2D> {
        // clockwise, closed
        vec![
            Point2D::new(x0, y0),
            Point2D::new(x0, y0 + size),
            Point2D::new(x0 + size, y0 + size),
            Point2D::new(x0 + size, y0),
            Point2D::new(x0, y0),
        ]
    }

    #[test]
    fn test_polygon_shapefile_write_then_read() {
        let dir = env::temp_dir().join("seamless_vector_shapefile_test");
        fs::create_dir_all(&dir).unwrap();
        let file_name = dir.join("squares.shp").to_string_lossy().to_string();

        let mut sf = Shapefile::new(&file_name, ShapeType::Polygon).unwrap();
        sf.projection = "PROJCS[\"test\"]".to_string();
        sf.attributes
            .add_field(&AttributeField::new("OID_ORIG", FieldDataType::Int, 18, 0));
        sf.attributes
            .add_field(&AttributeField::new("NAME", FieldDataType::Text, 12, 0));
        sf.attributes
            .add_field(&AttributeField::new("AREA", FieldDataType::Real, 14, 3));

        let mut g1 = ShapefileGeometry::new(ShapeType::Polygon);
        g1.add_part(&square(0.0, 0.0, 2.0));
        sf.add_record(g1).unwrap();
        sf.attributes.add_record(
            vec![
                FieldData::Int64(5_000_000_000),
                FieldData::Text("first".to_string()),
                FieldData::Real(4.0),
            ],
            false,
        );
        let mut g2 = ShapefileGeometry::new(ShapeType::Polygon);
        g2.add_part(&square(5.0, 5.0, 1.0));
        sf.add_record(g2).unwrap();
        sf.attributes.add_record(
            vec![FieldData::Int(2), FieldData::Null, FieldData::Real(1.25)],
            false,
        );
        sf.write().unwrap();

        let input = Shapefile::read(&file_name).unwrap();
        assert_eq!(input.num_records, 2);
        assert_eq!(input.header.shape_type, ShapeType::Polygon);
        assert_eq!(input.header.x_max, 6.0);
        assert_eq!(input.projection, "PROJCS[\"test\"]");
        assert_eq!(input.get_record(1).unwrap().points, square(5.0, 5.0, 1.0));
        assert_eq!(input.attributes.get_value(0, 0), FieldData::Int64(5_000_000_000));
        assert_eq!(input.attributes.get_value(1, 0), FieldData::Int(2));
        assert_eq!(
            input.attributes.get_value(0, 1),
            FieldData::Text("first".to_string())
        );
        assert!(input.attributes.get_value(1, 1).is_null());
        assert_eq!(input.attributes.get_value(1, 2), FieldData::Real(1.25));
        assert_eq!(input.get_short_filename(), "squares");
    }

    #[test]
    fn test_read_only_file_rejects_records() {
        let mut sf = Shapefile {
            file_mode: "r".to_string(),
            ..Default::default()
        };
        assert!(sf.add_point_record(1.0, 2.0).is_err());
        let mut pts = Shapefile::new("points", ShapeType::Point).unwrap();
        assert_eq!(pts.file_name, "points.shp");
        assert!(pts.add_point_record(1.0, 2.0).is_ok());
        assert!(pts.add_record(ShapefileGeometry::new(ShapeType::Polygon)).is_err());
    }

    #[test]
    fn test_format_field_value() {
        let f = AttributeField::new("V", FieldDataType::Real, 8, 2);
        assert_eq!(format_field_value(&f, &FieldData::Real(3.14159)), b"    3.14");
        let t = AttributeField::new("T", FieldDataType::Text, 4, 0);
        assert_eq!(format_field_value(&t, &FieldData::Text("abcdef".to_string())), b"abcd");
        assert_eq!(format_field_value(&t, &FieldData::Null), b"    ");
    }
}
