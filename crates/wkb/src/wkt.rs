use crate::{
    codec::MAX_NESTING,
    error::{Result, WkbError},
    geometry::{Coord, Dimension, Geometry, Shape},
};
use pest::{Parser, iterators::Pair};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar/wkt.pest"]
pub struct WktParser;

impl Geometry {
    /// Parses well-known text. Untagged coordinates with 3 or 4 ordinates are
    /// read as XYZ and XYZM.
    pub fn from_wkt(text: &str) -> Result<Self> {
        let mut pairs = WktParser::parse(Rule::geometry_text, text)
            .map_err(|e| WkbError::Wkt(e.to_string()))?;
        let geometry = pairs
            .next()
            .and_then(|text| text.into_inner().next())
            .ok_or_else(|| WkbError::Wkt("empty input".to_string()))?;
        build_geometry(geometry, 0)
    }

    pub fn to_wkt(&self) -> String {
        let mut out = String::new();
        write_geometry(self, &mut out);
        out
    }
}

/// Tracks the dimension of a geometry while its coordinates are read.
struct DimensionResolver {
    tagged: Option<Dimension>,
    inferred: Option<Dimension>,
}

impl DimensionResolver {
    fn new(tagged: Option<Dimension>) -> Self {
        Self {
            tagged,
            inferred: None,
        }
    }

    fn dimension(&self) -> Dimension {
        self.tagged.or(self.inferred).unwrap_or_default()
    }

    fn coord(&mut self, pair: Pair<Rule>) -> Result<Coord> {
        let values = pair
            .into_inner()
            .map(|n| {
                n.as_str()
                    .parse::<f64>()
                    .map_err(|_| WkbError::Wkt(format!("invalid number '{}'", n.as_str())))
            })
            .collect::<Result<Vec<f64>>>()?;

        let dimension = match (self.tagged, self.inferred) {
            (Some(dimension), _) | (None, Some(dimension)) => dimension,
            (None, None) => {
                let dimension = match values.len() {
                    3 => Dimension::Xyz,
                    4 => Dimension::Xyzm,
                    _ => Dimension::Xy,
                };
                self.inferred = Some(dimension);
                dimension
            }
        };
        if values.len() != dimension.ordinates() {
            return Err(WkbError::Wkt(format!(
                "expected {} ordinates, found {}",
                dimension.ordinates(),
                values.len()
            )));
        }

        let mut coord = Coord::xy(values[0], values[1]);
        let mut next = 2;
        if dimension.has_z() {
            coord.z = values[next];
            next += 1;
        }
        if dimension.has_m() {
            coord.m = values[next];
        }
        Ok(coord)
    }

    fn coord_list(&mut self, pair: Pair<Rule>) -> Result<Vec<Coord>> {
        pair.into_inner().map(|c| self.coord(c)).collect()
    }

    fn ring_list(&mut self, pair: Pair<Rule>) -> Result<Vec<Vec<Coord>>> {
        pair.into_inner().map(|r| self.coord_list(r)).collect()
    }
}

fn parse_dim(text: &str) -> Dimension {
    match text.to_ascii_uppercase().as_str() {
        "ZM" => Dimension::Xyzm,
        "Z" => Dimension::Xyz,
        "M" => Dimension::Xym,
        _ => Dimension::Xy,
    }
}

fn build_geometry(pair: Pair<Rule>, depth: usize) -> Result<Geometry> {
    if depth >= MAX_NESTING {
        return Err(WkbError::TooDeep(MAX_NESTING));
    }
    let kind = pair
        .into_inner()
        .next()
        .ok_or_else(|| WkbError::Wkt("missing geometry body".to_string()))?;
    let rule = kind.as_rule();

    let mut tagged = None;
    let mut body = Vec::new();
    for part in kind.into_inner() {
        match part.as_rule() {
            Rule::dim => tagged = Some(parse_dim(part.as_str())),
            Rule::empty => {}
            _ => body.push(part),
        }
    }

    let mut resolver = DimensionResolver::new(tagged);
    let shape = match rule {
        Rule::point => {
            let coord = body
                .into_iter()
                .next()
                .map(|c| resolver.coord(c))
                .transpose()?;
            Shape::Point(coord)
        }
        Rule::linestring => {
            let coords = match body.into_iter().next() {
                Some(list) => resolver.coord_list(list)?,
                None => Vec::new(),
            };
            Shape::LineString(coords)
        }
        Rule::polygon => {
            let rings = match body.into_iter().next() {
                Some(list) => resolver.ring_list(list)?,
                None => Vec::new(),
            };
            Shape::Polygon(rings)
        }
        Rule::multipoint => {
            let mut coords = Vec::with_capacity(body.len());
            for member in body {
                let coord = member
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::coord)
                    .map(|c| resolver.coord(c))
                    .transpose()?;
                coords.push(coord);
            }
            let dimension = resolver.dimension();
            Shape::MultiPoint(
                coords
                    .into_iter()
                    .map(|c| Geometry::new(dimension, Shape::Point(c)))
                    .collect(),
            )
        }
        Rule::multilinestring => {
            let lines = body
                .into_iter()
                .map(|list| resolver.coord_list(list))
                .collect::<Result<Vec<_>>>()?;
            let dimension = resolver.dimension();
            Shape::MultiLineString(
                lines
                    .into_iter()
                    .map(|l| Geometry::new(dimension, Shape::LineString(l)))
                    .collect(),
            )
        }
        Rule::multipolygon => {
            let polygons = body
                .into_iter()
                .map(|rings| resolver.ring_list(rings))
                .collect::<Result<Vec<_>>>()?;
            let dimension = resolver.dimension();
            Shape::MultiPolygon(
                polygons
                    .into_iter()
                    .map(|p| Geometry::new(dimension, Shape::Polygon(p)))
                    .collect(),
            )
        }
        Rule::collection => {
            let members = body
                .into_iter()
                .map(|g| build_geometry(g, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            if resolver.tagged.is_none() {
                resolver.inferred = members.first().map(|g| g.dimension);
            }
            Shape::GeometryCollection(members)
        }
        other => return Err(WkbError::Wkt(format!("unexpected rule {other:?}"))),
    };

    Ok(Geometry::new(resolver.dimension(), shape))
}

fn write_geometry(geometry: &Geometry, out: &mut String) {
    out.push_str(geometry.flat_type().name());
    match (geometry.dimension.has_z(), geometry.dimension.has_m()) {
        (true, true) => out.push_str(" ZM"),
        (true, false) => out.push_str(" Z"),
        (false, true) => out.push_str(" M"),
        (false, false) => {}
    }
    if geometry.is_empty() {
        out.push_str(" EMPTY");
        return;
    }
    out.push(' ');
    write_body(geometry, out);
}

fn write_body(geometry: &Geometry, out: &mut String) {
    let dimension = geometry.dimension;
    match &geometry.shape {
        Shape::Point(Some(coord)) => {
            out.push('(');
            write_coord(coord, dimension, out);
            out.push(')');
        }
        Shape::Point(None) => out.push_str("EMPTY"),
        Shape::LineString(coords) => write_coord_list(coords, dimension, out),
        Shape::Polygon(rings) => write_ring_list(rings, dimension, out),
        Shape::MultiPoint(parts) | Shape::MultiLineString(parts) | Shape::MultiPolygon(parts) => {
            out.push('(');
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_body(part, out);
            }
            out.push(')');
        }
        Shape::GeometryCollection(parts) => {
            out.push('(');
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_geometry(part, out);
            }
            out.push(')');
        }
    }
}

fn write_coord(coord: &Coord, dimension: Dimension, out: &mut String) {
    out.push_str(&format!("{} {}", coord.x, coord.y));
    if dimension.has_z() {
        out.push_str(&format!(" {}", coord.z));
    }
    if dimension.has_m() {
        out.push_str(&format!(" {}", coord.m));
    }
}

fn write_coord_list(coords: &[Coord], dimension: Dimension, out: &mut String) {
    out.push('(');
    for (i, coord) in coords.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_coord(coord, dimension, out);
    }
    out.push(')');
}

fn write_ring_list(rings: &[Vec<Coord>], dimension: Dimension, out: &mut String) {
    out.push('(');
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_coord_list(ring, dimension, out);
    }
    out.push(')');
}
