use std::fmt::{self, Write};

use geo::LineString;

use super::icon::ICON_PATH;
use crate::layer::{Feature, FieldValue, Geometry, GeometryKind, VectorLayer};

const POINT_STYLE: &str = "point";
const POLYGON_STYLE: &str = "sector";

/// KML rendering of a layer. Field names are assumed to exist in the
/// layer's schema; missing values render empty.
///
/// Render with `to_string()`.
pub struct KmlDocument<'a> {
    pub layer: &'a VectorLayer,
    pub name_field: &'a str,
    pub description_fields: &'a [String],
}

impl fmt::Display for KmlDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(f, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#)?;
        writeln!(f, "<Document>")?;
        writeln!(f, "  <name>{}</name>", Escaped(self.layer.name()))?;

        match self.layer.kind() {
            GeometryKind::Point => {
                writeln!(f, r#"  <Style id="{}">"#, POINT_STYLE)?;
                writeln!(
                    f,
                    "    <IconStyle><scale>0.8</scale><Icon><href>{}</href></Icon></IconStyle>",
                    ICON_PATH
                )?;
                writeln!(f, "    <LabelStyle><scale>0.8</scale></LabelStyle>")?;
                writeln!(f, "  </Style>")?;
            }
            GeometryKind::Polygon => {
                writeln!(f, r#"  <Style id="{}">"#, POLYGON_STYLE)?;
                writeln!(
                    f,
                    "    <LineStyle><color>ff0055ff</color><width>1.5</width></LineStyle>"
                )?;
                writeln!(
                    f,
                    "    <PolyStyle><color>660055ff</color><fill>1</fill><outline>1</outline></PolyStyle>"
                )?;
                writeln!(f, "  </Style>")?;
            }
        }

        writeln!(f, "  <Folder>")?;
        writeln!(f, "    <name>{}</name>", Escaped(self.layer.name()))?;
        for feature in self.layer.features() {
            self.placemark(f, feature)?;
        }
        writeln!(f, "  </Folder>")?;
        writeln!(f, "</Document>")?;
        writeln!(f, "</kml>")
    }
}

impl KmlDocument<'_> {
    fn placemark(&self, f: &mut fmt::Formatter<'_>, feature: &Feature) -> fmt::Result {
        let value = |name: &str| feature.value(name).cloned().unwrap_or(FieldValue::Null);

        writeln!(f, "    <Placemark>")?;
        writeln!(
            f,
            "      <name>{}</name>",
            Escaped(&value(self.name_field).to_string())
        )?;

        let mut table = String::from("<table>");
        for field in self.description_fields {
            write!(
                table,
                "<tr><td><b>{}</b></td><td>{}</td></tr>",
                Escaped(field),
                Escaped(&value(field).to_string())
            )?;
        }
        table.push_str("</table>");
        // Escaped values cannot contain "]]>".
        writeln!(f, "      <description><![CDATA[{}]]></description>", table)?;

        let style = match feature.geometry.kind() {
            GeometryKind::Point => POINT_STYLE,
            GeometryKind::Polygon => POLYGON_STYLE,
        };
        writeln!(f, "      <styleUrl>#{}</styleUrl>", style)?;

        if !self.description_fields.is_empty() {
            writeln!(f, "      <ExtendedData>")?;
            for field in self.description_fields {
                writeln!(
                    f,
                    r#"        <Data name="{}"><value>{}</value></Data>"#,
                    Escaped(field),
                    Escaped(&value(field).to_string())
                )?;
            }
            writeln!(f, "      </ExtendedData>")?;
        }

        match &feature.geometry {
            Geometry::Point(p) => {
                writeln!(
                    f,
                    "      <Point><coordinates>{},{},0</coordinates></Point>",
                    p.x(),
                    p.y()
                )?;
            }
            Geometry::Polygon(polygon) => {
                writeln!(f, "      <Polygon>")?;
                write_ring(f, "outerBoundaryIs", polygon.exterior())?;
                for ring in polygon.interiors() {
                    write_ring(f, "innerBoundaryIs", ring)?;
                }
                writeln!(f, "      </Polygon>")?;
            }
        }
        writeln!(f, "    </Placemark>")
    }
}

fn write_ring(f: &mut fmt::Formatter<'_>, boundary: &str, ring: &LineString<f64>) -> fmt::Result {
    write!(f, "        <{}><LinearRing><coordinates>", boundary)?;
    for (i, c) in ring.coords().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{},{},0", c.x, c.y)?;
    }
    writeln!(f, "</coordinates></LinearRing></{}>", boundary)
}

/// XML/HTML text escaping.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                _ => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping() {
        assert_eq!(
            Escaped(r#"A&B <"x"> 'y'"#).to_string(),
            "A&amp;B &lt;&quot;x&quot;&gt; &apos;y&apos;"
        );
        assert_eq!(Escaped("Alcalá").to_string(), "Alcalá");
    }
}
