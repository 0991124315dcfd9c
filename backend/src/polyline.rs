//! Encoded-polyline codec, 1e-5 degree precision.
//!
//! Delta-encodes each coordinate as two signed varints in 5-bit groups with
//! an ASCII-63 offset and a 0x20 continuation bit, the format route
//! providers use for leg and step geometry.

use shared::Coordinate;

pub fn encode(points: &[Coordinate]) -> String {
    let mut last_lat: i64 = 0;
    let mut last_lon: i64 = 0;
    let mut out = String::new();

    for point in points {
        let lat = (point.lat * 1e5).round() as i64;
        let lon = (point.lon * 1e5).round() as i64;

        encode_signed(lat - last_lat, &mut out);
        encode_signed(lon - last_lon, &mut out);

        last_lat = lat;
        last_lon = lon;
    }

    out
}

pub fn decode(encoded: &str) -> Vec<Coordinate> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        let Some((dlat, next)) = decode_signed(bytes, index) else {
            break;
        };
        lat += dlat;

        let Some((dlon, next)) = decode_signed(bytes, next) else {
            break;
        };
        lon += dlon;
        index = next;

        points.push(Coordinate {
            lat: lat as f64 / 1e5,
            lon: lon as f64 / 1e5,
        });
    }

    points
}

fn encode_signed(value: i64, out: &mut String) {
    let mut sgn = value << 1;
    if value < 0 {
        sgn = !sgn;
    }

    while sgn >= 0x20 {
        out.push((((0x20 | (sgn & 0x1f)) + 63) as u8) as char);
        sgn >>= 5;
    }
    out.push(((sgn + 63) as u8) as char);
}

/// Reads one signed varint starting at `index`; returns the value and the
/// index past it, or None on a truncated group.
fn decode_signed(bytes: &[u8], mut index: usize) -> Option<(i64, usize)> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let b = (*bytes.get(index)? as i64) - 63;
        index += 1;
        result |= (b & 0x1f) << shift;
        shift += 5;
        if b < 0x20 {
            break;
        }
    }

    let value = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Some((value, index))
}
