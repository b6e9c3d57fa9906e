//! Gridline helpers for geographic axes
//!
//! Projection math is out of scope; these functions only decide where
//! longitude/latitude gridlines sit and how their labels read.

/// Wrap a longitude into the half-open range (-180, 180]
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Longitude gridlines every `step` degrees from `lon0 - 180` up to (but not
/// including) `lon0 + 180`
pub fn longitude_gridlines(lon0: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) {
        return Vec::new();
    }
    let start = lon0 - 180.0;
    let count = (360.0 / step).ceil() as usize;
    (0..count)
        .map(|i| start + step * i as f64)
        .filter(|lon| *lon < lon0 + 180.0)
        .collect()
}

/// Latitude gridlines between `-latmax` and `latmax`, symmetric about the
/// equator
pub fn latitude_gridlines(step: f64, latmax: f64) -> Vec<f64> {
    if !(step > 0.0) || !(latmax > 0.0) {
        return Vec::new();
    }
    let mut north: Vec<f64> = (0..)
        .map(|i| step * i as f64)
        .take_while(|lat| *lat < latmax)
        .collect();
    north.push(latmax);
    let mut lines: Vec<f64> = north.iter().skip(1).rev().map(|lat| -lat).collect();
    lines.extend(north);
    lines
}

/// Label text for a longitude gridline, always within (180W, 180E]
pub fn format_longitude(lon: f64) -> String {
    let lon = wrap_longitude(lon);
    let magnitude = trim_degrees(lon.abs());
    if lon.abs() < 1e-9 || (lon - 180.0).abs() < 1e-9 {
        format!("{}°", magnitude)
    } else if lon > 0.0 {
        format!("{}°E", magnitude)
    } else {
        format!("{}°W", magnitude)
    }
}

/// Label text for a latitude gridline
pub fn format_latitude(lat: f64) -> String {
    let magnitude = trim_degrees(lat.abs());
    if lat.abs() < 1e-9 {
        "0°".to_string()
    } else if lat > 0.0 {
        format!("{}°N", magnitude)
    } else {
        format!("{}°S", magnitude)
    }
}

fn trim_degrees(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_longitude_range() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-180.0), 180.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(540.0), 180.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
    }

    #[test]
    fn test_longitude_gridlines_centered_on_lon0() {
        let lines = longitude_gridlines(0.0, 90.0);
        assert_eq!(lines, vec![-180.0, -90.0, 0.0, 90.0]);
        let shifted = longitude_gridlines(180.0, 120.0);
        assert_eq!(shifted, vec![0.0, 120.0, 240.0]);
    }

    #[test]
    fn test_latitude_gridlines_symmetric() {
        let lines = latitude_gridlines(30.0, 80.0);
        assert_eq!(lines, vec![-80.0, -60.0, -30.0, 0.0, 30.0, 60.0, 80.0]);
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(format_longitude(240.0), "120°W");
        assert_eq!(format_longitude(-180.0), "180°");
        assert_eq!(format_longitude(45.5), "45.5°E");
        assert_eq!(format_latitude(-30.0), "30°S");
        assert_eq!(format_latitude(0.0), "0°");
    }
}
