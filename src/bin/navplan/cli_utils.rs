use bevy::math::DVec3;
use spherenav::errors::{NavError, NavResult};
use spherenav::terrain::coordinates::LatLon;
use spherenav::terrain_generation::SurfaceFeature;

/// Generic parser for delimited numeric lists
pub fn parse_delimited<const N: usize>(
    input: &str,
    delimiter: char,
    type_name: &str,
) -> NavResult<[f64; N]> {
    let parts: Vec<&str> = input.split(delimiter).map(str::trim).collect();
    if parts.len() != N {
        return Err(NavError::InvalidArgument {
            reason: format!(
                "Invalid {type_name} format '{input}'. Expected {N} {delimiter}-separated values"
            ),
        });
    }

    let mut result = [0.0; N];
    for (i, part) in parts.iter().enumerate() {
        result[i] = part.parse().map_err(|_| NavError::InvalidArgument {
            reason: format!("Invalid {type_name} value: '{part}'"),
        })?;
    }

    Ok(result)
}

/// Parse "LAT,LON" in degrees
pub fn parse_lat_lon(input: &str) -> NavResult<LatLon> {
    let [lat, lon] = parse_delimited::<2>(input, ',', "lat,lon")?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(NavError::InvalidArgument {
            reason: format!("Latitude {lat} is outside [-90, 90]"),
        });
    }
    Ok(LatLon::new(lat, lon))
}

/// Parse "MIN,MAX" rock radius range
pub fn parse_radius_range(input: &str) -> NavResult<(f64, f64)> {
    let [min, max] = parse_delimited::<2>(input, ',', "radius range")?;

    if min <= 0.0 || max <= 0.0 {
        return Err(NavError::InvalidArgument {
            reason: "Radius values must be positive".to_string(),
        });
    }

    if min > max {
        return Err(NavError::InvalidArgument {
            reason: "Minimum radius must be less than or equal to maximum radius".to_string(),
        });
    }

    Ok((min, max))
}

/// Parse "LAT,LON,RADIUS_DEG,DEPTH" into a basin feature
pub fn parse_lake(input: &str) -> NavResult<SurfaceFeature> {
    let [lat, lon, radius_deg, depth] = parse_delimited::<4>(input, ',', "lake")?;
    if radius_deg <= 0.0 || depth <= 0.0 {
        return Err(NavError::InvalidArgument {
            reason: "Lake radius and depth must be positive".to_string(),
        });
    }
    Ok(SurfaceFeature::basin(
        LatLon::new(lat, lon).to_direction(),
        radius_deg.to_radians(),
        depth,
    ))
}

pub fn format_position(position: DVec3) -> String {
    let coords = LatLon::from_direction(position);
    format!(
        "({:.3}, {:.3}) r={:.2}",
        coords.lat,
        coords.lon,
        position.length()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lon() {
        assert_eq!(parse_lat_lon("10.5,-20").unwrap(), LatLon::new(10.5, -20.0));
        assert_eq!(parse_lat_lon(" 0 , 0 ").unwrap(), LatLon::new(0.0, 0.0));

        assert!(parse_lat_lon("10").is_err());
        assert!(parse_lat_lon("abc,def").is_err());
        assert!(parse_lat_lon("95,0").is_err());
    }

    #[test]
    fn test_parse_radius_range() {
        assert_eq!(parse_radius_range("0.5,2.0").unwrap(), (0.5, 2.0));
        assert_eq!(parse_radius_range("1,1").unwrap(), (1.0, 1.0));

        assert!(parse_radius_range("0.8").is_err());
        assert!(parse_radius_range("0.0,1.2").is_err());
        assert!(parse_radius_range("1.2,0.8").is_err());
    }

    #[test]
    fn test_parse_lake() {
        let lake = parse_lake("0,0,10,4").unwrap();
        assert!(lake.center.distance(DVec3::X) < 1e-12);
        assert!((lake.angular_radius - 10f64.to_radians()).abs() < 1e-12);
        assert_eq!(lake.height, -4.0);

        assert!(parse_lake("0,0,10").is_err());
        assert!(parse_lake("0,0,-1,4").is_err());
    }

    #[test]
    fn test_format_position() {
        let text = format_position(DVec3::Y * 50.0);
        assert!(text.starts_with("(90.000"));
        assert!(text.ends_with("r=50.00"));
    }
}
