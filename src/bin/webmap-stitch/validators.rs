use webmap_stitch::{GeoPoint, Provider};

pub fn is_numeric_min(min: usize) -> impl Fn(String) -> Result<(), String> {
    move |v: String| {
        let val = v
            .parse::<usize>()
            .map_err(|_| "must be numeric".to_owned())?;

        if val < min {
            return Err(format!("must be >= {}", min));
        }

        Ok(())
    }
}

pub fn is_latitude(v: String) -> Result<(), String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if val <= -90f64 || val >= 90f64 {
        return Err("must be between -90° and 90°".to_owned());
    }

    Ok(())
}

pub fn is_longitude(v: String) -> Result<(), String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if val < -180f64 {
        return Err("must be >= -180°".to_owned());
    } else if val > 180f64 {
        return Err("must be <= 180°".to_owned());
    }

    Ok(())
}

pub fn is_provider(v: String) -> Result<(), String> {
    v.parse::<Provider>().map(|_| ()).map_err(str::to_owned)
}

pub fn is_size(v: String) -> Result<(), String> {
    parse_size(&v).map(|_| ())
}

pub fn is_point(v: String) -> Result<(), String> {
    parse_point(&v).map(|_| ())
}

pub fn is_path(v: String) -> Result<(), String> {
    parse_path(&v).map(|_| ())
}

/// `WIDTHxHEIGHT`, e.g. `640x480`.
pub fn parse_size(v: &str) -> Result<(u32, u32), String> {
    let (w, h) = v
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| "must look like 640x480".to_owned())?;
    let parse = |s: &str| s.trim().parse::<u32>().map_err(|_| "must look like 640x480".to_owned());

    Ok((parse(w)?, parse(h)?))
}

/// `LAT,LON`, e.g. `50.77,6.08`.
pub fn parse_point(v: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = v
        .split_once(',')
        .ok_or_else(|| "must look like LAT,LON".to_owned())?;
    let parse = |s: &str| s.trim().parse::<f64>().map_err(|_| "must look like LAT,LON".to_owned());

    Ok(GeoPoint::new(parse(lat)?, parse(lon)?))
}

/// Points separated by `;`, e.g. `50.77,6.08;50.78,6.1`.
pub fn parse_path(v: &str) -> Result<Vec<GeoPoint>, String> {
    let points = v.split(';').map(parse_point).collect::<Result<Vec<_>, _>>()?;

    if points.len() < 2 {
        return Err("a path needs at least two points".to_owned());
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(parse_size("640x480"), Ok((640, 480)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("ax480").is_err());
    }

    #[test]
    fn points_and_paths() {
        assert_eq!(parse_point("50.77, 6.08"), Ok(GeoPoint::new(50.77, 6.08)));
        assert_eq!(
            parse_path("1,2;3,4"),
            Ok(vec![GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0)])
        );
        assert!(parse_path("1,2").is_err());
        assert!(is_point("north".to_owned()).is_err());
    }

    #[test]
    fn coordinates() {
        assert!(is_latitude("85".to_owned()).is_ok());
        assert!(is_latitude("90".to_owned()).is_err());
        assert!(is_longitude("-180".to_owned()).is_ok());
        assert!(is_longitude("180.5".to_owned()).is_err());
        assert!(is_numeric_min(1)("0".to_owned()).is_err());
    }
}
