// 📍 Coordinate Parser
// Free-form "lat,lon" strings → numeric pair

/// Parse a coordinate string into `(lat, lon)`.
///
/// Accepted encodings:
/// - `"33.8968768°, 130.8413181°"` (degree signs)
/// - `"geo:33.8968768,130.8413181"` (geo URI prefix)
/// - `"33.8968768, 130.8413181"` (plain)
///
/// Never fails loudly: wrong segment count or a non-numeric token gives `None`.
pub fn parse_coordinate_pair(text: &str) -> Option<(f64, f64)> {
    if text.is_empty() {
        return None;
    }

    let cleaned = text.replace('°', "").replace("geo:", "");
    let parts: Vec<&str> = cleaned.trim().split(',').map(str::trim).collect();

    if parts.len() != 2 {
        return None;
    }

    let lat = parts[0].parse::<f64>().ok()?;
    let lon = parts[1].parse::<f64>().ok()?;
    Some((lat, lon))
}

// ============================================================================
// TESTS
// ============================================================================
