//! Progress-line annotation.
//!
//! FFmpeg's stderr carries lines like
//! `frame=  120 fps= 60 ... time=00:00:04.80 bitrate= ...`. When the total
//! source duration is known, the `time=` marker is turned into a percentage
//! prefix; otherwise lines pass through untouched.

/// Annotate one diagnostic line with a `Progress: N% - ` prefix.
///
/// Pure and infallible: if the line carries no `time=HH:MM:SS.frac` marker,
/// the timestamp is malformed, or `known_duration` is absent or non-positive,
/// the line is returned unchanged.
pub fn annotate_line(line: &str, known_duration: Option<f64>) -> String {
    let duration = match known_duration {
        Some(d) if d > 0.0 => d,
        _ => return line.to_string(),
    };

    match extract_elapsed_secs(line) {
        Some(elapsed) => {
            let percent = (((elapsed / duration) * 100.0).floor() as i64).clamp(0, 100);
            format!("Progress: {}% - {}", percent, line)
        }
        None => line.to_string(),
    }
}

/// Find a `time=HH:MM:SS.frac` marker and convert it to elapsed seconds.
fn extract_elapsed_secs(line: &str) -> Option<f64> {
    let idx = line.find("time=")?;
    let token = line[idx + "time=".len()..]
        .split_whitespace()
        .next()?;
    parse_timestamp(token)
}

/// Parse `HH:MM:SS.frac` (fraction optional) into seconds.
fn parse_timestamp(ts: &str) -> Option<f64> {
    let mut parts = ts.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if hours < 0.0 || minutes < 0.0 || seconds < 0.0 {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        "frame=   48 fps= 24 q=-0.0 size=     256kB time=00:00:04.80 bitrate= 436.9kbits/s";

    #[test]
    fn test_percentage_prefix_with_known_duration() {
        let annotated = annotate_line(SAMPLE, Some(10.0));
        assert_eq!(annotated, format!("Progress: 48% - {}", SAMPLE));
    }

    #[test]
    fn test_percentage_is_floored() {
        // 4.8 / 9.7 = 49.48...% -> 49
        let annotated = annotate_line(SAMPLE, Some(9.7));
        assert!(annotated.starts_with("Progress: 49% - "));
    }

    #[test]
    fn test_percentage_clamped_at_100() {
        let line = "size= 1024kB time=00:01:00.00 bitrate= 139.8kbits/s";
        let annotated = annotate_line(line, Some(30.0));
        assert!(annotated.starts_with("Progress: 100% - "));
    }

    #[test]
    fn test_elapsed_equal_to_duration_is_exactly_100() {
        let line = "time=00:00:10.00";
        assert_eq!(annotate_line(line, Some(10.0)), format!("Progress: 100% - {}", line));
    }

    #[test]
    fn test_identity_without_time_marker() {
        let line = "Stream #0:0: Video: h264, yuv420p, 1280x720";
        assert_eq!(annotate_line(line, Some(10.0)), line);
    }

    #[test]
    fn test_identity_without_known_duration() {
        assert_eq!(annotate_line(SAMPLE, None), SAMPLE);
        assert_eq!(annotate_line(SAMPLE, Some(0.0)), SAMPLE);
    }

    #[test]
    fn test_identity_on_malformed_timestamp() {
        let line = "time=N/A bitrate=N/A speed=N/A";
        assert_eq!(annotate_line(line, Some(10.0)), line);
        let line = "time=12.5 something";
        assert_eq!(annotate_line(line, Some(10.0)), line);
    }

    #[test]
    fn test_hours_and_minutes_contribute_to_elapsed() {
        // 1:02:03 = 3723s of a 7446s source -> 50%
        let line = "time=01:02:03.00";
        assert_eq!(
            annotate_line(line, Some(7446.0)),
            format!("Progress: 50% - {}", line)
        );
    }

    #[test]
    fn test_timestamp_without_fraction() {
        assert_eq!(parse_timestamp("00:00:05"), Some(5.0));
        assert_eq!(parse_timestamp("00:01:05.5"), Some(65.5));
        assert_eq!(parse_timestamp("00:00"), None);
        assert_eq!(parse_timestamp("0:0:0:0"), None);
    }
}
