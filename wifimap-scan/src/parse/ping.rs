/// Summary of a `ping` run. Fields the output didn't carry stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PingStats {
    pub loss_pct: Option<f64>,
    pub avg_ms: Option<f64>,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
    pub jitter_ms: Option<f64>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn number_before(text: &str, end: usize) -> Option<f64> {
    let head = text[..end].trim_end();
    let start = head
        .rfind(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map(|i| i + 1)
        .unwrap_or(0);
    head[start..].parse().ok()
}

fn packet_loss(output: &str) -> Option<f64> {
    output
        .lines()
        .find_map(|line| {
            let at = line.find("% packet loss")?;
            number_before(line, at)
        })
        .or_else(|| {
            // Windows: "Lost = 0 (0% loss)"
            output.lines().find_map(|line| {
                let at = line.find("% loss")?;
                number_before(line, at)
            })
        })
}

/// `round-trip min/avg/max/stddev = 1.1/2.2/3.3/0.4 ms` (BSD) or
/// `rtt min/avg/max/mdev = ...` (iputils)
fn unix_rtt(output: &str) -> Option<(f64, f64, f64)> {
    let line = output
        .lines()
        .find(|line| line.contains("round-trip") || line.trim_start().starts_with("rtt"))?;
    let (_, values) = line.split_once('=')?;
    let values = values.trim().trim_end_matches("ms").trim();

    let mut parts = values.split('/').map(|v| v.trim().parse::<f64>());
    let min = parts.next()?.ok()?;
    let avg = parts.next()?.ok()?;
    let max = parts.next()?.ok()?;
    Some((min, avg, max))
}

fn windows_field(line: &str, key: &str) -> Option<f64> {
    let at = line.find(key)?;
    let rest = line[at + key.len()..].trim_start().strip_prefix('=')?.trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
    digits.parse().ok()
}

/// `Minimum = 1ms, Maximum = 4ms, Average = 2ms`
fn windows_rtt(output: &str) -> Option<(f64, f64, f64)> {
    output.lines().find_map(|line| {
        Some((
            windows_field(line, "Minimum")?,
            windows_field(line, "Average")?,
            windows_field(line, "Maximum")?,
        ))
    })
}

/// Parses the summary printed at the end of a `ping` run
pub fn parse_ping(output: &str) -> PingStats {
    if output.trim().is_empty() {
        log::warn!("No ping output, metrics unavailable");
        return PingStats::default();
    }

    let loss = packet_loss(output).filter(|v| v.is_finite());
    let rtt = unix_rtt(output).or_else(|| windows_rtt(output));

    match (loss.is_some(), rtt.is_some()) {
        (false, false) => {
            log::error!("Could not parse packet loss or round-trip times from ping output")
        }
        (false, true) => log::warn!("Could not parse packet loss from ping output"),
        (true, false) => log::warn!("Could not parse round-trip times from ping output"),
        (true, true) => {}
    }

    let Some((min, avg, max)) = rtt else {
        return PingStats {
            loss_pct: loss,
            ..PingStats::default()
        };
    };

    PingStats {
        loss_pct: loss,
        avg_ms: Some(round1(avg)),
        min_ms: Some(round1(min)),
        max_ms: Some(round1(max)),
        jitter_ms: Some(round1(max - min)),
    }
}
