/// Characters from cold to hot
pub const PALETTE: &[u8] = b" .:-=+*#%@";

pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
}

fn shade(intensity: f64) -> char {
    let top = (PALETTE.len() - 1) as f64;
    let index = (intensity.clamp(0.0, 1.0) * top).round() as usize;
    PALETTE[index] as char
}

/// Draws grid cells as rows of characters, origin at the top left.
/// Positions without a cell stay blank.
pub fn render_cells(cells: &[Cell], step: f64) -> Vec<String> {
    if cells.is_empty() || !(step > 0.0) {
        return Vec::new();
    }

    let slot = |v: f64| (v / step).round().max(0.0) as usize;
    let columns = cells.iter().map(|c| slot(c.x)).max().unwrap_or(0) + 1;
    let rows = cells.iter().map(|c| slot(c.y)).max().unwrap_or(0) + 1;

    let mut grid = vec![vec![' '; columns]; rows];
    for cell in cells {
        grid[slot(cell.y)][slot(cell.x)] = shade(cell.intensity);
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}

const BAR_FLOOR_DBM: f64 = -90.0;
const BAR_CEILING_DBM: f64 = -30.0;
const BAR_WIDTH: usize = 40;

/// Horizontal signal bar, empty at -90 dBm and full at -30 dBm
pub fn signal_bar(rssi_dbm: f64) -> String {
    if !rssi_dbm.is_finite() {
        return String::new();
    }
    let t = (rssi_dbm - BAR_FLOOR_DBM) / (BAR_CEILING_DBM - BAR_FLOOR_DBM);
    let filled = (t.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled)
}
