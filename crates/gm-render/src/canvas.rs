use gm_core::frame::GlyphGrid;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

/// Terminal color for an RGB triple. Pure black keeps the terminal background.
#[must_use]
pub fn to_color(rgb: [u8; 3]) -> Color {
    if rgb == [0, 0, 0] {
        Color::Reset
    } else {
        Color::Rgb(rgb[0], rgb[1], rgb[2])
    }
}

/// Writes a `GlyphGrid` straight into a `ratatui::Buffer`.
///
/// No ratatui Canvas widget: direct writes, clipped to `area`.
///
/// # Example
/// ```
/// use gm_core::frame::GlyphGrid;
/// use gm_render::canvas::render_grid;
/// use ratatui::buffer::Buffer;
/// use ratatui::layout::Rect;
///
/// let mut grid = GlyphGrid::new(3, 1);
/// grid.set(1, 0, '#');
/// let area = Rect::new(0, 0, 3, 1);
/// let mut buf = Buffer::empty(area);
/// render_grid(&mut buf, area, &grid, [255, 255, 255], [0, 0, 0]);
/// assert_eq!(buf[(1, 0)].symbol(), "#");
/// ```
pub fn render_grid(buf: &mut Buffer, area: Rect, grid: &GlyphGrid, fg: [u8; 3], bg: [u8; 3]) {
    let (fg, bg) = (to_color(fg), to_color(bg));
    if grid.width > area.width || grid.height > area.height {
        log::trace!(
            "Grille {}×{} tronquée à {}×{}",
            grid.width,
            grid.height,
            area.width,
            area.height
        );
    }
    for cy in 0..grid.height.min(area.height) {
        for cx in 0..grid.width.min(area.width) {
            if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                cell.set_char(grid.get(cx, cy)).set_fg(fg).set_bg(bg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_clipped_to_area() {
        let mut grid = GlyphGrid::new(6, 3);
        grid.cells.fill('@');
        let full = Rect::new(0, 0, 8, 4);
        let mut buf = Buffer::empty(full);
        render_grid(&mut buf, Rect::new(2, 1, 3, 2), &grid, [200, 100, 50], [0, 0, 0]);
        assert_eq!(buf[(2, 1)].symbol(), "@");
        assert_eq!(buf[(4, 2)].symbol(), "@");
        assert_eq!(buf[(5, 1)].symbol(), " ");
        assert_eq!(buf[(2, 3)].symbol(), " ");
        assert_eq!(buf[(3, 2)].fg, Color::Rgb(200, 100, 50));
        assert_eq!(buf[(3, 2)].bg, Color::Reset);
    }

    #[test]
    fn colored_background_is_applied() {
        let grid = GlyphGrid::new(1, 1);
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        render_grid(&mut buf, area, &grid, [1, 2, 3], [4, 5, 6]);
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(4, 5, 6));
    }
}
