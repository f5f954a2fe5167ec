//! Points sparkline widget for recent gameweek scores

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different score levels (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Score drawn as a full block; hauls above it are clamped
pub const DEFAULT_MAX_SCORE: f64 = 15.0;

/// A sparkline widget showing gameweek points, oldest first
pub struct ScoreSparkline<'a> {
    /// Points for each gameweek
    scores: &'a [i32],
    /// Score for normalization
    max_score: f64,
    /// Index drawn with the marker style
    highlight: Option<usize>,
    /// Style for the sparkline
    style: Style,
    /// Style for the highlighted gameweek
    marker_style: Style,
}

impl<'a> ScoreSparkline<'a> {
    pub fn new(scores: &'a [i32]) -> Self {
        Self {
            scores,
            max_score: DEFAULT_MAX_SCORE,
            highlight: None,
            style: Style::default().fg(Color::Cyan),
            marker_style: Style::default().fg(Color::Yellow),
        }
    }

    pub fn max_score(mut self, max_score: f64) -> Self {
        self.max_score = max_score;
        self
    }

    /// Highlights the best score of the run
    pub fn highlight_best(mut self) -> Self {
        self.highlight = self
            .scores
            .iter()
            .enumerate()
            .max_by_key(|(_, score)| **score)
            .map(|(i, _)| i);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn score_to_block(&self, score: i32) -> char {
        if self.max_score <= 0.0 {
            return BLOCKS[0];
        }
        let normalized = (score as f64 / self.max_score).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for ScoreSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;

        for (i, score) in self.scores.iter().take(width).enumerate() {
            let block = self.score_to_block(*score);
            let x = area.x + i as u16;
            let y = area.y;

            let style = if self.highlight == Some(i) {
                self.marker_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(block).set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_to_block_blank() {
        let sparkline = ScoreSparkline::new(&[]);
        assert_eq!(sparkline.score_to_block(0), '▁');
    }

    #[test]
    fn test_score_to_block_haul() {
        let sparkline = ScoreSparkline::new(&[]);
        assert_eq!(sparkline.score_to_block(15), '█');
        assert_eq!(sparkline.score_to_block(24), '█');
    }

    #[test]
    fn test_negative_score_clamps() {
        let sparkline = ScoreSparkline::new(&[]);
        // Red cards and own goals can take a score below zero
        assert_eq!(sparkline.score_to_block(-2), '▁');
    }

    #[test]
    fn test_zero_max_does_not_divide() {
        let sparkline = ScoreSparkline::new(&[]).max_score(0.0);
        assert_eq!(sparkline.score_to_block(5), '▁');
    }

    #[test]
    fn test_highlight_best() {
        let scores = [2, 13, 6, 1];
        let sparkline = ScoreSparkline::new(&scores).highlight_best();
        assert_eq!(sparkline.highlight, Some(1));
    }

    #[test]
    fn test_render_writes_one_cell_per_score() {
        let scores = [0, 15, 8];
        let area = Rect::new(0, 0, 5, 1);
        let mut buf = Buffer::empty(area);
        ScoreSparkline::new(&scores).render(area, &mut buf);

        let line: String = (0..5).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(line, "▁█▅  ");
    }
}
