//! Sliding-window least-squares slope
//!
//! Keeps the four running sums of an ordinary linear regression over a
//! fixed-width window and slides them one sample at a time. Sums are taken
//! relative to an anchor point and rebuilt from scratch once per window
//! width of slides, which keeps accumulated rounding bounded.

/// Sliding first-degree regression over paired `x`/`y` slices
#[derive(Debug, Clone)]
pub struct SlidingRegression<'a> {
    x: &'a [f64],
    y: &'a [f64],
    width: usize,
    start: usize,
    anchor_x: f64,
    anchor_y: f64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_xy: f64,
    slides: usize,
}

impl<'a> SlidingRegression<'a> {
    /// Window of `width` samples starting at index 0
    ///
    /// Returns `None` when the slices are shorter than `width` or differ in
    /// length, or `width` is zero.
    pub fn new(x: &'a [f64], y: &'a [f64], width: usize) -> Option<Self> {
        if width == 0 || x.len() != y.len() || x.len() < width {
            return None;
        }
        let mut reg = Self {
            x,
            y,
            width,
            start: 0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            sum_x: 0.0,
            sum_y: 0.0,
            sum_xx: 0.0,
            sum_xy: 0.0,
            slides: 0,
        };
        reg.rebuild();
        Some(reg)
    }

    /// Index of the first sample in the window
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last sample in the window
    pub fn end(&self) -> usize {
        self.start + self.width
    }

    /// Least-squares slope, `None` if every `x` in the window is equal
    pub fn slope(&self) -> Option<f64> {
        let n = self.width as f64;
        let denom = n * self.sum_xx - self.sum_x * self.sum_x;
        if denom <= f64::EPSILON * n * self.sum_xx {
            return None;
        }
        Some((n * self.sum_xy - self.sum_x * self.sum_y) / denom)
    }

    /// Shift the window one sample forward; `false` at the end of the data
    pub fn advance(&mut self) -> bool {
        if self.end() >= self.x.len() {
            return false;
        }

        self.slides += 1;
        if self.slides >= self.width {
            self.start += 1;
            self.rebuild();
            return true;
        }

        let (dx, dy) = self.centered(self.start);
        self.sum_x -= dx;
        self.sum_y -= dy;
        self.sum_xx -= dx * dx;
        self.sum_xy -= dx * dy;

        let (dx, dy) = self.centered(self.end());
        self.sum_x += dx;
        self.sum_y += dy;
        self.sum_xx += dx * dx;
        self.sum_xy += dx * dy;

        self.start += 1;
        true
    }

    fn centered(&self, i: usize) -> (f64, f64) {
        (self.x[i] - self.anchor_x, self.y[i] - self.anchor_y)
    }

    fn rebuild(&mut self) {
        self.anchor_x = self.x[self.start];
        self.anchor_y = self.y[self.start];
        self.sum_x = 0.0;
        self.sum_y = 0.0;
        self.sum_xx = 0.0;
        self.sum_xy = 0.0;
        for i in self.start..self.end() {
            let (dx, dy) = self.centered(i);
            self.sum_x += dx;
            self.sum_y += dy;
            self.sum_xx += dx * dx;
            self.sum_xy += dx * dy;
        }
        self.slides = 0;
    }
}

/// Slope of a single least-squares fit, computed directly
pub fn least_squares_slope(x: &[f64], y: &[f64]) -> Option<f64> {
    SlidingRegression::new(x, y, x.len()).and_then(|r| r.slope())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_slope(x: &[f64], y: &[f64]) -> f64 {
        let n = x.len() as f64;
        let mx = x.iter().sum::<f64>() / n;
        let my = y.iter().sum::<f64>() / n;
        let num: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
        let den: f64 = x.iter().map(|a| (a - mx) * (a - mx)).sum();
        num / den
    }

    #[test]
    fn test_exact_line() {
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 7.0).collect();
        let slope = least_squares_slope(&x, &y).unwrap();
        assert!((slope - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_values_zero_slope() {
        let x: Vec<f64> = (0..20).map(|i| 10.0 + i as f64 / 60.0).collect();
        let y = vec![42.0; 20];
        assert_eq!(least_squares_slope(&x, &y), Some(0.0));
    }

    #[test]
    fn test_degenerate_x() {
        let x = vec![1.0; 5];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(least_squares_slope(&x, &y).is_none());
    }

    #[test]
    fn test_invalid_construction() {
        assert!(SlidingRegression::new(&[1.0, 2.0], &[1.0], 1).is_none());
        assert!(SlidingRegression::new(&[1.0, 2.0], &[1.0, 2.0], 3).is_none());
        assert!(SlidingRegression::new(&[1.0, 2.0], &[1.0, 2.0], 0).is_none());
    }

    #[test]
    fn test_sliding_matches_naive_fit() {
        let x: Vec<f64> = (0..300).map(|i| 5.0 + i as f64 * 0.01).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 1000.0 + 4.0 * v + ((i * 37) % 11) as f64)
            .collect();

        let width = 25;
        let mut reg = SlidingRegression::new(&x, &y, width).unwrap();
        loop {
            let (s, e) = (reg.start(), reg.end());
            let expected = naive_slope(&x[s..e], &y[s..e]);
            let actual = reg.slope().unwrap();
            assert!(
                (expected - actual).abs() < 1e-6,
                "window {}..{}: {} vs {}",
                s,
                e,
                expected,
                actual
            );
            if !reg.advance() {
                break;
            }
        }
        assert_eq!(reg.end(), x.len());
    }
}
