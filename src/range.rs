//! Closed numeric interval used by the optimization fitness functions.

/// A closed interval `[min, max]`.
///
/// # Examples
///
/// ```
/// use u_evolve::Range;
///
/// let r = Range::new(-1.0, 3.0);
/// assert_eq!(r.length(), 4.0);
/// assert!(r.is_inside(3.0));
/// assert!(r.is_overlapping(&Range::new(2.0, 10.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `max - min`.
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Whether `x` lies within the interval, bounds included.
    pub fn is_inside(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    /// Whether `other` lies entirely within this interval.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.is_inside(other.min) && self.is_inside(other.max)
    }

    /// Whether the two intervals share at least one point.
    pub fn is_overlapping(&self, other: &Range) -> bool {
        self.is_inside(other.min)
            || self.is_inside(other.max)
            || other.is_inside(self.min)
            || other.is_inside(self.max)
    }
}
