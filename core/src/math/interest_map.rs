use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prelude::{RlanError, RlanResult};

/// Breakpoint of a piecewise-linear interest map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImPoint {
    pub x: f64,
    pub y: f64,
}

impl ImPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Named fuzzy-membership function mapping a metric onto [0, 1].
///
/// The weight is carried along for the caller's weighted average and is
/// never applied by [`InterestMap::interest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestMap {
    name: String,
    points: Vec<ImPoint>,
    weight: f64,
}

impl InterestMap {
    pub fn new(name: impl Into<String>, points: Vec<ImPoint>, weight: f64) -> RlanResult<Self> {
        let map = Self::from_parts(name, points, weight);
        map.validate()?;
        Ok(map)
    }

    pub(crate) fn from_parts(name: impl Into<String>, points: Vec<ImPoint>, weight: f64) -> Self {
        Self {
            name: name.into(),
            points,
            weight,
        }
    }

    pub fn validate(&self) -> RlanResult<()> {
        if self.points.is_empty() {
            return Err(RlanError::InvalidConfig(format!(
                "interest map {} has no points",
                self.name
            )));
        }
        for pair in self.points.windows(2) {
            if pair[1].x.partial_cmp(&pair[0].x) != Some(std::cmp::Ordering::Greater) {
                return Err(RlanError::InvalidConfig(format!(
                    "interest map {} points not ascending in x at {}",
                    self.name, pair[1].x
                )));
            }
        }
        if let Some(pt) = self
            .points
            .iter()
            .find(|pt| !pt.x.is_finite() || !(0.0..=1.0).contains(&pt.y))
        {
            return Err(RlanError::InvalidConfig(format!(
                "interest map {} has bad point ({}, {})",
                self.name, pt.x, pt.y
            )));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(RlanError::InvalidConfig(format!(
                "interest map {} has bad weight {}",
                self.name, self.weight
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[ImPoint] {
        &self.points
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Interest value for `val`, flat beyond the first and last points.
    /// NaN maps like a value below the first point.
    pub fn interest(&self, val: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if val.is_nan() || val <= first.x {
            return first.y;
        }
        if val >= last.x {
            return last.y;
        }
        // first index with x > val
        let upper = self.points.partition_point(|pt| pt.x <= val);
        let (Some(lo), Some(hi)) = (
            upper.checked_sub(1).and_then(|i| self.points.get(i)),
            self.points.get(upper),
        ) else {
            return first.y;
        };
        let frac = (val - lo.x) / (hi.x - lo.x);
        lo.y + frac * (hi.y - lo.y)
    }
}

impl fmt::Display for InterestMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  InterestMap: {}", self.name)?;
        writeln!(f, "    weight: {}", self.weight)?;
        for pt in &self.points {
            writeln!(f, "    x, y: {}, {}", pt.x, pt.y)?;
        }
        Ok(())
    }
}
