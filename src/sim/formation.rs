//! Section formation generator
//!
//! Pure layout math: given a column count, a formation and the template's
//! ranges, produce where each wall column sits and how far its top and
//! bottom walls are offset from the column center. The only state is the
//! caller's RNG, so identical draws reproduce identical layouts.

use std::f32::consts::PI;

use bitflags::bitflags;
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::curve::BezierCurve;
use super::template::SectionTemplate;

/// Named wall formation patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    /// Flat line, every column rolls its own gap
    Line,
    /// Centers follow half a sine period, up or down
    Wave,
    /// Gap swells in the middle of the section
    Circle,
    /// S-curve rising over the section
    Climb,
    /// S-curve falling over the section
    Drop,
    /// Flat line with a scaled gap
    Box,
    /// Four-point Bezier centers
    Curve,
    /// Gap follows a cosine envelope
    Cone,
}

impl Formation {
    pub const ALL: [Formation; 8] = [
        Formation::Line,
        Formation::Wave,
        Formation::Circle,
        Formation::Climb,
        Formation::Drop,
        Formation::Box,
        Formation::Curve,
        Formation::Cone,
    ];

    pub fn flag(self) -> FormationSet {
        match self {
            Formation::Line => FormationSet::LINE,
            Formation::Wave => FormationSet::WAVE,
            Formation::Circle => FormationSet::CIRCLE,
            Formation::Climb => FormationSet::CLIMB,
            Formation::Drop => FormationSet::DROP,
            Formation::Box => FormationSet::BOX,
            Formation::Curve => FormationSet::CURVE,
            Formation::Cone => FormationSet::CONE,
        }
    }
}

bitflags! {
    /// Formations a template allows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FormationSet: u8 {
        const LINE = 1 << 0;
        const WAVE = 1 << 1;
        const CIRCLE = 1 << 2;
        const CLIMB = 1 << 3;
        const DROP = 1 << 4;
        const BOX = 1 << 5;
        const CURVE = 1 << 6;
        const CONE = 1 << 7;
    }
}

impl FormationSet {
    /// Allowed formations in declaration order
    pub fn eligible(self) -> impl Iterator<Item = Formation> {
        Formation::ALL
            .into_iter()
            .filter(move |f| self.contains(f.flag()))
    }
}

/// Template-derived ranges the generator reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationParams {
    /// Horizontal distance between column centers
    pub column_width: f32,
    /// Full gap height range between top and bottom wall
    pub min_gap_height: f32,
    pub max_gap_height: f32,
    /// Amplitude/scale of the shaped formations
    pub scale: f32,
}

impl FormationParams {
    pub fn from_template(template: &SectionTemplate, column_width: f32) -> Self {
        Self {
            column_width,
            min_gap_height: template.min_gap_height,
            max_gap_height: template.max_gap_height,
            scale: template.formation_scale,
        }
    }

    fn roll_gap<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max_gap_height > self.min_gap_height {
            rng.random_range(self.min_gap_height..self.max_gap_height)
        } else {
            self.min_gap_height
        }
    }
}

/// One column of a layout, in section-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnPlacement {
    pub center: Vec2,
    /// Top wall offset from `center`
    pub top: Vec2,
    /// Bottom wall offset from `center`
    pub bottom: Vec2,
}

/// Generated section layout; consumed by placement, never mutated
#[derive(Debug, Clone, PartialEq)]
pub struct FormationLayout {
    formation: Formation,
    columns: Vec<ColumnPlacement>,
    end_point: Vec2,
}

impl FormationLayout {
    pub fn formation(&self) -> Formation {
        self.formation
    }

    pub fn columns(&self) -> &[ColumnPlacement] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Local point where the next section should start
    pub fn end_point(&self) -> Vec2 {
        self.end_point
    }
}

/// Uniform choice among the formations `allowed` permits
pub fn choose_formation<R: Rng + ?Sized>(allowed: FormationSet, rng: &mut R) -> Option<Formation> {
    let eligible: Vec<Formation> = allowed.eligible().collect();
    if eligible.is_empty() {
        return None;
    }
    Some(eligible[rng.random_range(0..eligible.len())])
}

/// Uniform count in `min..=max`
pub fn roll_count<R: Rng + ?Sized>(min: usize, max: usize, rng: &mut R) -> usize {
    if max > min { rng.random_range(min..=max) } else { min }
}

/// Fraction of the section covered at column `i`
#[inline]
fn column_fraction(i: usize, column_count: usize) -> f32 {
    if column_count > 1 {
        i as f32 / (column_count - 1) as f32
    } else {
        0.0
    }
}

/// Lay out `column_count` columns in the given formation
pub fn generate<R: Rng + ?Sized>(
    column_count: usize,
    formation: Formation,
    params: &FormationParams,
    rng: &mut R,
) -> FormationLayout {
    let width = params.column_width;
    let scale = params.scale;
    let n = column_count as f32;

    // Symmetric column: center at (x, y), walls at ±half_gap
    let symmetric = |i: usize, y: f32, half_gap: f32| ColumnPlacement {
        center: Vec2::new(width * i as f32, y),
        top: Vec2::new(0.0, half_gap),
        bottom: Vec2::new(0.0, -half_gap),
    };

    let columns: Vec<ColumnPlacement> = match formation {
        Formation::Line => (0..column_count)
            .map(|i| {
                let half_gap = params.roll_gap(rng) / 2.0;
                symmetric(i, 0.0, half_gap)
            })
            .collect(),
        Formation::Wave => {
            let half_gap = params.roll_gap(rng) / 2.0;
            let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            (0..column_count)
                .map(|i| {
                    let y = (column_fraction(i, column_count) * direction * PI).sin() * scale;
                    symmetric(i, y, half_gap)
                })
                .collect()
        }
        Formation::Circle => {
            let half_gap = params.roll_gap(rng) / 2.0;
            (0..column_count)
                .map(|i| {
                    let swell = (column_fraction(i, column_count) * PI).sin() * scale;
                    symmetric(i, 0.0, swell + half_gap)
                })
                .collect()
        }
        Formation::Climb | Formation::Drop => {
            let rise = if formation == Formation::Climb { n * scale } else { -n * scale };
            let slope = BezierCurve::slope(Vec2::ZERO, Vec2::new(n * width, rise));
            let half_gap = params.roll_gap(rng) / 2.0;
            (0..column_count)
                .map(|i| {
                    let y = slope.point(column_fraction(i, column_count)).y;
                    symmetric(i, y, half_gap)
                })
                .collect()
        }
        Formation::Curve => {
            let curve = BezierCurve::new(
                Vec2::ZERO,
                Vec2::new(n * width, n * scale),
                Vec2::new(0.0, n * scale),
                Vec2::new(n * width, 0.0),
            );
            let half_gap = params.roll_gap(rng) / 2.0;
            (0..column_count)
                .map(|i| {
                    let y = curve.point(column_fraction(i, column_count)).y;
                    symmetric(i, y, half_gap)
                })
                .collect()
        }
        Formation::Box => {
            let half_gap = params.roll_gap(rng) / 2.0 * scale;
            (0..column_count).map(|i| symmetric(i, 0.0, half_gap)).collect()
        }
        Formation::Cone => {
            let base = params.roll_gap(rng) + scale;
            (0..column_count)
                .map(|i| {
                    let envelope = (column_fraction(i, column_count) * PI).cos() * scale;
                    symmetric(i, 0.0, envelope + base)
                })
                .collect()
        }
    };

    let end_point = columns
        .last()
        .map_or(Vec2::ZERO, |c| c.center)
        + Vec2::new(width, 0.0);

    FormationLayout {
        formation,
        columns,
        end_point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn params() -> FormationParams {
        FormationParams {
            column_width: 1.0,
            min_gap_height: 4.0,
            max_gap_height: 6.0,
            scale: 1.5,
        }
    }

    #[test]
    fn test_line_spacing_and_gaps() {
        let mut rng = Pcg32::seed_from_u64(1);
        let layout = generate(5, Formation::Line, &params(), &mut rng);
        assert_eq!(layout.len(), 5);
        for (i, column) in layout.columns().iter().enumerate() {
            assert_eq!(column.center, Vec2::new(i as f32, 0.0));
            assert!((2.0..3.0).contains(&column.top.y));
            assert_eq!(column.bottom.y, -column.top.y);
        }
        assert_eq!(layout.end_point(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_wave_follows_half_sine() {
        let mut rng = Pcg32::seed_from_u64(2);
        let layout = generate(9, Formation::Wave, &params(), &mut rng);
        let ys: Vec<f32> = layout.columns().iter().map(|c| c.center.y).collect();
        assert!(ys[0].abs() < 1e-5);
        assert!(ys[8].abs() < 1e-4);
        // Middle column hits the full amplitude, up or down
        assert!((ys[4].abs() - 1.5).abs() < 1e-4);
        assert!((ys[2] - ys[6]).abs() < 1e-4);
        assert!(ys[1..8].iter().all(|y| y.signum() == ys[4].signum()));
        // Shared gap
        let gap = layout.columns()[0].top.y;
        assert!(layout.columns().iter().all(|c| c.top.y == gap));
    }

    #[test]
    fn test_circle_swells_in_middle() {
        let mut rng = Pcg32::seed_from_u64(3);
        let layout = generate(5, Formation::Circle, &params(), &mut rng);
        let columns = layout.columns();
        assert!(columns.iter().all(|c| c.center.y == 0.0));
        assert!((columns[2].top.y - columns[0].top.y - 1.5).abs() < 1e-4);
        assert!((columns[0].top.y - columns[4].top.y).abs() < 1e-4);
    }

    #[test]
    fn test_climb_and_drop_span_the_section() {
        let mut rng = Pcg32::seed_from_u64(4);
        let climb = generate(4, Formation::Climb, &params(), &mut rng);
        let drop = generate(4, Formation::Drop, &params(), &mut rng);
        assert!(climb.columns()[0].center.y.abs() < 1e-5);
        assert!((climb.columns()[3].center.y - 6.0).abs() < 1e-4);
        assert!((drop.columns()[3].center.y + 6.0).abs() < 1e-4);
        assert!(climb.columns().windows(2).all(|w| w[1].center.y >= w[0].center.y));
        assert!(drop.columns().windows(2).all(|w| w[1].center.y <= w[0].center.y));
    }

    #[test]
    fn test_box_scales_gap() {
        let mut rng = Pcg32::seed_from_u64(5);
        let layout = generate(3, Formation::Box, &params(), &mut rng);
        let half_gap = layout.columns()[0].top.y;
        assert!((3.0..4.5).contains(&half_gap));
        assert!(layout.columns().iter().all(|c| c.top.y == half_gap && c.center.y == 0.0));
    }

    #[test]
    fn test_cone_narrows() {
        let mut rng = Pcg32::seed_from_u64(6);
        let layout = generate(5, Formation::Cone, &params(), &mut rng);
        let columns = layout.columns();
        assert!(columns.windows(2).all(|w| w[1].top.y < w[0].top.y));
        assert!((columns[0].top.y - columns[4].top.y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_single_column_is_finite() {
        let mut rng = Pcg32::seed_from_u64(7);
        for formation in Formation::ALL {
            let layout = generate(1, formation, &params(), &mut rng);
            let column = layout.columns()[0];
            assert!(column.center.is_finite(), "{formation:?}");
            assert!(column.top.is_finite(), "{formation:?}");
        }
    }

    #[test]
    fn test_choose_formation_respects_set() {
        let mut rng = Pcg32::seed_from_u64(8);
        let allowed = FormationSet::WAVE | FormationSet::CONE;
        for _ in 0..100 {
            let formation = choose_formation(allowed, &mut rng).unwrap();
            assert!(matches!(formation, Formation::Wave | Formation::Cone));
        }
        assert_eq!(choose_formation(FormationSet::empty(), &mut rng), None);
    }

    #[test]
    fn test_formation_set_serde() {
        let set = FormationSet::LINE | FormationSet::BOX;
        let json = serde_json::to_string(&set).unwrap();
        let back: FormationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    proptest! {
        #[test]
        fn prop_same_draws_same_layout(seed in any::<u64>(), count in 1usize..20, which in 0usize..8) {
            let formation = Formation::ALL[which];
            let a = generate(count, formation, &params(), &mut Pcg32::seed_from_u64(seed));
            let b = generate(count, formation, &params(), &mut Pcg32::seed_from_u64(seed));
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.len(), count);
            for (i, column) in a.columns().iter().enumerate() {
                prop_assert!((column.center.x - i as f32).abs() < 1e-4);
                prop_assert!(column.top.y >= 0.0);
                prop_assert!((column.top.y + column.bottom.y).abs() < 1e-4);
            }
        }
    }
}
