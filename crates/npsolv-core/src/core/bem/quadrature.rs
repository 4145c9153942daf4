//! Quadrature on flat triangular panels.
//!
//! Rules are given on the reference triangle `(0,0)`, `(1,0)`, `(0,1)` as
//! `(xi, eta, weight)` with weights summing to one, so that
//! `∫_T f dS ≈ area · Σ w f(x(xi, eta))`.

use crate::core::mesh::surface::Panel;
use nalgebra::Point3;
use serde::Deserialize;
use std::f64::consts::PI;

pub static CENTROID_RULE: [(f64, f64, f64); 1] = [(1.0 / 3.0, 1.0 / 3.0, 1.0)];

pub static THREE_POINT_RULE: [(f64, f64, f64); 3] = [
    (1.0 / 6.0, 1.0 / 6.0, 1.0 / 3.0),
    (2.0 / 3.0, 1.0 / 6.0, 1.0 / 3.0),
    (1.0 / 6.0, 2.0 / 3.0, 1.0 / 3.0),
];

/// Degree-5 symmetric rule.
pub static SEVEN_POINT_RULE: [(f64, f64, f64); 7] = [
    (0.333333333333333, 0.333333333333333, 0.225),
    (0.797426985353087, 0.101286507323456, 0.125939180544827),
    (0.101286507323456, 0.797426985353087, 0.125939180544827),
    (0.101286507323456, 0.101286507323456, 0.125939180544827),
    (0.470142064105115, 0.059715871789770, 0.132394152788506),
    (0.059715871789770, 0.470142064105115, 0.132394152788506),
    (0.470142064105115, 0.470142064105115, 0.132394152788506),
];

/// Controls how the distance between a collocation point and a source panel
/// selects the integration rule.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct QuadratureParams {
    /// Below this distance/diameter ratio the panel is subdivided.
    pub near_field_ratio: f64,
    /// Refinement levels used in the near field (each level splits in four).
    pub near_subdivisions: u32,
    /// Above this ratio a single centroid evaluation is used.
    pub far_field_ratio: f64,
}

impl Default for QuadratureParams {
    fn default() -> Self {
        Self {
            near_field_ratio: 2.0,
            near_subdivisions: 2,
            far_field_ratio: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRegion {
    Near,
    Mid,
    Far,
}

impl QuadratureParams {
    pub fn region(&self, distance: f64, diameter: f64) -> FieldRegion {
        let ratio = distance / diameter;
        if ratio < self.near_field_ratio {
            FieldRegion::Near
        } else if ratio < self.far_field_ratio {
            FieldRegion::Mid
        } else {
            FieldRegion::Far
        }
    }

    /// Integrates `f` over a panel seen from `target` with the rule chosen by distance.
    pub fn integrate<F>(&self, target: &Point3<f64>, panel: &Panel, f: F) -> f64
    where
        F: Fn(&Point3<f64>) -> f64,
    {
        let distance = (target - panel.centroid).norm();
        match self.region(distance, panel.diameter()) {
            FieldRegion::Far => integrate(panel, &CENTROID_RULE, &f),
            FieldRegion::Mid => integrate(panel, &SEVEN_POINT_RULE, &f),
            FieldRegion::Near => subdivide(panel, self.near_subdivisions)
                .iter()
                .map(|sub| integrate(sub, &SEVEN_POINT_RULE, &f))
                .sum(),
        }
    }
}

/// Applies a reference rule to a panel.
#[inline]
pub fn integrate<F>(panel: &Panel, rule: &[(f64, f64, f64)], f: F) -> f64
where
    F: Fn(&Point3<f64>) -> f64,
{
    rule.iter()
        .map(|&(xi, eta, w)| w * f(&panel.point_at(xi, eta)))
        .sum::<f64>()
        * panel.area
}

/// Splits a panel into `4^levels` congruent sub-panels with the same orientation.
pub fn subdivide(panel: &Panel, levels: u32) -> Vec<Panel> {
    let mut panels = vec![*panel];
    for _ in 0..levels {
        panels = panels
            .iter()
            .flat_map(|p| {
                let [a, b, c] = p.corners;
                let ab = Point3::from((a.coords + b.coords) * 0.5);
                let bc = Point3::from((b.coords + c.coords) * 0.5);
                let ca = Point3::from((c.coords + a.coords) * 0.5);
                [[a, ab, ca], [ab, b, bc], [ca, bc, c], [ab, bc, ca]]
            })
            .filter_map(Panel::from_corners)
            .collect();
    }
    panels
}

/// Exact `∫_T 1/(4π|x - y|) dS_y` for `x` at the centroid of `T`.
///
/// In polar coordinates around `x` each edge at distance `h` contributes
/// `h [asinh(t_b/h) - asinh(t_a/h)]`, with `t_a`, `t_b` the signed positions
/// of the edge ends along the edge from the foot of the perpendicular.
pub fn single_layer_self(panel: &Panel) -> f64 {
    let x = panel.centroid;
    let [a, b, c] = panel.corners;
    let mut total = 0.0;
    for (start, end) in [(a, b), (b, c), (c, a)] {
        let edge = end - start;
        let u = edge / edge.norm();
        let t_a = (start - x).dot(&u);
        let t_b = (end - x).dot(&u);
        let h = ((start - x) - u * t_a).norm();
        if h > 0.0 {
            total += h * ((t_b / h).asinh() - (t_a / h).asinh());
        }
    }
    total / (4.0 * PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Panel {
        Panel::from_corners([
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        ])
        .unwrap()
    }

    #[test]
    fn rule_weights_sum_to_one() {
        for rule in [&CENTROID_RULE[..], &THREE_POINT_RULE[..], &SEVEN_POINT_RULE[..]] {
            let sum: f64 = rule.iter().map(|&(_, _, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn seven_point_rule_is_exact_for_quadratics() {
        let p = panel([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        // ∫ x² over the unit right triangle is 1/12.
        let value = integrate(&p, &SEVEN_POINT_RULE, |q| q.x * q.x);
        assert!((value - 1.0 / 12.0).abs() < 1e-12);
        let value = integrate(&p, &THREE_POINT_RULE, |q| q.x * q.y);
        assert!((value - 1.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn subdivision_preserves_area_and_orientation() {
        let p = panel([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 3.0, 1.0]);
        let subs = subdivide(&p, 2);
        assert_eq!(subs.len(), 16);
        let area: f64 = subs.iter().map(|s| s.area).sum();
        assert!((area - p.area).abs() < 1e-12);
        assert!(subs.iter().all(|s| (s.normal - p.normal).norm() < 1e-12));
    }

    #[test]
    fn region_follows_distance_to_diameter_ratio() {
        let params = QuadratureParams::default();
        assert_eq!(params.region(1.0, 1.0), FieldRegion::Near);
        assert_eq!(params.region(3.0, 1.0), FieldRegion::Mid);
        assert_eq!(params.region(10.0, 1.0), FieldRegion::Far);
    }

    #[test]
    fn analytic_self_term_matches_refined_quadrature() {
        let p = panel([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.3, 0.8, 0.0]);
        let x = p.centroid;
        // Sub-panel centroids never coincide with x except for the central one,
        // which is integrated analytically.
        let refined: f64 = subdivide(&p, 6)
            .iter()
            .map(|s| {
                if (s.centroid - x).norm() < 1e-12 {
                    single_layer_self(s)
                } else {
                    integrate(s, &SEVEN_POINT_RULE, |y| 1.0 / (4.0 * PI * (y - x).norm()))
                }
            })
            .sum();
        let exact = single_layer_self(&p);
        assert!((exact - refined).abs() / exact < 1e-3);
    }

    #[test]
    fn self_term_scales_linearly_with_size() {
        let small = panel([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let large = panel([0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 3.0, 0.0]);
        assert!((single_layer_self(&large) - 3.0 * single_layer_self(&small)).abs() < 1e-12);
    }

    #[test]
    fn far_panel_integral_matches_point_source() {
        let params = QuadratureParams::default();
        let p = panel([0.0, 0.0, 0.0], [0.1, 0.0, 0.0], [0.0, 0.1, 0.0]);
        let target = Point3::new(0.0, 0.0, 5.0);
        let value = params.integrate(&target, &p, |y| 1.0 / (y - target).norm());
        let expected = p.area / (target - p.centroid).norm();
        assert!((value - expected).abs() < 1e-12);
    }
}
