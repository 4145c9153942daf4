use crate::core::models::atom::LjParam;
use std::f64::consts::PI;

/// `2^(1/6)`, the ratio between the potential minimum and `σ`.
const TWO_POW_ONE_SIXTH: f64 = 1.122_462_048_309_373;

#[inline]
pub fn lennard_jones_12_6(dist: f64, sigma: f64, well_depth: f64) -> f64 {
    if dist < 1e-6 {
        return 1e10;
    }
    let rho6 = (sigma / dist).powi(6);
    4.0 * well_depth * (rho6 * rho6 - rho6)
}

/// Converts an `r_min/2` radius into the pair `σ` it implies for like atoms.
#[inline]
pub fn sigma_from_r_min_half(radius: f64) -> f64 {
    2.0 * radius / TWO_POW_ONE_SIXTH
}

/// Lorentz-Berthelot combination: arithmetic `σ`, geometric `ε`.
#[inline]
pub fn mix_lorentz_berthelot(a: LjParam, b: LjParam) -> LjParam {
    LjParam {
        sigma: 0.5 * (a.sigma + b.sigma),
        well_depth: (a.well_depth * b.well_depth).sqrt(),
    }
}

/// Radial factor `g(r)` of the vector field `F(d) = g(|d|) d` whose divergence
/// is the 12-6 potential: `∇·F = 4ε[(σ/r)^12 - (σ/r)^6]`.
#[inline]
pub fn lj_radial_flux(dist: f64, sigma: f64, well_depth: f64) -> f64 {
    let rho6 = (sigma / dist).powi(6);
    4.0 * well_depth * (-rho6 * rho6 / 9.0 + rho6 / 3.0)
}

/// Volume integral of the 12-6 potential over the exterior of a sphere of
/// radius `radius` centred on the atom.
pub fn lj_exterior_sphere_integral(radius: f64, sigma: f64, well_depth: f64) -> f64 {
    let s3 = (sigma / radius).powi(3);
    let s9 = s3 * s3 * s3;
    16.0 * PI * well_depth * sigma.powi(3) * (s9 / 9.0 - s3 / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn lennard_jones_is_zero_at_sigma() {
        assert!(f64_approx_equal(lennard_jones_12_6(3.0, 3.0, 0.2), 0.0));
    }

    #[test]
    fn lennard_jones_at_minimum_returns_negative_well_depth() {
        let r_min = 3.0 * TWO_POW_ONE_SIXTH;
        assert!(f64_approx_equal(lennard_jones_12_6(r_min, 3.0, 0.2), -0.2));
    }

    #[test]
    fn lennard_jones_at_very_small_distance_returns_large_positive_energy() {
        assert!(f64_approx_equal(lennard_jones_12_6(1e-7, 3.0, 0.2), 1e10));
    }

    #[test]
    fn sigma_from_r_min_half_places_minimum_at_twice_the_radius() {
        let radius = 1.908;
        let sigma = sigma_from_r_min_half(radius);
        let energy = lennard_jones_12_6(2.0 * radius, sigma, 0.1094);
        assert!(f64_approx_equal(energy, -0.1094));
    }

    #[test]
    fn lorentz_berthelot_mixes_sigma_and_epsilon() {
        let mixed = mix_lorentz_berthelot(
            LjParam {
                sigma: 3.0,
                well_depth: 0.04,
            },
            LjParam {
                sigma: 4.0,
                well_depth: 0.09,
            },
        );
        assert!(f64_approx_equal(mixed.sigma, 3.5));
        assert!(f64_approx_equal(mixed.well_depth, 0.06));
    }

    #[test]
    fn radial_flux_divergence_matches_potential() {
        // div(g(r) r_vec) = 3 g + r g'
        let (sigma, eps) = (3.3, 0.12);
        for &r in &[3.0, 4.2, 6.5] {
            let h = 1e-5;
            let g = lj_radial_flux(r, sigma, eps);
            let dg = (lj_radial_flux(r + h, sigma, eps) - lj_radial_flux(r - h, sigma, eps))
                / (2.0 * h);
            let divergence = 3.0 * g + r * dg;
            let potential = lennard_jones_12_6(r, sigma, eps);
            assert!((divergence - potential).abs() < 1e-6 * potential.abs().max(1e-3));
        }
    }

    #[test]
    fn exterior_integral_matches_surface_flux_of_radial_field() {
        // -∮ F·n over a sphere of radius R equals the exterior volume integral.
        let (sigma, eps, radius): (f64, f64, f64) = (3.2, 0.15, 4.5);
        let flux = 4.0 * PI * radius.powi(2) * lj_radial_flux(radius, sigma, eps) * radius;
        let volume = lj_exterior_sphere_integral(radius, sigma, eps);
        assert!((volume + flux).abs() < 1e-9);
        assert!(volume < 0.0);
    }
}
