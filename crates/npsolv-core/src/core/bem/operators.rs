use super::quadrature::{QuadratureParams, single_layer_self};
use crate::core::mesh::surface::{Panel, SurfaceMesh};
use nalgebra::{DMatrix, DVector, Point3};
use std::f64::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const FOUR_PI: f64 = 4.0 * PI;

/// Squared distance (Å²) below which two panel centroids are the same element.
const COINCIDENT_TOLERANCE_SQ: f64 = 1e-20;

/// Laplace single-layer kernel `G(x, y) = 1 / (4π|x - y|)`.
#[inline]
pub fn single_layer_kernel(x: &Point3<f64>, y: &Point3<f64>) -> f64 {
    1.0 / (FOUR_PI * (x - y).norm())
}

/// Single-layer potential at `x` of a unit density on `panel`.
pub fn single_layer_entry(
    x: &Point3<f64>,
    panel: &Panel,
    params: &QuadratureParams,
    coincident: bool,
) -> f64 {
    if coincident {
        return single_layer_self(panel);
    }
    params.integrate(x, panel, |y| single_layer_kernel(x, y))
}

/// Double-layer potential at `x` of a unit dipole density on `panel`:
/// `∫ ∂G/∂n_y dS_y = ∫ (x - y)·n_y / (4π|x - y|³) dS_y`.
///
/// The coincident entry vanishes on a flat panel.
pub fn double_layer_entry(
    x: &Point3<f64>,
    panel: &Panel,
    params: &QuadratureParams,
    coincident: bool,
) -> f64 {
    if coincident {
        return 0.0;
    }
    let normal = panel.normal;
    params.integrate(x, panel, |y| {
        let d = x - y;
        let r = d.norm();
        d.dot(&normal) / (FOUR_PI * r * r * r)
    })
}

/// Dense assembly of `entry(target centroid, source panel, coincident)`.
///
/// An entry is coincident when the target centroid lies on the source
/// centroid, so copies of a mesh still get the singular self term.
fn assemble<F>(targets: &[Panel], sources: &[Panel], entry: F) -> DMatrix<f64>
where
    F: Fn(&Point3<f64>, &Panel, bool) -> f64 + Sync,
{
    #[cfg(not(feature = "parallel"))]
    let iterator = targets.iter();

    #[cfg(feature = "parallel")]
    let iterator = targets.par_iter();

    let rows: Vec<Vec<f64>> = iterator
        .map(|target| {
            sources
                .iter()
                .map(|source| {
                    let coincident = (target.centroid - source.centroid).norm_squared()
                        < COINCIDENT_TOLERANCE_SQ;
                    entry(&target.centroid, source, coincident)
                })
                .collect()
        })
        .collect();
    DMatrix::from_row_iterator(targets.len(), sources.len(), rows.into_iter().flatten())
}

/// Single-layer block with rows at the centroids of `targets` and one column
/// per triangle of `sources`. Passing the same mesh (or a copy) twice yields
/// the self-interaction block.
pub fn assemble_single_layer(
    targets: &SurfaceMesh,
    sources: &SurfaceMesh,
    params: &QuadratureParams,
) -> DMatrix<f64> {
    assemble(
        targets.panels(),
        sources.panels(),
        |x, panel, coincident| single_layer_entry(x, panel, params, coincident),
    )
}

/// Double-layer block, laid out like [`assemble_single_layer`].
pub fn assemble_double_layer(
    targets: &SurfaceMesh,
    sources: &SurfaceMesh,
    params: &QuadratureParams,
) -> DMatrix<f64> {
    assemble(
        targets.panels(),
        sources.panels(),
        |x, panel, coincident| double_layer_entry(x, panel, params, coincident),
    )
}

/// Operators of the two-surface shell problem, with unknowns ordered as the
/// inner surface triangles followed by the outer surface triangles.
#[derive(Debug, Clone)]
pub struct BlockOperator {
    /// `[V11 V12; V21 V22]`.
    pub single_layer: DMatrix<f64>,
    /// `[K11; K21]`: double layer of the inner surface seen from every collocation point.
    pub inner_double_layer: DMatrix<f64>,
    pub inner_len: usize,
    pub outer_len: usize,
}

impl BlockOperator {
    pub fn assemble(inner: &SurfaceMesh, outer: &SurfaceMesh, params: &QuadratureParams) -> Self {
        let panels: Vec<Panel> = inner
            .panels()
            .iter()
            .chain(outer.panels())
            .copied()
            .collect();

        let single_layer = assemble(&panels, &panels, |x, panel, coincident| {
            single_layer_entry(x, panel, params, coincident)
        });
        let inner_double_layer = assemble(&panels, inner.panels(), |x, panel, coincident| {
            double_layer_entry(x, panel, params, coincident)
        });

        Self {
            single_layer,
            inner_double_layer,
            inner_len: inner.len(),
            outer_len: outer.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner_len + self.outer_len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `K·1` for the inner surface, one value per collocation point.
    pub fn inner_double_layer_row_sums(&self) -> DVector<f64> {
        self.inner_double_layer.column_sum()
    }
}
