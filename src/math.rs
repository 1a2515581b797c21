//! Mathematical utilities for plane frame calculations

use nalgebra::{DMatrix, DVector, SMatrix, SVector};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// 6x6 matrix for plane beam-column stiffness
pub type Mat6 = SMatrix<f64, 6, 6>;
/// 6-element vector for plane beam-column forces/displacements
pub type Vec6 = SVector<f64, 6>;

/// Compute the transformation matrix for a plane frame element
///
/// # Arguments
/// * `i_node` - Start node coordinates [X, Z]
/// * `j_node` - End node coordinates [X, Z]
///
/// # Returns
/// 6x6 matrix mapping global [UX, UZ, R] pairs to local [u, v, θ] pairs,
/// or `None` for a zero-length element
pub fn beam_transformation_matrix(i_node: &[f64; 2], j_node: &[f64; 2]) -> Option<Mat6> {
    let dx = j_node[0] - i_node[0];
    let dz = j_node[1] - i_node[1];
    let length = (dx * dx + dz * dz).sqrt();

    if length < 1e-10 {
        return None;
    }

    // Direction cosines of the local x-axis (along the element)
    let c = dx / length;
    let s = dz / length;

    let mut t = Mat6::zeros();
    for block in 0..2 {
        let o = block * 3;
        t[(o, o)] = c;
        t[(o, o + 1)] = s;
        t[(o + 1, o)] = -s;
        t[(o + 1, o + 1)] = c;
        t[(o + 2, o + 2)] = 1.0;
    }
    Some(t)
}

/// Compute the local stiffness matrix of a plane Euler-Bernoulli beam-column
///
/// # Arguments
/// * `ea` - Axial rigidity
/// * `ei` - Flexural rigidity
/// * `length` - Element length
///
/// # Returns
/// 6x6 local stiffness matrix in [u1, v1, θ1, u2, v2, θ2] order
pub fn beam_local_stiffness(ea: f64, ei: f64, length: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = ea / l;
    let ei_l3 = ei / l3;
    let ei_l2 = ei / l2;
    let ei_l = ei / l;

    #[rustfmt::skip]
    let data = [
        ea_l,   0.0,           0.0,          -ea_l,  0.0,           0.0,
        0.0,    12.0*ei_l3,    6.0*ei_l2,    0.0,    -12.0*ei_l3,   6.0*ei_l2,
        0.0,    6.0*ei_l2,     4.0*ei_l,     0.0,    -6.0*ei_l2,    2.0*ei_l,
        -ea_l,  0.0,           0.0,          ea_l,   0.0,           0.0,
        0.0,    -12.0*ei_l3,   -6.0*ei_l2,   0.0,    12.0*ei_l3,    -6.0*ei_l2,
        0.0,    6.0*ei_l2,     2.0*ei_l,     0.0,    -6.0*ei_l2,    4.0*ei_l,
    ];

    Mat6::from_row_slice(&data)
}

/// Solve a linear system using LU decomposition
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    a.clone().lu().solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transformation_matrix_downward() {
        let t = beam_transformation_matrix(&[0.0, 0.0], &[0.0, -2.0]).unwrap();

        // local x points down (-Z), local y points along +X
        assert_relative_eq!(t[(0, 1)], -1.0, epsilon = 1e-12);
        assert_relative_eq!(t[(1, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(t[(2, 2)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(beam_transformation_matrix(&[1.0, 1.0], &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_local_stiffness_symmetry() {
        let k = beam_local_stiffness(1.0e7, 5.0e5, 2.5);
        for i in 0..6 {
            for j in 0..6 {
                assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_cantilever_tip_deflection() {
        // Fixed at node 1: solve the free 3x3 block for a tip load
        let (ei, l, p) = (2.0e4, 3.0, 10.0);
        let k = beam_local_stiffness(1.0e6, ei, l);
        let k_ff = Mat::from_fn(3, 3, |r, c| k[(r + 3, c + 3)]);
        let f = Vec::from_vec(vec![0.0, p, 0.0]);
        let d = solve_linear_system(&k_ff, &f).unwrap();
        assert_relative_eq!(d[1], p * l.powi(3) / (3.0 * ei), epsilon = 1e-9);
    }
}
