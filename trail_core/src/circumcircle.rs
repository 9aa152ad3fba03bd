//! Circumcenter of three points in 3D.

use nalgebra::Vector3;

/// Relative collinearity tolerance: the points are degenerate when
/// `|a'×b'|² <= DEGENERATE_EPSILON · |a'|² · |b'|²`, i.e. when the squared
/// sine of the angle at C vanishes. Independent of the triangle's size.
pub const DEGENERATE_EPSILON: f64 = f64::EPSILON;

/// Finds the circumcenter of triangle ABC.
///
/// Returns the point equidistant from `a`, `b` and `c`, lying in their plane.
/// For collinear (or coincident) points there is no such circle and `c` is
/// returned unchanged, so the result is always finite.
///
/// ```text
/// a' = A - C,  b' = B - C
/// center = C + ((|a'|² b' - |b'|² a') × (a' × b')) / (2 |a' × b'|²)
/// ```
pub fn circumcenter(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Vector3<f64> {
    let ca = a - c;
    let cb = b - c;
    
    let cross = ca.cross(&cb);
    let cross_sq = cross.norm_squared();
    if cross_sq <= DEGENERATE_EPSILON * ca.norm_squared() * cb.norm_squared() {
        return *c;
    }
    
    let numerator = (cb * ca.norm_squared() - ca * cb.norm_squared()).cross(&cross);
    c + numerator / (2.0 * cross_sq)
}
