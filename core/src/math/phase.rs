use num_complex::Complex64;

/// Unit phasor for a phase angle in radians.
pub fn phasor(phase_rad: f64) -> Complex64 {
    Complex64::from_polar(1.0, phase_rad)
}

/// Argument of a complex value, in degrees, in (-180, 180].
pub fn arg_deg(val: Complex64) -> f64 {
    val.arg().to_degrees()
}

/// `a * conj(b)`: its argument is the angle from `b` to `a`.
pub fn conjugate_product(a: Complex64, b: Complex64) -> Complex64 {
    a * b.conj()
}

/// Wrapped angular difference `a - b` in degrees.
pub fn phase_diff_deg(a: Complex64, b: Complex64) -> f64 {
    arg_deg(conjugate_product(a, b))
}
