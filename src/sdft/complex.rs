//! Complex arithmetic used by the DFT recurrence.
//!
//! `Complex` is `num_complex::Complex<f64>` as re-exported by rustfft:
//! `+`, `-` and `*` work with both complex and real operands, `exp()` is the
//! complex exponential, `norm()` is the magnitude and `norm_sqr()` the squared
//! norm (no square root).

pub use rustfft::num_complex::Complex64 as Complex;

/// Unit phasor `exp(i * angle)`.
#[inline]
pub fn phasor(angle: f64) -> Complex {
    Complex::new(0.0, angle).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn arithmetic_matches_textbook_definitions() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, -1.0);

        assert_eq!(a + b, Complex::new(4.0, 1.0));
        assert_eq!(a - b, Complex::new(-2.0, 3.0));
        assert_eq!(a * b, Complex::new(5.0, 5.0));
    }

    #[test]
    fn real_operands_leave_imaginary_part_alone() {
        let z = Complex::new(0.5, -0.25);
        assert_eq!(z - 0.5 + 2.0, Complex::new(2.0, -0.25));
    }

    #[test]
    fn exp_of_real_and_imaginary_parts() {
        let z = Complex::new(1.0, PI).exp();
        assert!((z.re + std::f64::consts::E).abs() < 1e-12);
        assert!(z.im.abs() < 1e-12);
    }

    #[test]
    fn magnitude_and_squared_norm() {
        let z = Complex::new(3.0, 4.0);
        assert_eq!(z.norm(), 5.0);
        assert_eq!(z.norm_sqr(), 25.0);
    }

    #[test]
    fn phasor_has_unit_magnitude() {
        let quarter = phasor(FRAC_PI_2);
        assert!(quarter.re.abs() < 1e-15);
        assert!((quarter.im - 1.0).abs() < 1e-15);

        for step in 0..64 {
            let z = phasor(2.0 * PI * step as f64 / 64.0);
            assert!((z.norm() - 1.0).abs() < 1e-12, "step {} drifted", step);
        }
    }
}
