//! Mono biquad used to shape every voice layer.
//!
//! Coefficients follow the RBJ cookbook; processing is direct form II transposed.

use std::f64::consts::TAU;

use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FilterKind {
    Lowpass,
    Bandpass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub frequency: f64,
    pub q: f64,
}

impl FilterSpec {
    pub const fn lowpass(frequency: f64, q: f64) -> Self {
        Self {
            kind: FilterKind::Lowpass,
            frequency,
            q,
        }
    }

    pub const fn bandpass(frequency: f64, q: f64) -> Self {
        Self {
            kind: FilterKind::Bandpass,
            frequency,
            q,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Biquad {
    spec: FilterSpec,
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn new(spec: FilterSpec, sample_rate: f64) -> Self {
        let nyquist = sample_rate / 2.0;
        let f0 = spec.frequency.clamp(10.0, nyquist * 0.99);
        let q = spec.q.max(0.1);

        let w0 = TAU * f0 / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);

        let (b0, b1, b2) = match spec.kind {
            FilterKind::Lowpass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            FilterKind::Bandpass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;

        Self {
            spec,
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    pub fn spec(&self) -> FilterSpec {
        self.spec
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;

        if self.z1.abs() < 1e-15 {
            self.z1 = 0.0;
        }
        if self.z2.abs() < 1e-15 {
            self.z2 = 0.0;
        }
        y
    }

    /// Magnitude of the frequency response at `frequency`, linear scale.
    pub fn magnitude_at(&self, frequency: f64, sample_rate: f64) -> f64 {
        let w = TAU * frequency / sample_rate;
        let (sin_w, cos_w) = w.sin_cos();
        let (sin_2w, cos_2w) = (2.0 * w).sin_cos();

        let num_re = self.b0 + self.b1 * cos_w + self.b2 * cos_2w;
        let num_im = -(self.b1 * sin_w + self.b2 * sin_2w);
        let den_re = 1.0 + self.a1 * cos_w + self.a2 * cos_2w;
        let den_im = -(self.a1 * sin_w + self.a2 * sin_2w);

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }
}
