use serde::{Deserialize, Serialize};

/// Pointwise nonlinearity applied across one layer, paired with its
/// derivative.
///
/// HARD CONSTRAINT: [`Activation::derivative_from_output`] takes the
/// *already-activated* value `a = f(z)`, not the pre-activation `z`. The
/// backward pass relies on this calling convention, so only functions whose
/// derivative is expressible in terms of their own output belong here
/// (σ′ = a·(1−a), tanh′ = 1−a², identity′ = 1). An activation that cannot
/// satisfy this makes the backward pass mathematically wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Logistic sigmoid, the default everywhere.
    #[default]
    Sigmoid,
    Tanh,
    Identity,
}

impl Activation {
    /// Forward value `f(z)` for a single element.
    pub fn apply(&self, z: f64) -> f64 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-z).exp()),
            Activation::Tanh => z.tanh(),
            Activation::Identity => z,
        }
    }

    /// Derivative `f'` evaluated on the activated value `a = f(z)`.
    pub fn derivative_from_output(&self, a: f64) -> f64 {
        match self {
            Activation::Sigmoid => a * (1.0 - a),
            Activation::Tanh => 1.0 - a * a,
            Activation::Identity => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_matches_closed_form() {
        let s = Activation::Sigmoid;
        assert_relative_eq!(s.apply(0.0), 0.5);
        assert_relative_eq!(s.apply(2.0), 1.0 / (1.0 + (-2.0f64).exp()));
        assert!(s.apply(-30.0) < 1e-9);
        assert!(s.apply(30.0) > 1.0 - 1e-9);
    }

    #[test]
    fn derivatives_are_expressed_in_the_output() {
        // The derivative convention: feed the activated value back in.
        for &z in &[-1.5, -0.2, 0.0, 0.7, 2.0] {
            let a = Activation::Sigmoid.apply(z);
            assert_relative_eq!(
                Activation::Sigmoid.derivative_from_output(a),
                a * (1.0 - a)
            );

            let t = Activation::Tanh.apply(z);
            assert_relative_eq!(Activation::Tanh.derivative_from_output(t), 1.0 - t * t);

            assert_relative_eq!(Activation::Identity.derivative_from_output(z), 1.0);
        }
    }

    #[test]
    fn default_is_sigmoid() {
        assert_eq!(Activation::default(), Activation::Sigmoid);
    }
}
