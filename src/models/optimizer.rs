//! Adam: шаг по первому и второму моментам градиента

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Zip};

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: i32,
    first_moments: Vec<ArrayD<f64>>,
    second_moments: Vec<ArrayD<f64>>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self::with_params(learning_rate, 0.9, 0.999, 1e-7)
    }

    pub fn with_params(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
            first_moments: Vec::new(),
            second_moments: Vec::new(),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Количество сделанных шагов
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Один шаг по всем параметрам. Порядок пар (параметр, градиент) должен
    /// быть одинаковым от шага к шагу: моменты привязаны к позиции
    pub fn step<'a, I>(&mut self, params: I)
    where
        I: IntoIterator<Item = (ArrayViewMutD<'a, f64>, ArrayViewD<'a, f64>)>,
    {
        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);
        let (lr, beta1, beta2, eps) = (self.learning_rate, self.beta1, self.beta2, self.epsilon);

        for (idx, (param, grad)) in params.into_iter().enumerate() {
            if self.first_moments.len() <= idx {
                self.first_moments.push(ArrayD::zeros(param.raw_dim()));
                self.second_moments.push(ArrayD::zeros(param.raw_dim()));
            }

            Zip::from(param)
                .and(&grad)
                .and(&mut self.first_moments[idx])
                .and(&mut self.second_moments[idx])
                .for_each(|p, &g, m, v| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / bias1;
                    let v_hat = *v / bias2;
                    *p -= lr * m_hat / (v_hat.sqrt() + eps);
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn first_step_moves_by_learning_rate() {
        // После коррекции смещения первый шаг равен lr * sign(g)
        let mut adam = Adam::new(0.01);
        let mut w = array![1.0, -2.0, 0.5];
        let g = array![0.3, -4.0, 0.0];

        adam.step([(w.view_mut().into_dyn(), g.view().into_dyn())]);

        assert!((w[0] - 0.99).abs() < 1e-6);
        assert!((w[1] + 1.99).abs() < 1e-6);
        assert_eq!(w[2], 0.5);
        assert_eq!(adam.steps(), 1);
    }

    #[test]
    fn minimizes_quadratic() {
        let mut adam = Adam::new(0.1);
        let mut w = Array1::from(vec![5.0, -3.0]);

        for _ in 0..500 {
            let g = &w * 2.0;
            adam.step([(w.view_mut().into_dyn(), g.view().into_dyn())]);
        }

        assert!(w.iter().all(|v| v.abs() < 0.05));
    }
}
