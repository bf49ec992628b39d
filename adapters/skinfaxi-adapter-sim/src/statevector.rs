//! Statevector simulation engine.

use num_complex::Complex64;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use skinfaxi_ir::{Gate, OpKind, Operation, StandardGate};

/// A statevector over `2^n` amplitudes.
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a statevector initialized to |0...0⟩.
    pub fn new(num_qubits: u32) -> Self {
        let num_qubits = num_qubits as usize;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Apply an operation to the statevector.
    ///
    /// Measurements and barriers do not modify the state; sampling happens
    /// after the full evolution.
    pub fn apply(&mut self, op: &Operation) {
        match &op.kind {
            OpKind::Gate(Gate::Standard(gate)) => {
                let q: Vec<usize> = op.qubits.iter().map(|&q| q as usize).collect();
                self.apply_standard_gate(gate, &q);
            }
            // Custom gates never reach execution: validation rejects them.
            OpKind::Gate(Gate::Custom(_)) => {}
            OpKind::Reset => self.reset(op.qubits[0] as usize),
            OpKind::Measure | OpKind::Barrier => {}
        }
    }

    #[allow(clippy::too_many_lines)]
    fn apply_standard_gate(&mut self, gate: &StandardGate, q: &[usize]) {
        match *gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(q[0]),
            StandardGate::Y => self.apply_y(q[0]),
            StandardGate::Z => self.apply_z(q[0]),
            StandardGate::H => self.apply_h(q[0]),
            StandardGate::S => self.apply_phase(q[0], FRAC_PI_2),
            StandardGate::Sdg => self.apply_phase(q[0], -FRAC_PI_2),
            StandardGate::T => self.apply_phase(q[0], FRAC_PI_4),
            StandardGate::Tdg => self.apply_phase(q[0], -FRAC_PI_4),
            StandardGate::SX => self.apply_rx(q[0], FRAC_PI_2),
            StandardGate::SXdg => self.apply_rx(q[0], -FRAC_PI_2),
            StandardGate::Rx(theta) => self.apply_rx(q[0], theta),
            StandardGate::Ry(theta) => self.apply_ry(q[0], theta),
            StandardGate::Rz(theta) => self.apply_rz(q[0], theta),
            StandardGate::P(theta) => self.apply_phase(q[0], theta),
            StandardGate::U(theta, phi, lambda) => self.apply_u(q[0], theta, phi, lambda),

            StandardGate::CX => self.apply_cx(q[0], q[1]),
            StandardGate::CY => self.apply_cy(q[0], q[1]),
            StandardGate::CZ => self.apply_cz(q[0], q[1]),
            StandardGate::CH => self.apply_ch(q[0], q[1]),
            StandardGate::Swap => self.apply_swap(q[0], q[1]),
            StandardGate::ISwap => self.apply_iswap(q[0], q[1]),
            StandardGate::CRx(theta) => {
                self.apply_h(q[1]);
                self.apply_crz(q[0], q[1], theta);
                self.apply_h(q[1]);
            }
            StandardGate::CRy(theta) => self.apply_cry(q[0], q[1], theta),
            StandardGate::CRz(theta) => self.apply_crz(q[0], q[1], theta),
            StandardGate::CP(theta) => self.apply_cp(q[0], q[1], theta),
            StandardGate::RZZ(theta) => self.apply_rzz(q[0], q[1], theta),
            StandardGate::RXX(theta) => {
                self.apply_h(q[0]);
                self.apply_h(q[1]);
                self.apply_rzz(q[0], q[1], theta);
                self.apply_h(q[0]);
                self.apply_h(q[1]);
            }
            StandardGate::RYY(theta) => {
                self.apply_rx(q[0], FRAC_PI_2);
                self.apply_rx(q[1], FRAC_PI_2);
                self.apply_rzz(q[0], q[1], theta);
                self.apply_rx(q[0], -FRAC_PI_2);
                self.apply_rx(q[1], -FRAC_PI_2);
            }

            StandardGate::CCX => self.apply_ccx(q[0], q[1], q[2]),
            StandardGate::CSwap => self.apply_cswap(q[0], q[1], q[2]),
        }
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask != 0 {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for i in 0..(1 << self.num_qubits) {
            if i & mask != 0 {
                self.amplitudes[i] *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                self.amplitudes[i] *= phase_0;
            } else {
                self.amplitudes[i] *= phase_1;
            }
        }
    }

    fn apply_u(&mut self, qubit: usize, theta: f64, phi: f64, lambda: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        let e_il = Complex64::from_polar(1.0, lambda);
        let e_ip = Complex64::from_polar(1.0, phi);
        let e_ipl = Complex64::from_polar(1.0, phi + lambda);

        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - e_il * s * b;
                self.amplitudes[j] = e_ip * s * a + e_ipl * c * b;
            }
        }
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_cy(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_ch(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..(1 << self.num_qubits) {
            let b1 = (i & mask1) != 0;
            let b2 = (i & mask2) != 0;
            if b1 && !b2 {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_iswap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..(1 << self.num_qubits) {
            let b1 = (i & mask1) != 0;
            let b2 = (i & mask2) != 0;
            if b1 && !b2 {
                let j = (i & !mask1) | mask2;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_cry(&mut self, control: usize, target: usize, theta: f64) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_crz(&mut self, control: usize, target: usize, theta: f64) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for i in 0..(1 << self.num_qubits) {
            if i & ctrl_mask != 0 {
                if i & tgt_mask == 0 {
                    self.amplitudes[i] *= phase_0;
                } else {
                    self.amplitudes[i] *= phase_1;
                }
            }
        }
    }

    fn apply_cp(&mut self, control: usize, target: usize, theta: f64) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let phase = Complex64::from_polar(1.0, theta);
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
                self.amplitudes[i] *= phase;
            }
        }
    }

    fn apply_rzz(&mut self, q1: usize, q2: usize, theta: f64) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        let equal = Complex64::from_polar(1.0, -theta / 2.0);
        let unequal = Complex64::from_polar(1.0, theta / 2.0);
        for i in 0..(1 << self.num_qubits) {
            if ((i & mask1) != 0) == ((i & mask2) != 0) {
                self.amplitudes[i] *= equal;
            } else {
                self.amplitudes[i] *= unequal;
            }
        }
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let c1_mask = 1 << c1;
        let c2_mask = 1 << c2;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & c1_mask != 0) && (i & c2_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_cswap(&mut self, control: usize, t1: usize, t2: usize) {
        let ctrl_mask = 1 << control;
        let t1_mask = 1 << t1;
        let t2_mask = 1 << t2;
        for i in 0..(1 << self.num_qubits) {
            if i & ctrl_mask != 0 {
                let b1 = (i & t1_mask) != 0;
                let b2 = (i & t2_mask) != 0;
                if b1 && !b2 {
                    let j = (i & !t1_mask) | t2_mask;
                    self.amplitudes.swap(i, j);
                }
            }
        }
    }

    /// Project a qubit to |0⟩ and renormalize.
    fn reset(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let mut norm_sq = 0.0;
        for i in 0..(1 << self.num_qubits) {
            if i & mask != 0 {
                let j = i & !mask;
                let val = self.amplitudes[i];
                self.amplitudes[j] += val;
                self.amplitudes[i] = Complex64::new(0.0, 0.0);
            }
            norm_sq += self.amplitudes[i].norm_sqr();
        }
        let norm = norm_sq.sqrt();
        if norm > 0.0 {
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
    }

    /// Sample one measurement outcome from the current distribution.
    pub fn sample(&self) -> usize {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }
        // Numerical slack on normalized states.
        self.amplitudes.len() - 1
    }

    /// Bit of `outcome` for a given qubit.
    pub fn outcome_bit(outcome: usize, qubit: usize) -> u8 {
        ((outcome >> qubit) & 1) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_bell_amplitudes() {
        let mut sv = Statevector::new(2);
        sv.apply_h(0);
        sv.apply_cx(0, 1);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_x_flips() {
        let mut sv = Statevector::new(1);
        sv.apply_x(0);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_rx_pi_equals_x_up_to_phase() {
        let mut sv = Statevector::new(1);
        sv.apply_rx(0, PI);
        assert!(sv.amplitudes[0].norm() < 1e-10);
        assert!((sv.amplitudes[1].norm() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_sample_deterministic_state() {
        let mut sv = Statevector::new(1);
        sv.apply_x(0);
        for _ in 0..100 {
            assert_eq!(sv.sample(), 1);
        }
    }

    #[test]
    fn test_reset_collapses() {
        let mut sv = Statevector::new(1);
        sv.apply_h(0);
        sv.reset(0);
        for _ in 0..50 {
            assert_eq!(sv.sample(), 0);
        }
    }

    #[test]
    fn test_rzz_phases() {
        let mut sv = Statevector::new(2);
        sv.apply_x(0);
        sv.apply_rzz(0, 1, PI);
        // |01⟩ picks up e^{iπ/2}; magnitude is unchanged.
        assert!((sv.amplitudes[1].norm() - 1.0).abs() < 1e-10);
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 1.0)));
    }
}
