use std::collections::HashMap;

use crate::prelude::{SignalCode, SV};

/// One hardware bias value for a (vehicle, signal) pair. Code biases
/// are meters, phase biases cycles. Absence is expressed by the table
/// simply not holding an entry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BiasCorrection {
    /// [SV]
    pub sv: SV,

    /// [SignalCode] the bias applies to
    pub code: SignalCode,

    /// Bias value (meters for code, cycles for phase)
    pub value: f64,
}

/// Current bias values keyed by (vehicle, signal); one value per pair,
/// replaced on update.
#[derive(Debug, Clone, Default)]
pub struct BiasTable {
    inner: HashMap<(SV, SignalCode), f64>,
}

impl BiasTable {
    /// Replaces the current value for this (vehicle, signal) pair.
    pub fn insert(&mut self, bias: BiasCorrection) {
        self.inner.insert((bias.sv, bias.code), bias.value);
    }

    /// Current value, `None` when the product never delivered one.
    pub fn value(&self, sv: SV, code: SignalCode) -> Option<f64> {
        self.inner.get(&(sv, code)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::{BiasCorrection, BiasTable};
    use crate::prelude::{Constellation, SignalCode, SV};

    #[test]
    fn absent_is_none() {
        let sv = SV::new(Constellation::GPS, 5);

        let mut table = BiasTable::default();
        assert!(table.value(sv, SignalCode::C1C).is_none());

        table.insert(BiasCorrection {
            sv,
            code: SignalCode::C1C,
            value: 1.23,
        });

        assert_eq!(table.value(sv, SignalCode::C1C), Some(1.23));
        assert!(table.value(sv, SignalCode::C2W).is_none());
    }
}
