// Tempo and time signature as one immutable record. The UI swaps in a new
// record; the scheduler takes a copy at the top of every beat it computes, so
// it can never see half of an update.

use arc_swap::ArcSwap;

use crate::clock::{Tempo, TimeSignature};
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransportConfig {
    pub tempo: Tempo,
    pub signature: TimeSignature,
}

#[derive(Debug)]
pub struct SharedTransport {
    current: ArcSwap<TransportConfig>,
}

impl SharedTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { current: ArcSwap::from_pointee(config) }
    }

    pub fn snapshot(&self) -> TransportConfig {
        **self.current.load()
    }

    /// Validates before swapping; on error the old tempo stays.
    pub fn set_tempo(&self, bpm: f64) -> Result<Tempo, ConfigError> {
        let tempo = Tempo::new(bpm)?;
        self.current.rcu(|current| TransportConfig { tempo, ..**current });
        Ok(tempo)
    }

    pub fn set_signature(&self, signature: TimeSignature) {
        self.current.rcu(|current| TransportConfig { signature, ..**current });
    }
}

impl Default for SharedTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_tempo_keeps_previous_value() {
        let transport = SharedTransport::default();
        transport.set_tempo(90.0).unwrap();
        assert!(transport.set_tempo(0.0).is_err());
        assert!(transport.set_tempo(-5.0).is_err());
        assert_eq!(transport.snapshot().tempo.bpm(), 90.0);
    }

    #[test]
    fn tempo_and_signature_swap_independently() {
        let transport = SharedTransport::default();
        transport.set_signature(TimeSignature::new(7, 8).unwrap());
        transport.set_tempo(150.0).unwrap();
        let snap = transport.snapshot();
        assert_eq!(snap.signature.to_string(), "7/8");
        assert_eq!(snap.tempo.bpm(), 150.0);
    }
}
