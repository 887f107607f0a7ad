use crate::math::interest_map::InterestMap;
use crate::prelude::{LocatorConfig, MISSING_VAL};

/// Weighted fuzzy combination of the per-gate metrics into an RLAN flag.
pub struct FusionClassifier<'a> {
    config: &'a LocatorConfig,
}

impl<'a> FusionClassifier<'a> {
    pub fn new(config: &'a LocatorConfig) -> Self {
        Self { config }
    }

    /// Fused interest for one gate.
    ///
    /// With `renormalize_missing_criteria` set, metrics at the missing
    /// marker are left out and the weights re-summed; `None` if nothing
    /// is left. Otherwise every metric goes through its map as is.
    pub fn gate_interest(&self, phase_change_error: f64, snr_sdev: f64, ncp_mean: f64) -> Option<f64> {
        let criteria: [(&InterestMap, f64); 3] = [
            (&self.config.interest_map_phase_change_error, phase_change_error),
            (&self.config.interest_map_snr_sdev, snr_sdev),
            (&self.config.interest_map_ncp_mean, ncp_mean),
        ];
        let skip_missing = self.config.renormalize_missing_criteria;
        let (sum_interest, sum_weights) = criteria
            .iter()
            .filter(|(_, val)| !(skip_missing && *val == MISSING_VAL))
            .fold((0.0, 0.0), |(sum_interest, sum_weights), (map, val)| {
                (
                    sum_interest + map.weight() * map.interest(*val),
                    sum_weights + map.weight(),
                )
            });
        (sum_weights > 0.0).then(|| sum_interest / sum_weights)
    }

    /// Fill the interest and flag arrays for every gate.
    pub fn classify(
        &self,
        phase_change_error: &[f64],
        snr_sdev: &[f64],
        ncp_mean: &[f64],
        interest: &mut [f64],
        flags: &mut [bool],
    ) {
        let threshold = self.config.interest_threshold;
        let gates = phase_change_error
            .iter()
            .zip(snr_sdev)
            .zip(ncp_mean)
            .zip(interest.iter_mut().zip(flags.iter_mut()));
        for (((&pce, &sdev), &ncp), (interest, flag)) in gates {
            match self.gate_interest(pce, sdev, ncp) {
                Some(val) => {
                    *interest = val;
                    *flag = val > threshold;
                }
                None => {
                    *interest = MISSING_VAL;
                    *flag = false;
                }
            }
        }
    }
}
