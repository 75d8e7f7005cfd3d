//! Excited-state data extracted from an output file.
//!
//! [`ExcitedStates`] is the record every program parser produces: one
//! transition energy and one oscillator strength per excited state, stored
//! index-aligned. It is the only shape the rest of the crate sees, so the
//! program-specific parsers can change freely behind it.
//!
//! Energies are in wavenumbers (cm⁻¹); oscillator strengths are dimensionless.

use nalgebra::DVector;

/// Excitation energies and oscillator strengths for a set of excited states.
///
/// Element *i* of [`energies`](Self::energies) and of
/// [`oscillator_strengths`](Self::oscillator_strengths) belong to the same
/// excited state. The two vectors always have the same length; the only way to
/// build an `ExcitedStates` is through [`ExcitedStates::new`], which checks it.
///
/// # Examples
///
/// ```
/// use uvspec::states::ExcitedStates;
///
/// let states = ExcitedStates::new(vec![41_000.0, 45_500.0], vec![0.012, 0.250]).unwrap();
/// assert_eq!(states.len(), 2);
/// assert_eq!(states.strongest().map(|(i, _, _)| i), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExcitedStates {
    energies: DVector<f64>,
    oscillator_strengths: DVector<f64>,
}

impl ExcitedStates {
    /// Builds a record from index-aligned energies (cm⁻¹) and oscillator strengths.
    ///
    /// # Errors
    ///
    /// Returns a description of the mismatch when the two sequences differ in
    /// length.
    pub fn new(energies: Vec<f64>, oscillator_strengths: Vec<f64>) -> Result<Self, String> {
        if energies.len() != oscillator_strengths.len() {
            return Err(format!(
                "{} excitation energies but {} oscillator strengths",
                energies.len(),
                oscillator_strengths.len()
            ));
        }
        Ok(Self {
            energies: DVector::from_vec(energies),
            oscillator_strengths: DVector::from_vec(oscillator_strengths),
        })
    }

    /// Excitation energies in cm⁻¹.
    pub fn energies(&self) -> &DVector<f64> {
        &self.energies
    }

    /// Oscillator strengths, index-aligned with [`energies`](Self::energies).
    pub fn oscillator_strengths(&self) -> &DVector<f64> {
        &self.oscillator_strengths
    }

    /// Number of excited states.
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    /// Returns true when no excited states are present.
    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// Iterates over `(energy, oscillator_strength)` pairs in state order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energies
            .iter()
            .copied()
            .zip(self.oscillator_strengths.iter().copied())
    }

    /// Returns `(index, energy, strength)` of the state with the largest
    /// oscillator strength, or `None` when empty.
    pub fn strongest(&self) -> Option<(usize, f64, f64)> {
        self.iter()
            .enumerate()
            .max_by(|(_, (_, fa)), (_, (_, fb))| fa.total_cmp(fb))
            .map(|(i, (e, f))| (i, e, f))
    }

    /// Splits the record into its two vectors.
    pub fn into_parts(self) -> (DVector<f64>, DVector<f64>) {
        (self.energies, self.oscillator_strengths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_length_mismatch() {
        let result = ExcitedStates::new(vec![30_000.0, 31_000.0], vec![0.1]);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("2 excitation energies but 1"));
    }

    #[test]
    fn test_default_is_empty() {
        let states = ExcitedStates::default();
        assert!(states.is_empty());
        assert_eq!(states.len(), 0);
        assert!(states.strongest().is_none());
    }

    #[test]
    fn test_iter_keeps_index_alignment() {
        let states = ExcitedStates::new(vec![1.0, 2.0, 3.0], vec![0.3, 0.2, 0.1]).unwrap();
        let pairs: Vec<(f64, f64)> = states.iter().collect();
        assert_eq!(pairs, vec![(1.0, 0.3), (2.0, 0.2), (3.0, 0.1)]);
    }

    #[test]
    fn test_strongest() {
        let states = ExcitedStates::new(vec![1.0, 2.0, 3.0], vec![0.01, 0.5, 0.2]).unwrap();
        assert_eq!(states.strongest(), Some((1, 2.0, 0.5)));
    }
}
