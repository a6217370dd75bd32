//! Hardy-Weinberg equilibrium
//!
//! Compares the genotype counts of one group at one locus with the counts
//! expected from its allele frequencies under random mating.
use crate::chi_square::upper_tail;
use crate::prelude::*;
use log::info;
use serde::Serialize;

/// Observed counts in genotype order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GenotypeCounts(pub [Count; 3]);

impl GenotypeCounts {
    pub fn from_genotypes<I>(genotypes: I) -> Self
    where
        I: IntoIterator<Item = Genotype>,
    {
        let mut counts = [0; 3];
        for genotype in genotypes {
            counts[genotype.index()] += 1;
        }
        GenotypeCounts(counts)
    }

    pub fn get(&self, genotype: Genotype) -> Count {
        self.0[genotype.index()]
    }

    pub fn total(&self) -> Count {
        self.0.iter().sum()
    }

    /// Allele frequencies, two allele copies per subject.
    pub fn frequencies(&self) -> Option<AlleleFrequencies> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let major = 2 * self.get(Genotype::HomozygousMajor) + self.get(Genotype::Heterozygous);
        let p = major as f64 / (2 * total) as f64;
        Some(AlleleFrequencies { p, q: 1.0 - p })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlleleFrequencies {
    /// Major allele.
    pub p: f64,
    /// Minor allele.
    pub q: f64,
}

impl AlleleFrequencies {
    /// Genotype proportions p², 2pq, q².
    pub fn proportions(&self) -> [f64; 3] {
        [self.p * self.p, 2.0 * self.p * self.q, self.q * self.q]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    InEquilibrium,
    NotInEquilibrium,
    /// Some expected count is zero, so its deviation has no value.
    Undetermined,
}

/// Chart row for one genotype.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenotypePoint {
    pub genotype: String,
    pub observed: Count,
    pub expected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardyWeinbergResult {
    pub locus: Locus,
    pub group: String,
    pub observed: GenotypeCounts,
    pub expected: [f64; 3],
    pub frequencies: AlleleFrequencies,
    /// |observed - expected| / expected * 100, `None` where expected is zero.
    pub deviations: [Option<f64>; 3],
    pub threshold: f64,
    pub verdict: Verdict,
    /// Goodness-of-fit statistic with one degree of freedom.
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
}

impl HardyWeinbergResult {
    pub fn from_counts(
        locus: Locus,
        group: &str,
        observed: GenotypeCounts,
        config: &AnalysisConfig,
    ) -> Result<Self, AssociationError> {
        config.validate()?;
        let frequencies = observed
            .frequencies()
            .ok_or_else(|| AssociationError::EmptySample(locus.to_string(), group.to_owned()))?;
        let total = observed.total() as f64;
        let expected = frequencies.proportions().map(|share| share * total);

        let mut deviations = [None; 3];
        for (i, deviation) in deviations.iter_mut().enumerate() {
            if expected[i] > 0.0 {
                *deviation = Some((observed.0[i] as f64 - expected[i]).abs() / expected[i] * 100.0);
            }
        }

        let verdict = if deviations.iter().any(Option::is_none) {
            Verdict::Undetermined
        } else if deviations
            .iter()
            .flatten()
            .all(|&d| d < config.equilibrium_threshold)
        {
            Verdict::InEquilibrium
        } else {
            Verdict::NotInEquilibrium
        };

        let (statistic, p_value) = if verdict == Verdict::Undetermined {
            (None, None)
        } else {
            let statistic: f64 = observed
                .0
                .iter()
                .zip(expected.iter())
                .map(|(&o, &e)| (o as f64 - e).powi(2) / e)
                .sum();
            (Some(statistic), Some(upper_tail(statistic, 1)?))
        };

        Ok(Self {
            locus,
            group: group.to_owned(),
            observed,
            expected,
            frequencies,
            deviations,
            threshold: config.equilibrium_threshold,
            verdict,
            statistic,
            p_value,
        })
    }

    /// Observed against expected counts, one point per genotype.
    pub fn chart_points(&self) -> Vec<GenotypePoint> {
        Genotype::ALL
            .iter()
            .map(|&g| GenotypePoint {
                genotype: self.locus.symbol(g),
                observed: self.observed.get(g),
                expected: self.expected[g.index()],
            })
            .collect()
    }
}

/// Runs the test over raw genotype calls of one group at one locus.
///
/// Every call goes through `Locus::parse_genotype`, so a symbol outside
/// the locus alphabet fails with `AssociationError::UnknownGenotype`.
pub fn hardy_weinberg_calls<'a, I>(
    locus: Locus,
    group: &str,
    calls: I,
    config: &AnalysisConfig,
) -> Result<HardyWeinbergResult, AssociationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let genotypes = calls
        .into_iter()
        .map(|call| locus.parse_genotype(call))
        .collect::<Result<Vec<_>, _>>()?;
    let counts = GenotypeCounts::from_genotypes(genotypes);
    HardyWeinbergResult::from_counts(locus, group, counts, config)
}

pub trait HardyWeinberg {
    /// The test for one (locus, group) pair.
    fn hardy_weinberg(
        &self,
        locus: Locus,
        group: &str,
        config: &AnalysisConfig,
    ) -> Result<HardyWeinbergResult, AssociationError>;

    /// The test for every group, in sorted group order.
    fn hardy_weinberg_by_group(
        &self,
        locus: Locus,
        config: &AnalysisConfig,
    ) -> Result<Vec<HardyWeinbergResult>, AssociationError>;
}

impl HardyWeinberg for Sample {
    fn hardy_weinberg(
        &self,
        locus: Locus,
        group: &str,
        config: &AnalysisConfig,
    ) -> Result<HardyWeinbergResult, AssociationError> {
        let counts = GenotypeCounts::from_genotypes(self.genotypes(locus, group, config)?);
        let result = HardyWeinbergResult::from_counts(locus, group, counts, config)?;
        info!(
            "Hardy-Weinberg at {} in `{}`: p {:.4}, q {:.4}, {:?}.",
            locus, group, result.frequencies.p, result.frequencies.q, result.verdict
        );
        Ok(result)
    }

    fn hardy_weinberg_by_group(
        &self,
        locus: Locus,
        config: &AnalysisConfig,
    ) -> Result<Vec<HardyWeinbergResult>, AssociationError> {
        self.groups(config)?
            .iter()
            .map(|group| self.hardy_weinberg(locus, group, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::error::Error;

    fn run(counts: [Count; 3]) -> Result<HardyWeinbergResult, AssociationError> {
        HardyWeinbergResult::from_counts(
            Locus::Bsm,
            "case",
            GenotypeCounts(counts),
            &AnalysisConfig::default(),
        )
    }

    #[test]
    fn test_textbook_scenario() -> Result<(), Box<dyn Error>> {
        let result = run([50, 40, 10])?;
        assert_abs_diff_eq!(result.frequencies.p, 0.70, epsilon = 1e-12);
        assert_abs_diff_eq!(result.frequencies.q, 0.30, epsilon = 1e-12);
        assert_abs_diff_eq!(result.expected[0], 49.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.expected[1], 42.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.expected[2], 9.0, epsilon = 1e-9);
        // 10 against 9 deviates by 11%.
        assert_eq!(result.verdict, Verdict::NotInEquilibrium);
        Ok(())
    }

    #[test]
    fn test_expected_sums_to_total() -> Result<(), Box<dyn Error>> {
        let samples = [[1, 0, 0], [0, 7, 3], [298, 489, 213], [5, 5, 5], [0, 0, 12], [13, 1, 999]];
        for counts in &samples {
            let result = run(*counts)?;
            let total: Count = counts.iter().sum();
            assert_abs_diff_eq!(result.expected.iter().sum::<f64>(), total as f64, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_perfect_equilibrium() -> Result<(), Box<dyn Error>> {
        let result = run([25, 50, 25])?;
        assert_eq!(result.verdict, Verdict::InEquilibrium);
        assert_eq!(result.deviations, [Some(0.0), Some(0.0), Some(0.0)]);
        assert_abs_diff_eq!(result.statistic.unwrap_or(f64::NAN), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.p_value.unwrap_or(f64::NAN), 1.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_threshold_is_configurable() -> Result<(), Box<dyn Error>> {
        let counts = GenotypeCounts([50, 40, 10]);
        let result = HardyWeinbergResult::from_counts(
            Locus::Bsm,
            "case",
            counts,
            AnalysisConfig::new().equilibrium_threshold(12.0),
        )?;
        assert_eq!(result.verdict, Verdict::InEquilibrium);
        assert_eq!(result.threshold, 12.0);
        Ok(())
    }

    #[test]
    fn test_non_positive_threshold_is_rejected() -> Result<(), Box<dyn Error>> {
        for &threshold in &[0.0, -5.0] {
            let mut config = AnalysisConfig::default();
            config.equilibrium_threshold(threshold);
            assert!(matches!(
                HardyWeinbergResult::from_counts(
                    Locus::Bsm,
                    "case",
                    GenotypeCounts([50, 40, 10]),
                    &config
                ),
                Err(AssociationError::InvalidParameter(ref name, _, _))
                    if name == "equilibrium_threshold"
            ));
        }

        let sample = Sample::from_records(
            vec!["Grupa", "BSM"],
            vec![vec!["case", "AG"], vec!["control", "GG"]],
        )?;
        let mut config = AnalysisConfig::default();
        config.equilibrium_threshold(-5.0);
        assert!(matches!(
            sample.hardy_weinberg_by_group(Locus::Bsm, &config),
            Err(AssociationError::InvalidParameter(_, _, _))
        ));
        Ok(())
    }

    #[test]
    fn test_monomorphic_sample_is_undetermined() -> Result<(), Box<dyn Error>> {
        let result = run([12, 0, 0])?;
        assert_eq!(result.deviations[0], Some(0.0));
        assert_eq!(result.deviations[1], None);
        assert_eq!(result.deviations[2], None);
        assert_eq!(result.verdict, Verdict::Undetermined);
        assert_eq!(result.p_value, None);
        Ok(())
    }

    #[test]
    fn test_empty_sample_fails() {
        assert!(matches!(run([0, 0, 0]), Err(AssociationError::EmptySample(_, _))));
        let calls: Vec<&str> = vec![];
        assert!(matches!(
            hardy_weinberg_calls(Locus::VdrFokI, "control", calls, &AnalysisConfig::default()),
            Err(AssociationError::EmptySample(_, ref g)) if g == "control"
        ));
    }

    #[test]
    fn test_calls_are_validated_per_locus() -> Result<(), Box<dyn Error>> {
        let config = AnalysisConfig::default();
        let calls = vec!["CC", "TC", "CT", "TT"];
        let result = hardy_weinberg_calls(Locus::VdrFokI, "case", calls, &config)?;
        assert_eq!(result.observed, GenotypeCounts([1, 2, 1]));
        assert!(matches!(
            hardy_weinberg_calls(Locus::VdrFokI, "case", vec!["CC", "AG"], &config),
            Err(AssociationError::UnknownGenotype(_, _))
        ));
        Ok(())
    }

    #[test]
    fn test_chart_points() -> Result<(), Box<dyn Error>> {
        let points = run([50, 40, 10])?.chart_points();
        let labels: Vec<&str> = points.iter().map(|p| p.genotype.as_str()).collect();
        assert_eq!(labels, vec!["AA", "AG", "GG"]);
        assert_eq!(points[1].observed, 40);
        assert_abs_diff_eq!(points[1].expected, 42.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_by_group_on_sample() -> Result<(), Box<dyn Error>> {
        let sample = Sample::from_records(
            vec!["Grupa", "BSM"],
            vec![
                vec!["control", "AA"],
                vec!["case", "AG"],
                vec!["case", "GA"],
                vec!["control", "GG"],
                vec!["control", "AG"],
            ],
        )?;
        let results = sample.hardy_weinberg_by_group(Locus::Bsm, &AnalysisConfig::default())?;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].group, "case");
        assert_eq!(results[0].observed, GenotypeCounts([0, 2, 0]));
        assert_eq!(results[1].observed, GenotypeCounts([1, 1, 1]));
        Ok(())
    }
}
